//! Property-based tests for batch-update reconciliation.

use std::collections::BTreeSet;

use listdiff_batch::{convert_group_reloads, reconcile, GroupMutationSet};
use listdiff_diff::{diff, DiffMode};
use listdiff_types::{GroupPosition, Move, Reload};
use proptest::prelude::*;

// =============================================================================
// Test helpers
// =============================================================================

/// Unique group identities before and after: a shuffled subset of the old
/// groups followed by some fresh ones.
fn group_snapshots() -> impl Strategy<Value = (Vec<u32>, Vec<u32>)> {
    (0usize..8, 0u32..3).prop_flat_map(|(len, fresh)| {
        let old: Vec<u32> = (0..len as u32).collect();
        let kept = prop::sample::subsequence(old.clone(), 0..=len).prop_shuffle();
        (Just(old), kept).prop_map(move |(old, mut new)| {
            new.extend((0..fresh).map(|k| 100 + k));
            (old, new)
        })
    })
}

fn raw_positions() -> impl Strategy<Value = Vec<(usize, usize)>> {
    prop::collection::vec((0usize..8, 0usize..6), 0..8)
}

/// Fold raw pairs into positions inside a snapshot of `groups` groups.
fn positions(raw: &[(usize, usize)], groups: usize) -> Vec<GroupPosition> {
    if groups == 0 {
        return Vec::new();
    }
    raw.iter()
        .map(|&(g, i)| GroupPosition::new(g % groups, i))
        .collect()
}

/// Build a mutation set whose item-level input is self-consistent: no item
/// is both moved and deleted, and no slot is claimed by two moves.
fn mutation_set(
    old: &[u32],
    new: &[u32],
    reloads: &[usize],
    deletes: &[(usize, usize)],
    inserts: &[(usize, usize)],
    move_pairs: &[((usize, usize), (usize, usize))],
    item_reloads: &[((usize, usize), (usize, usize))],
) -> GroupMutationSet {
    let result = diff(old, new, DiffMode::Equality);
    let mut set = GroupMutationSet::from_diff(&result);
    let reloads: BTreeSet<usize> = reloads
        .iter()
        .filter(|_| !old.is_empty())
        .map(|r| r % old.len().max(1))
        .collect();
    convert_group_reloads(&reloads, old.len(), &result, &mut set);

    set.item_deletes = positions(deletes, old.len());
    set.item_inserts = positions(inserts, new.len());

    let deleted: BTreeSet<GroupPosition> = set.item_deletes.iter().copied().collect();
    let inserted: BTreeSet<GroupPosition> = set.item_inserts.iter().copied().collect();
    let mut froms = BTreeSet::new();
    let mut tos = BTreeSet::new();
    if !old.is_empty() && !new.is_empty() {
        for &(from, to) in move_pairs {
            let from = positions(&[from], old.len())[0];
            let to = positions(&[to], new.len())[0];
            if deleted.contains(&from)
                || inserted.contains(&to)
                || froms.contains(&from)
                || tos.contains(&to)
            {
                continue;
            }
            froms.insert(from);
            tos.insert(to);
            set.item_moves.push(Move::new(from, to));
        }
        for &(from, to) in item_reloads {
            let from = positions(&[from], old.len())[0];
            let to = positions(&[to], new.len())[0];
            if froms.contains(&from) || tos.contains(&to) {
                continue;
            }
            set.item_reloads.push(Reload::new(from, to));
        }
    }
    set
}

fn pairs() -> impl Strategy<Value = Vec<((usize, usize), (usize, usize))>> {
    prop::collection::vec(((0usize..8, 0usize..6), (0usize..8, 0usize..6)), 0..6)
}

// =============================================================================
// Reconciliation properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn reconciled_operations_are_disjoint(
        (old, new) in group_snapshots(),
        reloads in prop::collection::vec(0usize..8, 0..3),
        deletes in raw_positions(),
        inserts in raw_positions(),
        moves in pairs(),
        item_reloads in pairs(),
    ) {
        let set = mutation_set(&old, &new, &reloads, &deletes, &inserts, &moves, &item_reloads);
        let ops = reconcile(set);
        prop_assert!(ops.check_disjoint().is_ok());
        prop_assert!(ops.check_bounds(old.len(), new.len()).is_ok());
    }

    #[test]
    fn no_item_operation_touches_a_moved_or_rebuilt_group(
        (old, new) in group_snapshots(),
        reloads in prop::collection::vec(0usize..8, 0..3),
        deletes in raw_positions(),
        inserts in raw_positions(),
        moves in pairs(),
        item_reloads in pairs(),
    ) {
        let set = mutation_set(&old, &new, &reloads, &deletes, &inserts, &moves, &item_reloads);
        let ops = reconcile(set);

        let moved_from: BTreeSet<usize> = ops.group_moves.iter().map(|m| m.from).collect();
        let moved_to: BTreeSet<usize> = ops.group_moves.iter().map(|m| m.to).collect();
        for p in &ops.item_deletes {
            prop_assert!(!moved_from.contains(&p.group));
            prop_assert!(!ops.group_deletes.contains(&p.group));
        }
        for p in &ops.item_inserts {
            prop_assert!(!moved_to.contains(&p.group));
            prop_assert!(!ops.group_inserts.contains(&p.group));
        }
        for m in &ops.item_moves {
            prop_assert!(!moved_from.contains(&m.from.group));
            prop_assert!(!moved_to.contains(&m.to.group));
            prop_assert!(!ops.group_deletes.contains(&m.from.group));
            prop_assert!(!ops.group_inserts.contains(&m.to.group));
        }
    }

    #[test]
    fn surviving_group_moves_come_from_the_diff(
        (old, new) in group_snapshots(),
        deletes in raw_positions(),
        inserts in raw_positions(),
    ) {
        let set = mutation_set(&old, &new, &[], &deletes, &inserts, &[], &[]);
        let original = set.group_moves.clone();
        let ops = reconcile(set);
        prop_assert!(ops.group_moves.is_subset(&original));
    }

    #[test]
    fn group_counts_stay_balanced(
        (old, new) in group_snapshots(),
        reloads in prop::collection::vec(0usize..8, 0..3),
        deletes in raw_positions(),
        inserts in raw_positions(),
        moves in pairs(),
    ) {
        let set = mutation_set(&old, &new, &reloads, &deletes, &inserts, &moves, &[]);
        let ops = reconcile(set);
        prop_assert_eq!(
            old.len() + ops.group_inserts.len() - ops.group_deletes.len(),
            new.len()
        );
    }
}
