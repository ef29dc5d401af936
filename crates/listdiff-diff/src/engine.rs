//! Symbol-table diff over identity-bearing sequences.
//!
//! Items are paired by identity through a table of per-identity entries.
//! Each entry keeps a stack of candidate old indices so that duplicate
//! identities are paired first-come first-served; surplus duplicates on
//! either side fall out as plain inserts or deletes.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use listdiff_types::{Diffable, GroupPosition, Move, Position};

use crate::result::{DiffResult, IndexDiff, PathDiff};

/// How matched items are compared once their identities line up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiffMode {
    /// Matched items are compared with [`Diffable::is_equal_to`]; a mismatch
    /// is reported as an update.
    #[default]
    Equality,
    /// Only identities are compared. Matched items are never updates.
    Identity,
}

/// Diff two flat sequences.
///
/// Deletes and updates are reported in old-sequence indices, inserts in
/// new-sequence indices, and moves as `old -> new` pairs.
pub fn diff<T: Diffable>(old: &[T], new: &[T], mode: DiffMode) -> IndexDiff<T::Identity> {
    compute(old, new, mode, |i| i, |i| i)
}

/// Diff the items of one group against the items of another.
///
/// Deletes and updates are tagged with `from_group`, inserts with
/// `to_group`, and moves carry both.
pub fn diff_paths<T: Diffable>(
    from_group: usize,
    to_group: usize,
    old: &[T],
    new: &[T],
    mode: DiffMode,
) -> PathDiff<T::Identity> {
    compute(
        old,
        new,
        mode,
        |i| GroupPosition::new(from_group, i),
        |i| GroupPosition::new(to_group, i),
    )
}

/// Per-identity bookkeeping.
#[derive(Debug, Default)]
struct Entry {
    old_count: usize,
    new_count: usize,
    /// Candidate old indices, smallest on top. `None` marks a new-only
    /// occurrence and sits beneath every real index.
    old_indices: Vec<Option<usize>>,
}

fn compute<T, P, F, G>(
    old: &[T],
    new: &[T],
    mode: DiffMode,
    old_pos: F,
    new_pos: G,
) -> DiffResult<P, T::Identity>
where
    T: Diffable,
    P: Position,
    F: Fn(usize) -> P,
    G: Fn(usize) -> P,
{
    let old_lookup: HashMap<T::Identity, P> = old
        .iter()
        .enumerate()
        .map(|(i, item)| (item.diff_identity(), old_pos(i)))
        .collect();
    let new_lookup: HashMap<T::Identity, P> = new
        .iter()
        .enumerate()
        .map(|(i, item)| (item.diff_identity(), new_pos(i)))
        .collect();

    if new.is_empty() {
        let deletes = (0..old.len()).map(&old_pos).collect();
        return DiffResult::new(
            BTreeSet::new(),
            deletes,
            BTreeSet::new(),
            BTreeSet::new(),
            BTreeMap::new(),
            old_lookup,
            new_lookup,
        );
    }
    if old.is_empty() {
        let inserts = (0..new.len()).map(&new_pos).collect();
        return DiffResult::new(
            inserts,
            BTreeSet::new(),
            BTreeSet::new(),
            BTreeSet::new(),
            BTreeMap::new(),
            old_lookup,
            new_lookup,
        );
    }

    let mut entries: Vec<Entry> = Vec::new();
    let mut table: HashMap<T::Identity, usize> = HashMap::with_capacity(new.len());

    // Pass 1: count new occurrences and push a placeholder for each.
    let mut new_entries = Vec::with_capacity(new.len());
    for item in new {
        let slot = *table.entry(item.diff_identity()).or_insert_with(|| {
            entries.push(Entry::default());
            entries.len() - 1
        });
        let entry = &mut entries[slot];
        entry.new_count += 1;
        entry.old_indices.push(None);
        new_entries.push(slot);
    }

    // Pass 2: walk old back to front so the lowest index ends up on top.
    for (i, item) in old.iter().enumerate().rev() {
        let slot = *table.entry(item.diff_identity()).or_insert_with(|| {
            entries.push(Entry::default());
            entries.len() - 1
        });
        let entry = &mut entries[slot];
        entry.old_count += 1;
        entry.old_indices.push(Some(i));
    }

    // Pass 3: pair each new item with the next old candidate.
    let mut old_matched = vec![false; old.len()];
    let mut new_matches: Vec<Option<(usize, bool)>> = vec![None; new.len()];
    for (i, &slot) in new_entries.iter().enumerate() {
        let entry = &mut entries[slot];
        let Some(Some(o)) = entry.old_indices.pop() else {
            continue;
        };
        if entry.new_count > 0 && entry.old_count > 0 {
            let updated = match mode {
                DiffMode::Equality => !new[i].is_equal_to(&old[o]),
                DiffMode::Identity => false,
            };
            old_matched[o] = true;
            new_matches[i] = Some((o, updated));
        }
    }

    let mut deletes = BTreeSet::new();
    let mut delete_offsets = Vec::with_capacity(old.len());
    let mut running = 0;
    for (i, &matched) in old_matched.iter().enumerate() {
        delete_offsets.push(running);
        if !matched {
            deletes.insert(old_pos(i));
            running += 1;
        }
    }

    let mut inserts = BTreeSet::new();
    let mut updates = BTreeSet::new();
    let mut matches = BTreeMap::new();
    let mut moves = BTreeSet::new();
    running = 0;
    for (i, matched) in new_matches.iter().enumerate() {
        match *matched {
            None => {
                inserts.insert(new_pos(i));
                running += 1;
            }
            Some((o, updated)) => {
                matches.insert(old_pos(o), new_pos(i));
                if updated {
                    updates.insert(old_pos(o));
                }
                if o - delete_offsets[o] + running != i {
                    moves.insert(Move::new(old_pos(o), new_pos(i)));
                }
            }
        }
    }

    debug!(
        old = old.len(),
        new = new.len(),
        inserts = inserts.len(),
        deletes = deletes.len(),
        updates = updates.len(),
        moves = moves.len(),
        "diff computed"
    );

    DiffResult::new(
        inserts,
        deletes,
        updates,
        moves,
        matches,
        old_lookup,
        new_lookup,
    )
}
