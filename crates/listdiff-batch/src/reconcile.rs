//! Conflict resolution between group-level and item-level mutations.
//!
//! A renderer applies one cycle's structural changes as a single
//! transaction. When two mutations describe the same slot differently (a
//! group is moved while an item inside it is deleted, say), the coarser
//! delete+insert form wins: the moved group is rebuilt instead.

use std::collections::{BTreeSet, HashMap};
use std::hash::Hash;

use tracing::{debug, warn};

use listdiff_diff::IndexDiff;
use listdiff_types::{GroupPosition, Move};

use crate::operations::{GroupMutationSet, ReconciledOperations};

/// Group-level sets being rewritten by [`reconcile`].
struct GroupOps {
    inserts: BTreeSet<usize>,
    deletes: BTreeSet<usize>,
    moves: BTreeSet<Move<usize>>,
}

impl GroupOps {
    /// Replace a group move by a delete of its source and an insert of its
    /// destination. Converting the same move twice is a no-op.
    fn rebuild(&mut self, mv: Move<usize>, reason: &str) {
        if self.moves.remove(&mv) {
            debug!(from = mv.from, to = mv.to, reason, "group move rebuilt as delete+insert");
        }
        self.deletes.insert(mv.from);
        self.inserts.insert(mv.to);
    }
}

/// Resolve one cycle's mutations into a conflict-free operation set.
///
/// Rules, in order:
///
/// 1. Group moves whose destination is inserted or whose source is deleted
///    are dropped.
/// 2. The surviving moves are indexed by source and destination. The
///    indexes are fixed for the rest of the pass so that every conflicting
///    item in a moved group is caught, not just the first.
/// 3. An item delete inside a moved-from group is dropped and the group
///    move is rebuilt as delete+insert.
/// 4. An item insert inside a moved-to group is dropped, likewise.
/// 5. Item deletes are deduplicated.
/// 6. Item moves out of a deleted group are dropped; item moves out of a
///    moved group are dropped and the group move is rebuilt.
/// 7. Item reloads become delete(from)+insert(to), unless `from` is already
///    deleted. A reload touching a moved group rebuilds that group instead.
///
/// A group that ends up deleted takes its items with it, and a group that
/// ends up inserted is built whole from the new snapshot. So item deletes
/// and move sources inside a deleted group are dropped, item inserts inside
/// an inserted group are dropped, and an item move into an inserted group
/// becomes a delete of its source. This covers groups rebuilt by a reload
/// as well as rebuilt moves. An item move into a moved-to group rebuilds
/// that group, as an item insert would.
///
/// # Panics
///
/// If the result still claims a slot twice within one snapshot, which only
/// happens when the input itself moves and deletes (or inserts into) the
/// same item.
pub fn reconcile(mutations: GroupMutationSet) -> ReconciledOperations {
    let GroupMutationSet {
        group_inserts,
        group_deletes,
        group_moves,
        item_inserts,
        item_deletes,
        item_moves,
        item_reloads,
    } = mutations;

    let mut groups = GroupOps {
        inserts: group_inserts,
        deletes: group_deletes,
        moves: BTreeSet::new(),
    };

    // 1 + 2.
    let mut moved_from: HashMap<usize, Move<usize>> = HashMap::with_capacity(group_moves.len());
    let mut moved_to: HashMap<usize, Move<usize>> = HashMap::with_capacity(group_moves.len());
    for mv in group_moves {
        if groups.deletes.contains(&mv.from) || groups.inserts.contains(&mv.to) {
            debug!(from = mv.from, to = mv.to, "group move superseded by insert or delete");
            continue;
        }
        moved_from.insert(mv.from, mv);
        moved_to.insert(mv.to, mv);
        groups.moves.insert(mv);
    }
    let deleted_groups = groups.deletes.clone();

    // 3 + 5.
    let mut deletes: BTreeSet<GroupPosition> = BTreeSet::new();
    for position in item_deletes {
        match moved_from.get(&position.group) {
            Some(&mv) => groups.rebuild(mv, "item delete in moved group"),
            None => {
                deletes.insert(position);
            }
        }
    }

    // 4.
    let mut inserts: BTreeSet<GroupPosition> = BTreeSet::new();
    for position in item_inserts {
        match moved_to.get(&position.group) {
            Some(&mv) => groups.rebuild(mv, "item insert in moved group"),
            None => {
                inserts.insert(position);
            }
        }
    }

    // 6.
    let mut moves: BTreeSet<Move<GroupPosition>> = BTreeSet::new();
    for mv in item_moves {
        if deleted_groups.contains(&mv.from.group) {
            debug!(from = %mv.from, to = %mv.to, "item move out of deleted group dropped");
            continue;
        }
        if let Some(&group_move) = moved_from.get(&mv.from.group) {
            groups.rebuild(group_move, "item move in moved group");
            continue;
        }
        if let Some(&group_move) = moved_to.get(&mv.to.group) {
            groups.rebuild(group_move, "item move into moved group");
        }
        moves.insert(mv);
    }

    // 7.
    for reload in item_reloads {
        if deletes.contains(&reload.from) {
            continue;
        }
        if let Some(&mv) = moved_from.get(&reload.from.group) {
            groups.rebuild(mv, "item reload in moved group");
            continue;
        }
        if let Some(&mv) = moved_to.get(&reload.to.group) {
            groups.rebuild(mv, "item reload in moved group");
            continue;
        }
        deletes.insert(reload.from);
        inserts.insert(reload.to);
    }

    // Items inside whole-group deletes and inserts.
    deletes.retain(|p| !groups.deletes.contains(&p.group));
    inserts.retain(|p| !groups.inserts.contains(&p.group));
    let mut kept_moves = BTreeSet::new();
    for mv in moves {
        if groups.deletes.contains(&mv.from.group) {
            continue;
        }
        if groups.inserts.contains(&mv.to.group) {
            debug!(from = %mv.from, to = %mv.to, "item move into rebuilt group kept as delete");
            deletes.insert(mv.from);
        } else {
            kept_moves.insert(mv);
        }
    }

    let operations = ReconciledOperations {
        group_inserts: groups.inserts,
        group_deletes: groups.deletes,
        group_moves: groups.moves,
        item_inserts: inserts,
        item_deletes: deletes,
        item_moves: kept_moves,
    };

    // 8.
    if let Err(err) = operations.check_disjoint() {
        panic!("reconciled operations are not disjoint: {err}");
    }

    debug!(
        group_inserts = operations.group_inserts.len(),
        group_deletes = operations.group_deletes.len(),
        group_moves = operations.group_moves.len(),
        item_inserts = operations.item_inserts.len(),
        item_deletes = operations.item_deletes.len(),
        item_moves = operations.item_moves.len(),
        "operations reconciled"
    );
    operations
}

/// Turn group reloads into delete+insert pairs on `mutations`.
///
/// `reloads` are indices into the old snapshot of `old_len` groups. Each
/// reloaded group is deleted at its old position and inserted at the new
/// position it was matched with in `result`, so repeated identities rebuild
/// the right group. Reloads outside the old snapshot, or of groups the diff
/// deletes, are dropped with a warning.
pub fn convert_group_reloads<I: Clone + Eq + Hash>(
    reloads: &BTreeSet<usize>,
    old_len: usize,
    result: &IndexDiff<I>,
    mutations: &mut GroupMutationSet,
) {
    for &index in reloads {
        if index >= old_len {
            warn!(index, len = old_len, "reload of unknown group ignored");
            continue;
        }
        match result.matched_position(index) {
            Some(new) => {
                mutations.group_deletes.insert(index);
                mutations.group_inserts.insert(new);
            }
            None => warn!(index, "reload of removed group dropped"),
        }
    }
}
