//! Raw mutation sets and reconciled operation sets.

use std::collections::BTreeSet;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use listdiff_diff::IndexDiff;
use listdiff_types::{GroupPosition, Move, Reload};

use crate::error::{Result, UpdateError};

// ---------------------------------------------------------------------------
// GroupMutationSet
// ---------------------------------------------------------------------------

/// Raw group and item mutations gathered for one apply cycle.
///
/// Group indices and item positions in deletes and move sources refer to the
/// old snapshot; inserts and move destinations refer to the new snapshot.
/// Consumed by [`reconcile`](crate::reconcile).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GroupMutationSet {
    /// Groups inserted, by new index.
    pub group_inserts: BTreeSet<usize>,
    /// Groups deleted, by old index.
    pub group_deletes: BTreeSet<usize>,
    /// Groups moved from an old index to a new index.
    pub group_moves: BTreeSet<Move<usize>>,
    /// Items inserted, in the new snapshot.
    pub item_inserts: Vec<GroupPosition>,
    /// Items deleted, in the old snapshot. May repeat.
    pub item_deletes: Vec<GroupPosition>,
    /// Items moved from an old slot to a new slot.
    pub item_moves: Vec<Move<GroupPosition>>,
    /// Items rebuilt from an old slot into a new slot.
    pub item_reloads: Vec<Reload>,
}

impl GroupMutationSet {
    /// Seed the group-level mutations from a group diff.
    ///
    /// Updates are not carried over; see
    /// [`convert_group_reloads`](crate::convert_group_reloads).
    pub fn from_diff<I: Clone + Eq + Hash>(result: &IndexDiff<I>) -> Self {
        Self {
            group_inserts: result.inserts().clone(),
            group_deletes: result.deletes().clone(),
            group_moves: result.moves().clone(),
            ..Default::default()
        }
    }

    /// Returns `true` if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.group_inserts.is_empty()
            && self.group_deletes.is_empty()
            && self.group_moves.is_empty()
            && self.item_inserts.is_empty()
            && self.item_deletes.is_empty()
            && self.item_moves.is_empty()
            && self.item_reloads.is_empty()
    }
}

// ---------------------------------------------------------------------------
// ReconciledOperations
// ---------------------------------------------------------------------------

/// A single structural operation, as handed to a renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    /// Remove the item at an old-snapshot position.
    DeleteItem(GroupPosition),
    /// Insert an item at a new-snapshot position.
    InsertItem(GroupPosition),
    /// Move an item between slots.
    MoveItem(Move<GroupPosition>),
    /// Move a whole group.
    MoveGroup(Move<usize>),
    /// Remove the group at an old index.
    DeleteGroup(usize),
    /// Insert a group at a new index, built from the new snapshot.
    InsertGroup(usize),
}

/// A conflict-free operation set, safe to apply as one atomic transaction.
///
/// Within the old snapshot no group (or item) is both deleted and moved;
/// within the new snapshot no group (or item) is both inserted and a move
/// destination.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciledOperations {
    /// Groups inserted, by new index.
    pub group_inserts: BTreeSet<usize>,
    /// Groups deleted, by old index.
    pub group_deletes: BTreeSet<usize>,
    /// Groups moved; none is also deleted or inserted.
    pub group_moves: BTreeSet<Move<usize>>,
    /// Items inserted; never inside an inserted or moved-to group.
    pub item_inserts: BTreeSet<GroupPosition>,
    /// Items deleted; never inside a deleted or moved-from group.
    pub item_deletes: BTreeSet<GroupPosition>,
    /// Items moved between stationary groups.
    pub item_moves: BTreeSet<Move<GroupPosition>>,
}

impl ReconciledOperations {
    /// Returns `true` if there is nothing to apply.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of operations.
    pub fn len(&self) -> usize {
        self.group_inserts.len()
            + self.group_deletes.len()
            + self.group_moves.len()
            + self.item_inserts.len()
            + self.item_deletes.len()
            + self.item_moves.len()
    }

    /// All operations in the order a renderer must apply them: item
    /// deletes, item inserts, item moves, group moves, group deletes, group
    /// inserts.
    pub fn ordered(&self) -> Vec<Operation> {
        let mut ops = Vec::with_capacity(self.len());
        ops.extend(self.item_deletes.iter().copied().map(Operation::DeleteItem));
        ops.extend(self.item_inserts.iter().copied().map(Operation::InsertItem));
        ops.extend(self.item_moves.iter().copied().map(Operation::MoveItem));
        ops.extend(self.group_moves.iter().copied().map(Operation::MoveGroup));
        ops.extend(self.group_deletes.iter().copied().map(Operation::DeleteGroup));
        ops.extend(self.group_inserts.iter().copied().map(Operation::InsertGroup));
        ops
    }

    /// Verify that no slot is claimed twice within either snapshot.
    pub fn check_disjoint(&self) -> Result<()> {
        disjoint(
            "group",
            "old",
            &self.group_deletes,
            self.group_moves.iter().map(|m| m.from),
        )?;
        disjoint(
            "group",
            "new",
            &self.group_inserts,
            self.group_moves.iter().map(|m| m.to),
        )?;
        disjoint(
            "item",
            "old",
            &self.item_deletes,
            self.item_moves.iter().map(|m| m.from),
        )?;
        disjoint(
            "item",
            "new",
            &self.item_inserts,
            self.item_moves.iter().map(|m| m.to),
        )
    }

    /// Verify that every group index fits the snapshots: deletes and move
    /// sources against `old_groups`, inserts and move destinations against
    /// `new_groups`.
    ///
    /// Items are checked by their group only. Group contents are opaque to
    /// the updater, so item indices within a group are the renderer's to
    /// check.
    pub fn check_bounds(&self, old_groups: usize, new_groups: usize) -> Result<()> {
        let old = self
            .group_deletes
            .iter()
            .copied()
            .chain(self.group_moves.iter().map(|m| m.from))
            .chain(self.item_deletes.iter().map(|p| p.group))
            .chain(self.item_moves.iter().map(|m| m.from.group));
        in_range("old group", old, old_groups)?;

        let new = self
            .group_inserts
            .iter()
            .copied()
            .chain(self.group_moves.iter().map(|m| m.to))
            .chain(self.item_inserts.iter().map(|p| p.group))
            .chain(self.item_moves.iter().map(|m| m.to.group));
        in_range("new group", new, new_groups)
    }
}

fn disjoint<P: Ord + Copy + std::fmt::Debug>(
    level: &str,
    space: &str,
    claimed: &BTreeSet<P>,
    moved: impl Iterator<Item = P>,
) -> Result<()> {
    let mut seen = BTreeSet::new();
    for p in moved {
        if claimed.contains(&p) || !seen.insert(p) {
            return Err(UpdateError::Conflict(format!(
                "{level} {p:?} claimed twice in the {space} snapshot"
            )));
        }
    }
    Ok(())
}

fn in_range(what: &'static str, indices: impl Iterator<Item = usize>, len: usize) -> Result<()> {
    for index in indices {
        if index >= len {
            return Err(UpdateError::OutOfRange { what, index, len });
        }
    }
    Ok(())
}
