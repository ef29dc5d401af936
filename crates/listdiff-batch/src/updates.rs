//! Hand-issued mutations collected for the next apply cycle.

use std::collections::BTreeSet;
use std::fmt;
use std::hash::Hash;

use listdiff_diff::PathDiff;
use listdiff_types::{GroupPosition, Move, Reload};

use crate::operations::GroupMutationSet;

/// A side effect run just before the structural apply.
pub type BeforeApply = Box<dyn FnOnce()>;

/// A callback told whether the cycle's apply succeeded.
pub type Completion = Box<dyn FnOnce(bool)>;

/// Append-only collector of mutations for one pending apply cycle.
///
/// Positions follow the same convention as [`GroupMutationSet`]: deletes
/// and move sources are old-snapshot positions, inserts and move
/// destinations are new-snapshot positions.
#[derive(Default)]
pub struct BatchUpdates {
    group_reloads: BTreeSet<usize>,
    item_inserts: Vec<GroupPosition>,
    item_deletes: Vec<GroupPosition>,
    item_moves: Vec<Move<GroupPosition>>,
    item_reloads: Vec<Reload>,
    before_apply: Vec<BeforeApply>,
    completions: Vec<Completion>,
}

impl BatchUpdates {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the group at `index` in the old snapshot.
    pub fn reload_group(&mut self, index: usize) {
        self.group_reloads.insert(index);
    }

    /// Insert items at new-snapshot positions.
    pub fn insert_items(&mut self, positions: impl IntoIterator<Item = GroupPosition>) {
        self.item_inserts.extend(positions);
    }

    /// Delete items at old-snapshot positions.
    pub fn delete_items(&mut self, positions: impl IntoIterator<Item = GroupPosition>) {
        self.item_deletes.extend(positions);
    }

    /// Move an item from an old slot to a new slot.
    pub fn move_item(&mut self, from: GroupPosition, to: GroupPosition) {
        self.item_moves.push(Move::new(from, to));
    }

    /// Rebuild the item at `from` in the old snapshot at `to` in the new one.
    pub fn reload_item(&mut self, from: GroupPosition, to: GroupPosition) {
        self.item_reloads.push(Reload::new(from, to));
    }

    /// Record the structural changes of an item-level diff.
    ///
    /// The diff is made batch-safe first, so updated items are recorded as
    /// a delete of the old slot and an insert of the new one.
    pub fn record_item_diff<I: Clone + Eq + Hash>(&mut self, result: &PathDiff<I>) {
        let safe = result.to_batch_safe();
        self.item_deletes.extend(safe.deletes().iter().copied());
        self.item_inserts.extend(safe.inserts().iter().copied());
        self.item_moves.extend(safe.moves().iter().copied());
    }

    /// Run `f` right before the structural apply.
    pub fn before_apply(&mut self, f: impl FnOnce() + 'static) {
        self.before_apply.push(Box::new(f));
    }

    /// Run `f` once the cycle finishes.
    pub fn on_complete(&mut self, f: impl FnOnce(bool) + 'static) {
        self.completions.push(Box::new(f));
    }

    /// Returns `true` if any structural mutation was recorded.
    pub fn has_changes(&self) -> bool {
        !self.group_reloads.is_empty()
            || !self.item_inserts.is_empty()
            || !self.item_deletes.is_empty()
            || !self.item_moves.is_empty()
            || !self.item_reloads.is_empty()
    }

    /// Returns `true` if nothing at all was recorded, callbacks included.
    pub fn is_empty(&self) -> bool {
        !self.has_changes() && self.before_apply.is_empty() && self.completions.is_empty()
    }

    /// Group reloads recorded so far.
    pub fn group_reloads(&self) -> &BTreeSet<usize> {
        &self.group_reloads
    }

    /// Move every item mutation into `mutations`, leaving group reloads and
    /// callbacks behind.
    pub(crate) fn drain_items_into(&mut self, mutations: &mut GroupMutationSet) {
        mutations.item_inserts.append(&mut self.item_inserts);
        mutations.item_deletes.append(&mut self.item_deletes);
        mutations.item_moves.append(&mut self.item_moves);
        mutations.item_reloads.append(&mut self.item_reloads);
    }

    /// Split off the callbacks.
    pub(crate) fn take_callbacks(&mut self) -> (Vec<BeforeApply>, Vec<Completion>) {
        (
            std::mem::take(&mut self.before_apply),
            std::mem::take(&mut self.completions),
        )
    }
}

impl fmt::Debug for BatchUpdates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchUpdates")
            .field("group_reloads", &self.group_reloads)
            .field("item_inserts", &self.item_inserts)
            .field("item_deletes", &self.item_deletes)
            .field("item_moves", &self.item_moves)
            .field("item_reloads", &self.item_reloads)
            .field("before_apply", &self.before_apply.len())
            .field("completions", &self.completions.len())
            .finish()
    }
}
