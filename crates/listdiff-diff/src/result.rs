//! Diff output and the batch-safe transform.

use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::hash::Hash;

use listdiff_types::{GroupPosition, Move, Position};

/// A diff over flat indices.
pub type IndexDiff<I> = DiffResult<usize, I>;

/// A diff over (group, item) positions.
pub type PathDiff<I> = DiffResult<GroupPosition, I>;

/// The result of diffing two snapshots.
///
/// Deletes and updates are positions in the old snapshot, inserts are
/// positions in the new snapshot, and moves pair the two. A result is
/// immutable once built; [`DiffResult::to_batch_safe`] derives a new one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiffResult<P, I>
where
    P: Position,
    I: Eq + Hash,
{
    inserts: BTreeSet<P>,
    deletes: BTreeSet<P>,
    updates: BTreeSet<P>,
    moves: BTreeSet<Move<P>>,
    /// Old position -> new position for every matched pair.
    matches: BTreeMap<P, P>,
    old_lookup: HashMap<I, P>,
    new_lookup: HashMap<I, P>,
}

impl<P, I> DiffResult<P, I>
where
    P: Position,
    I: Clone + Eq + Hash,
{
    pub(crate) fn new(
        inserts: BTreeSet<P>,
        deletes: BTreeSet<P>,
        updates: BTreeSet<P>,
        moves: BTreeSet<Move<P>>,
        matches: BTreeMap<P, P>,
        old_lookup: HashMap<I, P>,
        new_lookup: HashMap<I, P>,
    ) -> Self {
        Self {
            inserts,
            deletes,
            updates,
            moves,
            matches,
            old_lookup,
            new_lookup,
        }
    }

    /// Positions in the new snapshot holding items with no old counterpart.
    pub fn inserts(&self) -> &BTreeSet<P> {
        &self.inserts
    }

    /// Positions in the old snapshot whose items have no new counterpart.
    pub fn deletes(&self) -> &BTreeSet<P> {
        &self.deletes
    }

    /// Old positions of matched items whose value changed.
    pub fn updates(&self) -> &BTreeSet<P> {
        &self.updates
    }

    /// Matched items whose position changed beyond the shift caused by
    /// inserts and deletes.
    pub fn moves(&self) -> &BTreeSet<Move<P>> {
        &self.moves
    }

    /// New position of the item matched with the item at `old`.
    ///
    /// `None` for deleted positions and positions outside the old snapshot.
    /// Unlike [`DiffResult::new_position`] this follows the actual pairing,
    /// so it stays exact when identities repeat.
    pub fn matched_position(&self, old: P) -> Option<P> {
        self.matches.get(&old).copied()
    }

    /// Returns `true` if the two snapshots differ.
    pub fn has_changes(&self) -> bool {
        self.change_count() > 0
    }

    /// Total number of inserts, deletes, updates, and moves.
    pub fn change_count(&self) -> usize {
        self.inserts.len() + self.deletes.len() + self.updates.len() + self.moves.len()
    }

    /// Position of `identity` in the old snapshot.
    ///
    /// For an identity that occurs more than once, the last occurrence.
    pub fn old_position<Q>(&self, identity: &Q) -> Option<P>
    where
        I: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.old_lookup.get(identity).copied()
    }

    /// Position of `identity` in the new snapshot.
    ///
    /// For an identity that occurs more than once, the last occurrence.
    pub fn new_position<Q>(&self, identity: &Q) -> Option<P>
    where
        I: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.new_lookup.get(identity).copied()
    }

    /// Fold updates into delete+insert pairs.
    ///
    /// A renderer applying changes in one atomic pass cannot combine a move
    /// and an update of the same item, and cannot refresh an item by
    /// identity once its position shifted. Every moved+updated item becomes
    /// a delete of its old slot and an insert of its new slot; every other
    /// updated item is deleted at its old position and inserted at its
    /// matched new position. The returned result has no updates, and its
    /// deletes, inserts, and moves touch disjoint positions.
    pub fn to_batch_safe(&self) -> Self {
        let mut inserts = self.inserts.clone();
        let mut deletes = self.deletes.clone();
        let mut matches = self.matches.clone();
        let mut moves = BTreeSet::new();

        for mv in &self.moves {
            if !self.updates.contains(&mv.from) {
                moves.insert(*mv);
            }
        }

        for old in &self.updates {
            if let Some(new) = matches.remove(old) {
                deletes.insert(*old);
                inserts.insert(new);
            }
        }

        Self {
            inserts,
            deletes,
            updates: BTreeSet::new(),
            moves,
            matches,
            old_lookup: self.old_lookup.clone(),
            new_lookup: self.new_lookup.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::{diff, diff_paths, DiffMode};
    use listdiff_types::Diffable;

    use super::*;

    #[derive(Clone, Debug)]
    struct Tile {
        id: u32,
        color: &'static str,
    }

    fn tile(id: u32, color: &'static str) -> Tile {
        Tile { id, color }
    }

    impl Diffable for Tile {
        type Identity = u32;

        fn diff_identity(&self) -> u32 {
            self.id
        }

        fn is_equal_to(&self, other: &Self) -> bool {
            self.color == other.color
        }
    }

    #[test]
    fn batch_safe_turns_moved_update_into_delete_insert() {
        let old = [tile(1, "red"), tile(2, "red")];
        let new = [tile(2, "blue"), tile(1, "red")];
        let safe = diff(&old, &new, DiffMode::Equality).to_batch_safe();

        assert!(safe.updates().is_empty());
        assert!(safe.deletes().contains(&1));
        assert!(safe.inserts().contains(&0));
        assert_eq!(safe.moves().len(), 1);
        assert!(safe.moves().contains(&Move::new(0, 1)));
    }

    #[test]
    fn batch_safe_turns_plain_update_into_delete_insert() {
        let old = [tile(1, "red"), tile(2, "red")];
        let new = [tile(1, "red"), tile(2, "green")];
        let result = diff(&old, &new, DiffMode::Equality);
        assert_eq!(result.updates().len(), 1);

        let safe = result.to_batch_safe();
        assert!(safe.updates().is_empty());
        assert_eq!(safe.deletes().iter().copied().collect::<Vec<_>>(), vec![1]);
        assert_eq!(safe.inserts().iter().copied().collect::<Vec<_>>(), vec![1]);
        assert!(safe.moves().is_empty());
    }

    #[test]
    fn batch_safe_uses_shifted_target() {
        let old = [tile(1, "red"), tile(2, "red")];
        let new = [tile(9, "red"), tile(1, "red"), tile(2, "green")];
        let safe = diff(&old, &new, DiffMode::Equality).to_batch_safe();
        assert!(safe.deletes().contains(&1));
        assert!(safe.inserts().contains(&2));
        assert!(safe.inserts().contains(&0));
    }

    #[test]
    fn batch_safe_is_idempotent() {
        let old = [tile(1, "a"), tile(2, "a"), tile(3, "a")];
        let new = [tile(3, "b"), tile(1, "a"), tile(4, "a"), tile(2, "c")];
        let once = diff(&old, &new, DiffMode::Equality).to_batch_safe();
        assert_eq!(once.to_batch_safe(), once);
    }

    #[test]
    fn batch_safe_unpairs_rebuilt_items() {
        let old = [tile(1, "red"), tile(2, "red")];
        let new = [tile(2, "red"), tile(1, "blue")];
        let result = diff(&old, &new, DiffMode::Equality);
        assert_eq!(result.matched_position(0), Some(1));

        let safe = result.to_batch_safe();
        assert_eq!(safe.matched_position(0), None);
        assert_eq!(safe.matched_position(1), Some(0));
        assert_eq!(safe.matched_position(7), None);
    }

    #[test]
    fn batch_safe_keeps_lookups() {
        let result = diff(&[1u32, 2], &[2, 3], DiffMode::Equality);
        let safe = result.to_batch_safe();
        assert_eq!(safe.old_position(&2), Some(1));
        assert_eq!(safe.new_position(&2), Some(0));
        assert_eq!(safe.new_position(&1), None);
    }

    #[test]
    fn lookups_borrow_string_identities() {
        let old = vec![String::from("x"), String::from("y")];
        let new = vec![String::from("y")];
        let result = diff(&old, &new, DiffMode::Equality);
        assert_eq!(result.old_position("x"), Some(0));
        assert_eq!(result.new_position("y"), Some(0));
    }

    #[test]
    fn change_count_sums_all_kinds() {
        let result = diff(&[1u8, 2, 3], &[3, 2, 4], DiffMode::Equality);
        assert_eq!(
            result.change_count(),
            result.inserts().len() + result.deletes().len() + result.moves().len()
        );
        assert!(result.has_changes());
    }

    #[test]
    fn grouped_batch_safe() {
        let old = [tile(1, "a"), tile(2, "a")];
        let new = [tile(1, "z"), tile(2, "a")];
        let safe = diff_paths(3, 3, &old, &new, DiffMode::Equality).to_batch_safe();
        assert!(safe.deletes().contains(&GroupPosition::new(3, 0)));
        assert!(safe.inserts().contains(&GroupPosition::new(3, 0)));
        assert!(safe.updates().is_empty());
    }
}
