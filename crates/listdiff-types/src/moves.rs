use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::position::GroupPosition;

/// A correspondence between an old and a new position of the same item.
///
/// Moves order by `from` first, so a sorted collection of moves walks the
/// old sequence front to back.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move<P> {
    /// Position in the old sequence.
    pub from: P,
    /// Position in the new sequence.
    pub to: P,
}

impl<P> Move<P> {
    /// Create a move from `from` to `to`.
    pub const fn new(from: P, to: P) -> Self {
        Self { from, to }
    }
}

impl<P: Ord> Ord for Move<P> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.from
            .cmp(&other.from)
            .then_with(|| self.to.cmp(&other.to))
    }
}

impl<P: Ord> PartialOrd for Move<P> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<P: fmt::Debug> fmt::Debug for Move<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({:?} -> {:?})", self.from, self.to)
    }
}

/// An item reload: the item at `from` in the old snapshot is rebuilt at `to`
/// in the new snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Reload {
    /// Slot in the old snapshot.
    pub from: GroupPosition,
    /// Slot in the new snapshot.
    pub to: GroupPosition,
}

impl Reload {
    /// Reload `from` into `to`.
    pub const fn new(from: GroupPosition, to: GroupPosition) -> Self {
        Self { from, to }
    }

    /// Reload an item that keeps its slot.
    pub const fn in_place(at: GroupPosition) -> Self {
        Self { from: at, to: at }
    }
}
