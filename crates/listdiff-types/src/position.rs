use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// An address space that diff results and operations are expressed in.
///
/// Implemented by flat `usize` indices and by [`GroupPosition`].
pub trait Position: Copy + Ord + Hash + fmt::Debug {}

impl Position for usize {}

impl Position for GroupPosition {}

/// A two-level address: an item inside a group.
///
/// Ordered by group first, then by item, so sorted sets of positions walk
/// each group in turn.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupPosition {
    /// Index of the group.
    pub group: usize,
    /// Index of the item within the group.
    pub item: usize,
}

impl GroupPosition {
    /// Create a position for `item` within `group`.
    pub const fn new(group: usize, item: usize) -> Self {
        Self { group, item }
    }
}

impl fmt::Debug for GroupPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GroupPosition({}.{})", self.group, self.item)
    }
}

impl fmt::Display for GroupPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.group, self.item)
    }
}

impl From<(usize, usize)> for GroupPosition {
    fn from((group, item): (usize, usize)) -> Self {
        Self { group, item }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_group_major() {
        let a = GroupPosition::new(0, 9);
        let b = GroupPosition::new(1, 0);
        assert!(a < b);
        assert!(GroupPosition::new(1, 0) < GroupPosition::new(1, 1));
    }

    #[test]
    fn display_and_debug() {
        let p = GroupPosition::new(2, 5);
        assert_eq!(p.to_string(), "2.5");
        assert_eq!(format!("{p:?}"), "GroupPosition(2.5)");
    }

    #[test]
    fn from_tuple() {
        assert_eq!(GroupPosition::from((3, 4)), GroupPosition::new(3, 4));
    }

    #[test]
    fn serde_roundtrip() {
        let p = GroupPosition::new(1, 7);
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, r#"{"group":1,"item":7}"#);
        let parsed: GroupPosition = serde_json::from_str(&json).unwrap();
        assert_eq!(p, parsed);
    }
}
