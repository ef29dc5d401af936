use std::fmt;
use std::hash::Hash;

/// An item that can take part in a diff.
///
/// A `Diffable` pairs a stable identity with a value-equality test. Two
/// snapshots are compared by identity first: items sharing an identity are
/// the same logical item, and [`Diffable::is_equal_to`] then decides whether
/// that item changed in place.
///
/// Identity must never change for the lifetime of a logical item. Several
/// items in one sequence may share an identity; the diff engine pairs them
/// up in order of appearance.
pub trait Diffable {
    /// The identity key. Cheap to clone and hash.
    type Identity: Clone + Eq + Hash + fmt::Debug;

    /// The identity of this item.
    fn diff_identity(&self) -> Self::Identity;

    /// Returns `true` if `other` (which shares this item's identity) carries
    /// the same value.
    fn is_equal_to(&self, other: &Self) -> bool;
}

macro_rules! impl_diffable_for_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Diffable for $ty {
                type Identity = $ty;

                fn diff_identity(&self) -> Self::Identity {
                    self.clone()
                }

                fn is_equal_to(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

impl_diffable_for_value!(
    u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, char, bool, String,
);

impl<'a> Diffable for &'a str {
    type Identity = &'a str;

    fn diff_identity(&self) -> Self::Identity {
        self
    }

    fn is_equal_to(&self, other: &Self) -> bool {
        self == other
    }
}
