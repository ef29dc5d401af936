//! Diff engine for listdiff.
//!
//! Compares two ordered snapshots of [`Diffable`](listdiff_types::Diffable)
//! items and produces the inserts, deletes, moves, and in-place updates that
//! turn one into the other, in expected linear time.
//!
//! # Key Types
//!
//! - [`diff`] / [`diff_paths`] -- Flat and grouped diff entry points
//! - [`DiffMode`] -- Whether matched items are compared by value
//! - [`DiffResult`] -- Immutable diff output with identity lookups and
//!   the batch-safe transform

pub mod engine;
pub mod result;

pub use engine::{diff, diff_paths, DiffMode};
pub use result::{DiffResult, IndexDiff, PathDiff};
