//! Foundation types for listdiff.
//!
//! This crate provides the identity and addressing types shared by the diff
//! engine and the batch-update reconciler. Every other listdiff crate depends
//! on `listdiff-types`.
//!
//! # Key Types
//!
//! - [`Diffable`] -- An item with a stable identity and a value-equality test
//! - [`Position`] -- Marker trait for an address space (flat `usize` or [`GroupPosition`])
//! - [`GroupPosition`] -- Two-level (group, item) address
//! - [`Move`] -- A `(from, to)` correspondence within one address space
//! - [`Reload`] -- An item reload from an old slot to a new slot

pub mod diffable;
pub mod moves;
pub mod position;

pub use diffable::Diffable;
pub use moves::{Move, Reload};
pub use position::{GroupPosition, Position};
