//! Batch-update reconciliation for listdiff.
//!
//! Turns a group-level diff plus hand-accumulated item mutations into one
//! conflict-free operation set that a renderer can apply atomically, and
//! drives the single-threaded apply cycle that produces it.
//!
//! # Key Types
//!
//! - [`BatchUpdates`] -- Append-only collector of item and group mutations
//! - [`GroupMutationSet`] -- Raw group and item mutations for one cycle
//! - [`reconcile`] -- Conflict resolution into [`ReconciledOperations`]
//! - [`ReconciledOperations`] / [`Operation`] -- Final operations in apply order
//! - [`Updater`] / [`Renderer`] -- Apply-cycle driver and its render collaborator
//! - [`UpdateState`] / [`UpdateEvent`] -- Apply-cycle state machine
//! - [`UpdaterConfig`] -- Diff mode and validation settings

pub mod config;
pub mod error;
pub mod operations;
pub mod reconcile;
pub mod state;
pub mod updater;
pub mod updates;

pub use config::UpdaterConfig;
pub use error::{Result, UpdateError};
pub use operations::{GroupMutationSet, Operation, ReconciledOperations};
pub use reconcile::{convert_group_reloads, reconcile};
pub use state::{UpdateEvent, UpdateState};
pub use updater::{CycleOutcome, Renderer, Updater};
pub use updates::BatchUpdates;
