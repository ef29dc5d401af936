//! The apply cycle: coalesce requests, diff, reconcile, hand off to a renderer.

use std::cell::{Cell, Ref, RefCell};

use tracing::{debug, info, warn};

use listdiff_diff::diff;
use listdiff_types::Diffable;

use crate::config::UpdaterConfig;
use crate::error::{Result, UpdateError};
use crate::operations::{GroupMutationSet, ReconciledOperations};
use crate::reconcile::{convert_group_reloads, reconcile};
use crate::state::{UpdateEvent, UpdateState};
use crate::updates::BatchUpdates;

/// The render collaborator that owns the visible groups and items.
pub trait Renderer<T> {
    /// Apply `operations` to the view, in the order given by
    /// [`ReconciledOperations::ordered`], so that it matches `snapshot`.
    /// Returns `false` if the apply failed.
    fn apply(&mut self, operations: &ReconciledOperations, snapshot: &[T]) -> bool;

    /// Throw away the view state and rebuild it from `snapshot`.
    fn reload(&mut self, snapshot: &[T]) -> bool;
}

/// Lazily produces the target snapshot at apply time.
type SnapshotProvider<T> = Box<dyn FnOnce() -> Vec<T>>;

/// Everything requested for the next cycle.
struct PendingCycle<T> {
    /// First requested source snapshot.
    from: Option<Vec<T>>,
    /// Last requested target snapshot.
    to: Option<SnapshotProvider<T>>,
    full_reload: bool,
    batch: BatchUpdates,
}

impl<T> Default for PendingCycle<T> {
    fn default() -> Self {
        Self {
            from: None,
            to: None,
            full_reload: false,
            batch: BatchUpdates::default(),
        }
    }
}

impl<T> PendingCycle<T> {
    fn is_empty(&self) -> bool {
        self.from.is_none() && self.to.is_none() && !self.full_reload && self.batch.is_empty()
    }
}

/// What one executed cycle did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CycleOutcome {
    /// The operations handed to the renderer; `None` for a full reload.
    pub operations: Option<ReconciledOperations>,
    /// Whether the renderer reported success.
    pub applied: bool,
}

/// Drives the apply cycle for one view.
///
/// Requests ([`perform_update`](Self::perform_update),
/// [`batch`](Self::batch), [`reload_data`](Self::reload_data)) are queued
/// and coalesced until [`flush`](Self::flush) runs the cycle against a
/// [`Renderer`]. Requests made while a cycle executes (from a renderer or a
/// callback holding the updater) land in the next cycle.
///
/// The updater is bound to the thread that created it: it is neither `Send`
/// nor `Sync`.
pub struct Updater<T> {
    config: UpdaterConfig,
    state: Cell<UpdateState>,
    /// The snapshot the renderer currently shows.
    current: RefCell<Vec<T>>,
    pending: RefCell<PendingCycle<T>>,
}

impl<T: Diffable + 'static> Updater<T> {
    /// Create an updater for an empty view.
    pub fn new(config: UpdaterConfig) -> Self {
        Self::with_snapshot(config, Vec::new())
    }

    /// Create an updater for a view already showing `snapshot`.
    pub fn with_snapshot(config: UpdaterConfig, snapshot: Vec<T>) -> Self {
        Self {
            config,
            state: Cell::new(UpdateState::Idle),
            current: RefCell::new(snapshot),
            pending: RefCell::new(PendingCycle::default()),
        }
    }

    /// The current configuration.
    pub fn config(&self) -> &UpdaterConfig {
        &self.config
    }

    /// Where the updater is in its cycle.
    pub fn state(&self) -> UpdateState {
        self.state.get()
    }

    /// The snapshot last handed to the renderer.
    pub fn snapshot(&self) -> Ref<'_, [T]> {
        Ref::map(self.current.borrow(), Vec::as_slice)
    }

    /// Request a transition from `from` to the snapshot `to` will produce.
    ///
    /// Coalesces with other pending requests: the first `from` and the last
    /// `to` are used. `to` runs only when the cycle executes.
    pub fn perform_update(
        &self,
        from: Vec<T>,
        to: impl FnOnce() -> Vec<T> + 'static,
        completion: impl FnOnce(bool) + 'static,
    ) {
        {
            let mut pending = self.pending.borrow_mut();
            if pending.from.is_none() {
                pending.from = Some(from);
            }
            pending.to = Some(Box::new(to));
            pending.batch.on_complete(completion);
        }
        self.request("perform_update");
    }

    /// Record hand-issued mutations for the next cycle.
    pub fn batch(&self, f: impl FnOnce(&mut BatchUpdates)) {
        f(&mut self.pending.borrow_mut().batch);
        self.request("batch");
    }

    /// Request a full reload from the snapshot `to` will produce.
    ///
    /// Structural mutations queued for the same cycle are discarded; their
    /// callbacks still run.
    pub fn reload_data(
        &self,
        to: impl FnOnce() -> Vec<T> + 'static,
        completion: impl FnOnce(bool) + 'static,
    ) {
        {
            let mut pending = self.pending.borrow_mut();
            pending.full_reload = true;
            pending.to = Some(Box::new(to));
            pending.batch.on_complete(completion);
        }
        self.request("reload_data");
    }

    /// Returns `true` if a cycle is queued or something was requested
    /// during the executing one.
    pub fn has_pending(&self) -> bool {
        !self.pending.borrow().is_empty()
    }

    /// Run the queued cycle against `renderer`.
    ///
    /// Returns `Ok(None)` when nothing is queued and
    /// [`UpdateError::AlreadyExecuting`] when called from inside a running
    /// cycle.
    ///
    /// # Panics
    ///
    /// With [`UpdaterConfig::validate_operations`] set, if an operation
    /// references a group outside the source or target snapshot.
    pub fn flush(&self, renderer: &mut dyn Renderer<T>) -> Result<Option<CycleOutcome>> {
        match self.state.get() {
            UpdateState::Idle => return Ok(None),
            state if state.is_executing() => return Err(UpdateError::AlreadyExecuting),
            _ => {}
        }
        self.advance(UpdateEvent::Ready)?;

        let mut cycle = self.pending.take();
        let (before_apply, completions) = cycle.batch.take_callbacks();
        for f in before_apply {
            f();
        }

        let outcome = if cycle.full_reload {
            self.run_reload(cycle, renderer)
        } else {
            self.run_batch(cycle, renderer)
        };
        self.advance(UpdateEvent::Applied)?;

        if !outcome.applied {
            warn!("renderer reported a failed apply");
        }
        for f in completions {
            f(outcome.applied);
        }
        self.advance(UpdateEvent::Finished)?;

        if self.has_pending() {
            self.state.set(self.state.get().requested());
            debug!("requests made during the cycle queued for the next one");
        }
        Ok(Some(outcome))
    }

    fn run_batch(&self, cycle: PendingCycle<T>, renderer: &mut dyn Renderer<T>) -> CycleOutcome {
        let PendingCycle {
            from, to, mut batch, ..
        } = cycle;

        if let (Some(from), Some(to)) = (from, to) {
            let to = to();
            let result = diff(&from, &to, self.config.diff_mode);
            let mut mutations = GroupMutationSet::from_diff(&result);

            let mut reloads = batch.group_reloads().clone();
            if self.config.reload_updated_groups {
                reloads.extend(result.updates().iter().copied());
            }
            convert_group_reloads(&reloads, from.len(), &result, &mut mutations);
            batch.drain_items_into(&mut mutations);

            let operations = reconcile(mutations);
            self.validate(&operations, from.len(), to.len());
            info!(
                from = from.len(),
                to = to.len(),
                operations = operations.len(),
                "applying update"
            );
            let applied = renderer.apply(&operations, &to);
            *self.current.borrow_mut() = to;
            return CycleOutcome {
                operations: Some(operations),
                applied,
            };
        }

        // Item-level changes only: groups keep their positions.
        let current = self.current.borrow();
        let mut mutations = GroupMutationSet::default();
        for &index in batch.group_reloads() {
            if index >= current.len() {
                warn!(index, len = current.len(), "reload of unknown group ignored");
                continue;
            }
            mutations.group_deletes.insert(index);
            mutations.group_inserts.insert(index);
        }
        batch.drain_items_into(&mut mutations);

        let operations = reconcile(mutations);
        self.validate(&operations, current.len(), current.len());
        info!(operations = operations.len(), "applying batch updates");
        let applied = renderer.apply(&operations, &current);
        CycleOutcome {
            operations: Some(operations),
            applied,
        }
    }

    fn run_reload(&self, cycle: PendingCycle<T>, renderer: &mut dyn Renderer<T>) -> CycleOutcome {
        if cycle.batch.has_changes() {
            debug!(batch = ?cycle.batch, "full reload discards queued mutations");
        }
        let snapshot = match cycle.to {
            Some(to) => to(),
            None => self.current.take(),
        };
        info!(groups = snapshot.len(), "reloading data");
        let applied = renderer.reload(&snapshot);
        *self.current.borrow_mut() = snapshot;
        CycleOutcome {
            operations: None,
            applied,
        }
    }

    fn validate(&self, operations: &ReconciledOperations, old_groups: usize, new_groups: usize) {
        if !self.config.validate_operations {
            return;
        }
        if let Err(err) = operations.check_bounds(old_groups, new_groups) {
            panic!("operation set does not fit the snapshot: {err}");
        }
    }

    fn request(&self, source: &'static str) {
        let state = self.state.get();
        let next = state.requested();
        if next != state {
            debug!(source, "update queued");
        }
        self.state.set(next);
    }

    fn advance(&self, event: UpdateEvent) -> Result<()> {
        let state = self.state.get();
        let next = state.on(event)?;
        debug!(from = ?state, to = ?next, ?event, "update state changed");
        self.state.set(next);
        Ok(())
    }
}
