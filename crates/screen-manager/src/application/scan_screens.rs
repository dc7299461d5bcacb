//! ScanScreensUseCase: rebuilds the screen set from the current outputs.
//!
//! A scan is the only way native screens come and go.  It runs whenever the
//! windowing system reports an output change (monitor plugged, unplugged,
//! mode switched) and once at start-up.
//!
//! # Steps
//!
//! ```text
//! enumerate outputs ──► group ──► plan ──► Scanning
//!                                            │
//!        commit plan (Added/Removed/GeometryChanged/OutputsChanged/ListChanged)
//!                                            │
//!                 workareas (WorkareaChanged) ──► primary (PrimaryChanged)
//!                                            │
//!                 reassign windows ──► purge pending screens ──► Scanned
//! ```
//!
//! Everything that can fail (the output query and the plan validation)
//! happens before `Scanning` is emitted.  A failed scan therefore leaves the
//! store untouched and emits nothing.
//!
//! # Architecture
//!
//! The use case depends only on traits ([`OutputSource`], [`EventSink`],
//! [`ClientRegistry`]) and on `screen_core` domain types.  Infrastructure
//! implementations are injected at construction time.

use std::collections::HashSet;
use std::sync::Arc;

use screen_core::{
    commit_plan, group_outputs, plan_scan, update_all_workareas, update_primary, MarginTable,
    MergePolicy, OutputDescriptor, OutputId, PlanError, ScreenEvent, ScreenId, ScreenStore,
};
use thiserror::Error;
use tracing::{info, warn};

use super::reassign_clients::{reassign_clients, ClientRegistry, ReassignOptions};

/// Error returned by an [`OutputSource`] query.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OutputQueryError {
    /// The windowing-system call failed.
    ///
    /// The inner string describes the failure, e.g.
    /// `"XOpenDisplay failed; DISPLAY=<unset>"`.
    #[error("platform error while enumerating outputs: {0}")]
    Platform(String),
}

/// Error type for the scan use case.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScanError {
    /// The output enumeration failed; nothing was changed.
    #[error("output query failed: {0}")]
    Query(#[from] OutputQueryError),

    /// The same output was reported twice; nothing was changed.
    #[error("output {0} reported more than once")]
    DuplicateOutput(OutputId),

    /// The subsystem has not been initialised (or was torn down).
    #[error("screen subsystem is not initialised")]
    NotInitialized,
}

impl From<PlanError> for ScanError {
    fn from(error: PlanError) -> Self {
        match error {
            PlanError::DuplicateOutput(id) => ScanError::DuplicateOutput(id),
        }
    }
}

/// Callback invoked by an [`OutputSource`] when the output topology changes.
pub type OutputChangeCallback = Box<dyn Fn() + Send + Sync>;

/// Trait for querying the physical outputs of the windowing system.
///
/// Infrastructure implementations talk to XRandR; test implementations
/// return a configurable list.
#[cfg_attr(test, mockall::automock)]
pub trait OutputSource: Send + Sync {
    /// Returns every output the windowing system knows about, connected or
    /// not.
    ///
    /// # Errors
    ///
    /// Returns [`OutputQueryError::Platform`] if the query fails.
    fn enumerate_outputs(&self) -> Result<Vec<OutputDescriptor>, OutputQueryError>;

    /// Registers `callback` to be called whenever the topology changes.
    ///
    /// Callbacks must only *request* a scan; they never run one.
    fn on_output_change(&self, callback: OutputChangeCallback);

    /// Delivers change notifications that arrived since the last call.
    ///
    /// Sources that notify synchronously have nothing to do here.
    fn dispatch_pending(&self) {}
}

/// Trait for publishing [`ScreenEvent`]s to the scripting layer.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: ScreenEvent);
}

/// The mutable screen state a scan works on.
#[derive(Debug, Default)]
pub struct ScreenState {
    pub store: ScreenStore,
    pub margins: MarginTable,
}

/// Summary of one completed scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub added: Vec<ScreenId>,
    pub updated: Vec<ScreenId>,
    pub removed: Vec<ScreenId>,
    /// Primary screen after the scan.
    pub primary: Option<ScreenId>,
    /// Number of windows rebound.
    pub reassigned: usize,
    /// Pending screens destroyed at the end of the scan.
    pub destroyed: Vec<ScreenId>,
}

/// Use case that reconciles the screen store with the current outputs.
pub struct ScanScreensUseCase {
    source: Arc<dyn OutputSource>,
    policy: Box<dyn MergePolicy>,
    sink: Arc<dyn EventSink>,
    options: ReassignOptions,
}

impl ScanScreensUseCase {
    /// Creates the use case with injected dependencies.
    pub fn new(
        source: Arc<dyn OutputSource>,
        policy: Box<dyn MergePolicy>,
        sink: Arc<dyn EventSink>,
        options: ReassignOptions,
    ) -> Self {
        Self {
            source,
            policy,
            sink,
            options,
        }
    }

    /// The output source this use case queries.
    pub fn source(&self) -> &Arc<dyn OutputSource> {
        &self.source
    }

    /// Runs one full scan.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Query`] if the output enumeration fails and
    /// [`ScanError::DuplicateOutput`] if the snapshot is inconsistent.  In
    /// both cases `state` is untouched and no event was emitted.
    pub fn execute(
        &self,
        state: &mut ScreenState,
        registry: &mut dyn ClientRegistry,
    ) -> Result<ScanReport, ScanError> {
        let outputs = self.source.enumerate_outputs().map_err(|e| {
            warn!("scan aborted: {e}");
            ScanError::from(e)
        })?;
        let groups = group_outputs(&outputs, self.policy.as_ref());
        let plan = plan_scan(&state.store, groups).map_err(|e| {
            warn!("scan aborted: {e}");
            ScanError::from(e)
        })?;

        // ── Nothing below can fail ────────────────────────────────────────────
        self.sink.emit(ScreenEvent::Scanning);

        let outcome = commit_plan(&mut state.store, plan);
        for id in &outcome.removed {
            state.margins.forget_screen(*id);
        }
        for id in &outcome.added {
            self.sink.emit(ScreenEvent::Added { id: *id });
        }
        for id in &outcome.removed {
            self.sink.emit(ScreenEvent::Removed { id: *id });
        }
        for update in &outcome.updated {
            if update.geometry_changed() {
                self.sink.emit(ScreenEvent::GeometryChanged {
                    id: update.id,
                    old: update.old_geometry,
                    new: update.new_geometry,
                });
            }
        }
        for update in outcome.updated.iter().filter(|u| u.outputs_changed) {
            self.sink.emit(ScreenEvent::OutputsChanged { id: update.id });
        }
        if !outcome.added.is_empty() || !outcome.removed.is_empty() {
            self.sink.emit(ScreenEvent::ListChanged);
        }

        for change in update_all_workareas(&mut state.store, &state.margins) {
            self.sink.emit(change.into());
        }
        if let Some(change) = update_primary(&mut state.store) {
            self.sink.emit(change.into());
        }

        let rebindings = reassign_clients(&state.store, registry, self.options);
        let destroyed = purge_unreferenced(&mut state.store, registry);

        self.sink.emit(ScreenEvent::Scanned);

        let report = ScanReport {
            added: outcome.added,
            updated: outcome.updated.iter().map(|u| u.id).collect(),
            removed: outcome.removed,
            primary: state.store.primary_id(),
            reassigned: rebindings.len(),
            destroyed,
        };
        info!(
            policy = self.policy.name(),
            screens = state.store.len(),
            added = report.added.len(),
            updated = report.updated.len(),
            removed = report.removed.len(),
            reassigned = report.reassigned,
            primary = ?report.primary,
            "scan complete"
        );
        Ok(report)
    }
}

/// Destroys pending screens that no holder and no window refers to.
pub(crate) fn purge_unreferenced(
    store: &mut ScreenStore,
    registry: &dyn ClientRegistry,
) -> Vec<ScreenId> {
    let referenced: HashSet<ScreenId> = registry
        .clients()
        .into_iter()
        .filter_map(|c| c.screen)
        .collect();
    store.purge(|id| referenced.contains(&id))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
