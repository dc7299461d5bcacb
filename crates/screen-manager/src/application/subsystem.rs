//! ScreenSubsystem: the facade other window-manager subsystems talk to.
//!
//! The subsystem owns the screen state and exposes three kinds of calls:
//!
//! - **lifecycle**: [`init`](ScreenSubsystem::init),
//!   [`scan`](ScreenSubsystem::scan), [`tick`](ScreenSubsystem::tick) and
//!   [`teardown`](ScreenSubsystem::teardown);
//! - **queries**: screen by coordinate, by area, by index, primary, count;
//! - **script requests**: fake screens, handles, reordering, primary and
//!   margin changes.
//!
//! # Scan scheduling
//!
//! Output-change callbacks and scripts never scan directly.  They hold a
//! [`ScanRequester`] and only raise a flag; the next
//! [`tick`](ScreenSubsystem::tick) runs at most one scan no matter how many
//! requests piled up.  Because every mutating call takes `&mut self`, a scan
//! can never start while another one is running.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use screen_core::{
    request_primary, update_primary, update_workarea, Area, MarginOwner, MergePolicy, Screen,
    ScreenEvent, ScreenId, StoreError, Strut,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::reassign_clients::{ClientRegistry, ReassignOptions};
use super::scan_screens::{
    purge_unreferenced, EventSink, OutputSource, ScanError, ScanReport, ScanScreensUseCase,
    ScreenState,
};

/// Error type for subsystem queries and script requests.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScreenError {
    /// No VALID screen has this identity.
    #[error("screen not found: {0}")]
    NotFound(ScreenId),

    /// The 1-based index is outside `1..=count`.
    #[error("screen index {index} out of range (screen count is {count})")]
    OutOfRange { index: usize, count: usize },

    /// Windows are still bound to the screen.
    #[error("{id} is still in use by {windows} window(s)")]
    InUse { id: ScreenId, windows: usize },

    /// The request only applies to script-created screens.
    #[error("{0} is not a fake screen")]
    NotFake(ScreenId),

    /// Any other lookup miss.
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for ScreenError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound(id) => ScreenError::NotFound(id),
            StoreError::OutOfRange { index, count } => ScreenError::OutOfRange { index, count },
            StoreError::NotFake(id) => ScreenError::NotFake(id),
            other => ScreenError::Store(other),
        }
    }
}

/// Cloneable, thread-safe handle that asks for a scan.
///
/// Requests coalesce: raising the flag ten times before the next tick still
/// yields a single scan.
#[derive(Debug, Clone, Default)]
pub struct ScanRequester {
    pending: Arc<AtomicBool>,
}

impl ScanRequester {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a scan as pending.
    pub fn request(&self) {
        self.pending.store(true, Ordering::Release);
    }

    /// Returns `true` if a scan is pending.
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Clears the flag and returns whether it was set.
    pub fn take(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }
}

/// Construction parameters for [`ScreenSubsystem`].
#[derive(Debug, Clone, Default)]
pub struct SubsystemOptions {
    pub reassign: ReassignOptions,
    /// Fake screens created by [`ScreenSubsystem::init`].
    pub fake_screens: Vec<Area>,
}

/// Owner of the screen set.
pub struct ScreenSubsystem {
    state: ScreenState,
    scan: ScanScreensUseCase,
    sink: Arc<dyn EventSink>,
    requester: ScanRequester,
    fake_screens: Vec<Area>,
    initialized: bool,
}

impl ScreenSubsystem {
    /// Creates an uninitialised subsystem.  Call [`init`](Self::init) next.
    pub fn new(
        source: Arc<dyn OutputSource>,
        policy: Box<dyn MergePolicy>,
        sink: Arc<dyn EventSink>,
        options: SubsystemOptions,
    ) -> Self {
        Self {
            state: ScreenState::default(),
            scan: ScanScreensUseCase::new(source, policy, Arc::clone(&sink), options.reassign),
            sink,
            requester: ScanRequester::new(),
            fake_screens: options.fake_screens,
            initialized: false,
        }
    }

    /// A handle callbacks and other threads use to request scans.
    pub fn requester(&self) -> ScanRequester {
        self.requester.clone()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────────

    /// Subscribes to output changes, creates configured fake screens and runs
    /// the first scan.
    ///
    /// # Errors
    ///
    /// Propagates the first scan's [`ScanError`].  The subsystem stays
    /// initialised so a later [`tick`](Self::tick) can retry.
    pub fn init(&mut self, registry: &mut dyn ClientRegistry) -> Result<ScanReport, ScanError> {
        if !self.initialized {
            let requester = self.requester.clone();
            self.scan
                .source()
                .on_output_change(Box::new(move || requester.request()));
            self.initialized = true;

            for geometry in std::mem::take(&mut self.fake_screens) {
                let id = self.create_fake_screen(geometry);
                debug!(%id, %geometry, "configured fake screen created");
            }
            info!("screen subsystem initialised");
        }
        self.scan(registry)
    }

    /// Runs one scan now.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::NotInitialized`] before [`init`](Self::init) or
    /// after [`teardown`](Self::teardown), and otherwise whatever the scan
    /// itself reports.
    pub fn scan(&mut self, registry: &mut dyn ClientRegistry) -> Result<ScanReport, ScanError> {
        if !self.initialized {
            return Err(ScanError::NotInitialized);
        }
        self.scan.execute(&mut self.state, registry)
    }

    /// Delivers pending output notifications and runs a scan if one was
    /// requested since the last tick.
    ///
    /// Returns `None` when no scan was due.
    pub fn tick(
        &mut self,
        registry: &mut dyn ClientRegistry,
    ) -> Option<Result<ScanReport, ScanError>> {
        if !self.initialized {
            return None;
        }
        self.scan.source().dispatch_pending();
        self.requester.take().then(|| self.scan(registry))
    }

    /// Drops every screen and stops reacting to scan requests.
    pub fn teardown(&mut self) {
        let count = self.state.store.len();
        self.state = ScreenState::default();
        self.requester.take();
        self.initialized = false;
        info!(screens = count, "screen subsystem torn down");
    }

    // ── Queries ───────────────────────────────────────────────────────────────

    /// The first VALID screen containing `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns [`ScreenError::Store`] wrapping `NoScreenAt` on a miss.
    pub fn screen_at(&self, x: i32, y: i32) -> Result<&Screen, ScreenError> {
        Ok(self.state.store.by_coordinate(x, y)?)
    }

    /// The VALID screen overlapping `area` the most.
    ///
    /// # Errors
    ///
    /// Returns [`ScreenError::Store`] wrapping `NoOverlap` on a miss.
    pub fn screen_overlapping(&self, area: &Area) -> Result<&Screen, ScreenError> {
        Ok(self.state.store.by_area_overlap(area)?)
    }

    /// The VALID screen at 1-based `index`.
    ///
    /// # Errors
    ///
    /// Returns [`ScreenError::OutOfRange`] outside `1..=screen_count()`.
    pub fn screen_by_index(&self, index: usize) -> Result<&Screen, ScreenError> {
        Ok(self.state.store.by_index(index)?)
    }

    /// 1-based index of a VALID screen.
    ///
    /// # Errors
    ///
    /// Returns [`ScreenError::NotFound`] if the screen is not VALID.
    pub fn index_of(&self, id: ScreenId) -> Result<usize, ScreenError> {
        Ok(self.state.store.index_of(id)?)
    }

    pub fn primary_screen(&self) -> Option<&Screen> {
        self.state.store.primary()
    }

    pub fn screen_count(&self) -> usize {
        self.state.store.len()
    }

    /// VALID screens in store order.
    pub fn screens(&self) -> impl Iterator<Item = &Screen> {
        self.state.store.iter()
    }

    /// Last-known state of any screen a handle may refer to, VALID or not.
    pub fn screen(&self, id: ScreenId) -> Option<&Screen> {
        self.state.store.get(id)
    }

    // ── Script requests ───────────────────────────────────────────────────────

    /// Creates a FAKE screen covering `geometry` and returns its identity.
    ///
    /// The creating script holds the new screen until it calls
    /// [`release_handle`](Self::release_handle).
    pub fn create_fake_screen(&mut self, geometry: Area) -> ScreenId {
        let store = &mut self.state.store;
        let id = store.allocate_id();
        let index = store.add(Screen::fake(id, geometry));
        update_workarea(store, &self.state.margins, id);
        info!(%id, %geometry, index, "fake screen created");
        self.sink.emit(ScreenEvent::Added { id });
        self.sink.emit(ScreenEvent::ListChanged);
        id
    }

    /// Removes a screen on script request.
    ///
    /// The screen stays readable through [`screen`](Self::screen) until the
    /// script releases its handle.  Removing a hardware-backed screen drops
    /// the native side's hold on it as well; if its outputs are still
    /// connected, the next scan creates a new screen for them.
    ///
    /// # Errors
    ///
    /// - [`ScreenError::NotFound`] if the screen is not VALID.
    /// - [`ScreenError::InUse`] if windows are still bound to it.
    pub fn remove_screen(
        &mut self,
        id: ScreenId,
        registry: &dyn ClientRegistry,
    ) -> Result<(), ScreenError> {
        let native = !self.state.store.get_valid(id)?.is_fake();
        let windows = registry
            .clients()
            .iter()
            .filter(|c| c.screen == Some(id))
            .count();
        if windows > 0 {
            warn!(%id, windows, "refusing to remove screen with bound windows");
            return Err(ScreenError::InUse { id, windows });
        }

        self.state.store.remove(id)?;
        if native {
            self.state.store.release_native(id)?;
        }
        self.state.margins.forget_screen(id);
        info!(%id, native, "screen removed on request");
        self.sink.emit(ScreenEvent::Removed { id });
        self.sink.emit(ScreenEvent::ListChanged);
        self.refresh_primary();
        purge_unreferenced(&mut self.state.store, registry);
        Ok(())
    }

    /// Overwrites the geometry of a FAKE screen.
    ///
    /// # Errors
    ///
    /// Returns [`ScreenError::NotFound`] or [`ScreenError::NotFake`].
    pub fn resize_fake_screen(&mut self, id: ScreenId, geometry: Area) -> Result<(), ScreenError> {
        let old_workarea = self.state.store.get_valid(id)?.workarea();
        let old = self.state.store.resize_fake(id, geometry)?;
        update_workarea(&mut self.state.store, &self.state.margins, id);
        let new_workarea = self.state.store.get_valid(id)?.workarea();

        if old != geometry {
            self.sink.emit(ScreenEvent::GeometryChanged { id, old, new: geometry });
        }
        if old_workarea != new_workarea {
            self.sink.emit(ScreenEvent::WorkareaChanged {
                id,
                old: old_workarea,
                new: new_workarea,
            });
        }
        Ok(())
    }

    /// Records that a script holds a handle to the screen.
    ///
    /// # Errors
    ///
    /// Returns [`ScreenError::NotFound`] if the screen was already destroyed.
    pub fn retain_handle(&mut self, id: ScreenId) -> Result<(), ScreenError> {
        Ok(self.state.store.retain_script(id)?)
    }

    /// Releases a script's handle and destroys the screen if nothing else
    /// holds it.
    ///
    /// Returns `true` if the screen was destroyed.
    ///
    /// # Errors
    ///
    /// Returns [`ScreenError::NotFound`] if the screen was already destroyed.
    pub fn release_handle(
        &mut self,
        id: ScreenId,
        registry: &dyn ClientRegistry,
    ) -> Result<bool, ScreenError> {
        self.state.store.release_script(id)?;
        let destroyed = purge_unreferenced(&mut self.state.store, registry);
        Ok(destroyed.contains(&id))
    }

    /// Exchanges the store positions (and so the indices) of two screens.
    ///
    /// # Errors
    ///
    /// Returns [`ScreenError::NotFound`] if either screen is not VALID.
    pub fn swap_screens(&mut self, a: ScreenId, b: ScreenId) -> Result<(), ScreenError> {
        self.state.store.swap(a, b)?;
        self.sink.emit(ScreenEvent::Swapped { a, b });
        self.sink.emit(ScreenEvent::ListChanged);
        Ok(())
    }

    /// Makes `id` the primary screen.
    ///
    /// # Errors
    ///
    /// Returns [`ScreenError::NotFound`] if `id` is not a VALID
    /// hardware-backed screen.
    pub fn set_primary(&mut self, id: ScreenId) -> Result<(), ScreenError> {
        if let Some(change) = request_primary(&mut self.state.store, id)? {
            info!(%id, "primary screen set on request");
            self.sink.emit(change.into());
        }
        Ok(())
    }

    // ── Margins ───────────────────────────────────────────────────────────────

    /// Replaces the struts `owner` reserves on `screen` and recomputes its
    /// workarea.  An empty `struts` list withdraws the reservation.
    ///
    /// # Errors
    ///
    /// Returns [`ScreenError::NotFound`] if the screen is not VALID.
    pub fn set_margins(
        &mut self,
        screen: ScreenId,
        owner: MarginOwner,
        struts: Vec<Strut>,
    ) -> Result<(), ScreenError> {
        self.state.store.get_valid(screen)?;
        self.state.margins.set(screen, owner, struts);
        self.refresh_workarea(screen);
        Ok(())
    }

    /// Withdraws every reservation of `owner` (e.g. a panel that exited).
    pub fn clear_margins(&mut self, owner: MarginOwner) {
        for screen in self.state.margins.clear_owner(owner) {
            self.refresh_workarea(screen);
        }
    }

    /// Recomputes every workarea on explicit request.
    pub fn update_workareas(&mut self) {
        let ids: Vec<ScreenId> = self.state.store.iter().map(|s| s.id()).collect();
        for id in ids {
            self.refresh_workarea(id);
        }
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    fn refresh_workarea(&mut self, id: ScreenId) {
        if let Some(change) = update_workarea(&mut self.state.store, &self.state.margins, id) {
            self.sink.emit(change.into());
        }
    }

    fn refresh_primary(&mut self) {
        if let Some(change) = update_primary(&mut self.state.store) {
            self.sink.emit(change.into());
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
