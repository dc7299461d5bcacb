//! The screen store: an ordered collection of screens plus the queue of
//! screens waiting to be destroyed.
//!
//! # Linked vs. pending screens
//!
//! The store keeps two lists:
//!
//! - **linked** screens, in creation order.  These are the VALID screens that
//!   lookups return and windows may be bound to.
//! - **pending** screens, which lost VALID (their outputs disconnected or a
//!   script removed them) but may still be referenced by a script handle or,
//!   transiently, by a window that has not been reassigned yet.
//!
//! A pending screen is destroyed by [`ScreenStore::purge`] once both of its
//! [`Holders`](super::screen::Holders) have released it and no window refers
//! to it.
//!
//! # Indices
//!
//! The 1-based index of a screen is its position among the linked screens.
//! It is a lookup convenience, not an identity: removing screen 1 makes the
//! former screen 2 answer to index 1, while its [`ScreenId`] stays the same.

use thiserror::Error;
use tracing::debug;

use super::geometry::Area;
use super::screen::{Screen, ScreenFlags, ScreenId};

/// Lookup and bookkeeping failures of the [`ScreenStore`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// No VALID screen has this identity.
    #[error("screen not found: {0}")]
    NotFound(ScreenId),

    /// No VALID screen contains the point.
    #[error("no screen contains point ({x}, {y})")]
    NoScreenAt { x: i32, y: i32 },

    /// No VALID screen overlaps the area.
    #[error("no screen overlaps area {0}")]
    NoOverlap(Area),

    /// The 1-based index is outside `1..=count`.
    #[error("screen index {index} out of range (screen count is {count})")]
    OutOfRange { index: usize, count: usize },

    /// The operation only applies to script-created screens.
    #[error("{0} is not a fake screen")]
    NotFake(ScreenId),
}

impl StoreError {
    /// Returns `true` for the "lookup missed" family of errors.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::NotFound(_) | StoreError::NoScreenAt { .. } | StoreError::NoOverlap(_)
        )
    }
}

/// Ordered collection of screens with deferred destruction.
#[derive(Debug, Default)]
pub struct ScreenStore {
    linked: Vec<Screen>,
    pending: Vec<Screen>,
    primary: Option<ScreenId>,
    next_id: u64,
}

impl ScreenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a fresh, never-reused screen identity.
    pub fn allocate_id(&mut self) -> ScreenId {
        self.next_id += 1;
        ScreenId(self.next_id)
    }

    /// Appends a screen and returns its 1-based index.
    pub fn add(&mut self, screen: Screen) -> usize {
        debug!(id = %screen.id(), geometry = %screen.geometry(), "screen linked");
        self.linked.push(screen);
        self.linked.len()
    }

    /// Unlinks a screen into the pending-removal queue and clears VALID.
    ///
    /// Holders are left untouched; the caller releases its own side.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no linked screen has this identity.
    pub fn remove(&mut self, id: ScreenId) -> Result<(), StoreError> {
        let pos = self
            .linked
            .iter()
            .position(|s| s.id() == id)
            .ok_or(StoreError::NotFound(id))?;
        let mut screen = self.linked.remove(pos);
        screen.flags.remove(ScreenFlags::VALID);
        debug!(%id, "screen unlinked, pending removal");
        self.pending.push(screen);
        Ok(())
    }

    /// Number of VALID screens.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// VALID screens in store order.
    pub fn iter(&self) -> impl Iterator<Item = &Screen> {
        self.linked.iter().filter(|s| s.is_valid())
    }

    /// Screens waiting to be destroyed.
    pub fn pending(&self) -> impl Iterator<Item = &Screen> {
        self.pending.iter()
    }

    /// Returns any known screen, linked or pending.
    ///
    /// Scripts may keep a handle to a removed screen and read its last-known
    /// state through this accessor; lookups never return such screens.
    pub fn get(&self, id: ScreenId) -> Option<&Screen> {
        self.linked
            .iter()
            .chain(self.pending.iter())
            .find(|s| s.id() == id)
    }

    /// Returns the screen only if it is VALID.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for unknown or invalidated screens.
    pub fn get_valid(&self, id: ScreenId) -> Result<&Screen, StoreError> {
        self.iter()
            .find(|s| s.id() == id)
            .ok_or(StoreError::NotFound(id))
    }

    pub(crate) fn get_valid_mut(&mut self, id: ScreenId) -> Result<&mut Screen, StoreError> {
        self.linked
            .iter_mut()
            .filter(|s| s.is_valid())
            .find(|s| s.id() == id)
            .ok_or(StoreError::NotFound(id))
    }

    /// Returns `true` if `id` names a VALID screen.
    pub fn contains(&self, id: ScreenId) -> bool {
        self.get_valid(id).is_ok()
    }

    /// Returns the screen at 1-based position `index`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::OutOfRange`] when `index` is 0 or past the end.
    pub fn by_index(&self, index: usize) -> Result<&Screen, StoreError> {
        let count = self.len();
        if index == 0 {
            return Err(StoreError::OutOfRange { index, count });
        }
        self.iter()
            .nth(index - 1)
            .ok_or(StoreError::OutOfRange { index, count })
    }

    /// Returns the 1-based index of a VALID screen.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for unknown or invalidated screens.
    pub fn index_of(&self, id: ScreenId) -> Result<usize, StoreError> {
        self.iter()
            .position(|s| s.id() == id)
            .map(|pos| pos + 1)
            .ok_or(StoreError::NotFound(id))
    }

    /// Returns the first VALID screen containing the point, in store order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoScreenAt`] when no screen contains the point.
    pub fn by_coordinate(&self, x: i32, y: i32) -> Result<&Screen, StoreError> {
        self.iter()
            .find(|s| s.geometry().contains_point(x, y))
            .ok_or(StoreError::NoScreenAt { x, y })
    }

    /// Returns the VALID screen sharing the most pixels with `area`.
    ///
    /// Ties go to the screen that comes first in store order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoOverlap`] when no screen overlaps `area`.
    pub fn by_area_overlap(&self, area: &Area) -> Result<&Screen, StoreError> {
        let mut best: Option<(&Screen, u64)> = None;
        for screen in self.iter() {
            let overlap = screen.geometry().overlap_size(area);
            if overlap == 0 {
                continue;
            }
            match best {
                Some((_, best_overlap)) if best_overlap >= overlap => {}
                _ => best = Some((screen, overlap)),
            }
        }
        best.map(|(s, _)| s).ok_or(StoreError::NoOverlap(*area))
    }

    /// Returns `true` if the point lies on the given VALID screen.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for unknown or invalidated screens.
    pub fn coord_in_screen(&self, id: ScreenId, x: i32, y: i32) -> Result<bool, StoreError> {
        Ok(self.get_valid(id)?.geometry().contains_point(x, y))
    }

    /// Returns `true` if `area` lies entirely on the given VALID screen.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for unknown or invalidated screens.
    pub fn area_in_screen(&self, id: ScreenId, area: &Area) -> Result<bool, StoreError> {
        Ok(self.get_valid(id)?.geometry().contains_area(area))
    }

    /// Exchanges the store positions of two VALID screens.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if either screen is not VALID.
    pub fn swap(&mut self, a: ScreenId, b: ScreenId) -> Result<(), StoreError> {
        let pos_a = self.linked_position(a)?;
        let pos_b = self.linked_position(b)?;
        self.linked.swap(pos_a, pos_b);
        Ok(())
    }

    /// Overwrites the geometry of a FAKE screen and returns the old value.
    ///
    /// The workarea is reset to the new geometry; callers recompute it
    /// against registered margins afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the screen is not VALID and
    /// [`StoreError::NotFake`] if it is backed by hardware.
    pub fn resize_fake(&mut self, id: ScreenId, geometry: Area) -> Result<Area, StoreError> {
        let screen = self.get_valid_mut(id)?;
        if !screen.is_fake() {
            return Err(StoreError::NotFake(id));
        }
        let old = screen.geometry;
        screen.geometry = geometry;
        screen.workarea = geometry;
        Ok(old)
    }

    // ── Primary designation ───────────────────────────────────────────────────

    /// Identity of the primary screen, if any.
    pub fn primary_id(&self) -> Option<ScreenId> {
        self.primary.filter(|id| self.contains(*id))
    }

    /// The primary screen, if any.
    pub fn primary(&self) -> Option<&Screen> {
        self.primary_id().and_then(|id| self.get_valid(id).ok())
    }

    /// The stored designation, even if it names a screen that lost VALID.
    pub(crate) fn raw_primary(&self) -> Option<ScreenId> {
        self.primary
    }

    pub(crate) fn set_primary_id(&mut self, id: Option<ScreenId>) {
        self.primary = id;
    }

    // ── Holders and destruction ───────────────────────────────────────────────

    /// Records that the scripting layer holds a handle to the screen.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the screen is unknown (already
    /// destroyed or never created).
    pub fn retain_script(&mut self, id: ScreenId) -> Result<(), StoreError> {
        self.any_mut(id)?.holders.script = true;
        Ok(())
    }

    /// Releases the scripting layer's hold on the screen.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the screen is unknown.
    pub fn release_script(&mut self, id: ScreenId) -> Result<(), StoreError> {
        self.any_mut(id)?.holders.script = false;
        Ok(())
    }

    /// Releases the native core's hold on the screen.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the screen is unknown.
    pub fn release_native(&mut self, id: ScreenId) -> Result<(), StoreError> {
        self.any_mut(id)?.holders.native = false;
        Ok(())
    }

    /// Destroys pending screens that nobody holds any more.
    ///
    /// `is_referenced` reports whether a window still refers to a screen;
    /// such screens stay pending.  Returns the identities destroyed.
    pub fn purge(&mut self, is_referenced: impl Fn(ScreenId) -> bool) -> Vec<ScreenId> {
        let mut destroyed = Vec::new();
        self.pending.retain(|screen| {
            let keep = !screen.holders.released() || is_referenced(screen.id());
            if !keep {
                destroyed.push(screen.id());
            }
            keep
        });
        for id in &destroyed {
            debug!(%id, "screen destroyed");
        }
        destroyed
    }

    /// Unlinks every screen and drops the pending queue.
    pub fn clear(&mut self) {
        self.linked.clear();
        self.pending.clear();
        self.primary = None;
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    fn linked_position(&self, id: ScreenId) -> Result<usize, StoreError> {
        self.linked
            .iter()
            .position(|s| s.id() == id && s.is_valid())
            .ok_or(StoreError::NotFound(id))
    }

    fn any_mut(&mut self, id: ScreenId) -> Result<&mut Screen, StoreError> {
        self.linked
            .iter_mut()
            .chain(self.pending.iter_mut())
            .find(|s| s.id() == id)
            .ok_or(StoreError::NotFound(id))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
