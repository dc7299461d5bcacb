//! Workarea calculation: the part of a screen not covered by panels or docks.
//!
//! Panels reserve space along a screen edge (a 24-pixel bar at the top, a
//! dock on the left, ...).  Each such reservation is a [`Strut`].  The
//! workarea is the screen geometry shrunk by the *largest* reservation on
//! each edge; two bars stacked on the same edge do not add up, matching the
//! usual `_NET_WM_STRUT` semantics.
//!
//! Reservations are registered per screen by an opaque [`MarginOwner`] (the
//! panel or dock window that contributes them) in a [`MarginTable`].

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::geometry::{offset, Area};
use super::screen::ScreenId;
use super::store::ScreenStore;

/// The four edges of a screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

/// Space reserved along one screen edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strut {
    pub edge: Edge,
    /// Thickness in pixels, measured inward from the edge.
    pub thickness: u32,
}

impl Strut {
    pub const fn new(edge: Edge, thickness: u32) -> Self {
        Self { edge, thickness }
    }
}

/// Opaque identity of whatever contributes margins (usually a panel window).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MarginOwner(pub u64);

/// Shrinks `geometry` by the largest strut on each edge.
///
/// The result always lies inside `geometry`.  When reservations exceed the
/// screen size the workarea collapses to zero width or height, which signals
/// a fully obscured screen.
pub fn compute_workarea<'a>(geometry: Area, struts: impl IntoIterator<Item = &'a Strut>) -> Area {
    let (mut top, mut bottom, mut left, mut right) = (0u32, 0u32, 0u32, 0u32);
    for strut in struts {
        let slot = match strut.edge {
            Edge::Top => &mut top,
            Edge::Bottom => &mut bottom,
            Edge::Left => &mut left,
            Edge::Right => &mut right,
        };
        *slot = (*slot).max(strut.thickness);
    }

    let left = left.min(geometry.width);
    let top = top.min(geometry.height);
    let width = geometry.width.saturating_sub(left).saturating_sub(right);
    let height = geometry.height.saturating_sub(top).saturating_sub(bottom);

    Area::new(offset(geometry.x, left), offset(geometry.y, top), width, height)
}

/// Margin contributions registered against each screen.
#[derive(Debug, Default, Clone)]
pub struct MarginTable {
    by_screen: HashMap<ScreenId, BTreeMap<MarginOwner, Vec<Strut>>>,
}

impl MarginTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the struts `owner` contributes to `screen`.
    ///
    /// An empty `struts` list removes the contribution.
    pub fn set(&mut self, screen: ScreenId, owner: MarginOwner, struts: Vec<Strut>) {
        let entry = self.by_screen.entry(screen).or_default();
        if struts.is_empty() {
            entry.remove(&owner);
        } else {
            entry.insert(owner, struts);
        }
        if entry.is_empty() {
            self.by_screen.remove(&screen);
        }
    }

    /// Removes `owner` from every screen and returns the screens it touched.
    pub fn clear_owner(&mut self, owner: MarginOwner) -> Vec<ScreenId> {
        let mut touched = Vec::new();
        for (screen, owners) in self.by_screen.iter_mut() {
            if owners.remove(&owner).is_some() {
                touched.push(*screen);
            }
        }
        self.by_screen.retain(|_, owners| !owners.is_empty());
        touched.sort_unstable();
        touched
    }

    /// Drops every contribution registered against `screen`.
    pub fn forget_screen(&mut self, screen: ScreenId) {
        self.by_screen.remove(&screen);
    }

    /// All struts registered against `screen`.
    pub fn struts(&self, screen: ScreenId) -> impl Iterator<Item = &Strut> {
        self.by_screen
            .get(&screen)
            .into_iter()
            .flat_map(|owners| owners.values().flatten())
    }
}

/// A workarea that changed during recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkareaChange {
    pub id: ScreenId,
    pub old: Area,
    pub new: Area,
}

/// Recomputes the workarea of one VALID screen.
///
/// Returns the change, or `None` when the value is unchanged or the screen is
/// not VALID.
pub fn update_workarea(
    store: &mut ScreenStore,
    margins: &MarginTable,
    id: ScreenId,
) -> Option<WorkareaChange> {
    let screen = store.get_valid_mut(id).ok()?;
    let new = compute_workarea(screen.geometry, margins.struts(id));
    if new == screen.workarea {
        return None;
    }
    let old = std::mem::replace(&mut screen.workarea, new);
    Some(WorkareaChange { id, old, new })
}

/// Recomputes the workarea of every VALID screen, in store order.
pub fn update_all_workareas(store: &mut ScreenStore, margins: &MarginTable) -> Vec<WorkareaChange> {
    let ids: Vec<ScreenId> = store.iter().map(|s| s.id()).collect();
    ids.into_iter()
        .filter_map(|id| update_workarea(store, margins, id))
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
