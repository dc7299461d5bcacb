//! Client reassignment: moving windows off screens that went away.
//!
//! Every managed window is bound to the screen it is displayed on.  When a
//! scan invalidates a screen, the windows bound to it become orphans and must
//! be rebound before anything else looks at them.  The target is chosen in
//! this order:
//!
//! 1. the VALID screen the window overlaps the most;
//! 2. otherwise the primary screen;
//! 3. otherwise the first VALID screen in store order (a FAKE screen when
//!    only FAKE screens are left);
//! 4. otherwise nothing: no VALID screen exists, and the window stays
//!    unbound until one appears.
//!
//! Windows that are unbound while a VALID screen exists are picked up the
//! same way.  A window only moves when `preserve_offset` is requested.  Windows already bound to a VALID screen are never touched, so
//! running the reassignment twice in a row is a no-op.

use screen_core::{Area, ScreenId, ScreenStore};
use tracing::{debug, info};

/// Opaque identity of a managed window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub u32);

impl std::fmt::Display for WindowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "window#{:#x}", self.0)
    }
}

/// A window as the client registry currently sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientBinding {
    pub window: WindowId,
    pub geometry: Area,
    pub screen: Option<ScreenId>,
}

/// A rebinding decided by the reassignment, delivered to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rebinding {
    pub window: WindowId,
    /// The screen the window was bound to, if any.
    pub from: Option<ScreenId>,
    /// The new screen, or `None` if no screen can take the window.
    pub to: Option<ScreenId>,
    /// Window geometry after the move.
    pub geometry: Area,
}

/// The window registry the screen subsystem reassigns windows in.
#[cfg_attr(test, mockall::automock)]
pub trait ClientRegistry {
    /// Snapshot of every managed window.
    fn clients(&self) -> Vec<ClientBinding>;

    /// Applies one rebinding.  Called exactly once per affected window.
    fn on_screen_invalidated(&mut self, rebinding: &Rebinding);
}

/// Knobs for [`reassign_clients`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReassignOptions {
    /// Keep the window's offset relative to its screen when moving it.
    pub preserve_offset: bool,
}

/// Computes where `window` lands when moved from `from` to `to`.
///
/// Without `preserve` the window keeps its absolute position.  With it the
/// window keeps its offset from the old screen's origin, then is shrunk and
/// shifted as needed so the whole rectangle lies inside `to`.
pub fn move_client_to_screen(window: Area, from: Area, to: Area, preserve: bool) -> Area {
    if !preserve {
        return window;
    }

    let width = window.width.min(to.width);
    let height = window.height.min(to.height);
    let x = fit_axis(window.x, from.x, to.x, to.width, width);
    let y = fit_axis(window.y, from.y, to.y, to.height, height);
    Area::new(x, y, width, height)
}

/// Translates `pos` from the `from` origin to the `to` origin and clamps it
/// so `len` pixels starting there stay within `to..to + to_len`.
fn fit_axis(pos: i32, from: i32, to: i32, to_len: u32, len: u32) -> i32 {
    let to = i64::from(to);
    let translated = to + (i64::from(pos) - i64::from(from));
    let max = to + i64::from(to_len - len);
    translated
        .clamp(to, max)
        .clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

fn needs_rebinding(store: &ScreenStore, binding: &ClientBinding) -> bool {
    match binding.screen {
        Some(id) => !store.contains(id),
        None => !store.is_empty(),
    }
}

/// Rebinds every window whose screen is no longer VALID.
///
/// Returns the rebindings delivered to `registry`, in registry order.
pub fn reassign_clients(
    store: &ScreenStore,
    registry: &mut dyn ClientRegistry,
    options: ReassignOptions,
) -> Vec<Rebinding> {
    let mut rebindings = Vec::new();

    for binding in registry.clients() {
        if !needs_rebinding(store, &binding) {
            continue;
        }

        let target = store
            .by_area_overlap(&binding.geometry)
            .map(|s| s.id())
            .ok()
            .or_else(|| store.primary_id())
            .or_else(|| store.by_index(1).map(|s| s.id()).ok());

        let geometry = match (binding.screen.and_then(|id| store.get(id)), target) {
            (Some(from), Some(to)) => match store.get_valid(to) {
                Ok(to) => move_client_to_screen(
                    binding.geometry,
                    from.geometry(),
                    to.geometry(),
                    options.preserve_offset,
                ),
                Err(_) => binding.geometry,
            },
            _ => binding.geometry,
        };

        let rebinding = Rebinding {
            window: binding.window,
            from: binding.screen,
            to: target,
            geometry,
        };
        debug!(
            window = %rebinding.window,
            from = ?rebinding.from,
            to = ?rebinding.to,
            "window rebound"
        );
        registry.on_screen_invalidated(&rebinding);
        rebindings.push(rebinding);
    }

    if !rebindings.is_empty() {
        info!(count = rebindings.len(), "windows reassigned");
    }
    rebindings
}

// ── Tests ─────────────────────────────────────────────────────────────────────
