//! Primary screen selection.
//!
//! Exactly one VALID, hardware-backed screen is "primary" whenever such a
//! screen exists.  Panels and notifications default to it, so the choice must
//! be stable: once a screen is primary it stays primary for as long as it is
//! eligible, and only a disconnect or an explicit request moves it.

use super::screen::{Screen, ScreenId};
use super::store::{ScreenStore, StoreError};

/// A change of the primary designation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimaryChange {
    pub id: Option<ScreenId>,
    pub previous: Option<ScreenId>,
}

fn eligible(screen: &Screen) -> bool {
    screen.is_valid() && !screen.is_fake()
}

/// Picks the primary screen without mutating the store.
///
/// 1. `current`, if it is still a VALID non-FAKE screen;
/// 2. otherwise the eligible screen whose origin is closest to `(0, 0)`,
///    earliest in store order on ties;
/// 3. otherwise `None`.
pub fn select_primary(store: &ScreenStore, current: Option<ScreenId>) -> Option<ScreenId> {
    if let Some(id) = current {
        if store.get_valid(id).map(eligible).unwrap_or(false) {
            return Some(id);
        }
    }

    let mut best: Option<(&Screen, i64)> = None;
    for screen in store.iter().filter(|s| eligible(s)) {
        let distance = screen.geometry().origin_distance_sq();
        match best {
            Some((_, best_distance)) if best_distance <= distance => {}
            _ => best = Some((screen, distance)),
        }
    }
    best.map(|(s, _)| s.id())
}

/// Re-runs selection and stores the result.
///
/// Returns the change, or `None` if the designation did not move.
pub fn update_primary(store: &mut ScreenStore) -> Option<PrimaryChange> {
    let previous = store.raw_primary();
    let selected = select_primary(store, previous);
    store.set_primary_id(selected);
    (selected != previous).then_some(PrimaryChange {
        id: selected,
        previous,
    })
}

/// Makes `id` primary on explicit request.
///
/// # Errors
///
/// Returns [`StoreError::NotFound`] if `id` is not a VALID hardware-backed
/// screen; FAKE screens can never be primary.
pub fn request_primary(store: &mut ScreenStore, id: ScreenId) -> Result<Option<PrimaryChange>, StoreError> {
    let screen = store.get_valid(id)?;
    if !eligible(screen) {
        return Err(StoreError::NotFound(id));
    }
    let previous = store.raw_primary();
    store.set_primary_id(Some(id));
    Ok((previous != Some(id)).then_some(PrimaryChange {
        id: Some(id),
        previous,
    }))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
