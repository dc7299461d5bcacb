//! Event records published to the scripting layer.
//!
//! Every observable change to the screen set is reported as one
//! [`ScreenEvent`].  During a scan the records are emitted in a fixed order:
//!
//! ```text
//! Scanning
//!   Added / Removed / GeometryChanged / OutputsChanged / ListChanged
//!   WorkareaChanged
//!   PrimaryChanged
//!   (window reassignment callbacks)
//! Scanned
//! ```
//!
//! Records are plain data and serialize with serde so an adapter can forward
//! them to scripts without knowing their shape.

use serde::{Deserialize, Serialize};

use super::geometry::Area;
use super::screen::ScreenId;

/// One observable change to the screen set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScreenEvent {
    /// A scan is about to mutate the store.
    Scanning,
    /// A scan finished; every invariant holds again.
    Scanned,
    /// A screen was created.
    Added { id: ScreenId },
    /// A screen lost VALID and left the ordered store.
    Removed { id: ScreenId },
    /// A screen kept its identity but moved or changed size.
    GeometryChanged { id: ScreenId, old: Area, new: Area },
    /// A screen kept its identity but its output descriptors were refreshed.
    OutputsChanged { id: ScreenId },
    /// Screens were added, removed or reordered.
    ListChanged,
    /// Two screens exchanged store positions.
    Swapped { a: ScreenId, b: ScreenId },
    /// The usable rectangle of a screen changed.
    WorkareaChanged { id: ScreenId, old: Area, new: Area },
    /// The primary designation moved; `id` is `None` when no eligible
    /// screen is left.
    PrimaryChanged {
        id: Option<ScreenId>,
        previous: Option<ScreenId>,
    },
}

impl ScreenEvent {
    /// The screen this event is about, if it concerns exactly one.
    pub fn screen(&self) -> Option<ScreenId> {
        match self {
            ScreenEvent::Added { id }
            | ScreenEvent::Removed { id }
            | ScreenEvent::GeometryChanged { id, .. }
            | ScreenEvent::OutputsChanged { id }
            | ScreenEvent::WorkareaChanged { id, .. } => Some(*id),
            ScreenEvent::PrimaryChanged { id, .. } => *id,
            ScreenEvent::Scanning
            | ScreenEvent::Scanned
            | ScreenEvent::ListChanged
            | ScreenEvent::Swapped { .. } => None,
        }
    }
}

impl From<super::workarea::WorkareaChange> for ScreenEvent {
    fn from(change: super::workarea::WorkareaChange) -> Self {
        ScreenEvent::WorkareaChanged {
            id: change.id,
            old: change.old,
            new: change.new,
        }
    }
}

impl From<super::primary::PrimaryChange> for ScreenEvent {
    fn from(change: super::primary::PrimaryChange) -> Self {
        ScreenEvent::PrimaryChanged {
            id: change.id,
            previous: change.previous,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
