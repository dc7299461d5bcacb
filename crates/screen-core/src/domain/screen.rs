//! The screen entity and the output descriptors it is built from.
//!
//! A **screen** is the logical display unit the window manager places windows
//! on.  It is usually backed by one or more physical **outputs** (monitor
//! connectors such as `HDMI-1` or `DP-2`).  Two outputs showing the same
//! picture ("cloned" mode) become a single screen; a script may also create a
//! *fake* screen that no hardware backs at all, for example to split one
//! ultra-wide monitor into two halves.
//!
//! # Who destroys a screen?
//!
//! Screens are shared between the native core and the scripting layer.  The
//! core holds a screen while its outputs are connected; the scripting layer
//! holds it while a script keeps a handle to it.  Each side is recorded in
//! [`Holders`]; the screen is destroyed only once both sides let go and no
//! window refers to it any more.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::geometry::Area;

/// Stable opaque handle of a screen.
///
/// Identities are allocated from a monotonically increasing counter and are
/// never reused, so a handle held by a script can never silently start
/// pointing at a different screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScreenId(pub u64);

impl std::fmt::Display for ScreenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "screen#{}", self.0)
    }
}

/// Windowing-system identifier of a physical output (e.g. a RandR output XID).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OutputId(pub u32);

impl std::fmt::Display for OutputId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "output#{}", self.0)
    }
}

/// Physical dimensions of a panel as reported by its EDID, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhysicalSize {
    pub width_mm: u32,
    pub height_mm: u32,
}

impl PhysicalSize {
    /// Diagonal dots-per-inch of `geometry` when shown on this panel.
    ///
    /// Returns `None` when the panel reports a zero size (projectors and many
    /// virtual outputs do).
    pub fn dpi(&self, geometry: &Area) -> Option<f64> {
        if self.width_mm == 0 || self.height_mm == 0 {
            return None;
        }
        let px = (f64::from(geometry.width).powi(2) + f64::from(geometry.height).powi(2)).sqrt();
        let mm = (f64::from(self.width_mm).powi(2) + f64::from(self.height_mm).powi(2)).sqrt();
        Some(px / (mm / 25.4))
    }
}

/// One physical output as reported by the windowing system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputDescriptor {
    /// Windowing-system identifier.
    pub id: OutputId,
    /// Connector name, e.g. `"HDMI-1"`.
    pub name: String,
    /// Position and mode size in virtual-desktop coordinates.
    pub geometry: Area,
    /// Physical panel size, when known.
    pub physical: Option<PhysicalSize>,
    /// Whether a monitor is plugged in and driven.
    pub connected: bool,
    /// Native grouping hint: outputs reporting the same unit form one
    /// logical monitor (RandR 1.5 monitors, tiled displays).
    pub unit: Option<u32>,
}

impl OutputDescriptor {
    /// Convenience constructor for a connected output without hints.
    pub fn connected(id: u32, name: impl Into<String>, geometry: Area) -> Self {
        Self {
            id: OutputId(id),
            name: name.into(),
            geometry,
            physical: None,
            connected: true,
            unit: None,
        }
    }
}

bitflags! {
    /// State and ownership flags of a screen.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ScreenFlags: u8 {
        /// Not pending removal.
        const VALID = 1 << 0;
        /// Created by a script, not backed by hardware.
        const FAKE = 1 << 1;
        /// The scripting layer is responsible for destroying it.
        const MANAGED_BY_SCRIPT = 1 << 2;
        /// The native scan is responsible for destroying it.
        const MANAGED_BY_NATIVE = 1 << 3;
    }
}

/// The ownership-flag pair that decides when a screen may be destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Holders {
    /// Held by the native core (outputs still connected, or not yet
    /// removed by a script).
    pub native: bool,
    /// Held by the scripting layer (a script handle is alive).
    pub script: bool,
}

impl Holders {
    /// Returns `true` once neither side holds the screen.
    pub fn released(&self) -> bool {
        !self.native && !self.script
    }
}

/// A logical screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Screen {
    id: ScreenId,
    pub(crate) flags: ScreenFlags,
    pub(crate) geometry: Area,
    pub(crate) workarea: Area,
    pub(crate) outputs: Vec<OutputDescriptor>,
    pub(crate) holders: Holders,
}

impl Screen {
    /// Creates a hardware-backed screen covering `outputs`.
    ///
    /// The geometry is the bounding box of the outputs.  The workarea starts
    /// equal to the geometry until margins are applied.
    pub fn native(id: ScreenId, outputs: Vec<OutputDescriptor>) -> Self {
        let geometry = bounding_box(&outputs);
        Self {
            id,
            flags: ScreenFlags::VALID | ScreenFlags::MANAGED_BY_NATIVE,
            geometry,
            workarea: geometry,
            outputs,
            holders: Holders {
                native: true,
                script: false,
            },
        }
    }

    /// Creates a script-owned screen with no outputs.
    pub fn fake(id: ScreenId, geometry: Area) -> Self {
        Self {
            id,
            flags: ScreenFlags::VALID | ScreenFlags::FAKE | ScreenFlags::MANAGED_BY_SCRIPT,
            geometry,
            workarea: geometry,
            outputs: Vec::new(),
            holders: Holders {
                native: false,
                script: true,
            },
        }
    }

    pub fn id(&self) -> ScreenId {
        self.id
    }

    pub fn flags(&self) -> ScreenFlags {
        self.flags
    }

    pub fn geometry(&self) -> Area {
        self.geometry
    }

    pub fn workarea(&self) -> Area {
        self.workarea
    }

    pub fn outputs(&self) -> &[OutputDescriptor] {
        &self.outputs
    }

    pub fn holders(&self) -> Holders {
        self.holders
    }

    pub fn is_valid(&self) -> bool {
        self.flags.contains(ScreenFlags::VALID)
    }

    pub fn is_fake(&self) -> bool {
        self.flags.contains(ScreenFlags::FAKE)
    }

    /// Sorted identifiers of the backing outputs; the key the scan matches on.
    pub fn output_ids(&self) -> Vec<OutputId> {
        let mut ids: Vec<OutputId> = self.outputs.iter().map(|o| o.id).collect();
        ids.sort_unstable();
        ids
    }

    /// Highest DPI among the backing outputs that report a physical size.
    pub fn dpi(&self) -> Option<f64> {
        self.outputs
            .iter()
            .filter_map(|o| o.physical.and_then(|p| p.dpi(&o.geometry)))
            .fold(None, |best, dpi| Some(best.map_or(dpi, |b: f64| b.max(dpi))))
    }
}

/// Bounding box of a set of outputs; an empty set yields an empty area.
pub fn bounding_box(outputs: &[OutputDescriptor]) -> Area {
    let mut iter = outputs.iter();
    match iter.next() {
        Some(first) => iter.fold(first.geometry, |acc, o| acc.union(&o.geometry)),
        None => Area::default(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_screen_is_valid_and_held_natively() {
        let screen = Screen::native(
            ScreenId(1),
            vec![OutputDescriptor::connected(10, "DP-1", Area::new(0, 0, 1920, 1080))],
        );

        assert!(screen.is_valid());
        assert!(!screen.is_fake());
        assert!(screen.flags().contains(ScreenFlags::MANAGED_BY_NATIVE));
        assert!(screen.holders().native);
        assert!(!screen.holders().script);
        assert_eq!(screen.workarea(), screen.geometry());
    }

    #[test]
    fn test_fake_screen_has_no_outputs_and_is_script_managed() {
        let screen = Screen::fake(ScreenId(7), Area::new(0, 0, 800, 600));

        assert!(screen.is_valid());
        assert!(screen.is_fake());
        assert!(screen.flags().contains(ScreenFlags::MANAGED_BY_SCRIPT));
        assert!(screen.outputs().is_empty());
        assert!(screen.holders().script);
    }

    #[test]
    fn test_native_geometry_is_bounding_box_of_outputs() {
        let screen = Screen::native(
            ScreenId(1),
            vec![
                OutputDescriptor::connected(1, "DP-1", Area::new(0, 0, 1920, 2160)),
                OutputDescriptor::connected(2, "DP-2", Area::new(1920, 0, 1920, 2160)),
            ],
        );
        assert_eq!(screen.geometry(), Area::new(0, 0, 3840, 2160));
    }

    #[test]
    fn test_output_ids_are_sorted() {
        let screen = Screen::native(
            ScreenId(1),
            vec![
                OutputDescriptor::connected(9, "HDMI-1", Area::new(0, 0, 1920, 1080)),
                OutputDescriptor::connected(3, "eDP-1", Area::new(0, 0, 1920, 1080)),
            ],
        );
        assert_eq!(screen.output_ids(), vec![OutputId(3), OutputId(9)]);
    }

    #[test]
    fn test_physical_size_dpi_for_24_inch_1080p_panel() {
        // 531x299 mm is a common 24" 16:9 panel: roughly 92 DPI at 1080p.
        let size = PhysicalSize { width_mm: 531, height_mm: 299 };
        let dpi = size.dpi(&Area::new(0, 0, 1920, 1080)).expect("non-zero panel");
        assert!((dpi - 91.8).abs() < 0.5, "got {dpi}");
    }

    #[test]
    fn test_physical_size_dpi_is_none_for_zero_size_panel() {
        let size = PhysicalSize { width_mm: 0, height_mm: 0 };
        assert_eq!(size.dpi(&Area::new(0, 0, 1920, 1080)), None);
    }

    #[test]
    fn test_screen_dpi_picks_highest_output() {
        let mut low = OutputDescriptor::connected(1, "DP-1", Area::new(0, 0, 1920, 1080));
        low.physical = Some(PhysicalSize { width_mm: 531, height_mm: 299 });
        let mut high = OutputDescriptor::connected(2, "eDP-1", Area::new(0, 0, 1920, 1080));
        high.physical = Some(PhysicalSize { width_mm: 294, height_mm: 165 });
        let screen = Screen::native(ScreenId(1), vec![low, high]);

        let dpi = screen.dpi().expect("dpi known");
        assert!(dpi > 140.0, "got {dpi}");
    }

    #[test]
    fn test_holders_released_only_when_both_sides_let_go() {
        assert!(!Holders { native: true, script: false }.released());
        assert!(!Holders { native: false, script: true }.released());
        assert!(Holders::default().released());
    }
}
