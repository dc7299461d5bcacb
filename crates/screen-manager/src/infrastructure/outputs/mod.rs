//! Output sources: where the physical output list comes from.
//!
//! Each source implements the application's
//! [`OutputSource`](crate::application::scan_screens::OutputSource) trait.
//!
//! | Module   | Backend                       | Compiled when                      |
//! |----------|-------------------------------|------------------------------------|
//! | `mock`   | In-memory, mutable topology   | always                             |
//! | `xrandr` | X11 RandR 1.5 (`XRRGetMonitors`) | Linux with the `x11` feature    |
//!
//! [`MockOutputSource`] is always compiled (not guarded by `#[cfg]`) so tests
//! and headless runs work on any machine without a display server.

pub mod mock;

pub use mock::MockOutputSource;

// ── XRandR implementation ─────────────────────────────────────────────────────

#[cfg(all(target_os = "linux", feature = "x11"))]
pub mod xrandr;

#[cfg(all(target_os = "linux", feature = "x11"))]
pub use xrandr::XrandrOutputSource;
