//! Domain entities for the screen-management core.
//!
//! This module contains pure screen-set logic with no infrastructure
//! dependencies.
//!
//! # How the pieces fit together (for beginners)
//!
//! A window manager never talks to monitors directly.  It asks the windowing
//! system for the list of physical **outputs**, decides which of them form
//! one logical **screen**, and keeps those screens in a **store** that every
//! other subsystem queries ("which screen is under the mouse?").
//!
//! When a monitor is plugged in or unplugged the same steps run again:
//!
//! 1. [`grouping`] turns the raw outputs into groups, one per screen.
//! 2. [`reconcile`] compares the groups with the store and plans what to
//!    add, update and invalidate, then commits that plan.
//! 3. [`workarea`] recomputes the usable rectangle of each screen.
//! 4. [`primary`] makes sure exactly one screen is primary.
//! 5. [`events`] describes every change as a typed record.
//!
//! None of these modules touch the operating system, so all of them can be
//! unit-tested on any machine.

/// Axis-aligned rectangles in virtual-desktop coordinates.
pub mod geometry;

/// Output grouping policies.
pub mod grouping;

/// Event records emitted while the screen set changes.
pub mod events;

/// Primary screen selection.
pub mod primary;

/// Plan-then-commit reconciliation of the store with an output snapshot.
pub mod reconcile;

/// The screen entity, its flags and output descriptors.
pub mod screen;

/// The ordered screen store with deferred destruction.
pub mod store;

/// Reserved margins and workarea computation.
pub mod workarea;
