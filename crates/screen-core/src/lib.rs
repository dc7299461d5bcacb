//! # screen-core
//!
//! Domain library of the screen manager: the screen entity and its store,
//! output grouping, scan reconciliation, workarea and primary selection, and
//! the event records describing every change.
//!
//! This crate has zero dependencies on windowing-system APIs or I/O.  The
//! `screen-manager` crate drives it from real (or mocked) output sources.
//!
//! # Architecture overview (for beginners)
//!
//! A monitor setup changes under the window manager's feet: cables get
//! plugged, laptops get docked, resolutions get switched.  Each change ends
//! in a *scan*, which rebuilds the logical screen set from the physical
//! outputs while keeping the identity of every screen that survived, so
//! windows and scripts referring to it are not disturbed.
//!
//! - **`domain::store`** – The ordered list of screens and the lookups other
//!   subsystems use: by index, by coordinate and by area overlap.
//!
//! - **`domain::grouping`** and **`domain::reconcile`** – The scan algorithm,
//!   split into a pure planning step and an infallible commit.
//!
//! - **`domain::workarea`** and **`domain::primary`** – Derived state that is
//!   recomputed after every change.

pub mod domain;

// Re-export the most-used types at the crate root so callers can write
// `screen_core::ScreenStore` instead of `screen_core::domain::store::ScreenStore`.
pub use domain::events::ScreenEvent;
pub use domain::geometry::Area;
pub use domain::grouping::{
    group_outputs, policy_by_name, DefaultMergePolicy, IdenticalGeometry, MergePolicy,
    NativeUnits, NeverMerge,
};
pub use domain::primary::{request_primary, select_primary, update_primary, PrimaryChange};
pub use domain::reconcile::{
    commit_plan, plan_scan, CommitOutcome, KeptScreen, PlanError, ScanPlan, ScreenUpdate,
};
pub use domain::screen::{
    bounding_box, Holders, OutputDescriptor, OutputId, PhysicalSize, Screen, ScreenFlags,
    ScreenId,
};
pub use domain::store::{ScreenStore, StoreError};
pub use domain::workarea::{
    compute_workarea, update_all_workareas, update_workarea, Edge, MarginOwner, MarginTable,
    Strut, WorkareaChange,
};
