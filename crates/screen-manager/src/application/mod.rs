//! Application layer use cases for the screen manager.
//!
//! # What is the "application" layer? (for beginners)
//!
//! In Clean Architecture the *application* layer sits between the domain
//! (pure screen-set rules in `screen_core`) and the infrastructure (XRandR,
//! channels, configuration files).
//!
//! Use cases in this layer:
//!
//! - **Orchestrate** domain objects to fulfil a goal (e.g., "bring the screen
//!   set in line with the monitors that are plugged in right now").
//! - **Depend on abstractions** (traits such as `OutputSource`, `EventSink`
//!   and `ClientRegistry`) rather than concrete implementations.
//! - **Contain no OS calls and no file system access**.
//!
//! # Sub-modules
//!
//! - **`scan_screens`**     – The scan: enumerate outputs, reconcile the
//!   store, recompute derived state and emit events.
//!
//! - **`reassign_clients`** – Moves windows off screens that were
//!   invalidated.
//!
//! - **`subsystem`**        – The `ScreenSubsystem` facade: lifecycle, scan
//!   scheduling, queries and script requests.

pub mod reassign_clients;
pub mod scan_screens;
pub mod subsystem;
