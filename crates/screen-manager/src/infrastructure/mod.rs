//! Infrastructure layer for the screen manager.
//!
//! Contains the adapters behind the application traits: output sources
//! (mock and XRandR), event sinks, the in-memory client table and
//! file-system configuration.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `screen_core`, but MUST NOT be imported by the `application` or domain
//! layers.

pub mod clients;
pub mod events;
pub mod outputs;
pub mod storage;
