//! Mock output source for tests and headless runs.
//!
//! Holds a mutable list of outputs.  Changing the list fires the registered
//! change callbacks synchronously, just like a hotplug notification would.
//! Failures can be injected to exercise the scan's error path.

use std::sync::{Mutex, PoisonError};

use screen_core::{Area, OutputDescriptor};
use tracing::debug;

use crate::application::scan_screens::{OutputChangeCallback, OutputQueryError, OutputSource};

#[derive(Default)]
struct MockState {
    outputs: Vec<OutputDescriptor>,
    fail_next: Option<String>,
}

/// A mock implementation of [`OutputSource`] with a configurable topology.
#[derive(Default)]
pub struct MockOutputSource {
    state: Mutex<MockState>,
    callbacks: Mutex<Vec<OutputChangeCallback>>,
}

impl MockOutputSource {
    /// Creates a source reporting `outputs`.
    pub fn new(outputs: Vec<OutputDescriptor>) -> Self {
        Self {
            state: Mutex::new(MockState {
                outputs,
                fail_next: None,
            }),
            callbacks: Mutex::new(Vec::new()),
        }
    }

    /// A single 1920×1080 laptop panel at the origin.
    pub fn single_1080p() -> Self {
        Self::new(vec![OutputDescriptor::connected(
            1,
            "eDP-1",
            Area::new(0, 0, 1920, 1080),
        )])
    }

    /// Two 1920×1080 monitors side by side.
    pub fn dual_1080p() -> Self {
        Self::new(vec![
            OutputDescriptor::connected(1, "DP-1", Area::new(0, 0, 1920, 1080)),
            OutputDescriptor::connected(2, "DP-2", Area::new(1920, 0, 1920, 1080)),
        ])
    }

    /// `n` 1920×1080 monitors in a row.
    pub fn row_1080p(n: usize) -> Self {
        Self::new(
            (0..n)
                .map(|i| {
                    OutputDescriptor::connected(
                        i as u32 + 1,
                        format!("DP-{}", i + 1),
                        Area::new(1920 * i as i32, 0, 1920, 1080),
                    )
                })
                .collect(),
        )
    }

    /// Replaces the topology and notifies every registered callback.
    pub fn set_outputs(&self, outputs: Vec<OutputDescriptor>) {
        debug!(count = outputs.len(), "mock outputs changed");
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .outputs = outputs;
        self.notify();
    }

    /// Makes the next [`enumerate_outputs`](OutputSource::enumerate_outputs)
    /// call fail with `message`.
    pub fn fail_next(&self, message: impl Into<String>) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .fail_next = Some(message.into());
    }

    /// Number of registered change callbacks.
    pub fn callback_count(&self) -> usize {
        self.callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn notify(&self) {
        let callbacks = self.callbacks.lock().unwrap_or_else(PoisonError::into_inner);
        for callback in callbacks.iter() {
            callback();
        }
    }
}

impl OutputSource for MockOutputSource {
    fn enumerate_outputs(&self) -> Result<Vec<OutputDescriptor>, OutputQueryError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match state.fail_next.take() {
            Some(message) => Err(OutputQueryError::Platform(message)),
            None => Ok(state.outputs.clone()),
        }
    }

    fn on_output_change(&self, callback: OutputChangeCallback) {
        self.callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(callback);
    }
}
