//! In-memory event sink for tests.

use std::sync::{Mutex, PoisonError};

use screen_core::ScreenEvent;

use crate::application::scan_screens::EventSink;

/// Records every emitted event in order.
#[derive(Debug, Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<ScreenEvent>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of everything recorded so far.
    pub fn events(&self) -> Vec<ScreenEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns everything recorded so far and starts over.
    pub fn take(&self) -> Vec<ScreenEvent> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// How many recorded events satisfy `predicate`.
    pub fn count(&self, predicate: impl Fn(&ScreenEvent) -> bool) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|e| predicate(e))
            .count()
    }
}

impl EventSink for RecordingEventSink {
    fn emit(&self, event: ScreenEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_drains_recorded_events() {
        let sink = RecordingEventSink::new();
        sink.emit(ScreenEvent::Scanning);
        sink.emit(ScreenEvent::Scanned);

        assert_eq!(sink.count(|e| *e == ScreenEvent::Scanned), 1);
        assert_eq!(sink.take(), vec![ScreenEvent::Scanning, ScreenEvent::Scanned]);
        assert!(sink.events().is_empty());
    }
}
