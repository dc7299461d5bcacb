//! Channel-backed event sink.

use screen_core::ScreenEvent;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use crate::application::scan_screens::EventSink;

/// Sends every event into an unbounded tokio channel.
///
/// Emitting never blocks, so the sink is safe to call from the scan path.
/// Events emitted after the receiver was dropped are discarded.
#[derive(Debug, Clone)]
pub struct ChannelEventSink {
    sender: UnboundedSender<ScreenEvent>,
}

impl ChannelEventSink {
    /// Creates the sink and the receiver its events arrive on.
    pub fn new() -> (Self, UnboundedReceiver<ScreenEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: ScreenEvent) {
        if self.sender.send(event).is_err() {
            debug!(?event, "event listener gone; event dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use screen_core::ScreenId;

    #[tokio::test]
    async fn test_events_arrive_in_emission_order() {
        // Arrange
        let (sink, mut receiver) = ChannelEventSink::new();

        // Act
        sink.emit(ScreenEvent::Scanning);
        sink.emit(ScreenEvent::Added { id: ScreenId(1) });
        sink.emit(ScreenEvent::Scanned);

        // Assert
        assert_eq!(receiver.recv().await, Some(ScreenEvent::Scanning));
        assert_eq!(receiver.recv().await, Some(ScreenEvent::Added { id: ScreenId(1) }));
        assert_eq!(receiver.recv().await, Some(ScreenEvent::Scanned));
    }

    #[tokio::test]
    async fn test_emit_after_receiver_dropped_does_not_panic() {
        let (sink, receiver) = ChannelEventSink::new();
        drop(receiver);

        sink.emit(ScreenEvent::ListChanged);
    }

    #[tokio::test]
    async fn test_channel_closes_when_every_sink_is_dropped() {
        let (sink, mut receiver) = ChannelEventSink::new();
        let clone = sink.clone();
        clone.emit(ScreenEvent::ListChanged);
        drop(sink);
        drop(clone);

        assert_eq!(receiver.recv().await, Some(ScreenEvent::ListChanged));
        assert_eq!(receiver.recv().await, None);
    }
}
