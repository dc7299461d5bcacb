//! Event sinks: where [`ScreenEvent`](screen_core::ScreenEvent)s go.
//!
//! - [`ChannelEventSink`] forwards events into a tokio channel so an async
//!   listener (the binary's logging task, a scripting adapter) can consume
//!   them off the scan path.
//! - [`RecordingEventSink`] keeps every event in memory for assertions.

pub mod channel;
pub mod recording;

pub use channel::ChannelEventSink;
pub use recording::RecordingEventSink;
