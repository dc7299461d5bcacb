//! End-to-end tests of the screen subsystem.
//!
//! These tests wire the real infrastructure adapters (mock output source,
//! recording sink, client table) into a [`ScreenSubsystem`] and drive it the
//! way the window manager does: hotplug → scan request → tick.

use std::sync::Arc;

use screen_core::{Area, DefaultMergePolicy, MergePolicy, NeverMerge, OutputDescriptor, ScreenEvent};
use screen_manager::application::reassign_clients::{ClientRegistry, ReassignOptions, WindowId};
use screen_manager::application::scan_screens::ScanError;
use screen_manager::application::subsystem::{ScreenSubsystem, SubsystemOptions};
use screen_manager::infrastructure::clients::ClientTable;
use screen_manager::infrastructure::events::RecordingEventSink;
use screen_manager::infrastructure::outputs::MockOutputSource;

// ── Helpers ───────────────────────────────────────────────────────────────────

fn output(id: u32, area: Area) -> OutputDescriptor {
    OutputDescriptor::connected(id, format!("OUT-{id}"), area)
}

struct Harness {
    source: Arc<MockOutputSource>,
    sink: Arc<RecordingEventSink>,
    subsystem: ScreenSubsystem,
    clients: ClientTable,
}

impl Harness {
    fn new(outputs: Vec<OutputDescriptor>, policy: Box<dyn MergePolicy>) -> Self {
        Self::with_options(outputs, policy, SubsystemOptions::default())
    }

    fn with_options(
        outputs: Vec<OutputDescriptor>,
        policy: Box<dyn MergePolicy>,
        options: SubsystemOptions,
    ) -> Self {
        let source = Arc::new(MockOutputSource::new(outputs));
        let sink = Arc::new(RecordingEventSink::new());
        let mut subsystem = ScreenSubsystem::new(
            Arc::clone(&source) as _,
            policy,
            Arc::clone(&sink) as _,
            options,
        );
        let mut clients = ClientTable::new();
        subsystem.init(&mut clients).expect("initial scan");
        sink.take();
        Self {
            source,
            sink,
            subsystem,
            clients,
        }
    }

    /// Simulates a hotplug and the next main-loop tick.
    fn hotplug(&mut self, outputs: Vec<OutputDescriptor>) {
        self.source.set_outputs(outputs);
        self.subsystem
            .tick(&mut self.clients)
            .expect("hotplug requested a scan")
            .expect("scan succeeded");
    }

    fn assert_all_windows_on_valid_screens(&self) {
        for client in self.clients.clients() {
            if let Some(id) = client.screen {
                assert!(
                    self.subsystem.screen(id).map(|s| s.is_valid()).unwrap_or(false),
                    "{} bound to invalid {id}",
                    client.window
                );
            }
        }
    }
}

// ── Scenarios ─────────────────────────────────────────────────────────────────

#[test]
fn test_identical_geometry_outputs_merge_into_one_screen() {
    let harness = Harness::new(
        vec![
            output(1, Area::new(0, 0, 1920, 1080)),
            output(2, Area::new(0, 0, 1920, 1080)),
        ],
        Box::new(DefaultMergePolicy),
    );

    assert_eq!(harness.subsystem.screen_count(), 1);
    let screen = harness.subsystem.screen_by_index(1).unwrap();
    assert_eq!(screen.outputs().len(), 2);
    assert_eq!(screen.geometry(), Area::new(0, 0, 1920, 1080));
    assert_eq!(harness.subsystem.primary_screen().unwrap().id(), screen.id());
}

#[test]
fn test_disconnect_with_disjoint_survivor_falls_back_to_primary() {
    // Arrange
    let mut harness = Harness::new(
        vec![
            output(1, Area::new(0, 0, 1920, 1080)),
            output(2, Area::new(1920, 0, 1920, 1080)),
        ],
        Box::new(DefaultMergePolicy),
    );
    let left = harness.subsystem.screen_by_index(1).unwrap().id();
    let right = harness.subsystem.screen_by_index(2).unwrap().id();
    harness
        .clients
        .insert(WindowId(1), Area::new(2400, 200, 800, 600), Some(right));

    // Act
    harness.hotplug(vec![output(1, Area::new(0, 0, 1920, 1080))]);

    // Assert
    let window = harness.clients.get(WindowId(1)).unwrap();
    assert_eq!(window.screen, Some(left));
    assert_eq!(window.geometry, Area::new(2400, 200, 800, 600), "not moved unless asked");
    harness.assert_all_windows_on_valid_screens();
    assert!(harness.subsystem.screen(right).is_none(), "purged once unreferenced");
}

#[test]
fn test_fake_screen_is_untouched_by_scan() {
    // Arrange
    let mut harness = Harness::new(
        vec![output(1, Area::new(0, 0, 1920, 1080))],
        Box::new(DefaultMergePolicy),
    );
    let fake = harness
        .subsystem
        .create_fake_screen(Area::new(1920, 0, 1024, 768));

    // Act: unplug everything, then plug a different monitor in.
    harness.hotplug(Vec::new());
    harness.hotplug(vec![output(5, Area::new(0, 0, 2560, 1440))]);

    // Assert
    let screen = harness.subsystem.screen(fake).expect("fake survives");
    assert!(screen.is_valid());
    assert!(screen.is_fake());
    assert_eq!(screen.geometry(), Area::new(1920, 0, 1024, 768));
    assert_eq!(
        harness
            .sink
            .count(|e| matches!(e, ScreenEvent::Removed { id } if *id == fake)),
        0
    );
}

#[test]
fn test_primary_disconnect_with_second_screen_at_origin_emits_one_primary_change() {
    // Arrange: two screens both anchored at the origin, kept apart.
    let mut harness = Harness::new(
        vec![
            output(1, Area::new(0, 0, 1920, 1080)),
            output(2, Area::new(0, 0, 1280, 1024)),
        ],
        Box::new(NeverMerge),
    );
    let first = harness.subsystem.primary_screen().unwrap().id();
    let second = harness.subsystem.screen_by_index(2).unwrap().id();

    // Act
    harness.hotplug(vec![output(2, Area::new(0, 0, 1280, 1024))]);

    // Assert
    let changes: Vec<ScreenEvent> = harness
        .sink
        .events()
        .into_iter()
        .filter(|e| matches!(e, ScreenEvent::PrimaryChanged { .. }))
        .collect();
    assert_eq!(
        changes,
        vec![ScreenEvent::PrimaryChanged {
            id: Some(second),
            previous: Some(first),
        }]
    );
}

#[test]
fn test_scan_events_follow_documented_order() {
    let mut harness = Harness::new(
        vec![output(1, Area::new(0, 0, 1920, 1080))],
        Box::new(DefaultMergePolicy),
    );
    let first = harness.subsystem.screen_by_index(1).unwrap().id();

    harness.hotplug(vec![output(2, Area::new(0, 0, 2560, 1440))]);

    let events = harness.sink.take();
    let second = harness.subsystem.screen_by_index(1).unwrap().id();
    assert_eq!(
        events,
        vec![
            ScreenEvent::Scanning,
            ScreenEvent::Added { id: second },
            ScreenEvent::Removed { id: first },
            ScreenEvent::ListChanged,
            ScreenEvent::PrimaryChanged {
                id: Some(second),
                previous: Some(first),
            },
            ScreenEvent::Scanned,
        ]
    );
}

#[test]
fn test_orphans_join_disjoint_fake_screen_when_every_output_is_unplugged() {
    // Arrange
    let mut harness = Harness::new(
        vec![output(1, Area::new(0, 0, 1920, 1080))],
        Box::new(DefaultMergePolicy),
    );
    let native = harness.subsystem.screen_by_index(1).unwrap().id();
    let fake = harness
        .subsystem
        .create_fake_screen(Area::new(5000, 0, 800, 600));
    harness
        .clients
        .insert(WindowId(1), Area::new(100, 100, 400, 300), Some(native));
    harness
        .clients
        .insert(WindowId(2), Area::new(10, 10, 100, 100), None);

    // Act
    harness.hotplug(Vec::new());

    // Assert
    assert_eq!(harness.subsystem.screen_count(), 1);
    assert!(harness.subsystem.primary_screen().is_none());
    assert_eq!(harness.clients.get(WindowId(1)).unwrap().screen, Some(fake));
    assert_eq!(harness.clients.get(WindowId(2)).unwrap().screen, Some(fake));
    harness.assert_all_windows_on_valid_screens();
}

// ── Failure and scheduling ────────────────────────────────────────────────────

#[test]
fn test_enumeration_failure_leaves_store_and_events_untouched() {
    // Arrange
    let mut harness = Harness::new(
        vec![output(1, Area::new(0, 0, 1920, 1080))],
        Box::new(DefaultMergePolicy),
    );
    let before: Vec<_> = harness.subsystem.screens().map(|s| s.id()).collect();
    harness.source.fail_next("display connection lost");

    // Act
    let result = harness.subsystem.scan(&mut harness.clients);

    // Assert
    assert!(matches!(result, Err(ScanError::Query(_))));
    let after: Vec<_> = harness.subsystem.screens().map(|s| s.id()).collect();
    assert_eq!(before, after);
    assert!(harness.sink.events().is_empty());
}

#[test]
fn test_burst_of_hotplug_notifications_runs_one_scan() {
    // Arrange
    let mut harness = Harness::new(
        vec![output(1, Area::new(0, 0, 1920, 1080))],
        Box::new(DefaultMergePolicy),
    );
    assert_eq!(harness.source.callback_count(), 1);

    // Act
    harness.source.set_outputs(vec![
        output(1, Area::new(0, 0, 1920, 1080)),
        output(2, Area::new(1920, 0, 1920, 1080)),
    ]);
    harness.source.set_outputs(vec![
        output(1, Area::new(0, 0, 1920, 1080)),
        output(2, Area::new(1920, 0, 1920, 1080)),
        output(3, Area::new(3840, 0, 1920, 1080)),
    ]);
    let first = harness.subsystem.tick(&mut harness.clients);
    let second = harness.subsystem.tick(&mut harness.clients);

    // Assert
    assert!(matches!(first, Some(Ok(_))));
    assert!(second.is_none());
    assert_eq!(harness.sink.count(|e| *e == ScreenEvent::Scanning), 1);
    assert_eq!(harness.subsystem.screen_count(), 3);
}

// ── Ownership ─────────────────────────────────────────────────────────────────

#[test]
fn test_disconnected_screen_is_purged_only_after_script_releases_it() {
    // Arrange
    let mut harness = Harness::new(
        vec![
            output(1, Area::new(0, 0, 1920, 1080)),
            output(2, Area::new(1920, 0, 1920, 1080)),
        ],
        Box::new(DefaultMergePolicy),
    );
    let right = harness.subsystem.screen_by_index(2).unwrap().id();
    harness.subsystem.retain_handle(right).unwrap();

    // Act: the native side lets go.
    harness.hotplug(vec![output(1, Area::new(0, 0, 1920, 1080))]);

    // Assert: still readable through the script handle, never looked up.
    let pending = harness.subsystem.screen(right).expect("script still holds it");
    assert!(!pending.is_valid());
    assert!(harness.subsystem.screen_at(2000, 10).is_err());

    // Act: the script lets go.
    let destroyed = harness
        .subsystem
        .release_handle(right, &harness.clients)
        .unwrap();

    // Assert
    assert!(destroyed);
    assert!(harness.subsystem.screen(right).is_none());
}

#[test]
fn test_preserve_offset_keeps_relative_position_on_reassignment() {
    // Arrange
    let mut harness = Harness::with_options(
        vec![
            output(1, Area::new(0, 0, 1920, 1080)),
            output(2, Area::new(1920, 0, 1920, 1080)),
        ],
        Box::new(DefaultMergePolicy),
        SubsystemOptions {
            reassign: ReassignOptions {
                preserve_offset: true,
            },
            ..SubsystemOptions::default()
        },
    );
    let right = harness.subsystem.screen_by_index(2).unwrap().id();
    harness
        .clients
        .insert(WindowId(1), Area::new(1920 + 300, 200, 800, 600), Some(right));

    // Act
    harness.hotplug(vec![output(1, Area::new(0, 0, 1920, 1080))]);

    // Assert
    let window = harness.clients.get(WindowId(1)).unwrap();
    assert_eq!(window.geometry, Area::new(300, 200, 800, 600));
}
