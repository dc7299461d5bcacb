//! In-memory client registry.
//!
//! A `HashMap` from window to its binding.  The binary uses it as a
//! stand-in for the window manager's real client list, and tests use it to
//! observe reassignment end to end.

use std::collections::HashMap;

use screen_core::{Area, ScreenId};
use tracing::debug;

use crate::application::reassign_clients::{ClientBinding, ClientRegistry, Rebinding, WindowId};

/// `HashMap`-backed [`ClientRegistry`].
#[derive(Debug, Default, Clone)]
pub struct ClientTable {
    clients: HashMap<WindowId, ClientBinding>,
}

impl ClientTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts managing `window` at `geometry`, bound to `screen`.
    ///
    /// Re-inserting a known window replaces its binding.
    pub fn insert(&mut self, window: WindowId, geometry: Area, screen: Option<ScreenId>) {
        self.clients.insert(
            window,
            ClientBinding {
                window,
                geometry,
                screen,
            },
        );
    }

    /// Stops managing `window`.
    pub fn remove(&mut self, window: WindowId) -> Option<ClientBinding> {
        self.clients.remove(&window)
    }

    pub fn get(&self, window: WindowId) -> Option<&ClientBinding> {
        self.clients.get(&window)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Number of windows bound to `screen`.
    pub fn bound_to(&self, screen: ScreenId) -> usize {
        self.clients
            .values()
            .filter(|c| c.screen == Some(screen))
            .count()
    }
}

impl ClientRegistry for ClientTable {
    /// Every binding, ordered by window id so reassignment is deterministic.
    fn clients(&self) -> Vec<ClientBinding> {
        let mut clients: Vec<ClientBinding> = self.clients.values().copied().collect();
        clients.sort_by_key(|c| c.window);
        clients
    }

    fn on_screen_invalidated(&mut self, rebinding: &Rebinding) {
        match self.clients.get_mut(&rebinding.window) {
            Some(binding) => {
                binding.screen = rebinding.to;
                binding.geometry = rebinding.geometry;
            }
            None => debug!(window = %rebinding.window, "rebinding for unknown window ignored"),
        }
    }
}
