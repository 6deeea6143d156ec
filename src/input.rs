use std::collections::HashSet;

use winit::event::ElementState;
use winit::keyboard::{KeyCode, PhysicalKey};

/// Keyboard state for the interactive window.
///
/// Owned by the interactive session. The window-event handler is the only
/// writer and the per-frame movement step the only reader; both run on the
/// event-loop thread.
#[derive(Debug, Default)]
pub struct InputState {
    keys_down: HashSet<KeyCode>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key transition. Keys without a stable code are ignored.
    pub fn apply_key(&mut self, key: PhysicalKey, state: ElementState) {
        let PhysicalKey::Code(code) = key else {
            return;
        };
        match state {
            ElementState::Pressed => {
                self.keys_down.insert(code);
            }
            ElementState::Released => {
                self.keys_down.remove(&code);
            }
        }
    }

    /// Clear held keys, e.g. on focus loss, so no key stays stuck.
    pub fn clear(&mut self) {
        self.keys_down.clear();
    }

    pub fn key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }
}
