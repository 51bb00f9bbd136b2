use std::collections::HashSet;

use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::play::Direction;

/// Keyboard state for the current frame.
#[derive(Default)]
pub struct Input {
    keys_down: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,
    keys_released: HashSet<KeyCode>,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call at the end of each frame to reset per-frame state.
    pub fn end_frame(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
    }

    /// Process a window event and update input state.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        if let WindowEvent::KeyboardInput { event, .. } = event
            && let PhysicalKey::Code(key) = event.physical_key
        {
            self.key(key, event.state);
        }
    }

    fn key(&mut self, key: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if self.keys_down.insert(key) {
                    self.keys_pressed.insert(key);
                }
            }
            ElementState::Released => {
                self.keys_down.remove(&key);
                self.keys_released.insert(key);
            }
        }
    }

    /// Returns true if the key is currently held down.
    pub fn key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// Returns true if the key went down this frame. Auto-repeat does not count.
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Returns true if the key was released this frame.
    pub fn key_released(&self, key: KeyCode) -> bool {
        self.keys_released.contains(&key)
    }

    /// The arrow key currently held, vertical keys winning ties.
    pub fn held_direction(&self) -> Direction {
        [
            (KeyCode::ArrowUp, Direction::Up),
            (KeyCode::ArrowDown, Direction::Down),
            (KeyCode::ArrowLeft, Direction::Left),
            (KeyCode::ArrowRight, Direction::Right),
        ]
        .into_iter()
        .find(|(key, _)| self.key_down(*key))
        .map_or(Direction::None, |(_, dir)| dir)
    }
}
