use std::collections::HashSet;

use crate::math::Vec2;

use super::types::{Key, MouseButton};

/// Transitions seen during the current frame.
///
/// [`InputState`](super::InputState) holds what is down right now; this holds
/// what changed since the last frame. Cleared by the frame driver after each
/// frame.
#[derive(Debug, Default)]
pub struct InputFrame {
    pub keys_pressed: HashSet<Key>,
    pub keys_released: HashSet<Key>,
    pub buttons_pressed: HashSet<MouseButton>,
    pub buttons_released: HashSet<MouseButton>,

    /// Text committed this frame, in arrival order.
    pub text: Vec<String>,

    /// Sum of all scroll amounts this frame.
    pub scroll: Vec2,
}

impl InputFrame {
    pub fn clear(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
        self.buttons_pressed.clear();
        self.buttons_released.clear();
        self.text.clear();
        self.scroll = Vec2::zero();
    }

    pub fn key_pressed(&self, key: Key) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn key_released(&self, key: Key) -> bool {
        self.keys_released.contains(&key)
    }

    pub fn button_pressed(&self, button: MouseButton) -> bool {
        self.buttons_pressed.contains(&button)
    }

    pub fn button_released(&self, button: MouseButton) -> bool {
        self.buttons_released.contains(&button)
    }
}
