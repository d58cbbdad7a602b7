//! Bidirectional lookup between [`Key`] and winit key codes.

use std::collections::HashMap;

use winit::keyboard::{KeyCode, PhysicalKey};

use super::types::Key;

/// Every key with a winit counterpart. Each side appears once.
const TABLE: &[(Key, KeyCode)] = &[
    (Key::Escape, KeyCode::Escape),
    (Key::Enter, KeyCode::Enter),
    (Key::Tab, KeyCode::Tab),
    (Key::Backspace, KeyCode::Backspace),
    (Key::Space, KeyCode::Space),
    (Key::Insert, KeyCode::Insert),
    (Key::Delete, KeyCode::Delete),
    (Key::Home, KeyCode::Home),
    (Key::End, KeyCode::End),
    (Key::PageUp, KeyCode::PageUp),
    (Key::PageDown, KeyCode::PageDown),
    (Key::ArrowUp, KeyCode::ArrowUp),
    (Key::ArrowDown, KeyCode::ArrowDown),
    (Key::ArrowLeft, KeyCode::ArrowLeft),
    (Key::ArrowRight, KeyCode::ArrowRight),
    (Key::CapsLock, KeyCode::CapsLock),
    (Key::ScrollLock, KeyCode::ScrollLock),
    (Key::NumLock, KeyCode::NumLock),
    (Key::PrintScreen, KeyCode::PrintScreen),
    (Key::Pause, KeyCode::Pause),
    (Key::ContextMenu, KeyCode::ContextMenu),
    (Key::ShiftLeft, KeyCode::ShiftLeft),
    (Key::ShiftRight, KeyCode::ShiftRight),
    (Key::ControlLeft, KeyCode::ControlLeft),
    (Key::ControlRight, KeyCode::ControlRight),
    (Key::AltLeft, KeyCode::AltLeft),
    (Key::AltRight, KeyCode::AltRight),
    (Key::SuperLeft, KeyCode::SuperLeft),
    (Key::SuperRight, KeyCode::SuperRight),
    (Key::A, KeyCode::KeyA),
    (Key::B, KeyCode::KeyB),
    (Key::C, KeyCode::KeyC),
    (Key::D, KeyCode::KeyD),
    (Key::E, KeyCode::KeyE),
    (Key::F, KeyCode::KeyF),
    (Key::G, KeyCode::KeyG),
    (Key::H, KeyCode::KeyH),
    (Key::I, KeyCode::KeyI),
    (Key::J, KeyCode::KeyJ),
    (Key::K, KeyCode::KeyK),
    (Key::L, KeyCode::KeyL),
    (Key::M, KeyCode::KeyM),
    (Key::N, KeyCode::KeyN),
    (Key::O, KeyCode::KeyO),
    (Key::P, KeyCode::KeyP),
    (Key::Q, KeyCode::KeyQ),
    (Key::R, KeyCode::KeyR),
    (Key::S, KeyCode::KeyS),
    (Key::T, KeyCode::KeyT),
    (Key::U, KeyCode::KeyU),
    (Key::V, KeyCode::KeyV),
    (Key::W, KeyCode::KeyW),
    (Key::X, KeyCode::KeyX),
    (Key::Y, KeyCode::KeyY),
    (Key::Z, KeyCode::KeyZ),
    (Key::Digit0, KeyCode::Digit0),
    (Key::Digit1, KeyCode::Digit1),
    (Key::Digit2, KeyCode::Digit2),
    (Key::Digit3, KeyCode::Digit3),
    (Key::Digit4, KeyCode::Digit4),
    (Key::Digit5, KeyCode::Digit5),
    (Key::Digit6, KeyCode::Digit6),
    (Key::Digit7, KeyCode::Digit7),
    (Key::Digit8, KeyCode::Digit8),
    (Key::Digit9, KeyCode::Digit9),
    (Key::Apostrophe, KeyCode::Quote),
    (Key::Comma, KeyCode::Comma),
    (Key::Minus, KeyCode::Minus),
    (Key::Period, KeyCode::Period),
    (Key::Slash, KeyCode::Slash),
    (Key::Semicolon, KeyCode::Semicolon),
    (Key::Equal, KeyCode::Equal),
    (Key::BracketLeft, KeyCode::BracketLeft),
    (Key::Backslash, KeyCode::Backslash),
    (Key::BracketRight, KeyCode::BracketRight),
    (Key::Backquote, KeyCode::Backquote),
    (Key::Numpad0, KeyCode::Numpad0),
    (Key::Numpad1, KeyCode::Numpad1),
    (Key::Numpad2, KeyCode::Numpad2),
    (Key::Numpad3, KeyCode::Numpad3),
    (Key::Numpad4, KeyCode::Numpad4),
    (Key::Numpad5, KeyCode::Numpad5),
    (Key::Numpad6, KeyCode::Numpad6),
    (Key::Numpad7, KeyCode::Numpad7),
    (Key::Numpad8, KeyCode::Numpad8),
    (Key::Numpad9, KeyCode::Numpad9),
    (Key::NumpadDecimal, KeyCode::NumpadDecimal),
    (Key::NumpadDivide, KeyCode::NumpadDivide),
    (Key::NumpadMultiply, KeyCode::NumpadMultiply),
    (Key::NumpadSubtract, KeyCode::NumpadSubtract),
    (Key::NumpadAdd, KeyCode::NumpadAdd),
    (Key::NumpadEnter, KeyCode::NumpadEnter),
    (Key::NumpadEqual, KeyCode::NumpadEqual),
    (Key::F1, KeyCode::F1),
    (Key::F2, KeyCode::F2),
    (Key::F3, KeyCode::F3),
    (Key::F4, KeyCode::F4),
    (Key::F5, KeyCode::F5),
    (Key::F6, KeyCode::F6),
    (Key::F7, KeyCode::F7),
    (Key::F8, KeyCode::F8),
    (Key::F9, KeyCode::F9),
    (Key::F10, KeyCode::F10),
    (Key::F11, KeyCode::F11),
    (Key::F12, KeyCode::F12),
    (Key::F13, KeyCode::F13),
    (Key::F14, KeyCode::F14),
    (Key::F15, KeyCode::F15),
    (Key::F16, KeyCode::F16),
    (Key::F17, KeyCode::F17),
    (Key::F18, KeyCode::F18),
    (Key::F19, KeyCode::F19),
    (Key::F20, KeyCode::F20),
    (Key::F21, KeyCode::F21),
    (Key::F22, KeyCode::F22),
    (Key::F23, KeyCode::F23),
    (Key::F24, KeyCode::F24),
];

/// Key lookup table, built once per runtime.
#[derive(Debug, Clone)]
pub struct KeyMap {
    to_key: HashMap<KeyCode, Key>,
    to_code: HashMap<Key, KeyCode>,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyMap {
    pub fn new() -> Self {
        let to_key: HashMap<_, _> = TABLE.iter().map(|&(k, c)| (c, k)).collect();
        let to_code: HashMap<_, _> = TABLE.iter().copied().collect();
        debug_assert_eq!(to_key.len(), TABLE.len(), "duplicate key code in table");
        debug_assert_eq!(to_code.len(), TABLE.len(), "duplicate key in table");
        Self { to_key, to_code }
    }

    /// Key for a winit code; codes outside the table become `Key::Unknown`.
    pub fn key(&self, code: KeyCode) -> Key {
        self.to_key
            .get(&code)
            .copied()
            .unwrap_or(Key::Unknown(code as u32))
    }

    /// winit code for a key, if it has one.
    pub fn code(&self, key: Key) -> Option<KeyCode> {
        self.to_code.get(&key).copied()
    }

    pub fn translate(&self, key: PhysicalKey) -> Key {
        match key {
            PhysicalKey::Code(code) => self.key(code),
            // Native codes carry no stable number in winit 0.30.
            PhysicalKey::Unidentified(_) => Key::Unknown(0),
        }
    }

    pub fn len(&self) -> usize {
        self.to_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_code.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_bijective() {
        let map = KeyMap::new();
        assert_eq!(map.len(), TABLE.len());
        for &(key, code) in TABLE {
            assert_eq!(map.key(code), key);
            assert_eq!(map.code(key), Some(code));
        }
    }

    #[test]
    fn left_and_right_modifiers_stay_distinct() {
        let map = KeyMap::new();
        assert_eq!(map.key(KeyCode::ShiftLeft), Key::ShiftLeft);
        assert_eq!(map.key(KeyCode::ShiftRight), Key::ShiftRight);
        assert_ne!(map.code(Key::ControlLeft), map.code(Key::ControlRight));
    }

    #[test]
    fn unmapped_codes_are_unknown() {
        let map = KeyMap::new();
        let key = map.key(KeyCode::MediaPlayPause);
        assert_eq!(key, Key::Unknown(KeyCode::MediaPlayPause as u32));
        assert_eq!(map.code(key), None);
        assert_eq!(map.code(Key::Unknown(7)), None);
    }

    #[test]
    fn physical_keys_translate() {
        let map = KeyMap::new();
        assert_eq!(map.translate(PhysicalKey::Code(KeyCode::KeyW)), Key::W);
        assert_eq!(map.translate(PhysicalKey::Code(KeyCode::Quote)), Key::Apostrophe);
    }
}
