use std::collections::HashSet;

use crate::math::Vec2;

use super::event::Event;
use super::frame::InputFrame;
use super::types::{Key, Modifiers, MouseButton};

/// Current input state for a window.
#[derive(Debug, Default)]
pub struct InputState {
    pub modifiers: Modifiers,
    pub focused: bool,

    /// Pointer position in draw space; `None` while outside the window.
    pub pointer: Option<Vec2>,

    pub keys_down: HashSet<Key>,
    pub buttons_down: HashSet<MouseButton>,
}

impl InputState {
    /// Folds `ev` into the state and records transitions into `frame`.
    pub fn apply_event(&mut self, frame: &mut InputFrame, ev: &Event) {
        match ev {
            Event::KeyPress { key, modifiers } | Event::KeyHold { key, modifiers } => {
                self.modifiers = *modifiers;
                if self.keys_down.insert(*key) {
                    frame.keys_pressed.insert(*key);
                }
            }

            Event::KeyRelease { key, modifiers } => {
                self.modifiers = *modifiers;
                if self.keys_down.remove(key) {
                    frame.keys_released.insert(*key);
                }
            }

            Event::MouseMove { to, .. } => {
                self.pointer = Some(*to);
            }

            Event::MouseLeave => {
                self.pointer = None;
            }

            Event::MouseButtonPress { button, position, modifiers } => {
                self.pointer = Some(*position);
                self.modifiers = *modifiers;
                if self.buttons_down.insert(*button) {
                    frame.buttons_pressed.insert(*button);
                }
            }

            Event::MouseButtonRelease { button, position, modifiers } => {
                self.pointer = Some(*position);
                self.modifiers = *modifiers;
                if self.buttons_down.remove(button) {
                    frame.buttons_released.insert(*button);
                }
            }

            Event::Scroll { delta, modifiers } => {
                self.modifiers = *modifiers;
                frame.scroll = frame.scroll + delta.amount();
            }

            Event::Text(text) => frame.text.push(text.clone()),

            Event::Focus(focused) => {
                self.focused = *focused;
                if !*focused {
                    // Releases never arrive for keys held across a focus loss.
                    self.keys_down.clear();
                    self.buttons_down.clear();
                    self.modifiers = Modifiers::default();
                }
            }

            Event::MouseEnter
            | Event::Resized { .. }
            | Event::MonitorConnected(_)
            | Event::MonitorDisconnected(_) => {}
        }
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn button_down(&self, button: MouseButton) -> bool {
        self.buttons_down.contains(&button)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::ScrollDelta;

    fn press(key: Key) -> Event {
        Event::KeyPress { key, modifiers: Modifiers::default() }
    }

    fn release(key: Key) -> Event {
        Event::KeyRelease { key, modifiers: Modifiers::default() }
    }

    #[test]
    fn press_and_release_record_transitions_once() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();

        state.apply_event(&mut frame, &press(Key::Space));
        state.apply_event(&mut frame, &Event::KeyHold { key: Key::Space, modifiers: Modifiers::default() });
        assert!(state.key_down(Key::Space));
        assert!(frame.key_pressed(Key::Space));
        assert_eq!(frame.keys_pressed.len(), 1);

        frame.clear();
        state.apply_event(&mut frame, &release(Key::Space));
        assert!(!state.key_down(Key::Space));
        assert!(frame.key_released(Key::Space));
        assert!(!frame.key_pressed(Key::Space));
    }

    #[test]
    fn releasing_an_unheld_key_is_not_a_transition() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        state.apply_event(&mut frame, &release(Key::Q));
        assert!(frame.keys_released.is_empty());
    }

    #[test]
    fn focus_loss_clears_held_input() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        state.apply_event(&mut frame, &Event::Focus(true));
        state.apply_event(&mut frame, &press(Key::A));
        state.apply_event(
            &mut frame,
            &Event::MouseButtonPress {
                button: MouseButton::Left,
                position: Vec2::new(3.0, 4.0),
                modifiers: Modifiers::default(),
            },
        );

        state.apply_event(&mut frame, &Event::Focus(false));
        assert!(!state.focused);
        assert!(state.keys_down.is_empty());
        assert!(state.buttons_down.is_empty());
        assert_eq!(state.pointer, Some(Vec2::new(3.0, 4.0)));
    }

    #[test]
    fn pointer_follows_moves_and_leaves() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        state.apply_event(&mut frame, &Event::MouseMove { from: Vec2::zero(), to: Vec2::new(10.0, 20.0) });
        assert_eq!(state.pointer, Some(Vec2::new(10.0, 20.0)));
        state.apply_event(&mut frame, &Event::MouseLeave);
        assert_eq!(state.pointer, None);
    }

    #[test]
    fn scroll_and_text_accumulate_per_frame() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        let m = Modifiers::default();
        state.apply_event(&mut frame, &Event::Scroll { delta: ScrollDelta::Lines(Vec2::new(0.0, 1.0)), modifiers: m });
        state.apply_event(&mut frame, &Event::Scroll { delta: ScrollDelta::Lines(Vec2::new(0.0, 2.0)), modifiers: m });
        state.apply_event(&mut frame, &Event::Text("h".into()));
        state.apply_event(&mut frame, &Event::Text("i".into()));

        assert_eq!(frame.scroll, Vec2::new(0.0, 3.0));
        assert_eq!(frame.text, vec!["h", "i"]);

        frame.clear();
        assert_eq!(frame.scroll, Vec2::zero());
        assert!(frame.text.is_empty());
    }
}
