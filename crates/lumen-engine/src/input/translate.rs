//! winit → [`Event`] translation.

use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, Ime, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::ModifiersState;

use crate::math::Vec2;

use super::event::Event;
use super::keymap::KeyMap;
use super::types::{Modifiers, MouseButton, ScrollDelta};

/// Stateful translator for one window.
///
/// winit reports modifiers separately from keys and does not report the
/// previous pointer position, so both are tracked here.
#[derive(Debug, Default)]
pub struct Translator {
    modifiers: Modifiers,
    pointer: Option<Vec2>,
}

impl Translator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translates `event` for a window whose drawable is `height` pixels tall.
    ///
    /// Returns `None` for events with no [`Event`] counterpart, and for
    /// window lifecycle events the runtime handles itself.
    pub fn translate(&mut self, keymap: &KeyMap, event: &WindowEvent, height: u32) -> Option<Event> {
        match event {
            WindowEvent::ModifiersChanged(m) => {
                self.modifiers = map_modifiers(m.state());
                None
            }

            WindowEvent::Focused(focused) => {
                if !*focused {
                    self.modifiers = Modifiers::default();
                }
                Some(Event::Focus(*focused))
            }

            WindowEvent::CursorEntered { .. } => Some(Event::MouseEnter),

            WindowEvent::CursorLeft { .. } => {
                self.pointer = None;
                Some(Event::MouseLeave)
            }

            WindowEvent::CursorMoved { position, .. } => Some(self.pointer_moved(to_draw_space(*position, height))),

            WindowEvent::MouseInput { state, button, .. } => {
                let button = map_mouse_button(*button);
                let position = self.pointer.unwrap_or_default();
                let modifiers = self.modifiers;
                Some(match state {
                    ElementState::Pressed => Event::MouseButtonPress { button, position, modifiers },
                    ElementState::Released => Event::MouseButtonRelease { button, position, modifiers },
                })
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let delta = match delta {
                    MouseScrollDelta::LineDelta(x, y) => ScrollDelta::Lines(Vec2::new(*x, *y)),
                    MouseScrollDelta::PixelDelta(p) => ScrollDelta::Pixels(Vec2::new(p.x as f32, p.y as f32)),
                };
                Some(Event::Scroll { delta, modifiers: self.modifiers })
            }

            WindowEvent::KeyboardInput { event, .. } => {
                let key = keymap.translate(event.physical_key);
                let modifiers = self.modifiers;
                Some(match (event.state, event.repeat) {
                    (ElementState::Pressed, false) => Event::KeyPress { key, modifiers },
                    (ElementState::Pressed, true) => Event::KeyHold { key, modifiers },
                    (ElementState::Released, _) => Event::KeyRelease { key, modifiers },
                })
            }

            WindowEvent::Ime(Ime::Commit(text)) if !text.is_empty() => Some(Event::Text(text.clone())),

            _ => None,
        }
    }

    /// Records a pointer move; the first move after entering starts from
    /// where it lands.
    pub fn pointer_moved(&mut self, to: Vec2) -> Event {
        let from = self.pointer.unwrap_or(to);
        self.pointer = Some(to);
        Event::MouseMove { from, to }
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }
}

/// Window pixel position (origin top-left) to draw space (origin bottom-left).
pub fn to_draw_space(position: PhysicalPosition<f64>, height: u32) -> Vec2 {
    Vec2::new(position.x as f32, (f64::from(height) - position.y) as f32)
}

fn map_modifiers(m: ModifiersState) -> Modifiers {
    Modifiers {
        shift: m.shift_key(),
        ctrl: m.control_key(),
        alt: m.alt_key(),
        meta: m.super_key(),
    }
}

fn map_mouse_button(b: WinitMouseButton) -> MouseButton {
    match b {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        WinitMouseButton::Back => MouseButton::Back,
        WinitMouseButton::Forward => MouseButton::Forward,
        WinitMouseButton::Other(v) => MouseButton::Other(v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn y_axis_is_flipped_to_bottom_left_origin() {
        let p = to_draw_space(PhysicalPosition::new(10.0, 0.0), 600);
        assert_eq!(p, Vec2::new(10.0, 600.0));
        let p = to_draw_space(PhysicalPosition::new(0.0, 600.0), 600);
        assert_eq!(p, Vec2::new(0.0, 0.0));
    }

    #[test]
    fn moves_report_previous_position() {
        let mut t = Translator::new();
        assert_eq!(
            t.pointer_moved(Vec2::new(1.0, 1.0)),
            Event::MouseMove { from: Vec2::new(1.0, 1.0), to: Vec2::new(1.0, 1.0) }
        );
        assert_eq!(
            t.pointer_moved(Vec2::new(4.0, 5.0)),
            Event::MouseMove { from: Vec2::new(1.0, 1.0), to: Vec2::new(4.0, 5.0) }
        );
    }

    #[test]
    fn modifier_state_maps_each_flag() {
        let m = map_modifiers(ModifiersState::SHIFT | ModifiersState::SUPER);
        assert_eq!(m, Modifiers { shift: true, ctrl: false, alt: false, meta: true });
        assert!(!map_modifiers(ModifiersState::empty()).any());
    }

    #[test]
    fn mouse_buttons_map_one_to_one() {
        assert_eq!(map_mouse_button(WinitMouseButton::Left), MouseButton::Left);
        assert_eq!(map_mouse_button(WinitMouseButton::Other(9)), MouseButton::Other(9));
    }
}
