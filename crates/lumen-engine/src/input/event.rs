//! Window and input events, and listener dispatch.

use crate::math::Vec2;

use super::monitor::Monitor;
use super::types::{Key, Modifiers, MouseButton, ScrollDelta};

/// Everything the runtime reports to listeners and to the game.
///
/// Positions are in draw space: pixels with the origin at the bottom-left
/// corner of the window.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    KeyPress { key: Key, modifiers: Modifiers },
    KeyRelease { key: Key, modifiers: Modifiers },
    /// Auto-repeat while a key is held down.
    KeyHold { key: Key, modifiers: Modifiers },

    MouseEnter,
    MouseLeave,
    MouseMove { from: Vec2, to: Vec2 },
    MouseButtonPress { button: MouseButton, position: Vec2, modifiers: Modifiers },
    MouseButtonRelease { button: MouseButton, position: Vec2, modifiers: Modifiers },
    Scroll { delta: ScrollDelta, modifiers: Modifiers },

    /// Committed text input.
    Text(String),
    Focus(bool),
    Resized { width: u32, height: u32 },

    MonitorConnected(Monitor),
    MonitorDisconnected(Monitor),
}

impl Event {
    pub fn is_key(&self) -> bool {
        matches!(self, Event::KeyPress { .. } | Event::KeyRelease { .. } | Event::KeyHold { .. })
    }

    pub fn is_mouse(&self) -> bool {
        matches!(
            self,
            Event::MouseEnter
                | Event::MouseLeave
                | Event::MouseMove { .. }
                | Event::MouseButtonPress { .. }
                | Event::MouseButtonRelease { .. }
                | Event::Scroll { .. }
        )
    }

    pub fn is_monitor(&self) -> bool {
        matches!(self, Event::MonitorConnected(_) | Event::MonitorDisconnected(_))
    }
}

/// Receives events, one handler slot per event kind.
///
/// Every slot defaults to doing nothing; implement the ones you need.
/// The category slots (`on_key_event`, `on_mouse_event`, `on_monitor_event`)
/// run before the specific slot.
#[allow(unused_variables)]
pub trait Listener {
    fn on_key_event(&mut self, event: &Event) {}
    fn on_mouse_event(&mut self, event: &Event) {}
    fn on_monitor_event(&mut self, event: &Event) {}

    fn on_key_press(&mut self, key: Key, modifiers: Modifiers) {}
    fn on_key_release(&mut self, key: Key, modifiers: Modifiers) {}
    fn on_key_hold(&mut self, key: Key, modifiers: Modifiers) {}

    fn on_mouse_enter(&mut self) {}
    fn on_mouse_leave(&mut self) {}
    fn on_mouse_move(&mut self, from: Vec2, to: Vec2) {}
    fn on_mouse_button_press(&mut self, button: MouseButton, position: Vec2) {}
    fn on_mouse_button_release(&mut self, button: MouseButton, position: Vec2) {}
    fn on_scroll(&mut self, delta: ScrollDelta) {}

    fn on_text(&mut self, text: &str) {}
    fn on_focus(&mut self, focused: bool) {}
    fn on_resize(&mut self, width: u32, height: u32) {}

    fn on_monitor_connected(&mut self, monitor: &Monitor) {}
    fn on_monitor_disconnected(&mut self, monitor: &Monitor) {}

    /// Routes `event` to its category slot, then to its own slot.
    fn dispatch(&mut self, event: &Event) {
        if event.is_key() {
            self.on_key_event(event);
        } else if event.is_mouse() {
            self.on_mouse_event(event);
        } else if event.is_monitor() {
            self.on_monitor_event(event);
        }

        match event {
            Event::KeyPress { key, modifiers } => self.on_key_press(*key, *modifiers),
            Event::KeyRelease { key, modifiers } => self.on_key_release(*key, *modifiers),
            Event::KeyHold { key, modifiers } => self.on_key_hold(*key, *modifiers),
            Event::MouseEnter => self.on_mouse_enter(),
            Event::MouseLeave => self.on_mouse_leave(),
            Event::MouseMove { from, to } => self.on_mouse_move(*from, *to),
            Event::MouseButtonPress { button, position, .. } => self.on_mouse_button_press(*button, *position),
            Event::MouseButtonRelease { button, position, .. } => {
                self.on_mouse_button_release(*button, *position)
            }
            Event::Scroll { delta, .. } => self.on_scroll(*delta),
            Event::Text(text) => self.on_text(text),
            Event::Focus(focused) => self.on_focus(*focused),
            Event::Resized { width, height } => self.on_resize(*width, *height),
            Event::MonitorConnected(m) => self.on_monitor_connected(m),
            Event::MonitorDisconnected(m) => self.on_monitor_disconnected(m),
        }
    }
}

/// Handle returned by [`EventDispatcher::add_listener`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ListenerId(u64);

/// Owns a window's listeners and delivers events to them in
/// registration order.
#[derive(Default)]
pub struct EventDispatcher {
    listeners: Vec<(ListenerId, Box<dyn Listener>)>,
    next_id: u64,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&mut self, listener: Box<dyn Listener>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Removes and returns a listener. Unknown ids return `None`.
    pub fn remove_listener(&mut self, id: ListenerId) -> Option<Box<dyn Listener>> {
        let idx = self.listeners.iter().position(|(l, _)| *l == id)?;
        Some(self.listeners.remove(idx).1)
    }

    pub fn dispatch(&mut self, event: &Event) {
        for (_, listener) in &mut self.listeners {
            listener.dispatch(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
