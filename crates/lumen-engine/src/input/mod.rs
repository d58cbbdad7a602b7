//! Input subsystem.
//!
//! Events, listeners and input state are platform-agnostic; only
//! [`KeyMap`] and [`Translator`] know about winit.

mod event;
mod frame;
mod keymap;
mod monitor;
mod state;
mod translate;
mod types;

pub use event::{Event, EventDispatcher, Listener, ListenerId};
pub use frame::InputFrame;
pub use keymap::KeyMap;
pub use monitor::{Monitor, MonitorId, MonitorInfo, MonitorRegistry};
pub use state::InputState;
pub use translate::{Translator, to_draw_space};
pub use types::{Key, Modifiers, MouseButton, ScrollDelta};
