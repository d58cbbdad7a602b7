//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and Window, and wires them to the GPU layer.

mod config;
mod game_window;
mod runtime;

pub use config::{WindowConfig, WindowState};
pub use game_window::{GameWindow, WindowCommand};
pub use runtime::Runtime;
