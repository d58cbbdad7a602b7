//! Lumen engine crate.
//!
//! A small 2D game framework: a winit window driving an update/render loop,
//! listener-based input events, an immediate-mode drawing API batched onto
//! wgpu, and a streaming audio player.

pub mod audio;
pub mod core;
pub mod draw;
pub mod error;
pub mod gpu;
pub mod input;
pub mod logging;
pub mod math;
pub mod time;
pub mod window;

pub use error::{AudioError, InvalidArgument, LoadError};
