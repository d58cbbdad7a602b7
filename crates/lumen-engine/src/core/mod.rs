//! The contract between the runtime and game code, and the per-frame driver.

mod app;
mod frame;

pub use app::Game;
pub use frame::{run_frame, shutdown};
