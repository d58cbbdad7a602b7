//! Frame timing.
//!
//! One `FrameClock` lives per game loop; `tick()` is called once per iteration
//! and yields the elapsed time handed to `Game::update`.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
