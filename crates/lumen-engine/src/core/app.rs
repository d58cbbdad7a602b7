use crate::draw::{Color, Graphics};
use crate::input::Event;
use crate::window::GameWindow;

/// Game contract implemented by user code and passed to
/// [`Runtime::run`](crate::window::Runtime::run).
pub trait Game {
    /// Colour the framebuffer is cleared to before each render.
    fn background_color(&self) -> Color {
        Color::BLACK
    }

    /// Called once, after the window and GPU are ready.
    fn init(&mut self, window: &mut GameWindow, graphics: &mut Graphics) -> anyhow::Result<()> {
        let _ = (window, graphics);
        Ok(())
    }

    /// Advances the game by `dt` seconds.
    fn update(&mut self, window: &mut GameWindow, dt: f64);

    /// Issues the frame's draw calls.
    fn render(&mut self, window: &GameWindow, graphics: &mut Graphics);

    /// Called for every event after listeners have seen it.
    fn on_event(&mut self, window: &mut GameWindow, event: &Event) {
        let _ = (window, event);
    }

    /// Called once before GPU resources are released.
    fn dispose(&mut self) {}
}
