use crate::draw::Graphics;
use crate::gpu::PresentOutcome;
use crate::window::GameWindow;

use super::app::Game;

/// Runs one frame: update, clear, render, flush, present.
///
/// Input for the frame has already been delivered through
/// [`Game::on_event`]; the per-frame transitions are cleared on return.
pub fn run_frame<G: Game + ?Sized>(
    game: &mut G,
    window: &mut GameWindow,
    graphics: &mut Graphics,
    dt: f64,
) -> PresentOutcome {
    game.update(window, dt);

    graphics.begin_frame(game.background_color());
    game.render(window, graphics);
    graphics.draw();
    let outcome = graphics.present();

    window.end_frame();
    outcome
}

/// Disposes the game, then every GPU resource.
pub fn shutdown<G: Game + ?Sized>(game: &mut G, graphics: &mut Graphics) {
    log::info!("shutting down");
    game.dispose();
    graphics.dispose();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::{Color, GraphicsConfig};
    use crate::gpu::{CallLog, GpuCall, HeadlessContext, Primitive};
    use crate::input::{Event, Key, Modifiers};
    use crate::window::WindowConfig;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Script {
        trace: Rc<RefCell<Vec<String>>>,
        x: f32,
    }

    impl Game for Script {
        fn background_color(&self) -> Color {
            Color::BLUE
        }

        fn update(&mut self, window: &mut GameWindow, dt: f64) {
            self.x += (dt * 100.0) as f32;
            self.trace.borrow_mut().push(format!("update {dt}"));
            if window.input().key_down(Key::Escape) {
                window.close();
            }
        }

        fn render(&mut self, _: &GameWindow, graphics: &mut Graphics) {
            self.trace.borrow_mut().push("render".into());
            graphics.fill_rect(self.x, 0.0, 10.0, 10.0);
        }

        fn dispose(&mut self) {
            self.trace.borrow_mut().push("dispose".into());
        }
    }

    fn setup() -> (GameWindow, Graphics, CallLog) {
        let (gpu, log) = HeadlessContext::with_log();
        let graphics = Graphics::new(Box::new(gpu), 800, 600, GraphicsConfig::default()).unwrap();
        (GameWindow::new(&WindowConfig::default()), graphics, log)
    }

    #[test]
    fn frame_clears_then_draws_then_presents() {
        let (mut window, mut graphics, log) = setup();
        let mut game = Script::default();

        let outcome = run_frame(&mut game, &mut window, &mut graphics, 0.016);
        assert_eq!(outcome, PresentOutcome::Presented);

        let calls = log.calls();
        assert_eq!(calls.first(), Some(&GpuCall::BeginFrame(Color::BLUE)));
        assert_eq!(calls.last(), Some(&GpuCall::Present));
        assert_eq!(log.draws(), vec![(Primitive::Triangles, 0, 6)]);
        assert_eq!(*game.trace.borrow(), vec!["update 0.016", "render"]);
    }

    #[test]
    fn nothing_drawn_still_presents() {
        struct Idle;
        impl Game for Idle {
            fn update(&mut self, _: &mut GameWindow, _: f64) {}
            fn render(&mut self, _: &GameWindow, _: &mut Graphics) {}
        }

        let (mut window, mut graphics, log) = setup();
        run_frame(&mut Idle, &mut window, &mut graphics, 0.0);
        assert_eq!(log.calls(), vec![GpuCall::BeginFrame(Color::BLACK), GpuCall::Present]);
    }

    #[test]
    fn update_sees_input_and_can_close() {
        let (mut window, mut graphics, _) = setup();
        let mut game = Script::default();

        window.dispatch(&Event::KeyPress { key: Key::Escape, modifiers: Modifiers::default() });
        run_frame(&mut game, &mut window, &mut graphics, 0.01);
        assert!(window.should_close());
        assert!(!window.input_frame().key_pressed(Key::Escape));
    }

    #[test]
    fn shutdown_disposes_game_before_gpu() {
        let (_, mut graphics, log) = setup();
        let mut game = Script::default();

        shutdown(&mut game, &mut graphics);
        assert_eq!(*game.trace.borrow(), vec!["dispose"]);
        assert_eq!(log.calls(), vec![GpuCall::Dispose]);
    }
}
