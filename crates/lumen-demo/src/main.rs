//! Bouncing shapes, text and an optional sound.
//!
//! Usage: `lumen-demo [FONT.ttf] [SOUND.wav]`

use std::path::PathBuf;

use anyhow::Context;
use lumen_engine::audio::{AudioClip, AudioPlayer, StreamedAudioSource};
use lumen_engine::core::Game;
use lumen_engine::draw::{Color, Font, Graphics, GraphicsConfig, find_system_font};
use lumen_engine::gpu::GpuInit;
use lumen_engine::input::{Event, Key, Listener, Modifiers, Monitor};
use lumen_engine::logging::{LoggingConfig, init_logging};
use lumen_engine::window::{GameWindow, Runtime, WindowConfig, WindowState};

const BALL_RADIUS: f32 = 24.0;

struct KeyLogger;

impl Listener for KeyLogger {
    fn on_key_press(&mut self, key: Key, modifiers: Modifiers) {
        log::debug!("key {key} pressed ({modifiers:?})");
    }

    fn on_monitor_connected(&mut self, monitor: &Monitor) {
        log::info!("monitor {} is {}x{}", monitor.name, monitor.width, monitor.height);
    }
}

struct Demo {
    font_path: Option<PathBuf>,
    sound_path: Option<PathBuf>,
    audio: Option<AudioPlayer>,

    ball: (f32, f32),
    velocity: (f32, f32),
    spin: f32,
    fps: f64,
}

impl Demo {
    fn new(font_path: Option<PathBuf>, sound_path: Option<PathBuf>) -> Self {
        Self {
            font_path,
            sound_path,
            audio: None,
            ball: (200.0, 200.0),
            velocity: (180.0, 140.0),
            spin: 0.0,
            fps: 0.0,
        }
    }

    fn start_audio(&mut self) {
        let Some(path) = self.sound_path.clone() else {
            return;
        };
        let player = match AudioPlayer::new() {
            Ok(p) => p,
            Err(e) => {
                log::warn!("audio disabled: {e}");
                return;
            }
        };

        // Short sounds are decoded up front, long ones streamed.
        let result = match AudioClip::load(&path) {
            Ok(clip) if clip.duration().as_secs() < 10 => {
                player.play(&clip);
                Ok(())
            }
            Ok(_) => StreamedAudioSource::open(&path)
                .map_err(anyhow::Error::from)
                .and_then(|s| player.play_streamed(s)),
            Err(e) => Err(e.into()),
        };
        if let Err(e) = result {
            log::warn!("could not play {}: {e:#}", path.display());
        }
        self.audio = Some(player);
    }
}

impl Game for Demo {
    fn background_color(&self) -> Color {
        Color::DARK_GRAY
    }

    fn init(&mut self, window: &mut GameWindow, graphics: &mut Graphics) -> anyhow::Result<()> {
        window.add_listener(Box::new(KeyLogger));

        let bytes = match &self.font_path {
            Some(path) => Some(std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?),
            None => find_system_font(),
        };
        match bytes {
            Some(bytes) => {
                let id = graphics.load_font(&bytes).context("failed to load font")?;
                graphics.set_font(Some(Font::new(id, 20.0)));
            }
            None => log::warn!("no font found; text is disabled"),
        }

        self.start_audio();
        Ok(())
    }

    fn update(&mut self, window: &mut GameWindow, dt: f64) {
        let frame = window.input_frame();
        let (quit, fullscreen, vsync) = (
            frame.key_pressed(Key::Escape),
            frame.key_pressed(Key::F11),
            frame.key_pressed(Key::V),
        );
        if quit {
            window.close();
            return;
        }
        if fullscreen {
            let next = match window.state() {
                WindowState::Fullscreen => WindowState::Restored,
                _ => WindowState::Fullscreen,
            };
            window.set_state(next);
        }
        if vsync {
            let enabled = !window.vsync();
            window.set_vsync(enabled);
        }

        let dt = dt as f32;
        let (w, h) = (window.width() as f32, window.height() as f32);
        let (mut x, mut y) = self.ball;
        let (mut vx, mut vy) = self.velocity;
        x += vx * dt;
        y += vy * dt;
        if x < BALL_RADIUS || x > w - BALL_RADIUS {
            vx = -vx;
            x = x.clamp(BALL_RADIUS, (w - BALL_RADIUS).max(BALL_RADIUS));
        }
        if y < BALL_RADIUS || y > h - BALL_RADIUS {
            vy = -vy;
            y = y.clamp(BALL_RADIUS, (h - BALL_RADIUS).max(BALL_RADIUS));
        }
        self.ball = (x, y);
        self.velocity = (vx, vy);
        self.spin = (self.spin + dt * 2.0) % std::f32::consts::TAU;

        if dt > 0.0 {
            self.fps = self.fps * 0.9 + (1.0 / f64::from(dt)) * 0.1;
        }
    }

    fn render(&mut self, window: &GameWindow, g: &mut Graphics) {
        let (w, h) = (window.width() as f32, window.height() as f32);

        g.set_color(Color::GRAY);
        g.fill_rect(20.0, 20.0, w - 40.0, 40.0);
        g.set_color(Color::WHITE);
        g.draw_rect(20.0, 20.0, w - 40.0, 40.0);

        let (x, y) = self.ball;
        g.set_color(Color::ORANGE);
        g.fill_ellipse(x, y, BALL_RADIUS, BALL_RADIUS);
        g.set_color(Color::YELLOW);
        g.draw_arc(x, y, BALL_RADIUS + 8.0, BALL_RADIUS + 8.0, self.spin, self.spin + std::f32::consts::PI);

        g.set_color(Color::CYAN);
        g.draw_line(0.0, 0.0, w, h);
        g.draw_ellipse(w / 2.0, h / 2.0, w / 4.0, h / 4.0);

        if let Some(p) = window.input().pointer {
            g.set_color(Color::MAGENTA);
            g.fill_rect(p.x - 3.0, p.y - 3.0, 6.0, 6.0);
        }

        g.set_color(Color::WHITE);
        let line = g.line_height();
        g.draw_string(&format!("lumen  {:.0} fps\nEsc quits, F11 fullscreen, V vsync", self.fps), 30.0, h - 30.0 - line);
    }

    fn on_event(&mut self, _: &mut GameWindow, event: &Event) {
        if let Event::Resized { width, height } = event {
            log::debug!("resized to {width}x{height}");
        }
    }

    fn dispose(&mut self) {
        self.audio = None;
    }
}

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    let mut args = std::env::args_os().skip(1).map(PathBuf::from);
    let font = args.next();
    let sound = args.next();

    Runtime::run(
        WindowConfig::default().with_title("lumen demo"),
        GpuInit::default(),
        GraphicsConfig::default(),
        Demo::new(font, sound),
    )
}
