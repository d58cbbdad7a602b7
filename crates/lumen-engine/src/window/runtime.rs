use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::monitor::MonitorHandle;
use winit::window::{Fullscreen, Window, WindowId};

use crate::core::{Game, run_frame, shutdown};
use crate::draw::{Graphics, GraphicsConfig};
use crate::gpu::{GpuInit, PresentOutcome, WgpuContext};
use crate::input::{Event, KeyMap, MonitorInfo, Translator};
use crate::time::FrameClock;

use super::config::{WindowConfig, WindowState};
use super::game_window::{GameWindow, WindowCommand};

/// How often the monitor list is re-read.
const MONITOR_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Entry point: opens the window, drives frames until it closes.
pub struct Runtime;

impl Runtime {
    /// Runs `game` in a window built from `config`. Returns once the window
    /// has closed; initialization failures and fatal GPU errors are returned
    /// as errors.
    pub fn run<G>(config: WindowConfig, gpu_init: GpuInit, graphics: GraphicsConfig, game: G) -> Result<()>
    where
        G: Game + 'static,
    {
        graphics.validate().context("invalid graphics configuration")?;

        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, graphics, game);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.fatal.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

struct WindowEntry {
    window: Arc<Window>,
    state: GameWindow,
    graphics: Graphics,
    clock: FrameClock,
    translator: Translator,
    last_monitor_poll: Instant,
}

struct AppState<G: Game> {
    config: WindowConfig,
    gpu_init: GpuInit,
    graphics_config: GraphicsConfig,
    game: G,
    keymap: KeyMap,

    entry: Option<WindowEntry>,
    fatal: Option<anyhow::Error>,
    finished: bool,
}

impl<G: Game> AppState<G> {
    fn new(config: WindowConfig, gpu_init: GpuInit, graphics_config: GraphicsConfig, game: G) -> Self {
        Self {
            config,
            gpu_init,
            graphics_config,
            game,
            keymap: KeyMap::new(),
            entry: None,
            fatal: None,
            finished: false,
        }
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let cfg = &self.config;
        let attrs = Window::default_attributes()
            .with_title(cfg.title.clone())
            .with_inner_size(PhysicalSize::new(cfg.width.max(1), cfg.height.max(1)))
            .with_position(PhysicalPosition::new(cfg.x, cfg.y))
            .with_resizable(cfg.resizable)
            .with_visible(cfg.visible);

        let window = Arc::new(event_loop.create_window(attrs).context("failed to create window")?);
        window.set_ime_allowed(true);

        let gpu = pollster::block_on(WgpuContext::new(window.clone(), self.gpu_init.clone(), cfg.vsync))
            .context("GPU initialization failed")?;

        let size = window.inner_size();
        let graphics = Graphics::new(Box::new(gpu), size.width.max(1), size.height.max(1), self.graphics_config.clone())
            .context("invalid graphics configuration")?;

        let mut state = GameWindow::new(cfg);
        state.on_resized(size.width.max(1), size.height.max(1));

        log::info!("window '{}' opened at {}x{}", cfg.title, size.width, size.height);

        let mut entry = WindowEntry {
            window,
            state,
            graphics,
            clock: FrameClock::new(),
            translator: Translator::new(),
            last_monitor_poll: Instant::now(),
        };

        for event in sync_monitors(event_loop, &mut entry.state) {
            deliver(&mut self.game, &mut entry.state, &event);
        }

        // Monitor and state only apply once monitors are known.
        if cfg.monitor.is_some()
            && let Err(e) = entry.state.set_monitor(cfg.monitor)
        {
            log::warn!("ignoring configured monitor: {e}");
        }
        if cfg.state != WindowState::Restored {
            entry.state.set_state(cfg.state);
        }
        apply_commands(&mut entry);

        self.game
            .init(&mut entry.state, &mut entry.graphics)
            .context("game initialization failed")?;
        apply_commands(&mut entry);

        entry.clock.reset();
        entry.window.request_redraw();
        self.entry = Some(entry);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{error:#}");
        self.fatal = Some(error);
        self.finish(event_loop);
    }

    /// Tears down the window exactly once and stops the loop.
    fn finish(&mut self, event_loop: &ActiveEventLoop) {
        if !self.finished {
            self.finished = true;
            if let Some(mut entry) = self.entry.take() {
                shutdown(&mut self.game, &mut entry.graphics);
                log::info!("window '{}' closed", entry.state.title());
            }
        }
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(entry) = self.entry.as_mut() else {
            return;
        };

        if entry.last_monitor_poll.elapsed() >= MONITOR_POLL_INTERVAL {
            entry.last_monitor_poll = Instant::now();
            for event in sync_monitors(event_loop, &mut entry.state) {
                deliver(&mut self.game, &mut entry.state, &event);
            }
        }

        let dt = entry.clock.tick().elapsed;
        let outcome = run_frame(&mut self.game, &mut entry.state, &mut entry.graphics, dt);
        apply_commands(entry);

        let close = entry.state.should_close();
        if outcome == PresentOutcome::Fatal {
            self.fail(event_loop, anyhow!("GPU surface reported a fatal error"));
        } else if close {
            self.finish(event_loop);
        }
    }
}

impl<G: Game> ApplicationHandler for AppState<G> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() || self.finished {
            return;
        }
        if let Err(e) = self.create_window(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.finished {
            event_loop.exit();
            return;
        }

        // Continuous redraw: the game loop never idles.
        event_loop.set_control_flow(ControlFlow::Poll);
        if let Some(entry) = &self.entry {
            entry.window.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(entry) = self.entry.as_mut() else {
            return;
        };
        if entry.window.id() != window_id {
            return;
        }

        match &event {
            WindowEvent::CloseRequested => {
                entry.state.close();
                self.finish(event_loop);
            }

            WindowEvent::Resized(size) => {
                let (w, h) = (size.width.max(1), size.height.max(1));
                entry.graphics.resize(w, h);
                entry.state.on_resized(w, h);
                deliver(&mut self.game, &mut entry.state, &Event::Resized { width: w, height: h });
                entry.window.request_redraw();
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let size = entry.window.inner_size();
                entry.graphics.resize(size.width.max(1), size.height.max(1));
                entry.state.on_resized(size.width.max(1), size.height.max(1));
            }

            WindowEvent::Moved(pos) => entry.state.on_moved(pos.x, pos.y),

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            _ => {
                let height = entry.state.height();
                if let Some(ev) = entry.translator.translate(&self.keymap, &event, height) {
                    deliver(&mut self.game, &mut entry.state, &ev);
                }
                if entry.state.should_close() {
                    self.finish(event_loop);
                }
            }
        }
    }
}

/// Input state and listeners first, then the game.
fn deliver<G: Game>(game: &mut G, window: &mut GameWindow, event: &Event) {
    window.dispatch(event);
    game.on_event(window, event);
}

fn sync_monitors(event_loop: &ActiveEventLoop, window: &mut GameWindow) -> Vec<Event> {
    let current = event_loop.available_monitors().map(|m| {
        let size = m.size();
        let info = MonitorInfo {
            name: m.name().unwrap_or_else(|| "unknown".to_string()),
            width: size.width,
            height: size.height,
        };
        (m, info)
    });
    window.monitor_registry_mut().sync(current)
}

fn apply_commands(entry: &mut WindowEntry) {
    for cmd in entry.state.take_commands() {
        log::debug!("window command: {cmd:?}");
        match cmd {
            WindowCommand::SetTitle(title) => entry.window.set_title(&title),
            WindowCommand::SetSize { width, height } => {
                // The platform answers with a Resized event when it differs.
                let _ = entry.window.request_inner_size(PhysicalSize::new(width, height));
            }
            WindowCommand::SetPosition { x, y } => entry.window.set_outer_position(PhysicalPosition::new(x, y)),
            WindowCommand::SetVsync(enabled) => entry.graphics.set_vsync(enabled),
            WindowCommand::SetVisible(visible) => entry.window.set_visible(visible),
            WindowCommand::SetState(state) => apply_state(entry, state),
            WindowCommand::SetMonitor(_) => {
                let handle = target_monitor(entry);
                if entry.state.state() == WindowState::Fullscreen {
                    entry.window.set_fullscreen(Some(Fullscreen::Borderless(handle)));
                } else if let Some(h) = handle {
                    entry.window.set_outer_position(h.position());
                }
            }
        }
    }
}

fn target_monitor(entry: &WindowEntry) -> Option<MonitorHandle> {
    entry
        .state
        .monitor()
        .and_then(|id| entry.state.monitor_registry().handle(id).cloned())
}

fn apply_state(entry: &WindowEntry, state: WindowState) {
    let window = &entry.window;
    match state {
        WindowState::Minimized => window.set_minimized(true),
        WindowState::Restored => {
            window.set_fullscreen(None);
            window.set_maximized(false);
            window.set_minimized(false);
        }
        WindowState::Maximized => {
            window.set_fullscreen(None);
            window.set_maximized(true);
        }
        WindowState::Fullscreen => {
            window.set_fullscreen(Some(Fullscreen::Borderless(target_monitor(entry))));
        }
    }
}
