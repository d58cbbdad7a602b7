use std::path::PathBuf;

use anyhow::Context;
use winit::monitor::MonitorHandle;

use crate::draw::{DEFAULT_LOADER_WORKERS, PendingTexture, TextureLoader};
use crate::error::InvalidArgument;
use crate::input::{Event, EventDispatcher, InputFrame, InputState, Listener, ListenerId, Monitor, MonitorId, MonitorRegistry};

use super::config::{WindowConfig, WindowState};

/// A change requested by game code, applied to the OS window by the runtime
/// once the current callback returns.
#[derive(Debug, Clone, PartialEq)]
pub enum WindowCommand {
    SetTitle(String),
    SetSize { width: u32, height: u32 },
    SetPosition { x: i32, y: i32 },
    SetVsync(bool),
    SetState(WindowState),
    SetMonitor(Option<MonitorId>),
    SetVisible(bool),
}

/// Per-window state handed to [`Game`](crate::core::Game) callbacks.
///
/// Setters update the local view immediately and queue a [`WindowCommand`];
/// getters reflect the latest request or the latest platform report.
pub struct GameWindow {
    title: String,
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    visible: bool,
    vsync: bool,
    state: WindowState,
    monitor: Option<MonitorId>,

    close_requested: bool,
    commands: Vec<WindowCommand>,

    input: InputState,
    input_frame: InputFrame,
    listeners: EventDispatcher,
    monitors: MonitorRegistry<MonitorHandle>,
    textures: Option<TextureLoader>,
}

impl GameWindow {
    pub fn new(config: &WindowConfig) -> Self {
        Self {
            title: config.title.clone(),
            width: config.width.max(1),
            height: config.height.max(1),
            x: config.x,
            y: config.y,
            visible: config.visible,
            vsync: config.vsync,
            state: config.state,
            monitor: config.monitor,
            close_requested: false,
            commands: Vec::new(),
            input: InputState::default(),
            input_frame: InputFrame::default(),
            listeners: EventDispatcher::new(),
            monitors: MonitorRegistry::new(),
            textures: None,
        }
    }

    // ── geometry ──────────────────────────────────────────────────────────

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.commands.push(WindowCommand::SetTitle(self.title.clone()));
    }

    /// Drawable size in physical pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn set_size(&mut self, width: u32, height: u32) -> Result<(), InvalidArgument> {
        if width == 0 || height == 0 {
            return Err(InvalidArgument::new("size", format!("{width}x{height} has a zero dimension")));
        }
        self.width = width;
        self.height = height;
        self.commands.push(WindowCommand::SetSize { width, height });
        Ok(())
    }

    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub fn set_position(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
        self.commands.push(WindowCommand::SetPosition { x, y });
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        self.commands.push(WindowCommand::SetVisible(visible));
    }

    pub fn vsync(&self) -> bool {
        self.vsync
    }

    pub fn set_vsync(&mut self, vsync: bool) {
        self.vsync = vsync;
        self.commands.push(WindowCommand::SetVsync(vsync));
    }

    pub fn state(&self) -> WindowState {
        self.state
    }

    pub fn set_state(&mut self, state: WindowState) {
        self.state = state;
        self.commands.push(WindowCommand::SetState(state));
    }

    pub fn monitor(&self) -> Option<MonitorId> {
        self.monitor
    }

    /// Moves the window to a connected monitor, or lets the platform choose
    /// with `None`.
    pub fn set_monitor(&mut self, monitor: Option<MonitorId>) -> Result<(), InvalidArgument> {
        if let Some(id) = monitor
            && !self.monitors.contains(id)
        {
            return Err(InvalidArgument::new("monitor", format!("{id:?} is not connected")));
        }
        self.monitor = monitor;
        self.commands.push(WindowCommand::SetMonitor(monitor));
        Ok(())
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    /// Asks the runtime to close the window after the current frame.
    pub fn close(&mut self) {
        self.close_requested = true;
    }

    pub fn should_close(&self) -> bool {
        self.close_requested
    }

    // ── input and events ──────────────────────────────────────────────────

    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Transitions since the previous frame.
    pub fn input_frame(&self) -> &InputFrame {
        &self.input_frame
    }

    pub fn add_listener(&mut self, listener: Box<dyn Listener>) -> ListenerId {
        self.listeners.add_listener(listener)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> Option<Box<dyn Listener>> {
        self.listeners.remove_listener(id)
    }

    /// Connected monitors ordered by id.
    pub fn monitors(&self) -> Vec<&Monitor> {
        self.monitors.monitors()
    }

    // ── textures ──────────────────────────────────────────────────────────

    /// Starts decoding an image file in the background. The loader is
    /// started on first use.
    pub fn load_texture_async(&mut self, path: impl Into<PathBuf>) -> anyhow::Result<PendingTexture> {
        if self.textures.is_none() {
            let loader = TextureLoader::new(DEFAULT_LOADER_WORKERS).context("failed to start texture loader")?;
            self.textures = Some(loader);
        }
        let loader = self.textures.as_ref().context("texture loader unavailable")?;
        Ok(loader.load_async(path))
    }

    // ── runtime side ──────────────────────────────────────────────────────

    /// Updates input state and notifies listeners.
    pub(crate) fn dispatch(&mut self, event: &Event) {
        self.input.apply_event(&mut self.input_frame, event);
        self.listeners.dispatch(event);
    }

    pub(crate) fn end_frame(&mut self) {
        self.input_frame.clear();
    }

    pub(crate) fn take_commands(&mut self) -> Vec<WindowCommand> {
        std::mem::take(&mut self.commands)
    }

    pub(crate) fn on_resized(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    pub(crate) fn on_moved(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
    }

    pub(crate) fn monitor_registry_mut(&mut self) -> &mut MonitorRegistry<MonitorHandle> {
        &mut self.monitors
    }

    pub(crate) fn monitor_registry(&self) -> &MonitorRegistry<MonitorHandle> {
        &self.monitors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Key, Modifiers};
    use std::cell::Cell;
    use std::rc::Rc;

    fn window() -> GameWindow {
        GameWindow::new(&WindowConfig::default())
    }

    #[test]
    fn defaults_follow_config() {
        let w = GameWindow::new(&WindowConfig::default().with_title("demo").with_size(320, 200));
        assert_eq!(w.title(), "demo");
        assert_eq!(w.size(), (320, 200));
        assert!(w.vsync());
        assert_eq!(w.state(), WindowState::Restored);
        assert!(!w.should_close());
    }

    #[test]
    fn setters_queue_commands_in_order() {
        let mut w = window();
        w.set_title("x");
        w.set_position(5, 6);
        w.set_vsync(false);
        w.set_state(WindowState::Fullscreen);

        assert_eq!(
            w.take_commands(),
            vec![
                WindowCommand::SetTitle("x".into()),
                WindowCommand::SetPosition { x: 5, y: 6 },
                WindowCommand::SetVsync(false),
                WindowCommand::SetState(WindowState::Fullscreen),
            ]
        );
        assert!(w.take_commands().is_empty());
        assert_eq!(w.position(), (5, 6));
    }

    #[test]
    fn zero_size_is_rejected() {
        let mut w = window();
        assert!(w.set_size(0, 10).is_err());
        assert_eq!(w.size(), (800, 600));
        assert!(w.take_commands().is_empty());
    }

    #[test]
    fn unknown_monitor_is_rejected() {
        let mut w = window();
        let err = w.set_monitor(Some(MonitorId(3))).unwrap_err();
        assert_eq!(err.name, "monitor");
        assert!(w.set_monitor(None).is_ok());
    }

    #[test]
    fn close_sets_flag() {
        let mut w = window();
        w.close();
        assert!(w.should_close());
    }

    struct Counter(Rc<Cell<u32>>);

    impl Listener for Counter {
        fn on_key_press(&mut self, _: Key, _: Modifiers) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn dispatch_feeds_input_and_listeners() {
        let mut w = window();
        let hits = Rc::new(Cell::new(0));
        let id = w.add_listener(Box::new(Counter(hits.clone())));

        let ev = Event::KeyPress { key: Key::Enter, modifiers: Modifiers::default() };
        w.dispatch(&ev);
        assert_eq!(hits.get(), 1);
        assert!(w.input().key_down(Key::Enter));
        assert!(w.input_frame().key_pressed(Key::Enter));

        w.end_frame();
        assert!(!w.input_frame().key_pressed(Key::Enter));
        assert!(w.input().key_down(Key::Enter));

        w.remove_listener(id);
        w.dispatch(&ev);
        assert_eq!(hits.get(), 1);
    }
}
