use crate::input::MonitorId;

/// How a window occupies the screen.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum WindowState {
    Minimized,
    #[default]
    Restored,
    Maximized,
    /// Borderless fullscreen on the window's monitor.
    Fullscreen,
}

/// Initial window settings.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowConfig {
    pub title: String,
    /// Drawable size in physical pixels.
    pub width: u32,
    pub height: u32,
    pub x: i32,
    pub y: i32,
    pub resizable: bool,
    pub visible: bool,
    pub vsync: bool,
    pub state: WindowState,
    pub monitor: Option<MonitorId>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "lumen".to_string(),
            width: 800,
            height: 600,
            x: 0,
            y: 0,
            resizable: true,
            visible: true,
            vsync: true,
            state: WindowState::Restored,
            monitor: None,
        }
    }
}

impl WindowConfig {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_position(mut self, x: i32, y: i32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn with_resizable(mut self, resizable: bool) -> Self {
        self.resizable = resizable;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    pub fn with_state(mut self, state: WindowState) -> Self {
        self.state = state;
        self
    }

    pub fn with_monitor(mut self, monitor: Option<MonitorId>) -> Self {
        self.monitor = monitor;
        self
    }
}
