/// Surface and device preferences for [`WgpuContext`](super::WgpuContext).
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Adapter choice. Games default to the discrete GPU.
    pub power_preference: wgpu::PowerPreference,

    /// Pick an sRGB surface format when one exists. Off by default since
    /// [`Color`](crate::draw::Color) components are blended as given.
    pub prefer_srgb: bool,

    /// Present mode used while vsync is on. `AutoNoVsync` is used while it
    /// is off.
    pub vsync_present_mode: wgpu::PresentMode,

    /// Falls back to a supported mode when unavailable.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    pub required_features: wgpu::Features,
    pub required_limits: wgpu::Limits,

    /// Hint; honoured where the backend supports it.
    pub frame_latency: u32,
}

impl GpuInit {
    pub fn with_power_preference(mut self, preference: wgpu::PowerPreference) -> Self {
        self.power_preference = preference;
        self
    }

    pub fn with_srgb(mut self, prefer: bool) -> Self {
        self.prefer_srgb = prefer;
        self
    }

    pub fn with_vsync_present_mode(mut self, mode: wgpu::PresentMode) -> Self {
        self.vsync_present_mode = mode;
        self
    }

    pub fn with_frame_latency(mut self, frames: u32) -> Self {
        self.frame_latency = frames.max(1);
        self
    }
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            power_preference: wgpu::PowerPreference::HighPerformance,
            prefer_srgb: false,
            vsync_present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            frame_latency: 2,
        }
    }
}
