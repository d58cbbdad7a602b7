use std::cell::RefCell;
use std::rc::Rc;

use crate::draw::Color;

use super::{Attribute, GpuContext, PresentOutcome, Primitive, Program, TextureId};

/// One recorded [`GpuContext`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum GpuCall {
    UseProgram(Program),
    Upload { attribute: Attribute, data: Vec<f32> },
    BindTexture(TextureId),
    Draw { primitive: Primitive, first: u32, count: u32 },
    CreateTexture { texture: TextureId, width: u32, height: u32 },
    UpdateTexture { texture: TextureId, x: u32, y: u32, width: u32, height: u32 },
    ReleaseTexture(TextureId),
    BeginFrame(Color),
    Present,
    Resize { width: u32, height: u32 },
    SetVsync(bool),
    Dispose,
}

/// Shared, clonable view of the calls a [`HeadlessContext`] has received.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Rc<RefCell<Vec<GpuCall>>>);

impl CallLog {
    pub fn calls(&self) -> Vec<GpuCall> {
        self.0.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    /// `(primitive, first, count)` of every draw, in order.
    pub fn draws(&self) -> Vec<(Primitive, u32, u32)> {
        self.0
            .borrow()
            .iter()
            .filter_map(|c| match *c {
                GpuCall::Draw { primitive, first, count } => Some((primitive, first, count)),
                _ => None,
            })
            .collect()
    }

    /// Payloads of every upload to `attribute`, in order.
    pub fn uploads(&self, attribute: Attribute) -> Vec<Vec<f32>> {
        self.0
            .borrow()
            .iter()
            .filter_map(|c| match c {
                GpuCall::Upload { attribute: a, data } if *a == attribute => Some(data.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&GpuCall) -> bool) -> usize {
        self.0.borrow().iter().filter(|c| pred(c)).count()
    }

    fn push(&self, call: GpuCall) {
        self.0.borrow_mut().push(call);
    }
}

/// A [`GpuContext`] with no device behind it.
///
/// Every call is appended to a [`CallLog`]; texture ids are handed out
/// sequentially from 1. Once disposed, calls are no longer recorded.
#[derive(Debug, Default)]
pub struct HeadlessContext {
    log: CallLog,
    next_texture: u32,
    disposed: bool,
}

impl HeadlessContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the context together with a handle on its call log.
    pub fn with_log() -> (Self, CallLog) {
        let ctx = Self::new();
        let log = ctx.log.clone();
        (ctx, log)
    }

    pub fn log(&self) -> &CallLog {
        &self.log
    }

    fn record(&mut self, call: GpuCall) {
        if !self.disposed {
            self.log.push(call);
        }
    }
}

impl GpuContext for HeadlessContext {
    fn use_program(&mut self, program: Program) {
        self.record(GpuCall::UseProgram(program));
    }

    fn upload(&mut self, attribute: Attribute, data: &[f32]) {
        debug_assert_eq!(data.len() % attribute.components(), 0);
        self.record(GpuCall::Upload { attribute, data: data.to_vec() });
    }

    fn bind_texture(&mut self, texture: TextureId) {
        self.record(GpuCall::BindTexture(texture));
    }

    fn draw(&mut self, primitive: Primitive, first: u32, count: u32) {
        self.record(GpuCall::Draw { primitive, first, count });
    }

    fn create_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> TextureId {
        debug_assert_eq!(rgba.len(), (width * height * 4) as usize);
        self.next_texture += 1;
        let texture = TextureId(self.next_texture);
        self.record(GpuCall::CreateTexture { texture, width, height });
        texture
    }

    fn update_texture(&mut self, texture: TextureId, x: u32, y: u32, width: u32, height: u32, rgba: &[u8]) {
        debug_assert_eq!(rgba.len(), (width * height * 4) as usize);
        self.record(GpuCall::UpdateTexture { texture, x, y, width, height });
    }

    fn release_texture(&mut self, texture: TextureId) {
        self.record(GpuCall::ReleaseTexture(texture));
    }

    fn begin_frame(&mut self, clear: Color) {
        self.record(GpuCall::BeginFrame(clear));
    }

    fn present(&mut self) -> PresentOutcome {
        if self.disposed {
            return PresentOutcome::Skipped;
        }
        self.record(GpuCall::Present);
        PresentOutcome::Presented
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.record(GpuCall::Resize { width, height });
    }

    fn set_vsync(&mut self, enabled: bool) {
        self.record(GpuCall::SetVsync(enabled));
    }

    fn dispose(&mut self) {
        self.record(GpuCall::Dispose);
        self.disposed = true;
    }
}
