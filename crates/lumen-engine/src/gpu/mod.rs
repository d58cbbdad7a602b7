//! GPU seam.
//!
//! Everything above this module talks to the GPU through [`GpuContext`]:
//! - [`WgpuContext`] renders to a window surface
//! - [`HeadlessContext`] records calls for tests

mod context;
mod headless;
mod init;
mod surface;
mod wgpu_context;

pub use context::{Attribute, GpuContext, PresentOutcome, Primitive, Program, TextureId};
pub use headless::{CallLog, GpuCall, HeadlessContext};
pub use init::GpuInit;
pub use wgpu_context::WgpuContext;
