//! Immediate-mode 2D drawing: colors, cameras, batches, textures and text.

mod batch;
mod camera;
mod color;
mod font;
mod graphics;
mod texture;

pub use batch::{QUAD_VERTICES, ShapeBatch, TextureBatch, UvRect};
pub use camera::{Camera, OrthographicCamera, PixelCamera};
pub use color::Color;
pub use font::{Font, FontId, FontSystem, SYSTEM_FONT_PATHS, find_system_font};
pub use graphics::{ARC_SEGMENTS, ELLIPSE_SEGMENTS, Graphics, GraphicsConfig, MIN_ATLAS_SIZE};
pub use texture::{
    DEFAULT_LOADER_WORKERS, PendingTexture, Texture, TextureData, TextureLoader, decode_texture_data,
    load_texture_data,
};
