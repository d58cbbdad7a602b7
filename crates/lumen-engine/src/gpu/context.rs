use crate::draw::Color;

/// GPU primitive topology.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Primitive {
    Lines,
    Triangles,
}

impl Primitive {
    /// Vertices per primitive.
    #[inline]
    pub const fn vertices(self) -> usize {
        match self {
            Primitive::Lines => 2,
            Primitive::Triangles => 3,
        }
    }
}

/// Per-vertex attribute channel.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Attribute {
    Position,
    Color,
    TexCoord,
}

impl Attribute {
    /// Floats per vertex.
    #[inline]
    pub const fn components(self) -> usize {
        match self {
            Attribute::Position => 3,
            Attribute::Color => 4,
            Attribute::TexCoord => 2,
        }
    }
}

/// Shader program selected for subsequent uploads and draws.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Program {
    /// Position + color.
    Shape,
    /// Position + color + texture coordinates, sampled from the bound texture.
    Texture,
}

/// Handle to a texture owned by a [`GpuContext`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub(crate) u32);

/// Result of presenting a frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PresentOutcome {
    Presented,
    /// Nothing reached the screen this frame (surface lost, zero-sized, timeout).
    Skipped,
    /// Unrecoverable device failure. The loop should shut down.
    Fatal,
}

/// Operations the renderer needs from a GPU backend.
///
/// Calls are made from the render thread only. Within a frame the contract is:
/// `begin_frame`, then any number of `use_program` / `upload` / `bind_texture` /
/// `draw` sequences, then `present`. A `draw` consumes the attribute data of
/// the most recent `upload` per channel; `first` and `count` are vertex
/// indices into that data.
pub trait GpuContext {
    fn use_program(&mut self, program: Program);

    /// Uploads one attribute channel. `data.len()` is a multiple of
    /// [`Attribute::components`].
    fn upload(&mut self, attribute: Attribute, data: &[f32]);

    fn bind_texture(&mut self, texture: TextureId);

    fn draw(&mut self, primitive: Primitive, first: u32, count: u32);

    /// Creates an RGBA8 texture. Row 0 of `rgba` is the bottom row.
    fn create_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> TextureId;

    /// Replaces a sub-rectangle of an existing texture.
    fn update_texture(&mut self, texture: TextureId, x: u32, y: u32, width: u32, height: u32, rgba: &[u8]);

    fn release_texture(&mut self, texture: TextureId);

    /// Starts a frame that clears to `clear`.
    fn begin_frame(&mut self, clear: Color);

    fn present(&mut self) -> PresentOutcome;

    /// Drawable size in physical pixels changed.
    fn resize(&mut self, width: u32, height: u32);

    fn set_vsync(&mut self, enabled: bool);

    /// Releases every GPU resource. Later calls are ignored.
    fn dispose(&mut self);
}
