//! Fixed-capacity vertex batches.
//!
//! A batch accumulates primitives of one kind and turns them into as few GPU
//! calls as possible. It is either accumulating (`len < capacity`) or gets
//! flushed: explicitly, or right after the append that fills it. A flush
//! uploads only the filled prefix of each attribute array, once per channel,
//! then resets the batch.

use crate::gpu::{Attribute, GpuContext, Primitive, Program, TextureId};
use crate::math::Vec3;

use super::Color;

/// Vertices per textured quad (two triangles).
pub const QUAD_VERTICES: usize = 6;

/// Texture-coordinate rectangle. `(s1, t1)` is the bottom-left corner.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct UvRect {
    pub s1: f32,
    pub t1: f32,
    pub s2: f32,
    pub t2: f32,
}

impl UvRect {
    pub const FULL: UvRect = UvRect { s1: 0.0, t1: 0.0, s2: 1.0, t2: 1.0 };

    pub const fn new(s1: f32, t1: f32, s2: f32, t2: f32) -> Self {
        Self { s1, t1, s2, t2 }
    }

    /// Coordinates for the quad vertex order
    /// bottom-left, top-left, bottom-right, bottom-right, top-right, top-left.
    fn quad(&self) -> [f32; QUAD_VERTICES * 2] {
        let UvRect { s1, t1, s2, t2 } = *self;
        [s1, t1, s1, t2, s2, t1, s2, t1, s2, t2, s1, t2]
    }
}

impl Default for UvRect {
    fn default() -> Self {
        Self::FULL
    }
}

fn write_vertices(dst: &mut [f32], vertices: &[Vec3]) {
    for (slot, v) in dst.chunks_exact_mut(3).zip(vertices) {
        slot.copy_from_slice(&v.to_array());
    }
}

fn write_color(dst: &mut [f32], color: Color) {
    let rgba = color.to_array();
    for slot in dst.chunks_exact_mut(4) {
        slot.copy_from_slice(&rgba);
    }
}

// ── shape batch ───────────────────────────────────────────────────────────

/// Untextured lines or triangles, drawn with one call per flush.
#[derive(Debug)]
pub struct ShapeBatch {
    primitive: Primitive,
    capacity: usize,
    len: usize,
    positions: Box<[f32]>,
    colors: Box<[f32]>,
}

impl ShapeBatch {
    /// `capacity` is in primitives; zero is raised to one.
    /// [`GraphicsConfig::validate`](super::GraphicsConfig::validate) rejects it
    /// before a [`Graphics`](super::Graphics) is built.
    pub fn new(primitive: Primitive, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let vertices = capacity * primitive.vertices();
        Self {
            primitive,
            capacity,
            len: 0,
            positions: vec![0.0; vertices * Attribute::Position.components()].into_boxed_slice(),
            colors: vec![0.0; vertices * Attribute::Color.components()].into_boxed_slice(),
        }
    }

    pub fn primitive(&self) -> Primitive {
        self.primitive
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Records one primitive. `vertices.len()` must equal the primitive arity.
    ///
    /// Flushes immediately when this append fills the batch.
    pub fn append(&mut self, gpu: &mut dyn GpuContext, color: Color, vertices: &[Vec3]) {
        let arity = self.primitive.vertices();
        debug_assert_eq!(vertices.len(), arity, "wrong vertex count for {:?}", self.primitive);

        let v0 = self.len * arity;
        write_vertices(&mut self.positions[v0 * 3..(v0 + arity) * 3], vertices);
        write_color(&mut self.colors[v0 * 4..(v0 + arity) * 4], color);
        self.len += 1;

        if self.len == self.capacity {
            self.flush(gpu);
        }
    }

    /// Uploads the pending primitives and issues a single draw call.
    /// An empty batch issues nothing.
    pub fn flush(&mut self, gpu: &mut dyn GpuContext) {
        if self.len == 0 {
            return;
        }
        let vertices = self.len * self.primitive.vertices();

        gpu.use_program(Program::Shape);
        gpu.upload(Attribute::Position, &self.positions[..vertices * 3]);
        gpu.upload(Attribute::Color, &self.colors[..vertices * 4]);
        gpu.draw(self.primitive, 0, vertices as u32);

        log::trace!("flushed {} {:?} primitives", self.len, self.primitive);
        self.len = 0;
    }
}

// ── texture batch ─────────────────────────────────────────────────────────

/// Textured quads. Each quad may use a different texture, so a flush issues
/// one bind + draw per quad.
#[derive(Debug)]
pub struct TextureBatch {
    capacity: usize,
    positions: Box<[f32]>,
    texcoords: Box<[f32]>,
    colors: Box<[f32]>,
    textures: Vec<TextureId>,
}

impl TextureBatch {
    /// `capacity` is in quads; zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let vertices = capacity * QUAD_VERTICES;
        Self {
            capacity,
            positions: vec![0.0; vertices * Attribute::Position.components()].into_boxed_slice(),
            texcoords: vec![0.0; vertices * Attribute::TexCoord.components()].into_boxed_slice(),
            colors: vec![0.0; vertices * Attribute::Color.components()].into_boxed_slice(),
            textures: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Textures of the pending quads, in draw order.
    pub fn textures(&self) -> &[TextureId] {
        &self.textures
    }

    /// Records one quad given as two triangles:
    /// bottom-left, top-left, bottom-right, bottom-right, top-right, top-left.
    pub fn append(
        &mut self,
        gpu: &mut dyn GpuContext,
        texture: TextureId,
        color: Color,
        uv: UvRect,
        vertices: &[Vec3; QUAD_VERTICES],
    ) {
        let v0 = self.textures.len() * QUAD_VERTICES;
        write_vertices(&mut self.positions[v0 * 3..(v0 + QUAD_VERTICES) * 3], vertices);
        write_color(&mut self.colors[v0 * 4..(v0 + QUAD_VERTICES) * 4], color);
        self.texcoords[v0 * 2..(v0 + QUAD_VERTICES) * 2].copy_from_slice(&uv.quad());
        self.textures.push(texture);

        if self.textures.len() == self.capacity {
            self.flush(gpu);
        }
    }

    pub fn flush(&mut self, gpu: &mut dyn GpuContext) {
        if self.textures.is_empty() {
            return;
        }
        let vertices = self.textures.len() * QUAD_VERTICES;

        gpu.use_program(Program::Texture);
        gpu.upload(Attribute::Position, &self.positions[..vertices * 3]);
        gpu.upload(Attribute::TexCoord, &self.texcoords[..vertices * 2]);
        gpu.upload(Attribute::Color, &self.colors[..vertices * 4]);

        for (i, texture) in self.textures.iter().enumerate() {
            gpu.bind_texture(*texture);
            gpu.draw(Primitive::Triangles, (i * QUAD_VERTICES) as u32, QUAD_VERTICES as u32);
        }

        log::trace!("flushed {} textured quads", self.textures.len());
        self.textures.clear();
    }
}
