use std::collections::HashMap;
use std::f64::consts::TAU;
use std::path::Path;

use crate::error::{InvalidArgument, LoadError};
use crate::gpu::{GpuContext, PresentOutcome, Primitive};
use crate::math::Vec3;

use super::batch::{QUAD_VERTICES, ShapeBatch, TextureBatch, UvRect};
use super::camera::{Camera, PixelCamera};
use super::font::{Font, FontId, FontSystem, GlyphAtlas};
use super::texture::{Texture, TextureData, load_texture_data};
use super::Color;

/// Segments used by [`Graphics::draw_ellipse`] and [`Graphics::fill_ellipse`].
pub const ELLIPSE_SEGMENTS: u32 = 32;
/// Segments used by [`Graphics::draw_arc`].
pub const ARC_SEGMENTS: u32 = 16;

/// Batch sizes and atlas dimensions.
#[derive(Debug, Clone)]
pub struct GraphicsConfig {
    /// Lines or triangles per flush.
    pub shape_capacity: usize,
    /// Textured quads per flush.
    pub texture_capacity: usize,
    /// Edge length of each glyph atlas texture, in pixels.
    pub atlas_size: u32,
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        Self { shape_capacity: 1024, texture_capacity: 256, atlas_size: 1024 }
    }
}

/// Smallest glyph atlas edge accepted by [`GraphicsConfig::validate`].
pub const MIN_ATLAS_SIZE: u32 = 16;

impl GraphicsConfig {
    /// Rejects empty batches and atlases too small to hold a glyph.
    pub fn validate(&self) -> Result<(), InvalidArgument> {
        if self.shape_capacity == 0 {
            return Err(InvalidArgument::new("shape_capacity", "must be at least 1"));
        }
        if self.texture_capacity == 0 {
            return Err(InvalidArgument::new("texture_capacity", "must be at least 1"));
        }
        if self.atlas_size < MIN_ATLAS_SIZE {
            return Err(InvalidArgument::new(
                "atlas_size",
                format!("{} is below {MIN_ATLAS_SIZE}", self.atlas_size),
            ));
        }
        Ok(())
    }
}

fn check_segments(segments: u32) -> Result<(), InvalidArgument> {
    if segments == 0 {
        return Err(InvalidArgument::new("segments", "must be at least 1"));
    }
    Ok(())
}

/// Point on the ellipse centred at `(cx, cy)` with radii `(rx, ry)`.
#[inline]
fn ellipse_point(cx: f32, cy: f32, rx: f32, ry: f32, theta: f64) -> (f32, f32) {
    (cx + rx * theta.cos() as f32, cy + ry * theta.sin() as f32)
}

#[inline]
fn project(camera: &dyn Camera, x: f32, y: f32) -> Vec3 {
    camera.project(Vec3::new(x, y, 0.0))
}

/// Quad corners as two triangles:
/// bottom-left, top-left, bottom-right, bottom-right, top-right, top-left.
fn quad(camera: &dyn Camera, x: f32, y: f32, w: f32, h: f32) -> [Vec3; QUAD_VERTICES] {
    let bl = project(camera, x, y);
    let tl = project(camera, x, y + h);
    let br = project(camera, x + w, y);
    let tr = project(camera, x + w, y + h);
    [bl, tl, br, br, tr, tl]
}

/// The per-window drawing surface.
///
/// Coordinates are in draw space: by default one unit per pixel with the
/// origin at the bottom-left corner. Every call projects its corners through
/// the active camera and appends them to a batch; GPU work only happens in
/// [`Graphics::draw`] or when a batch fills up.
pub struct Graphics {
    gpu: Box<dyn GpuContext>,

    color: Color,
    font: Option<Font>,
    default_camera: PixelCamera,
    camera: Option<Box<dyn Camera>>,

    lines: ShapeBatch,
    triangles: ShapeBatch,
    textures: TextureBatch,

    fonts: FontSystem,
    atlases: HashMap<(FontId, u32), GlyphAtlas>,
    atlas_size: u32,
    warned_no_font: bool,
}

impl Graphics {
    /// Fails when `config` does not pass [`GraphicsConfig::validate`].
    pub fn new(
        gpu: Box<dyn GpuContext>,
        width: u32,
        height: u32,
        config: GraphicsConfig,
    ) -> Result<Self, InvalidArgument> {
        config.validate()?;
        Ok(Self {
            gpu,
            color: Color::BLACK,
            font: None,
            default_camera: PixelCamera::new(width, height),
            camera: None,
            lines: ShapeBatch::new(Primitive::Lines, config.shape_capacity),
            triangles: ShapeBatch::new(Primitive::Triangles, config.shape_capacity),
            textures: TextureBatch::new(config.texture_capacity),
            fonts: FontSystem::new(),
            atlases: HashMap::new(),
            atlas_size: config.atlas_size,
            warned_no_font: false,
        })
    }

    // ── state ─────────────────────────────────────────────────────────────

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn font(&self) -> Option<Font> {
        self.font
    }

    pub fn set_font(&mut self, font: Option<Font>) {
        self.font = font;
    }

    /// The custom camera, or `None` while the default pixel camera is active.
    pub fn camera(&self) -> Option<&dyn Camera> {
        self.camera.as_deref()
    }

    /// Installs a custom camera; `None` restores the default pixel camera.
    pub fn set_camera(&mut self, camera: Option<Box<dyn Camera>>) {
        self.camera = camera;
    }

    /// The camera every draw call projects through.
    pub fn active_camera(&self) -> &dyn Camera {
        active(&self.camera, &self.default_camera)
    }

    /// Follows a drawable-size change: the GPU surface and the default camera.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
        self.default_camera.resize(width, height);
    }

    pub fn set_vsync(&mut self, enabled: bool) {
        self.gpu.set_vsync(enabled);
    }

    // ── shapes ────────────────────────────────────────────────────────────

    pub fn draw_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        let camera = active(&self.camera, &self.default_camera);
        let v = [project(camera, x1, y1), project(camera, x2, y2)];
        self.lines.append(&mut *self.gpu, self.color, &v);
    }

    /// Outline of the rectangle with bottom-left corner `(x, y)`.
    pub fn draw_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        let camera = active(&self.camera, &self.default_camera);
        let bl = project(camera, x, y);
        let tl = project(camera, x, y + height);
        let tr = project(camera, x + width, y + height);
        let br = project(camera, x + width, y);

        for edge in [[bl, tl], [tl, tr], [tr, br], [br, bl]] {
            self.lines.append(&mut *self.gpu, self.color, &edge);
        }
    }

    /// Filled rectangle with bottom-left corner `(x, y)`: two triangles.
    pub fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        let camera = active(&self.camera, &self.default_camera);
        let bl = project(camera, x, y);
        let tl = project(camera, x, y + height);
        let tr = project(camera, x + width, y + height);
        let br = project(camera, x + width, y);

        self.triangles.append(&mut *self.gpu, self.color, &[bl, tl, br]);
        self.triangles.append(&mut *self.gpu, self.color, &[tr, br, tl]);
    }

    /// Outline of the ellipse centred at `(x, y)` with radii `width` and
    /// `height`.
    pub fn draw_ellipse(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.ellipse_outline(x, y, width, height, ELLIPSE_SEGMENTS);
    }

    pub fn draw_ellipse_segments(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        segments: u32,
    ) -> Result<(), InvalidArgument> {
        check_segments(segments)?;
        self.ellipse_outline(x, y, width, height, segments);
        Ok(())
    }

    /// Filled ellipse: `segments` triangles sharing the centre.
    pub fn fill_ellipse(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.ellipse_fill(x, y, width, height, ELLIPSE_SEGMENTS);
    }

    pub fn fill_ellipse_segments(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        segments: u32,
    ) -> Result<(), InvalidArgument> {
        check_segments(segments)?;
        self.ellipse_fill(x, y, width, height, segments);
        Ok(())
    }

    /// Elliptical arc centred at `(x, y)` from `start` to `end` radians.
    pub fn draw_arc(&mut self, x: f32, y: f32, width: f32, height: f32, start: f32, end: f32) {
        self.arc(x, y, width, height, start, end, ARC_SEGMENTS);
    }

    #[allow(clippy::too_many_arguments)]
    pub fn draw_arc_segments(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        start: f32,
        end: f32,
        segments: u32,
    ) -> Result<(), InvalidArgument> {
        check_segments(segments)?;
        self.arc(x, y, width, height, start, end, segments);
        Ok(())
    }

    fn ellipse_outline(&mut self, x: f32, y: f32, rx: f32, ry: f32, segments: u32) {
        let step = TAU / f64::from(segments);
        self.curve(x, y, rx, ry, 0.0, step, segments);
    }

    #[allow(clippy::too_many_arguments)]
    fn arc(&mut self, x: f32, y: f32, rx: f32, ry: f32, start: f32, end: f32, segments: u32) {
        let step = (f64::from(end) - f64::from(start)) / f64::from(segments);
        self.curve(x, y, rx, ry, f64::from(start), step, segments);
    }

    #[allow(clippy::too_many_arguments)]
    fn curve(&mut self, x: f32, y: f32, rx: f32, ry: f32, start: f64, step: f64, segments: u32) {
        let camera = active(&self.camera, &self.default_camera);
        for i in 0..segments {
            let (x1, y1) = ellipse_point(x, y, rx, ry, start + step * f64::from(i));
            let (x2, y2) = ellipse_point(x, y, rx, ry, start + step * f64::from(i + 1));
            let v = [project(camera, x1, y1), project(camera, x2, y2)];
            self.lines.append(&mut *self.gpu, self.color, &v);
        }
    }

    fn ellipse_fill(&mut self, x: f32, y: f32, rx: f32, ry: f32, segments: u32) {
        let camera = active(&self.camera, &self.default_camera);
        let centre = project(camera, x, y);
        let step = TAU / f64::from(segments);
        for i in 0..segments {
            let (x1, y1) = ellipse_point(x, y, rx, ry, step * f64::from(i));
            let (x2, y2) = ellipse_point(x, y, rx, ry, step * f64::from(i + 1));
            let v = [centre, project(camera, x1, y1), project(camera, x2, y2)];
            self.triangles.append(&mut *self.gpu, self.color, &v);
        }
    }

    // ── text ──────────────────────────────────────────────────────────────

    pub fn load_font(&mut self, bytes: &[u8]) -> Result<FontId, LoadError> {
        self.fonts.load_font(bytes)
    }

    pub fn fonts(&self) -> &FontSystem {
        &self.fonts
    }

    /// Width of the widest line of `text` in the current font.
    pub fn string_width(&self, text: &str) -> f32 {
        self.font.map_or(0.0, |f| self.fonts.string_width(f, text))
    }

    /// Line height of the current font.
    pub fn line_height(&self) -> f32 {
        self.font.map_or(0.0, |f| self.fonts.line_height(f))
    }

    /// Draws `text` with the current font and color. `(x, y)` is the
    /// bottom-left corner of the first line; `\n` starts a new line one line
    /// height lower and `\r` is ignored.
    pub fn draw_string(&mut self, text: &str, x: f32, y: f32) {
        let Some(font) = self.font else {
            if !self.warned_no_font {
                log::warn!("draw_string called with no font set; text is not drawn");
                self.warned_no_font = true;
            }
            return;
        };
        if self.fonts.get(font.id).is_none() {
            log::warn!("draw_string with unknown font {:?}", font.id);
            return;
        }

        let line_height = self.fonts.line_height(font);
        let atlas_size = self.atlas_size;
        let atlas = self
            .atlases
            .entry(font.atlas_key())
            .or_insert_with(|| GlyphAtlas::new(font, atlas_size));
        let camera = active(&self.camera, &self.default_camera);

        let (mut pen_x, mut pen_y) = (x, y);
        for ch in text.chars() {
            match ch {
                '\r' => continue,
                '\n' => {
                    pen_x = x;
                    pen_y -= line_height;
                    continue;
                }
                _ => {}
            }

            if let Some(glyph) = atlas.glyph(&mut *self.gpu, &self.fonts, ch)
                && let Some(texture) = atlas.texture()
            {
                let v = quad(camera, pen_x, pen_y, glyph.width, glyph.height);
                self.textures.append(&mut *self.gpu, texture, self.color, glyph.uv, &v);
            }
            pen_x += self.fonts.advance(font, ch);
        }
    }

    // ── textures ──────────────────────────────────────────────────────────

    /// Uploads decoded pixels as a new texture.
    pub fn create_texture(&mut self, data: &TextureData) -> Result<Texture, InvalidArgument> {
        if data.width == 0 || data.height == 0 {
            return Err(InvalidArgument::new("data", format!("texture is {}x{}", data.width, data.height)));
        }
        let expected = data.width as usize * data.height as usize * usize::from(data.channels);
        if !matches!(data.channels, 3 | 4) || data.pixels.len() != expected {
            return Err(InvalidArgument::new(
                "data",
                format!("{} bytes do not describe a {}x{}x{} image", data.pixels.len(), data.width, data.height, data.channels),
            ));
        }

        let id = self.gpu.create_texture(data.width, data.height, &data.to_rgba8());
        Ok(Texture::new(id, data.width, data.height))
    }

    /// Loads an image file on the calling thread and uploads it.
    pub fn load_texture(&mut self, path: impl AsRef<Path>) -> Result<Texture, LoadError> {
        let data = load_texture_data(path)?;
        Ok(self.create_texture(&data)?)
    }

    pub fn release_texture(&mut self, texture: Texture) {
        self.gpu.release_texture(texture.id());
    }

    /// Draws `texture` at its own size with bottom-left corner `(x, y)`.
    pub fn draw_texture(&mut self, texture: &Texture, x: f32, y: f32) {
        self.draw_texture_tinted(texture, x, y, Color::WHITE);
    }

    pub fn draw_texture_tinted(&mut self, texture: &Texture, x: f32, y: f32, tint: Color) {
        let (w, h) = (texture.width() as f32, texture.height() as f32);
        self.push_quad(texture, tint, UvRect::FULL, x, y, w, h);
    }

    pub fn draw_texture_sized(&mut self, texture: &Texture, x: f32, y: f32, width: f32, height: f32) {
        self.push_quad(texture, Color::WHITE, UvRect::FULL, x, y, width, height);
    }

    /// Draws the `uv` sub-rectangle of `texture` into the given rectangle.
    pub fn draw_texture_region(
        &mut self,
        texture: &Texture,
        uv: UvRect,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) {
        self.push_quad(texture, Color::WHITE, uv, x, y, width, height);
    }

    #[allow(clippy::too_many_arguments)]
    fn push_quad(&mut self, texture: &Texture, tint: Color, uv: UvRect, x: f32, y: f32, w: f32, h: f32) {
        let camera = active(&self.camera, &self.default_camera);
        let v = quad(camera, x, y, w, h);
        self.textures.append(&mut *self.gpu, texture.id(), tint, uv, &v);
    }

    // ── frame ─────────────────────────────────────────────────────────────

    pub fn begin_frame(&mut self, background: Color) {
        self.gpu.begin_frame(background);
    }

    /// Flushes every batch: triangles, then lines, then textured quads.
    pub fn draw(&mut self) {
        self.triangles.flush(&mut *self.gpu);
        self.lines.flush(&mut *self.gpu);
        self.textures.flush(&mut *self.gpu);
    }

    pub fn present(&mut self) -> PresentOutcome {
        self.gpu.present()
    }

    /// Releases glyph atlases and every GPU resource.
    pub fn dispose(&mut self) {
        for atlas in self.atlases.values_mut() {
            atlas.release(&mut *self.gpu);
        }
        self.atlases.clear();
        self.gpu.dispose();
    }
}

/// Field-level view of the active camera, so callers can keep mutating the
/// batches while it is borrowed.
#[inline]
fn active<'a>(custom: &'a Option<Box<dyn Camera>>, default: &'a PixelCamera) -> &'a dyn Camera {
    match custom {
        Some(c) => c.as_ref(),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::{Attribute, CallLog, GpuCall, HeadlessContext, Program};
    use crate::math::Matrix4;
    use approx::assert_relative_eq;

    fn graphics(width: u32, height: u32) -> (Graphics, CallLog) {
        let (gpu, log) = HeadlessContext::with_log();
        (Graphics::new(Box::new(gpu), width, height, GraphicsConfig::default()).unwrap(), log)
    }

    fn positions(log: &CallLog, index: usize) -> Vec<[f32; 3]> {
        log.uploads(Attribute::Position)[index]
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect()
    }

    /// Draw space equals clip space.
    struct IdentityCamera;

    impl Camera for IdentityCamera {
        fn project(&self, point: Vec3) -> Vec3 {
            Matrix4::IDENTITY.transform_point(point)
        }

        fn invert_project(&self, point: Vec3) -> Vec3 {
            point
        }
    }

    // ── shapes ────────────────────────────────────────────────────────────

    #[test]
    fn fill_rect_appends_two_triangles() {
        let (mut g, log) = graphics(100, 100);
        g.fill_rect(0.0, 0.0, 50.0, 100.0);
        assert_eq!(g.triangles.len(), 2);
        assert!(log.is_empty());

        g.draw();
        assert_eq!(log.draws(), vec![(Primitive::Triangles, 0, 6)]);
        let p = positions(&log, 0);
        // bl, tl, br / tr, br, tl
        assert_eq!(p[0], [-1.0, -1.0, 0.0]);
        assert_eq!(p[1], [-1.0, 1.0, 0.0]);
        assert_eq!(p[2], [0.0, -1.0, 0.0]);
        assert_eq!(p[3], [0.0, 1.0, 0.0]);
        assert_eq!(p[4], [0.0, -1.0, 0.0]);
        assert_eq!(p[5], [-1.0, 1.0, 0.0]);
    }

    #[test]
    fn draw_rect_winds_bl_tl_tr_br() {
        let (mut g, log) = graphics(100, 100);
        g.set_camera(Some(Box::new(IdentityCamera)));
        g.draw_rect(0.0, 0.0, 1.0, 1.0);
        g.draw();

        let p = positions(&log, 0);
        let expected = [
            [0.0, 0.0], [0.0, 1.0],
            [0.0, 1.0], [1.0, 1.0],
            [1.0, 1.0], [1.0, 0.0],
            [1.0, 0.0], [0.0, 0.0],
        ];
        assert_eq!(p.len(), 8);
        for (got, want) in p.iter().zip(expected) {
            assert_eq!([got[0], got[1]], want);
        }
    }

    #[test]
    fn ellipse_outline_uses_32_segments() {
        let (mut g, log) = graphics(200, 200);
        g.draw_ellipse(100.0, 100.0, 50.0, 20.0);
        assert_eq!(g.lines.len(), 32);
        g.draw();
        assert_eq!(log.draws(), vec![(Primitive::Lines, 0, 64)]);
    }

    #[test]
    fn ellipse_points_lie_on_the_curve() {
        let (mut g, log) = graphics(10, 10);
        g.set_camera(Some(Box::new(IdentityCamera)));
        g.draw_ellipse_segments(1.0, 2.0, 4.0, 3.0, 8).unwrap();
        g.draw();

        for [x, y, _] in positions(&log, 0) {
            let nx = (x - 1.0) / 4.0;
            let ny = (y - 2.0) / 3.0;
            assert_relative_eq!(nx * nx + ny * ny, 1.0, epsilon = 1e-5);
        }
        let p = positions(&log, 0);
        assert_relative_eq!(p[0][0], 5.0);
        assert_relative_eq!(p[0][1], 2.0);
    }

    #[test]
    fn fill_ellipse_fans_from_centre() {
        let (mut g, log) = graphics(10, 10);
        g.set_camera(Some(Box::new(IdentityCamera)));
        g.fill_ellipse_segments(0.5, 0.5, 1.0, 1.0, 6).unwrap();
        assert_eq!(g.triangles.len(), 6);
        g.draw();
        let p = positions(&log, 0);
        for tri in p.chunks_exact(3) {
            assert_eq!(tri[0], [0.5, 0.5, 0.0]);
        }
    }

    #[test]
    fn arc_sweeps_between_angles() {
        let (mut g, log) = graphics(10, 10);
        g.set_camera(Some(Box::new(IdentityCamera)));
        g.draw_arc(0.0, 0.0, 1.0, 1.0, 0.0, std::f32::consts::FRAC_PI_2);
        assert_eq!(g.lines.len(), ARC_SEGMENTS as usize);
        g.draw();

        let p = positions(&log, 0);
        assert_relative_eq!(p[0][0], 1.0);
        assert_relative_eq!(p[0][1], 0.0);
        let last = p[p.len() - 1];
        assert_relative_eq!(last[0], 0.0, epsilon = 1e-6);
        assert_relative_eq!(last[1], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn zero_segments_is_rejected() {
        let (mut g, _) = graphics(10, 10);
        assert!(g.draw_ellipse_segments(0.0, 0.0, 1.0, 1.0, 0).is_err());
        assert!(g.fill_ellipse_segments(0.0, 0.0, 1.0, 1.0, 0).is_err());
        let err = g.draw_arc_segments(0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 0).unwrap_err();
        assert_eq!(err.name, "segments");
        assert!(g.lines.is_empty());
        assert!(g.triangles.is_empty());
    }

    #[test]
    fn current_color_is_recorded_per_vertex() {
        let (mut g, log) = graphics(10, 10);
        assert_eq!(g.color(), Color::BLACK);
        g.set_color(Color::GREEN);
        g.draw_line(0.0, 0.0, 1.0, 1.0);
        g.draw();
        assert_eq!(log.uploads(Attribute::Color)[0], [0.0, 1.0, 0.0, 1.0].repeat(2));
    }

    // ── batching across the façade ────────────────────────────────────────

    #[test]
    fn full_line_batch_flushes_mid_frame() {
        let (gpu, log) = HeadlessContext::with_log();
        let config = GraphicsConfig { shape_capacity: 4, ..GraphicsConfig::default() };
        let mut g = Graphics::new(Box::new(gpu), 10, 10, config).unwrap();

        for i in 0..5 {
            g.draw_line(i as f32, 0.0, i as f32, 1.0);
        }
        assert_eq!(log.draws(), vec![(Primitive::Lines, 0, 8)]);
        assert_eq!(g.lines.len(), 1);
    }

    #[test]
    fn empty_batches_in_config_are_rejected() {
        let build = |config: GraphicsConfig| {
            Graphics::new(Box::new(HeadlessContext::new()), 10, 10, config).err().map(|e| e.name)
        };
        let base = GraphicsConfig::default();

        assert_eq!(build(GraphicsConfig { shape_capacity: 0, ..base.clone() }), Some("shape_capacity"));
        assert_eq!(build(GraphicsConfig { texture_capacity: 0, ..base.clone() }), Some("texture_capacity"));
        assert_eq!(build(GraphicsConfig { atlas_size: MIN_ATLAS_SIZE - 1, ..base.clone() }), Some("atlas_size"));
        assert_eq!(build(GraphicsConfig { shape_capacity: 1, texture_capacity: 1, atlas_size: MIN_ATLAS_SIZE }), None);
    }

    #[test]
    fn draw_flushes_triangles_lines_textures_in_order() {
        let (mut g, log) = graphics(10, 10);
        let tex = g
            .create_texture(&TextureData { width: 1, height: 1, channels: 4, pixels: vec![255; 4] })
            .unwrap();
        log.clear();

        g.draw_texture(&tex, 0.0, 0.0);
        g.draw_line(0.0, 0.0, 1.0, 1.0);
        g.fill_rect(0.0, 0.0, 1.0, 1.0);
        g.draw();

        let programs: Vec<Primitive> = log.draws().into_iter().map(|(p, _, _)| p).collect();
        assert_eq!(programs, vec![Primitive::Triangles, Primitive::Lines, Primitive::Triangles]);
        let uses: Vec<GpuCall> = log
            .calls()
            .into_iter()
            .filter(|c| matches!(c, GpuCall::UseProgram(_)))
            .collect();
        assert_eq!(
            uses,
            vec![
                GpuCall::UseProgram(Program::Shape),
                GpuCall::UseProgram(Program::Shape),
                GpuCall::UseProgram(Program::Texture),
            ]
        );
    }

    // ── camera ────────────────────────────────────────────────────────────

    #[test]
    fn default_camera_is_reported_as_none() {
        let (mut g, _) = graphics(10, 10);
        assert!(g.camera().is_none());
        g.set_camera(Some(Box::new(IdentityCamera)));
        assert!(g.camera().is_some());
        g.set_camera(None);
        assert!(g.camera().is_none());
    }

    #[test]
    fn resize_updates_default_camera_and_gpu() {
        let (mut g, log) = graphics(100, 100);
        g.resize(200, 50);
        assert!(log.calls().contains(&GpuCall::Resize { width: 200, height: 50 }));

        let tr = g.active_camera().project(Vec3::new(200.0, 50.0, 0.0));
        assert_relative_eq!(tr.x, 1.0);
        assert_relative_eq!(tr.y, 1.0);
    }

    // ── textures ──────────────────────────────────────────────────────────

    #[test]
    fn create_texture_validates_data() {
        let (mut g, _) = graphics(10, 10);
        let empty = TextureData { width: 0, height: 4, channels: 4, pixels: vec![] };
        assert!(g.create_texture(&empty).is_err());

        let short = TextureData { width: 2, height: 2, channels: 4, pixels: vec![0; 4] };
        assert!(g.create_texture(&short).is_err());

        let rgb = TextureData { width: 2, height: 1, channels: 3, pixels: vec![9; 6] };
        let tex = g.create_texture(&rgb).unwrap();
        assert_eq!((tex.width(), tex.height()), (2, 1));
    }

    #[test]
    fn texture_region_carries_uvs_and_white_tint() {
        let (mut g, log) = graphics(10, 10);
        let tex = g
            .create_texture(&TextureData { width: 2, height: 2, channels: 4, pixels: vec![0; 16] })
            .unwrap();
        g.set_color(Color::RED);
        g.draw_texture_region(&tex, UvRect::new(0.0, 0.0, 0.5, 0.5), 0.0, 0.0, 5.0, 5.0);
        g.draw();

        assert_eq!(log.uploads(Attribute::TexCoord)[0][..4], [0.0, 0.0, 0.0, 0.5]);
        assert_eq!(log.uploads(Attribute::Color)[0][..4], [1.0, 1.0, 1.0, 1.0]);
        assert!(log.calls().contains(&GpuCall::BindTexture(tex.id())));
    }

    #[test]
    fn release_texture_forwards_to_gpu() {
        let (mut g, log) = graphics(10, 10);
        let tex = g
            .create_texture(&TextureData { width: 1, height: 1, channels: 4, pixels: vec![0; 4] })
            .unwrap();
        g.release_texture(tex);
        assert!(log.calls().contains(&GpuCall::ReleaseTexture(tex.id())));
    }

    // ── text ──────────────────────────────────────────────────────────────

    #[test]
    fn text_without_font_draws_nothing() {
        let (mut g, log) = graphics(10, 10);
        g.draw_string("hello", 0.0, 0.0);
        g.draw();
        assert!(log.is_empty());
        assert_eq!(g.string_width("hello"), 0.0);
    }

    #[test]
    fn text_appends_one_quad_per_visible_glyph() {
        let Some(bytes) = crate::draw::find_system_font() else {
            eprintln!("no system font found; skipping");
            return;
        };
        let (mut g, _) = graphics(200, 200);
        let id = g.load_font(&bytes).unwrap();
        g.set_font(Some(Font::new(id, 16.0)));

        g.draw_string("a b\r\nc", 10.0, 100.0);
        assert_eq!(g.textures.len(), 3);
        assert!(g.line_height() > 0.0);
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    #[test]
    fn dispose_releases_gpu() {
        let (mut g, log) = graphics(10, 10);
        g.dispose();
        assert_eq!(log.calls().last(), Some(&GpuCall::Dispose));
    }
}
