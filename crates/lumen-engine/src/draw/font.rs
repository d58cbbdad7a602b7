//! Fonts and glyph atlases.
//!
//! Each `(font, pixel size)` pair gets its own atlas texture. A glyph is
//! rasterized once, on first use, into a cell one line tall and one advance
//! wide, with the baseline at the line's descent. Drawing a glyph is then a
//! single textured quad the size of its cell.

use std::collections::HashMap;

use crate::error::LoadError;
use crate::gpu::{GpuContext, TextureId};

use super::batch::UvRect;

/// Opaque handle to a font loaded into a [`FontSystem`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct FontId(pub(crate) usize);

/// A loaded font at a pixel size.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Font {
    pub id: FontId,
    pub size: f32,
}

impl Font {
    pub fn new(id: FontId, size: f32) -> Self {
        Self { id, size }
    }

    pub(crate) fn atlas_key(&self) -> (FontId, u32) {
        (self.id, self.size.to_bits())
    }
}

/// Owns every parsed font. Fonts are immutable after loading.
#[derive(Default)]
pub struct FontSystem {
    fonts: Vec<fontdue::Font>,
}

impl FontSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a TrueType or OpenType font.
    pub fn load_font(&mut self, bytes: &[u8]) -> Result<FontId, LoadError> {
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| LoadError::Font(e.to_string()))?;
        let id = FontId(self.fonts.len());
        self.fonts.push(font);
        log::debug!("loaded font {id:?} ({} glyphs)", self.fonts[id.0].glyph_count());
        Ok(id)
    }

    pub(crate) fn get(&self, id: FontId) -> Option<&fontdue::Font> {
        self.fonts.get(id.0)
    }

    /// Distance between two baselines.
    pub fn line_height(&self, font: Font) -> f32 {
        self.line_metrics(font).map_or(font.size * 1.2, |m| m.new_line_size)
    }

    /// Width of the widest line of `text`, in pixels.
    pub fn string_width(&self, font: Font, text: &str) -> f32 {
        let Some(f) = self.get(font.id) else {
            return 0.0;
        };
        text.split('\n')
            .map(|line| {
                line.chars()
                    .filter(|&c| c != '\r')
                    .map(|c| f.metrics(c, font.size).advance_width)
                    .sum::<f32>()
            })
            .fold(0.0, f32::max)
    }

    /// Horizontal pen advance after `ch`.
    pub(crate) fn advance(&self, font: Font, ch: char) -> f32 {
        self.get(font.id).map_or(0.0, |f| f.metrics(ch, font.size).advance_width)
    }

    fn line_metrics(&self, font: Font) -> Option<fontdue::LineMetrics> {
        self.get(font.id)?.horizontal_line_metrics(font.size)
    }
}

// ── shelf packing ─────────────────────────────────────────────────────────

/// Pixels between packed cells.
const PADDING: u32 = 1;

/// Row-by-row rectangle packer. Rows grow upward from the bottom.
#[derive(Debug)]
pub(crate) struct ShelfPacker {
    edge: u32,
    cursor_x: u32,
    cursor_y: u32,
    row_height: u32,
    full: bool,
}

impl ShelfPacker {
    pub(crate) fn new(edge: u32) -> Self {
        Self { edge, cursor_x: PADDING, cursor_y: PADDING, row_height: 0, full: false }
    }

    pub(crate) fn is_full(&self) -> bool {
        self.full
    }

    /// Reserves a `w` x `h` cell, returning its lower-left corner.
    /// Once a cell fails to fit, the packer stays full.
    pub(crate) fn place(&mut self, w: u32, h: u32) -> Option<(u32, u32)> {
        if self.full {
            return None;
        }

        if self.cursor_x + w + PADDING > self.edge {
            self.cursor_y += self.row_height + PADDING;
            self.cursor_x = PADDING;
            self.row_height = 0;
        }

        if self.cursor_x + w + PADDING > self.edge || self.cursor_y + h + PADDING > self.edge {
            self.full = true;
            return None;
        }

        let at = (self.cursor_x, self.cursor_y);
        self.cursor_x += w + PADDING;
        self.row_height = self.row_height.max(h);
        Some(at)
    }
}

// ── glyph cells ───────────────────────────────────────────────────────────

/// Renders a fontdue coverage bitmap (rows top-down) into an RGBA cell
/// (rows bottom-up) of `cell_w` x `cell_h`. `baseline` is the baseline's row
/// counted from the bottom of the cell.
pub(crate) fn compose_cell(
    metrics: &fontdue::Metrics,
    coverage: &[u8],
    cell_w: u32,
    cell_h: u32,
    baseline: i32,
) -> Vec<u8> {
    let mut rgba = vec![0u8; (cell_w * cell_h * 4) as usize];
    for px in rgba.chunks_exact_mut(4) {
        px[..3].fill(255);
    }

    let bottom = baseline + metrics.ymin;
    for (row, line) in coverage.chunks_exact(metrics.width.max(1)).enumerate() {
        let y = bottom + (metrics.height - 1 - row) as i32;
        if !(0..cell_h as i32).contains(&y) {
            continue;
        }
        for (col, &alpha) in line.iter().enumerate() {
            let x = metrics.xmin + col as i32;
            if !(0..cell_w as i32).contains(&x) {
                continue;
            }
            rgba[((y as u32 * cell_w + x as u32) * 4 + 3) as usize] = alpha;
        }
    }
    rgba
}

/// Placement of one glyph in its atlas.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct Glyph {
    pub uv: UvRect,
    pub width: f32,
    pub height: f32,
}

/// Lazily filled glyph atlas for one font at one size.
pub(crate) struct GlyphAtlas {
    font: Font,
    texture: Option<TextureId>,
    packer: ShelfPacker,
    /// `None` marks glyphs with no coverage, or that did not fit.
    glyphs: HashMap<char, Option<Glyph>>,
}

impl GlyphAtlas {
    pub(crate) fn new(font: Font, edge: u32) -> Self {
        Self { font, texture: None, packer: ShelfPacker::new(edge), glyphs: HashMap::new() }
    }

    pub(crate) fn texture(&self) -> Option<TextureId> {
        self.texture
    }

    /// Returns the glyph for `ch`, rasterizing and uploading it on first use.
    pub(crate) fn glyph(&mut self, gpu: &mut dyn GpuContext, fonts: &FontSystem, ch: char) -> Option<Glyph> {
        if let Some(cached) = self.glyphs.get(&ch) {
            return *cached;
        }
        let glyph = self.rasterize(gpu, fonts, ch);
        self.glyphs.insert(ch, glyph);
        glyph
    }

    fn rasterize(&mut self, gpu: &mut dyn GpuContext, fonts: &FontSystem, ch: char) -> Option<Glyph> {
        let font = fonts.get(self.font.id)?;
        let (metrics, coverage) = font.rasterize(ch, self.font.size);
        if metrics.width == 0 || metrics.height == 0 || coverage.iter().all(|&a| a == 0) {
            return None;
        }

        let line = font.horizontal_line_metrics(self.font.size);
        let cell_h = line.map_or(self.font.size * 1.2, |m| m.new_line_size).ceil().max(1.0) as u32;
        let baseline = line.map_or(0.0, |m| -m.descent).ceil() as i32;
        let cell_w = (metrics.advance_width.ceil() as i32)
            .max(metrics.xmin + metrics.width as i32)
            .max(1) as u32;

        let was_full = self.packer.is_full();
        let Some((x, y)) = self.packer.place(cell_w, cell_h) else {
            if !was_full {
                log::warn!(
                    "glyph atlas for {:?} at {}px is full; further glyphs are skipped",
                    self.font.id,
                    self.font.size
                );
            }
            return None;
        };

        let texture = self.ensure_texture(gpu);
        let rgba = compose_cell(&metrics, &coverage, cell_w, cell_h, baseline);
        gpu.update_texture(texture, x, y, cell_w, cell_h, &rgba);

        let edge = self.packer.edge as f32;
        Some(Glyph {
            uv: UvRect::new(
                x as f32 / edge,
                y as f32 / edge,
                (x + cell_w) as f32 / edge,
                (y + cell_h) as f32 / edge,
            ),
            width: cell_w as f32,
            height: cell_h as f32,
        })
    }

    fn ensure_texture(&mut self, gpu: &mut dyn GpuContext) -> TextureId {
        if let Some(t) = self.texture {
            return t;
        }
        let edge = self.packer.edge;
        let t = gpu.create_texture(edge, edge, &vec![0u8; (edge * edge * 4) as usize]);
        log::debug!("created {edge}x{edge} glyph atlas for {:?} at {}px", self.font.id, self.font.size);
        self.texture = Some(t);
        t
    }

    pub(crate) fn release(&mut self, gpu: &mut dyn GpuContext) {
        if let Some(t) = self.texture.take() {
            gpu.release_texture(t);
        }
        self.glyphs.clear();
    }

    #[cfg(test)]
    pub(crate) fn is_full(&self) -> bool {
        self.packer.is_full()
    }
}

/// Well-known locations of a sans-serif system font.
pub const SYSTEM_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Reads the first system font found in [`SYSTEM_FONT_PATHS`].
pub fn find_system_font() -> Option<Vec<u8>> {
    SYSTEM_FONT_PATHS.iter().find_map(|p| std::fs::read(p).ok())
}
