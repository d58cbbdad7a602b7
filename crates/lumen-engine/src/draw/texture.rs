//! Texture handles, decoded pixel data and the background loader.

use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use anyhow::Context;
use crossbeam_channel::{Receiver, Sender, TryRecvError};

use crate::error::LoadError;
use crate::gpu::TextureId;

/// A texture living on the GPU, created through
/// [`Graphics::create_texture`](super::Graphics::create_texture).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Texture {
    id: TextureId,
    width: u32,
    height: u32,
}

impl Texture {
    pub(crate) fn new(id: TextureId, width: u32, height: u32) -> Self {
        Self { id, width, height }
    }

    pub fn id(&self) -> TextureId {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// Decoded 8-bit image, rows stored bottom-up.
///
/// Only RGB (3 channels) and RGBA (4 channels) images are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub pixels: Vec<u8>,
}

impl TextureData {
    /// Pixels expanded to RGBA, borrowing when already RGBA.
    pub fn to_rgba8(&self) -> std::borrow::Cow<'_, [u8]> {
        match self.channels {
            4 => std::borrow::Cow::Borrowed(&self.pixels),
            _ => std::borrow::Cow::Owned(
                self.pixels
                    .chunks_exact(3)
                    .flat_map(|p| [p[0], p[1], p[2], 255])
                    .collect(),
            ),
        }
    }
}

/// Reads and decodes an image file.
pub fn load_texture_data(path: impl AsRef<Path>) -> Result<TextureData, LoadError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| LoadError::io(path, e))?;
    let data = decode_texture_data(&bytes)?;
    log::debug!("loaded texture {} ({}x{}, {} channels)", path.display(), data.width, data.height, data.channels);
    Ok(data)
}

/// Decodes an in-memory image (format sniffed from the bytes) and flips it
/// so row 0 is the bottom of the picture.
pub fn decode_texture_data(bytes: &[u8]) -> Result<TextureData, LoadError> {
    let image = image::load_from_memory(bytes)?.flipv();
    let (width, height) = (image.width(), image.height());

    let (channels, pixels) = match image.color().channel_count() {
        3 => (3, image.into_rgb8().into_raw()),
        4 => (4, image.into_rgba8().into_raw()),
        n => return Err(LoadError::UnsupportedChannels(u16::from(n))),
    };

    Ok(TextureData { width, height, channels, pixels })
}

// ── background loader ─────────────────────────────────────────────────────

/// Worker threads used when none is requested.
pub const DEFAULT_LOADER_WORKERS: usize = 4;

type LoadResult = Result<TextureData, LoadError>;

struct Job {
    path: PathBuf,
    reply: Sender<LoadResult>,
}

/// Decodes image files on a fixed pool of worker threads.
///
/// Decoding happens off the render thread; the resulting [`TextureData`] is
/// then handed to [`Graphics::create_texture`](super::Graphics::create_texture)
/// on the render thread. Dropping the loader lets queued jobs finish and joins
/// the workers.
pub struct TextureLoader {
    jobs: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl TextureLoader {
    pub fn new(workers: usize) -> anyhow::Result<Self> {
        let (tx, rx) = crossbeam_channel::unbounded::<Job>();

        let handles = (0..workers.max(1))
            .map(|i| {
                let rx = rx.clone();
                thread::Builder::new()
                    .name(format!("texture-loader-{i}"))
                    .spawn(move || worker_loop(rx))
                    .context("failed to spawn texture loader thread")
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        log::debug!("texture loader started with {} workers", handles.len());
        Ok(Self { jobs: Some(tx), workers: handles })
    }

    /// Queues `path` for decoding. Never blocks.
    pub fn load_async(&self, path: impl Into<PathBuf>) -> PendingTexture {
        let path = path.into();
        let (reply, result) = crossbeam_channel::bounded(1);

        let queued = self
            .jobs
            .as_ref()
            .is_some_and(|jobs| jobs.send(Job { path: path.clone(), reply: reply.clone() }).is_ok());
        if !queued {
            let _ = reply.send(Err(LoadError::LoaderClosed));
        }

        PendingTexture { path, result, taken: false }
    }
}

impl Drop for TextureLoader {
    fn drop(&mut self) {
        self.jobs = None;
        for handle in self.workers.drain(..) {
            if let Err(e) = handle.join() {
                log::error!("texture loader thread panicked: {e:?}");
            }
        }
    }
}

fn worker_loop(jobs: Receiver<Job>) {
    while let Ok(Job { path, reply }) = jobs.recv() {
        let result = load_texture_data(&path);
        if let Err(e) = &result {
            log::warn!("failed to load texture {}: {e}", path.display());
        }
        // The requester may have dropped its handle.
        let _ = reply.send(result);
    }
}

/// Result slot of a [`TextureLoader::load_async`] request.
pub struct PendingTexture {
    path: PathBuf,
    result: Receiver<LoadResult>,
    taken: bool,
}

impl PendingTexture {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the result once it is ready, exactly once. Never blocks.
    pub fn try_take(&mut self) -> Option<LoadResult> {
        if self.taken {
            return None;
        }
        let out = match self.result.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(LoadError::LoaderClosed),
        };
        self.taken = true;
        Some(out)
    }

    /// Blocks until the result is ready. Not for the render thread.
    pub fn wait(self) -> LoadResult {
        if self.taken {
            return Err(LoadError::LoaderClosed);
        }
        self.result.recv().unwrap_or(Err(LoadError::LoaderClosed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png_bytes(img: impl Into<image::DynamicImage>) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        img.into().write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("lumen-{}-{name}", std::process::id()))
    }

    // ── decoding ──────────────────────────────────────────────────────────

    #[test]
    fn decode_flips_rows_bottom_up() {
        // Top row red, bottom row blue.
        let mut img = RgbaImage::new(1, 2);
        img.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        img.put_pixel(0, 1, Rgba([0, 0, 255, 255]));

        let data = decode_texture_data(&png_bytes(img)).unwrap();
        assert_eq!((data.width, data.height, data.channels), (1, 2, 4));
        assert_eq!(&data.pixels[0..4], &[0, 0, 255, 255]);
        assert_eq!(&data.pixels[4..8], &[255, 0, 0, 255]);
    }

    #[test]
    fn rgb_expands_to_opaque_rgba() {
        let img = RgbImage::from_pixel(2, 1, Rgb([10, 20, 30]));
        let data = decode_texture_data(&png_bytes(img)).unwrap();
        assert_eq!(data.channels, 3);
        assert_eq!(data.to_rgba8().as_ref(), &[10, 20, 30, 255, 10, 20, 30, 255]);
    }

    #[test]
    fn grayscale_is_rejected() {
        let img = GrayImage::new(2, 2);
        let err = decode_texture_data(&png_bytes(img)).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedChannels(1)));
    }

    #[test]
    fn garbage_is_an_image_error() {
        let err = decode_texture_data(b"definitely not an image").unwrap_err();
        assert!(matches!(err, LoadError::Image(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let path = temp_path("missing.png");
        match load_texture_data(&path) {
            Err(LoadError::Io { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected io error, got {other:?}"),
        }
    }

    // ── loader ────────────────────────────────────────────────────────────

    #[test]
    fn loader_decodes_off_thread() {
        let path = temp_path("loader.png");
        std::fs::write(&path, png_bytes(RgbaImage::from_pixel(3, 2, Rgba([1, 2, 3, 4])))).unwrap();

        let loader = TextureLoader::new(2).unwrap();
        let pending = loader.load_async(&path);
        assert_eq!(pending.path(), path.as_path());

        let data = pending.wait().unwrap();
        assert_eq!((data.width, data.height), (3, 2));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn try_take_yields_result_once() {
        let loader = TextureLoader::new(1).unwrap();
        let mut pending = loader.load_async(temp_path("nope.png"));

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        let result = loop {
            if let Some(r) = pending.try_take() {
                break r;
            }
            assert!(std::time::Instant::now() < deadline, "loader never answered");
            thread::yield_now();
        };
        assert!(matches!(result, Err(LoadError::Io { .. })));
        assert!(pending.try_take().is_none());
    }
}
