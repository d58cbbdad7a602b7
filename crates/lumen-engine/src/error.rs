//! Error types shared across the engine.
//!
//! Three families, matching how each failure is surfaced:
//! - [`LoadError`] is returned by resource loaders and never aborts the frame loop.
//! - [`InvalidArgument`] is returned synchronously at the call boundary.
//! - [`AudioError`] is returned when the audio device cannot be opened or driven.

use std::path::PathBuf;

/// A resource (texture, font, audio) could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode image: {0}")]
    Image(#[from] image::ImageError),

    #[error("failed to decode wav data: {0}")]
    Wav(#[from] hound::Error),

    #[error("failed to parse font: {0}")]
    Font(String),

    #[error("unsupported number of channels: {0}")]
    UnsupportedChannels(u16),

    #[error("texture loader has shut down")]
    LoaderClosed,

    #[error(transparent)]
    Invalid(#[from] InvalidArgument),
}

impl LoadError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LoadError::Io { path: path.into(), source }
    }
}

/// An argument was rejected at the API boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid argument `{name}`: {reason}")]
pub struct InvalidArgument {
    pub name: &'static str,
    pub reason: String,
}

impl InvalidArgument {
    pub(crate) fn new(name: &'static str, reason: impl Into<String>) -> Self {
        Self { name, reason: reason.into() }
    }
}

/// The audio device could not be opened or the output stream failed.
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("no default audio output device available")]
    NoOutputDevice,

    #[error("audio device error: {0}")]
    Device(String),

    #[error("unsupported output sample format: {0}")]
    UnsupportedSampleFormat(String),
}
