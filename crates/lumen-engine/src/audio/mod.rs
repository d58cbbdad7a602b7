//! Sound playback.
//!
//! WAV files are decoded with `hound`, mixed in software and played through
//! the default `cpal` output device.

mod clip;
mod mixer;
mod player;
mod stream;

pub use clip::AudioClip;
pub use mixer::Mixer;
pub use player::AudioPlayer;
pub use stream::{CHUNK_SECONDS, StreamedAudioSource};
