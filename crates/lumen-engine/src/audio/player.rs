use std::io::{Read, Seek};
use std::thread;

use anyhow::Context;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::error::AudioError;

use super::clip::AudioClip;
use super::mixer::{Mixer, MixerHandle, Voice};
use super::stream::StreamedAudioSource;

/// Chunks decoded ahead of playback per stream.
const STREAM_QUEUE_DEPTH: usize = 2;

/// Plays sounds on the default output device.
///
/// Dropping the player stops the output stream and every playing sound.
pub struct AudioPlayer {
    mixer: MixerHandle,
    channels: u16,
    sample_rate: u32,
    _stream: cpal::Stream,
}

impl AudioPlayer {
    /// Opens the default output device in its default configuration.
    pub fn new() -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioError::NoOutputDevice)?;
        let config = device
            .default_output_config()
            .map_err(|e| AudioError::Device(e.to_string()))?;

        let format = config.sample_format();
        if format != cpal::SampleFormat::F32 {
            return Err(AudioError::UnsupportedSampleFormat(format.to_string()));
        }

        let channels = config.channels();
        let sample_rate = config.sample_rate();
        let (handle, mut mixer) = Mixer::new(channels, sample_rate);

        let stream = device
            .build_output_stream(
                &config.into(),
                move |out: &mut [f32], _: &cpal::OutputCallbackInfo| mixer.mix(out),
                |err| log::error!("audio stream error: {err}"),
                None,
            )
            .map_err(|e| AudioError::Device(e.to_string()))?;
        stream.play().map_err(|e| AudioError::Device(e.to_string()))?;

        log::info!("audio output opened: {channels} ch at {sample_rate} Hz");
        Ok(Self { mixer: handle, channels, sample_rate, _stream: stream })
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Starts playing `clip`. Several clips, and the same clip several times,
    /// may play at once.
    pub fn play(&self, clip: &AudioClip) {
        if !self.mixer.add(Voice::clip(clip)) {
            log::warn!("audio output closed; clip dropped");
        }
    }

    /// Starts playing `source` while a worker thread decodes it ahead of
    /// playback. The render thread is never blocked.
    pub fn play_streamed<R>(&self, mut source: StreamedAudioSource<R>) -> anyhow::Result<()>
    where
        R: Read + Seek + Send + 'static,
    {
        let (tx, rx) = crossbeam_channel::bounded(STREAM_QUEUE_DEPTH);
        let voice = Voice::stream(source.channels(), source.sample_rate(), rx);

        thread::Builder::new()
            .name("audio-stream".into())
            .spawn(move || {
                loop {
                    match source.next_chunk() {
                        Ok(Some(chunk)) => {
                            // Blocks this worker only; fails once the voice is gone.
                            if tx.send(chunk).is_err() {
                                break;
                            }
                        }
                        Ok(None) => break,
                        Err(e) => {
                            log::warn!("audio stream decode failed: {e}");
                            break;
                        }
                    }
                }
                log::debug!("audio stream worker finished");
            })
            .context("failed to spawn audio stream worker")?;

        if !self.mixer.add(voice) {
            log::warn!("audio output closed; stream dropped");
        }
        Ok(())
    }
}
