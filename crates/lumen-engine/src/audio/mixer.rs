//! Software mixing of playing voices into the device buffer.
//!
//! The mixer runs on the audio callback thread. New voices reach it over a
//! channel; it never locks and never blocks.

use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender, TryRecvError};

use super::clip::AudioClip;

enum Samples {
    Clip(Arc<[f32]>),
    /// Chunks arrive from a decode worker.
    Stream { queue: Receiver<Vec<f32>>, chunk: Vec<f32> },
}

/// One playing sound.
pub(crate) struct Voice {
    samples: Samples,
    channels: usize,
    sample_rate: u32,
    /// Position in source frames within the current buffer.
    cursor: f64,
}

impl Voice {
    pub(crate) fn clip(clip: &AudioClip) -> Self {
        Self {
            samples: Samples::Clip(clip.shared_samples()),
            channels: usize::from(clip.channels()),
            sample_rate: clip.sample_rate(),
            cursor: 0.0,
        }
    }

    pub(crate) fn stream(channels: u16, sample_rate: u32, queue: Receiver<Vec<f32>>) -> Self {
        Self {
            samples: Samples::Stream { queue, chunk: Vec::new() },
            channels: usize::from(channels),
            sample_rate,
            cursor: 0.0,
        }
    }

    fn buffer(&self) -> &[f32] {
        match &self.samples {
            Samples::Clip(s) => s,
            Samples::Stream { chunk, .. } => chunk,
        }
    }

    /// Next frame as (left, right), advancing by `step` source frames.
    ///
    /// A stream whose next chunk is not decoded yet yields silence without
    /// advancing. Returns `None` once the voice has finished.
    fn next_frame(&mut self, step: f64) -> Option<[f32; 2]> {
        loop {
            let buffer = self.buffer();
            let frames = buffer.len() / self.channels;
            let index = self.cursor as usize;

            if index < frames {
                let at = index * self.channels;
                let frame = if self.channels == 1 {
                    [buffer[at], buffer[at]]
                } else {
                    [buffer[at], buffer[at + 1]]
                };
                self.cursor += step;
                return Some(frame);
            }

            match &mut self.samples {
                Samples::Clip(_) => return None,
                Samples::Stream { queue, chunk } => match queue.try_recv() {
                    Ok(next) => {
                        self.cursor = (self.cursor - frames as f64).max(0.0);
                        *chunk = next;
                    }
                    Err(TryRecvError::Empty) => return Some([0.0, 0.0]),
                    Err(TryRecvError::Disconnected) => return None,
                },
            }
        }
    }
}

/// Sends voices to a [`Mixer`]. Cheap to clone.
#[derive(Clone)]
pub(crate) struct MixerHandle {
    voices: Sender<Voice>,
}

impl MixerHandle {
    /// Queues a voice. Returns `false` if the mixer is gone.
    pub(crate) fn add(&self, voice: Voice) -> bool {
        self.voices.send(voice).is_ok()
    }
}

/// Mixes active voices into an interleaved output buffer.
pub struct Mixer {
    voices: Vec<Voice>,
    incoming: Receiver<Voice>,
    channels: usize,
    sample_rate: u32,
}

impl Mixer {
    pub(crate) fn new(channels: u16, sample_rate: u32) -> (MixerHandle, Mixer) {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mixer = Mixer {
            voices: Vec::new(),
            incoming: rx,
            channels: usize::from(channels.max(1)),
            sample_rate: sample_rate.max(1),
        };
        (MixerHandle { voices: tx }, mixer)
    }

    pub fn channels(&self) -> u16 {
        self.channels as u16
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Voices currently playing.
    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    /// Overwrites `out` with the sum of all voices, clamped to [-1, 1].
    ///
    /// Mono output averages both sides; outputs with more than two channels
    /// carry the sound on the first two.
    pub fn mix(&mut self, out: &mut [f32]) {
        self.voices.extend(self.incoming.try_iter());
        out.fill(0.0);

        let channels = self.channels;
        let out_rate = f64::from(self.sample_rate);

        self.voices.retain_mut(|voice| {
            let step = f64::from(voice.sample_rate) / out_rate;
            for frame in out.chunks_exact_mut(channels) {
                let Some([l, r]) = voice.next_frame(step) else {
                    return false;
                };
                if channels == 1 {
                    frame[0] += (l + r) * 0.5;
                } else {
                    frame[0] += l;
                    frame[1] += r;
                }
            }
            true
        });

        for s in out.iter_mut() {
            *s = s.clamp(-1.0, 1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(channels: u16, rate: u32, samples: &[f32]) -> AudioClip {
        AudioClip::from_samples(channels, rate, samples.to_vec()).unwrap()
    }

    // ── channel adaptation ────────────────────────────────────────────────

    #[test]
    fn mono_source_fills_both_stereo_sides() {
        let (handle, mut mixer) = Mixer::new(2, 100);
        handle.add(Voice::clip(&clip(1, 100, &[0.25, 0.5])));

        let mut out = [9.0; 4];
        mixer.mix(&mut out);
        assert_eq!(out, [0.25, 0.25, 0.5, 0.5]);
    }

    #[test]
    fn stereo_source_is_averaged_into_mono() {
        let (handle, mut mixer) = Mixer::new(1, 100);
        handle.add(Voice::clip(&clip(2, 100, &[0.2, 0.4, -1.0, 0.0])));

        let mut out = [0.0; 2];
        mixer.mix(&mut out);
        assert!((out[0] - 0.3).abs() < 1e-6);
        assert!((out[1] + 0.5).abs() < 1e-6);
    }

    #[test]
    fn extra_output_channels_stay_silent() {
        let (handle, mut mixer) = Mixer::new(4, 100);
        handle.add(Voice::clip(&clip(2, 100, &[0.1, 0.2])));

        let mut out = [1.0; 4];
        mixer.mix(&mut out);
        assert_eq!(out, [0.1, 0.2, 0.0, 0.0]);
    }

    // ── resampling and lifetime ───────────────────────────────────────────

    #[test]
    fn half_rate_source_repeats_each_sample() {
        let (handle, mut mixer) = Mixer::new(1, 200);
        handle.add(Voice::clip(&clip(1, 100, &[0.1, 0.2])));

        let mut out = [0.0; 5];
        mixer.mix(&mut out);
        assert_eq!(out, [0.1, 0.1, 0.2, 0.2, 0.0]);
        assert_eq!(mixer.active_voices(), 0);
    }

    #[test]
    fn double_rate_source_skips_samples() {
        let (handle, mut mixer) = Mixer::new(1, 100);
        handle.add(Voice::clip(&clip(1, 200, &[0.1, 0.2, 0.3, 0.4])));

        let mut out = [0.0; 2];
        mixer.mix(&mut out);
        assert_eq!(out, [0.1, 0.3]);
    }

    #[test]
    fn voices_sum_and_clamp() {
        let (handle, mut mixer) = Mixer::new(1, 100);
        handle.add(Voice::clip(&clip(1, 100, &[0.75, 0.25])));
        handle.add(Voice::clip(&clip(1, 100, &[0.75, 0.25])));

        let mut out = [0.0; 2];
        mixer.mix(&mut out);
        assert_eq!(out, [1.0, 0.5]);
    }

    #[test]
    fn finished_voices_are_dropped() {
        let (handle, mut mixer) = Mixer::new(1, 100);
        handle.add(Voice::clip(&clip(1, 100, &[0.5; 4])));

        let mut out = [0.0; 4];
        mixer.mix(&mut out);
        assert_eq!(mixer.active_voices(), 1);
        mixer.mix(&mut out);
        assert_eq!(mixer.active_voices(), 0);
        assert_eq!(out, [0.0; 4]);
    }

    // ── streams ───────────────────────────────────────────────────────────

    #[test]
    fn stream_plays_chunks_in_order_across_buffers() {
        let (handle, mut mixer) = Mixer::new(1, 100);
        let (tx, rx) = crossbeam_channel::bounded(2);
        tx.send(vec![0.1, 0.2, 0.3]).unwrap();
        tx.send(vec![0.4]).unwrap();
        handle.add(Voice::stream(1, 100, rx));

        let mut out = [0.0; 2];
        mixer.mix(&mut out);
        assert_eq!(out, [0.1, 0.2]);
        mixer.mix(&mut out);
        assert_eq!(out, [0.3, 0.4]);
    }

    #[test]
    fn starved_stream_is_silent_then_resumes() {
        let (handle, mut mixer) = Mixer::new(1, 100);
        let (tx, rx) = crossbeam_channel::bounded(2);
        handle.add(Voice::stream(1, 100, rx));

        let mut out = [1.0; 2];
        mixer.mix(&mut out);
        assert_eq!(out, [0.0, 0.0]);
        assert_eq!(mixer.active_voices(), 1);

        tx.send(vec![0.5, 0.5]).unwrap();
        mixer.mix(&mut out);
        assert_eq!(out, [0.5, 0.5]);

        drop(tx);
        mixer.mix(&mut out);
        assert_eq!(mixer.active_voices(), 0);
    }
}
