use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use hound::{SampleFormat, WavReader};

use crate::error::{InvalidArgument, LoadError};

/// A fully decoded sound, shared cheaply between voices.
///
/// Samples are interleaved `f32` in [-1, 1]. Only mono and stereo are
/// supported.
#[derive(Debug, Clone)]
pub struct AudioClip {
    samples: Arc<[f32]>,
    channels: u16,
    sample_rate: u32,
}

impl AudioClip {
    /// Reads and decodes a WAV file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| LoadError::io(path, e))?;
        let clip = Self::decode(WavReader::new(BufReader::new(file))?)?;
        log::debug!(
            "loaded clip {} ({} ch, {} Hz, {:.2}s)",
            path.display(),
            clip.channels,
            clip.sample_rate,
            clip.duration().as_secs_f32()
        );
        Ok(clip)
    }

    /// Decodes an in-memory WAV file.
    pub fn from_wav_bytes(bytes: &[u8]) -> Result<Self, LoadError> {
        Self::decode(WavReader::new(bytes)?)
    }

    /// Wraps already-decoded interleaved samples.
    pub fn from_samples(channels: u16, sample_rate: u32, samples: Vec<f32>) -> Result<Self, InvalidArgument> {
        if !matches!(channels, 1 | 2) {
            return Err(InvalidArgument::new("channels", format!("{channels} is not mono or stereo")));
        }
        if sample_rate == 0 {
            return Err(InvalidArgument::new("sample_rate", "must be positive"));
        }
        if samples.len() % usize::from(channels) != 0 {
            return Err(InvalidArgument::new(
                "samples",
                format!("{} samples do not divide into {channels} channels", samples.len()),
            ));
        }
        Ok(Self { samples: samples.into(), channels, sample_rate })
    }

    fn decode<R: Read>(mut reader: WavReader<R>) -> Result<Self, LoadError> {
        let spec = check_spec(&reader)?;
        let samples = read_samples(&mut reader, usize::MAX)?;
        Ok(Self { samples: samples.into(), channels: spec.channels, sample_rate: spec.sample_rate })
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of sample frames (one sample per channel).
    pub fn frames(&self) -> usize {
        self.samples.len() / usize::from(self.channels)
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.frames() as f64 / f64::from(self.sample_rate))
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub(crate) fn shared_samples(&self) -> Arc<[f32]> {
        self.samples.clone()
    }
}

/// Rejects anything but mono and stereo, and headers declaring 0 Hz.
pub(crate) fn check_spec<R: Read>(reader: &WavReader<R>) -> Result<hound::WavSpec, LoadError> {
    let spec = reader.spec();
    if !matches!(spec.channels, 1 | 2) {
        return Err(LoadError::UnsupportedChannels(spec.channels));
    }
    if spec.sample_rate == 0 {
        return Err(InvalidArgument::new("sample_rate", "WAV header declares 0 Hz").into());
    }
    Ok(spec)
}

/// Reads up to `limit` samples from the reader's current position,
/// normalized to [-1, 1].
pub(crate) fn read_samples<R: Read>(reader: &mut WavReader<R>, limit: usize) -> Result<Vec<f32>, hound::Error> {
    let spec = reader.spec();
    match spec.sample_format {
        SampleFormat::Float => reader.samples::<f32>().take(limit).collect(),
        SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .take(limit)
                .map(|s| s.map(|v| v as f32 / scale))
                .collect()
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use hound::{WavSpec, WavWriter};
    use std::io::Cursor;

    /// 16-bit PCM WAV holding `samples`.
    pub(crate) fn wav_bytes(channels: u16, sample_rate: u32, samples: &[i16]) -> Vec<u8> {
        let spec = WavSpec { channels, sample_rate, bits_per_sample: 16, sample_format: SampleFormat::Int };
        let mut cursor = Cursor::new(Vec::new());
        let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
        cursor.into_inner()
    }

    /// `wav_bytes` with the header's sample rate and byte rate zeroed.
    pub(crate) fn zero_rate_wav_bytes(samples: &[i16]) -> Vec<u8> {
        let mut bytes = wav_bytes(1, 8000, samples);
        bytes[24..32].fill(0);
        bytes
    }

    #[test]
    fn decodes_pcm16_to_unit_range() {
        let clip = AudioClip::from_wav_bytes(&wav_bytes(1, 8000, &[0, 16384, -32768])).unwrap();
        assert_eq!(clip.channels(), 1);
        assert_eq!(clip.sample_rate(), 8000);
        assert_eq!(clip.samples(), &[0.0, 0.5, -1.0]);
    }

    #[test]
    fn stereo_frames_and_duration() {
        let clip = AudioClip::from_wav_bytes(&wav_bytes(2, 4, &[0; 16])).unwrap();
        assert_eq!(clip.frames(), 8);
        assert_eq!(clip.duration(), Duration::from_secs(2));
    }

    #[test]
    fn more_than_two_channels_is_rejected() {
        let err = AudioClip::from_wav_bytes(&wav_bytes(3, 8000, &[0; 6])).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedChannels(3)));
    }

    #[test]
    fn garbage_is_a_wav_error() {
        let err = AudioClip::from_wav_bytes(b"RIFF nope").unwrap_err();
        assert!(matches!(err, LoadError::Wav(_)));
    }

    #[test]
    fn from_samples_validates_layout() {
        assert!(AudioClip::from_samples(2, 44100, vec![0.0; 3]).is_err());
        assert!(AudioClip::from_samples(0, 44100, vec![]).is_err());
        assert!(AudioClip::from_samples(1, 0, vec![0.0]).is_err());
        assert_eq!(AudioClip::from_samples(2, 44100, vec![0.0; 4]).unwrap().frames(), 2);
    }

    #[test]
    fn zero_sample_rate_header_is_rejected() {
        let err = AudioClip::from_wav_bytes(&zero_rate_wav_bytes(&[0, 1, 2, 3])).unwrap_err();
        assert!(matches!(err, LoadError::Invalid(ref e) if e.name == "sample_rate"), "{err:?}");
    }
}
