use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use hound::WavReader;

use crate::error::LoadError;

use super::clip::{check_spec, read_samples};

/// Seconds of audio decoded per chunk.
pub const CHUNK_SECONDS: u32 = 5;

/// A WAV file decoded a chunk at a time, for sounds too long to hold in
/// memory at once.
pub struct StreamedAudioSource<R = BufReader<File>> {
    reader: WavReader<R>,
    channels: u16,
    sample_rate: u32,
    chunk_samples: usize,
    done: bool,
}

impl StreamedAudioSource<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| LoadError::io(path, e))?;
        let source = Self::from_reader(BufReader::new(file))?;
        log::debug!("opened stream {} ({} ch, {} Hz)", path.display(), source.channels, source.sample_rate);
        Ok(source)
    }
}

impl<R: Read + Seek> StreamedAudioSource<R> {
    pub fn from_reader(reader: R) -> Result<Self, LoadError> {
        let reader = WavReader::new(reader)?;
        let spec = check_spec(&reader)?;
        let chunk_samples = (CHUNK_SECONDS as usize) * (spec.sample_rate as usize) * usize::from(spec.channels);
        Ok(Self {
            reader,
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            chunk_samples: chunk_samples.max(usize::from(spec.channels)),
            done: false,
        })
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Total length in sample frames.
    pub fn frames(&self) -> u32 {
        self.reader.duration()
    }

    /// Decodes the next chunk; `None` once the file is exhausted.
    pub fn next_chunk(&mut self) -> Result<Option<Vec<f32>>, LoadError> {
        if self.done {
            return Ok(None);
        }
        let chunk = read_samples(&mut self.reader, self.chunk_samples)?;
        if chunk.len() < self.chunk_samples {
            self.done = true;
        }
        if chunk.is_empty() {
            return Ok(None);
        }
        Ok(Some(chunk))
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Rewinds to the first sample.
    pub fn reset(&mut self) -> Result<(), LoadError> {
        self.reader.seek(0).map_err(|e| LoadError::Wav(hound::Error::IoError(e)))?;
        self.done = false;
        Ok(())
    }
}
