//! WAV decoding into interleaved f32 tracks.

use std::io::Read;
use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavReader};

use crate::error::AudioError;

/// A fully decoded audio file
#[derive(Debug, Clone)]
pub struct Track {
    /// Display name (file name)
    pub name: String,

    /// Interleaved samples in [-1, 1]
    pub samples: Vec<f32>,

    pub channels: usize,

    pub sample_rate: u32,
}

impl Track {
    /// Decode a WAV file from disk
    pub fn open(path: &Path) -> Result<Self, AudioError> {
        let decode_err = |source| AudioError::Decode {
            path: path.to_path_buf(),
            source,
        };
        let reader = WavReader::open(path).map_err(decode_err)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::from_reader(name, reader).map_err(|e| match e {
            AudioError::Decode { source, .. } => decode_err(source),
            other => other,
        })
    }

    /// Decode from an already-open WAV reader
    pub fn from_reader<R: Read>(name: String, reader: WavReader<R>) -> Result<Self, AudioError> {
        let spec = reader.spec();
        if spec.channels == 0 {
            return Err(AudioError::Unsupported("zero channels".to_string()));
        }

        let samples = match spec.sample_format {
            SampleFormat::Float => reader
                .into_samples::<f32>()
                .collect::<Result<Vec<_>, _>>(),
            SampleFormat::Int => {
                if spec.bits_per_sample == 0 || spec.bits_per_sample > 32 {
                    return Err(AudioError::Unsupported(format!(
                        "{}-bit integer samples",
                        spec.bits_per_sample
                    )));
                }
                let scale = 1.0 / (1u64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|v| v as f32 * scale))
                    .collect::<Result<Vec<_>, _>>()
            }
        }
        .map_err(|source| AudioError::Decode {
            path: PathBuf::from(&name),
            source,
        })?;

        let channels = spec.channels as usize;
        if samples.len() < channels {
            return Err(AudioError::EmptyTrack);
        }

        Ok(Self {
            name,
            samples,
            channels,
            sample_rate: spec.sample_rate,
        })
    }

    /// Number of sample frames (one sample per channel)
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels
    }

    pub fn duration_secs(&self) -> f32 {
        self.frames() as f32 / self.sample_rate as f32
    }

    /// Sample of `channel` at integer `frame`
    pub fn sample(&self, frame: usize, channel: usize) -> f32 {
        let channel = channel.min(self.channels - 1);
        self.samples
            .get(frame * self.channels + channel)
            .copied()
            .unwrap_or(0.0)
    }
}
