//! Audio playback and spectrum analysis.
//!
//! Decodes a WAV file, plays it through cpal, and reduces the analyser's
//! byte spectrum into bass/mid/high energies for audio-reactive visuals.

mod analyser;
mod bands;
mod decoder;
mod playback;
mod system;

use std::path::Path;

use crate::error::AudioError;

// Re-export public types
pub use analyser::{blackman_window, SampleTap, SpectrumAnalyser};
pub use bands::{extract, extract_with, BandEnergies};
pub use decoder::Track;
pub use playback::Playback;
pub use system::AudioSystem;

/// Snapshot of the playback controls
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackStatus {
    pub playing: bool,
    pub volume: f32,
    /// Name of the loaded track, if any
    pub track: Option<String>,
    /// Output not yet started by user interaction
    pub suspended: bool,
}

/// A playable source exposing a frequency snapshot and playback controls
pub trait AudioSource {
    /// Fill `out` with the current byte spectrum.
    /// Returns `false` (and zeroes `out`) when no audio is attached.
    fn frequency_data(&mut self, out: &mut [u8]) -> bool;

    /// Resume output if suspended, then flip play/pause. Returns the new state.
    fn toggle_play_pause(&mut self) -> Result<bool, AudioError>;

    /// Set output volume (clamped to [0, 1])
    fn set_volume(&mut self, volume: f32);

    /// Replace the current source with a file, returning its display name
    fn load_file(&mut self, path: &Path) -> Result<String, AudioError>;

    fn status(&self) -> PlaybackStatus;
}
