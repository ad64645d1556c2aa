//! Parameter definitions with units and documented semantics.
//!
//! All magic numbers are extracted here with:
//! - Units (pixels, seconds, decibels, bins)
//! - Documented ranges and meanings
//! - Validation where a bad value would break the pipeline

mod audio;
mod preset;
mod render;
mod settings;

// Re-export all types
pub use audio::{AnalyserConfig, BandLayout, MIN_FREQUENCY_BINS};
pub use preset::Preset;
pub use render::{RecordingConfig, RenderConfig, SmoothingConfig};
pub use settings::{SettingKey, Settings, SliderRange};
