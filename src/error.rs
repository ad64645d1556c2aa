//! Error types shared across the crate.

use std::path::PathBuf;

use thiserror::Error;

/// Preset and parameter validation failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid preset: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Audio device, stream and decode failures
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no audio output device found")]
    NoOutputDevice,

    #[error("failed to get audio config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("failed to build audio stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start audio stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    #[error("audio stream has no samples")]
    EmptyTrack,

    #[error("unsupported audio layout: {0}")]
    Unsupported(String),
}

/// Per-frame rendering failures
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to acquire surface texture: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    #[error("failed to save frame {frame}: {source}")]
    Capture {
        frame: u64,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to map capture buffer: {0}")]
    Map(#[from] wgpu::BufferAsyncError),

    #[error("capture buffer mapping was abandoned before completing")]
    MapAbandoned,
}

/// Startup failures of the visualizer
#[derive(Debug, Error)]
pub enum VisualizerError {
    /// The required rendering capability is missing
    #[error("GPU rendering is not supported on this system")]
    NoAdapter,

    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("failed to request device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface is not supported by the selected adapter")]
    IncompatibleSurface,
}
