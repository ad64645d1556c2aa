//! Window, smoothing and recording configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// Rendering configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Initial window width (logical pixels)
    pub window_width: u32,

    /// Initial window height (logical pixels)
    pub window_height: u32,

    /// Start in borderless fullscreen
    pub fullscreen: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            window_width: 1280,
            window_height: 720,
            fullscreen: false,
        }
    }
}

/// Parameter smoothing configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingConfig {
    /// Fraction of the remaining gap closed per tick, in (0, 1]
    pub rate: f32,

    /// Gap under which current snaps to target (0 disables snapping)
    pub snap_epsilon: f32,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            rate: 0.05,
            snap_epsilon: 1e-4,
        }
    }
}

impl SmoothingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.rate > 0.0 && self.rate <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "smoothing rate must be within (0, 1], got {}",
                self.rate
            )));
        }
        if !(self.snap_epsilon >= 0.0 && self.snap_epsilon.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "snap epsilon must be a finite value >= 0, got {}",
                self.snap_epsilon
            )));
        }
        Ok(())
    }
}

/// Recording mode configuration
#[derive(Debug, Clone)]
pub struct RecordingConfig {
    /// Duration to record (seconds)
    pub duration_secs: f32,

    /// Output directory for frames
    pub output_dir: PathBuf,

    /// Frame rate (FPS)
    pub fps: u32,
}

impl RecordingConfig {
    pub fn new(duration_secs: f32) -> Self {
        Self {
            duration_secs,
            output_dir: PathBuf::from("recording"),
            fps: 60,
        }
    }

    /// Total number of frames to capture
    pub fn total_frames(&self) -> u64 {
        (self.duration_secs * self.fps as f32).ceil().max(0.0) as u64
    }

    /// Fixed time step between captured frames
    pub fn frame_step(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps.max(1) as f64)
    }

    /// Frame directory path
    pub fn frames_dir(&self) -> PathBuf {
        self.output_dir.join("frames")
    }

    /// Path of a single captured frame
    pub fn frame_path(&self, frame: u64) -> PathBuf {
        self.frames_dir().join(format!("frame_{:05}.png", frame))
    }
}
