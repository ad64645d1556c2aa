//! Command-line argument parsing and layered configuration.

use std::path::PathBuf;

use clap::Parser;

use crate::error::ConfigError;
use crate::params::{
    AnalyserConfig, BandLayout, Preset, RecordingConfig, RenderConfig, SettingKey, Settings,
    SmoothingConfig,
};

/// Default playback volume
pub const DEFAULT_VOLUME: f32 = 1.0;

/// Command line arguments
#[derive(Parser, Debug, Default)]
#[command(name = "juliascope")]
#[command(about = "Audio-reactive kaleidoscopic Julia-set visualizer", long_about = None)]
pub struct Args {
    /// WAV file to load at startup
    #[arg(value_name = "AUDIO_FILE")]
    pub audio_file: Option<PathBuf>,

    /// TOML preset applied before the flags below
    #[arg(long, value_name = "FILE")]
    pub preset: Option<PathBuf>,

    #[arg(long, value_name = "N")]
    pub iterations: Option<f32>,

    #[arg(long, value_name = "Z")]
    pub zoom: Option<f32>,

    #[arg(long, value_name = "S")]
    pub speed: Option<f32>,

    #[arg(long, value_name = "A")]
    pub audio_reactivity: Option<f32>,

    #[arg(long, value_name = "K")]
    pub kaleidoscope_segments: Option<f32>,

    /// Playback volume in [0, 1]
    #[arg(long, value_name = "V")]
    pub volume: Option<f32>,

    /// Window width (logical pixels)
    #[arg(long, value_name = "PX")]
    pub width: Option<u32>,

    /// Window height (logical pixels)
    #[arg(long, value_name = "PX")]
    pub height: Option<u32>,

    /// Start in borderless fullscreen
    #[arg(long)]
    pub fullscreen: bool,

    /// Fraction of the gap to target closed per frame
    #[arg(long, value_name = "R")]
    pub smoothing_rate: Option<f32>,

    /// Gap under which a setting snaps to its target (0 disables)
    #[arg(long, value_name = "E")]
    pub snap_epsilon: Option<f32>,

    /// Record frames to recording/frames for the given duration, then exit
    #[arg(long, value_name = "SECONDS")]
    pub record: Option<f32>,

    /// Log filter (overrides RUST_LOG), e.g. "debug" or "juliascope=trace"
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

/// Fully resolved startup configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub settings: Settings,
    pub smoothing: SmoothingConfig,
    pub analyser: AnalyserConfig,
    pub bands: BandLayout,
    pub render: RenderConfig,
    pub volume: f32,
    pub audio_file: Option<PathBuf>,
    pub recording: Option<RecordingConfig>,
}

impl Args {
    fn setting_overrides(&self) -> [(SettingKey, Option<f32>); 5] {
        [
            (SettingKey::Iterations, self.iterations),
            (SettingKey::Zoom, self.zoom),
            (SettingKey::Speed, self.speed),
            (SettingKey::AudioReactivity, self.audio_reactivity),
            (SettingKey::KaleidoscopeSegments, self.kaleidoscope_segments),
        ]
    }

    /// Resolve defaults, then the preset file, then flags
    pub fn resolve(&self) -> Result<AppConfig, ConfigError> {
        let preset = match &self.preset {
            Some(path) => Preset::load(path)?,
            None => Preset::default(),
        };
        self.resolve_with(preset)
    }

    /// Resolve against an already loaded preset
    pub fn resolve_with(&self, preset: Preset) -> Result<AppConfig, ConfigError> {
        let mut settings = preset.settings.unwrap_or_default();
        for (key, value) in self.setting_overrides() {
            if let Some(value) = value {
                settings.set(key, value);
            }
        }
        settings.validate()?;

        let mut smoothing = SmoothingConfig::default();
        preset.apply_smoothing(&mut smoothing);
        if let Some(rate) = self.smoothing_rate {
            smoothing.rate = rate;
        }
        if let Some(eps) = self.snap_epsilon {
            smoothing.snap_epsilon = eps;
        }
        smoothing.validate()?;

        let volume = self.volume.or(preset.volume).unwrap_or(DEFAULT_VOLUME);
        if !(0.0..=1.0).contains(&volume) {
            return Err(ConfigError::Invalid(format!(
                "volume must be within [0, 1], got {}",
                volume
            )));
        }

        let mut render = RenderConfig::default();
        if let Some(width) = self.width {
            render.window_width = width;
        }
        if let Some(height) = self.height {
            render.window_height = height;
        }
        render.fullscreen = self.fullscreen;
        if render.window_width == 0 || render.window_height == 0 {
            return Err(ConfigError::Invalid("window size must be non-zero".into()));
        }

        let recording = match self.record {
            Some(secs) if !(secs.is_finite() && secs > 0.0) => {
                return Err(ConfigError::Invalid(format!(
                    "recording duration must be positive, got {}",
                    secs
                )))
            }
            Some(secs) => Some(RecordingConfig::new(secs)),
            None => None,
        };

        let analyser = AnalyserConfig::default();
        analyser.validate()?;

        Ok(AppConfig {
            settings,
            smoothing,
            analyser,
            bands: BandLayout::default(),
            render,
            volume,
            audio_file: self.audio_file.clone(),
            recording,
        })
    }
}
