//! Tunable visual settings and their slider ranges.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// The five user-tunable fractal parameters.
///
/// Two instances live side by side at runtime: the raw *target* written by input
/// handlers and the smoothed *current* read by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Maximum escape-time iterations per Julia evaluation
    pub iterations: f32,

    /// Zoom factor (higher = closer)
    pub zoom: f32,

    /// Time-scale multiplier applied to elapsed seconds
    pub speed: f32,

    /// Gain on the audio-driven color shifts
    pub audio_reactivity: f32,

    /// Mirror-symmetry fold count
    pub kaleidoscope_segments: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            iterations: 200.0,
            zoom: 1.0,
            speed: 1.0,
            audio_reactivity: 1.0,
            kaleidoscope_segments: 6.0,
        }
    }
}

impl Settings {
    pub fn get(&self, key: SettingKey) -> f32 {
        match key {
            SettingKey::Iterations => self.iterations,
            SettingKey::Zoom => self.zoom,
            SettingKey::Speed => self.speed,
            SettingKey::AudioReactivity => self.audio_reactivity,
            SettingKey::KaleidoscopeSegments => self.kaleidoscope_segments,
        }
    }

    pub fn get_mut(&mut self, key: SettingKey) -> &mut f32 {
        match key {
            SettingKey::Iterations => &mut self.iterations,
            SettingKey::Zoom => &mut self.zoom,
            SettingKey::Speed => &mut self.speed,
            SettingKey::AudioReactivity => &mut self.audio_reactivity,
            SettingKey::KaleidoscopeSegments => &mut self.kaleidoscope_segments,
        }
    }

    pub fn set(&mut self, key: SettingKey, value: f32) {
        *self.get_mut(key) = value;
    }

    /// Iterate `(key, value)` pairs in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (SettingKey, f32)> + '_ {
        SettingKey::ALL.iter().map(move |&key| (key, self.get(key)))
    }

    /// First key holding a NaN or infinite value, if any
    pub fn first_non_finite(&self) -> Option<SettingKey> {
        self.iter()
            .find(|(_, value)| !value.is_finite())
            .map(|(key, _)| key)
    }

    /// Reject values the sliders could never produce.
    ///
    /// Zero segments or zero iterations divide by zero in the shader.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(key) = self.first_non_finite() {
            return Err(ConfigError::Invalid(format!("setting '{}' is not finite", key)));
        }
        for (key, value) in self.iter() {
            let range = key.slider();
            if !range.contains(value) {
                return Err(ConfigError::Invalid(format!(
                    "setting '{}' must be within [{}, {}], got {}",
                    key, range.min, range.max, value
                )));
            }
        }
        Ok(())
    }
}

/// Name of a single setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    Iterations,
    Zoom,
    Speed,
    AudioReactivity,
    KaleidoscopeSegments,
}

impl SettingKey {
    pub const ALL: [SettingKey; 5] = [
        SettingKey::Iterations,
        SettingKey::Zoom,
        SettingKey::Speed,
        SettingKey::AudioReactivity,
        SettingKey::KaleidoscopeSegments,
    ];

    /// Canonical (camelCase) name, as used by presets and the panel
    pub fn name(self) -> &'static str {
        match self {
            SettingKey::Iterations => "iterations",
            SettingKey::Zoom => "zoom",
            SettingKey::Speed => "speed",
            SettingKey::AudioReactivity => "audioReactivity",
            SettingKey::KaleidoscopeSegments => "kaleidoscopeSegments",
        }
    }

    /// Slider range backing this setting's input control
    pub fn slider(self) -> SliderRange {
        match self {
            SettingKey::Iterations => SliderRange::new(50.0, 500.0, 10.0),
            SettingKey::Zoom => SliderRange::new(0.1, 5.0, 0.1),
            SettingKey::Speed => SliderRange::new(0.0, 5.0, 0.1),
            SettingKey::AudioReactivity => SliderRange::new(0.0, 5.0, 0.1),
            SettingKey::KaleidoscopeSegments => SliderRange::new(1.0, 16.0, 1.0),
        }
    }

    /// Next key in panel order, wrapping around
    pub fn next(self) -> Self {
        let idx = self.index();
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Previous key in panel order, wrapping around
    pub fn prev(self) -> Self {
        let idx = self.index();
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|&k| k == self).unwrap_or(0)
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SettingKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        SettingKey::ALL
            .into_iter()
            .find(|key| {
                key.name().eq_ignore_ascii_case(wanted)
                    || key.name().eq_ignore_ascii_case(&wanted.replace(['-', '_'], ""))
            })
            .ok_or_else(|| format!("unknown setting '{}'", s))
    }
}

/// Min/max/step of a slider control
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderRange {
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl SliderRange {
    pub const fn new(min: f32, max: f32, step: f32) -> Self {
        Self { min, max, step }
    }

    pub fn contains(&self, value: f32) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// Move `value` by `steps` slider steps, clamped to the range
    pub fn nudge(&self, value: f32, steps: i32) -> f32 {
        (value + self.step * steps as f32).clamp(self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults_match_reference_values() {
        let s = Settings::default();
        assert_eq!(s.iterations, 200.0);
        assert_eq!(s.zoom, 1.0);
        assert_eq!(s.speed, 1.0);
        assert_eq!(s.audio_reactivity, 1.0);
        assert_eq!(s.kaleidoscope_segments, 6.0);
    }

    #[test]
    fn test_get_set_by_key() {
        let mut s = Settings::default();
        for (i, key) in SettingKey::ALL.into_iter().enumerate() {
            s.set(key, i as f32 + 0.5);
        }
        assert_eq!(s.get(SettingKey::Iterations), 0.5);
        assert_eq!(s.get(SettingKey::KaleidoscopeSegments), 4.5);
        assert_eq!(s.iter().count(), 5);
    }

    #[test]
    fn test_key_parsing_accepts_canonical_and_cli_spellings() {
        assert_eq!("audioReactivity".parse(), Ok(SettingKey::AudioReactivity));
        assert_eq!("audio-reactivity".parse(), Ok(SettingKey::AudioReactivity));
        assert_eq!(
            "kaleidoscope_segments".parse(),
            Ok(SettingKey::KaleidoscopeSegments)
        );
        assert!("brightness".parse::<SettingKey>().is_err());
    }

    #[test]
    fn test_key_cycle_wraps() {
        assert_eq!(SettingKey::KaleidoscopeSegments.next(), SettingKey::Iterations);
        assert_eq!(SettingKey::Iterations.prev(), SettingKey::KaleidoscopeSegments);
    }

    #[test]
    fn test_slider_nudge_clamps() {
        let zoom = SettingKey::Zoom.slider();
        assert_relative_eq!(zoom.nudge(1.0, 1), 1.1, epsilon = 1e-6);
        assert_eq!(zoom.nudge(4.95, 3), 5.0);
        assert_eq!(zoom.nudge(0.15, -5), 0.1);
    }

    #[test]
    fn test_validate_rejects_values_outside_slider_range() {
        assert!(Settings::default().validate().is_ok());

        let no_segments = Settings {
            kaleidoscope_segments: 0.0,
            ..Default::default()
        };
        assert!(matches!(no_segments.validate(), Err(ConfigError::Invalid(_))));

        let no_iterations = Settings {
            iterations: 0.0,
            ..Default::default()
        };
        assert!(no_iterations.validate().is_err());

        let edges = Settings {
            iterations: 500.0,
            zoom: 0.1,
            speed: 0.0,
            audio_reactivity: 5.0,
            kaleidoscope_segments: 1.0,
        };
        assert!(edges.validate().is_ok());
    }

    #[test]
    fn test_non_finite_detection() {
        let mut s = Settings::default();
        assert_eq!(s.first_non_finite(), None);
        s.speed = f32::NAN;
        assert_eq!(s.first_non_finite(), Some(SettingKey::Speed));
    }
}
