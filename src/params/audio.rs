//! Audio analysis configuration and band layout.

use std::ops::Range;

use crate::error::ConfigError;

/// Fewest frequency bins the band layout can be served from
pub const MIN_FREQUENCY_BINS: usize = 32;

/// Spectrum analyser configuration (byte frequency analysis)
#[derive(Debug, Clone)]
pub struct AnalyserConfig {
    /// Analysis window in samples (power of 2, yields `fft_size / 2` bins)
    pub fft_size: usize,

    /// Weight of the previous frame in the magnitude average (0..1)
    pub smoothing_time_constant: f32,

    /// Magnitude mapped to byte 0 (dB)
    pub min_decibels: f32,

    /// Magnitude mapped to byte 255 (dB)
    pub max_decibels: f32,
}

impl Default for AnalyserConfig {
    fn default() -> Self {
        Self {
            fft_size: 256, // 128 bins
            smoothing_time_constant: 0.8,
            min_decibels: -100.0,
            max_decibels: -30.0,
        }
    }
}

impl AnalyserConfig {
    /// Number of frequency bins produced per read
    pub fn frequency_bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Validate configuration (power-of-2 window, enough bins for the band layout)
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.fft_size.is_power_of_two() {
            return Err(ConfigError::Invalid(format!(
                "analyser size must be a power of 2, got {}",
                self.fft_size
            )));
        }
        if self.frequency_bin_count() < MIN_FREQUENCY_BINS {
            return Err(ConfigError::Invalid(format!(
                "analyser size {} yields {} bins, need at least {}",
                self.fft_size,
                self.frequency_bin_count(),
                MIN_FREQUENCY_BINS
            )));
        }
        if !(0.0..=1.0).contains(&self.smoothing_time_constant) {
            return Err(ConfigError::Invalid(format!(
                "smoothing time constant must be within [0, 1], got {}",
                self.smoothing_time_constant
            )));
        }
        if self.min_decibels >= self.max_decibels {
            return Err(ConfigError::Invalid(format!(
                "min decibels ({}) must be below max decibels ({})",
                self.min_decibels, self.max_decibels
            )));
        }
        Ok(())
    }
}

/// Spectrum bin ranges reduced into bass/mid/high energies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandLayout {
    pub bass_bins: Range<usize>,
    pub mid_bins: Range<usize>,
    pub high_bins: Range<usize>,
}

impl Default for BandLayout {
    fn default() -> Self {
        // At 44.1 kHz with 128 bins each bin spans ~172 Hz
        Self {
            bass_bins: 0..4,
            mid_bins: 4..12,
            high_bins: 12..32,
        }
    }
}

impl BandLayout {
    /// One past the highest bin any band reads
    pub fn required_bins(&self) -> usize {
        self.bass_bins
            .end
            .max(self.mid_bins.end)
            .max(self.high_bins.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_analyser_has_128_bins() {
        let config = AnalyserConfig::default();
        assert_eq!(config.frequency_bin_count(), 128);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_analyser_rejects_small_or_odd_windows() {
        let mut config = AnalyserConfig::default();
        config.fft_size = 32; // 16 bins
        assert!(config.validate().is_err());

        config.fft_size = 200;
        assert!(config.validate().is_err());

        config.fft_size = 64; // exactly 32 bins
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_analyser_rejects_inverted_decibel_range() {
        let config = AnalyserConfig {
            min_decibels: -30.0,
            max_decibels: -100.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_layout_needs_32_bins() {
        let layout = BandLayout::default();
        assert_eq!(layout.required_bins(), MIN_FREQUENCY_BINS);
        assert_eq!(layout.bass_bins.len(), 4);
        assert_eq!(layout.mid_bins.len(), 8);
        assert_eq!(layout.high_bins.len(), 20);
    }
}
