//! Reduction of a byte spectrum into bass/mid/high energies.

use std::ops::Range;

use crate::params::BandLayout;

/// Normalized band energies, each in [0, 1]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BandEnergies {
    pub bass: f32,
    pub mid: f32,
    pub high: f32,
}

impl BandEnergies {
    /// No audio-reactive contribution
    pub const SILENT: BandEnergies = BandEnergies {
        bass: 0.0,
        mid: 0.0,
        high: 0.0,
    };
}

/// Extract energies with the default 0..4 / 4..12 / 12..32 layout
pub fn extract(spectrum: &[u8]) -> BandEnergies {
    extract_with(spectrum, &BandLayout::default())
}

/// Extract energies with an explicit bin layout.
///
/// Bins past the end of `spectrum` count as zero; the divisor is always the full
/// band width.
pub fn extract_with(spectrum: &[u8], layout: &BandLayout) -> BandEnergies {
    BandEnergies {
        bass: band_mean(spectrum, &layout.bass_bins),
        mid: band_mean(spectrum, &layout.mid_bins),
        high: band_mean(spectrum, &layout.high_bins),
    }
}

fn band_mean(spectrum: &[u8], bins: &Range<usize>) -> f32 {
    if bins.is_empty() {
        return 0.0;
    }
    let end = bins.end.min(spectrum.len());
    let start = bins.start.min(end);
    let sum: u32 = spectrum[start..end].iter().map(|&b| u32::from(b)).sum();
    sum as f32 / (bins.len() as f32 * 255.0)
}
