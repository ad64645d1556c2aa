//! Byte frequency analysis of the most recent output samples.
//!
//! Follows the analyser-node recipe used by browser audio graphs:
//! Blackman window -> FFT -> magnitude / N -> temporal smoothing ->
//! decibels -> linear map of [min_db, max_db] onto [0, 255].

use std::collections::VecDeque;
use std::f32::consts::PI;
use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::error::ConfigError;
use crate::params::AnalyserConfig;

/// Rolling window of the latest mono samples, written by the audio thread
#[derive(Debug)]
pub struct SampleTap {
    samples: VecDeque<f32>,
    capacity: usize,
}

impl SampleTap {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, sample: f32) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Down-mix one interleaved frame (channel average) and push it
    pub fn push_frame(&mut self, frame: &[f32]) {
        if frame.is_empty() {
            return;
        }
        let sum: f32 = frame.iter().sum();
        self.push(sum / frame.len() as f32);
    }

    /// Copy the latest samples into `out`, zero-padding the oldest slots
    pub fn copy_latest(&self, out: &mut [f32]) {
        let available = self.samples.len().min(out.len());
        let pad = out.len() - available;
        out[..pad].fill(0.0);
        let skip = self.samples.len() - available;
        for (dst, &src) in out[pad..].iter_mut().zip(self.samples.iter().skip(skip)) {
            *dst = src;
        }
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Spectrum analyser producing one byte magnitude per frequency bin
pub struct SpectrumAnalyser {
    config: AnalyserConfig,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
}

impl SpectrumAnalyser {
    pub fn new(config: AnalyserConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(config.fft_size);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];
        let window = (0..config.fft_size)
            .map(|i| blackman_window(i, config.fft_size))
            .collect();

        Ok(Self {
            buffer: vec![Complex::new(0.0, 0.0); config.fft_size],
            smoothed: vec![0.0; config.frequency_bin_count()],
            window,
            scratch,
            fft,
            config,
        })
    }

    pub fn config(&self) -> &AnalyserConfig {
        &self.config
    }

    /// Samples consumed per analysis
    pub fn fft_size(&self) -> usize {
        self.config.fft_size
    }

    pub fn frequency_bin_count(&self) -> usize {
        self.config.frequency_bin_count()
    }

    /// Forget the smoothing history
    pub fn reset(&mut self) {
        self.smoothed.fill(0.0);
    }

    /// Analyse `samples` (the latest `fft_size` mono samples) into `out`.
    ///
    /// `samples` shorter than the window are zero-padded at the front; `out` is
    /// filled up to the bin count and any remainder is zeroed.
    pub fn byte_frequency_data(&mut self, samples: &[f32], out: &mut [u8]) {
        let n = self.config.fft_size;
        let pad = n.saturating_sub(samples.len());
        let recent = &samples[samples.len().saturating_sub(n)..];

        for (i, slot) in self.buffer.iter_mut().enumerate() {
            let sample = if i < pad { 0.0 } else { recent[i - pad] };
            *slot = Complex::new(sample * self.window[i], 0.0);
        }
        self.fft
            .process_with_scratch(&mut self.buffer, &mut self.scratch);

        let tau = self.config.smoothing_time_constant;
        let scale = 1.0 / n as f32;
        for (avg, bin) in self.smoothed.iter_mut().zip(self.buffer.iter()) {
            let magnitude = bin.norm() * scale;
            let next = tau * *avg + (1.0 - tau) * magnitude;
            *avg = if next.is_finite() { next } else { 0.0 };
        }

        let (min_db, max_db) = (self.config.min_decibels, self.config.max_decibels);
        let range_scale = 255.0 / (max_db - min_db);
        for (i, byte) in out.iter_mut().enumerate() {
            *byte = match self.smoothed.get(i) {
                Some(&magnitude) => to_byte(magnitude, min_db, range_scale),
                None => 0,
            };
        }
    }
}

fn to_byte(magnitude: f32, min_db: f32, range_scale: f32) -> u8 {
    let db = 20.0 * magnitude.log10();
    let scaled = (db - min_db) * range_scale;
    if scaled.is_nan() {
        0
    } else {
        scaled.clamp(0.0, 255.0) as u8
    }
}

/// Blackman window (alpha = 0.16) over a periodic window of `size` samples
pub fn blackman_window(index: usize, size: usize) -> f32 {
    const A0: f32 = 0.42;
    const A1: f32 = 0.5;
    const A2: f32 = 0.08;
    let x = index as f32 / size as f32;
    A0 - A1 * (2.0 * PI * x).cos() + A2 * (4.0 * PI * x).cos()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine_at_bin(bin: usize, size: usize, amplitude: f32) -> Vec<f32> {
        (0..size)
            .map(|i| amplitude * (2.0 * PI * bin as f32 * i as f32 / size as f32).sin())
            .collect()
    }

    #[test]
    fn test_blackman_window_shape() {
        let size = 256;
        assert!(blackman_window(0, size).abs() < 1e-6);
        assert!((blackman_window(size / 2, size) - 1.0).abs() < 1e-6);
        // Symmetric around the center
        assert!((blackman_window(10, size) - blackman_window(size - 10, size)).abs() < 1e-5);
    }

    #[test]
    fn test_silence_yields_zero_bytes() {
        let mut analyser = SpectrumAnalyser::new(AnalyserConfig::default()).unwrap();
        let mut out = vec![7u8; analyser.frequency_bin_count()];
        analyser.byte_frequency_data(&[0.0; 256], &mut out);
        assert!(out.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_tone_peaks_at_its_bin() {
        let mut analyser = SpectrumAnalyser::new(AnalyserConfig::default()).unwrap();
        let mut out = vec![0u8; 128];
        analyser.byte_frequency_data(&sine_at_bin(6, 256, 1.0), &mut out);

        assert_eq!(out[6], 255);
        assert!(out[64] < 10, "far bin leaked: {}", out[64]);
        assert!(out[100] < 10, "far bin leaked: {}", out[100]);
    }

    #[test]
    fn test_smoothing_decays_after_signal_stops() {
        let mut analyser = SpectrumAnalyser::new(AnalyserConfig::default()).unwrap();
        let mut out = vec![0u8; 128];
        let tone = sine_at_bin(20, 256, 0.01);

        analyser.byte_frequency_data(&tone, &mut out);
        let first = out[20];
        analyser.byte_frequency_data(&tone, &mut out);
        let second = out[20];
        assert!(second > first, "smoothing should ramp up: {} -> {}", first, second);

        for _ in 0..10 {
            analyser.byte_frequency_data(&[0.0; 256], &mut out);
        }
        assert!(out[20] < second);

        analyser.reset();
        analyser.byte_frequency_data(&[0.0; 256], &mut out);
        assert_eq!(out[20], 0);
    }

    #[test]
    fn test_short_input_and_output_are_padded() {
        let mut analyser = SpectrumAnalyser::new(AnalyserConfig::default()).unwrap();
        let mut out = vec![9u8; 200];
        analyser.byte_frequency_data(&[0.0; 10], &mut out);
        assert!(out.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_sample_tap_keeps_latest_window() {
        let mut tap = SampleTap::new(4);
        for i in 0..6 {
            tap.push(i as f32);
        }
        assert_eq!(tap.len(), 4);

        let mut out = [0.0; 6];
        tap.copy_latest(&mut out);
        assert_eq!(out, [0.0, 0.0, 2.0, 3.0, 4.0, 5.0]);

        let mut tail = [0.0; 2];
        tap.copy_latest(&mut tail);
        assert_eq!(tail, [4.0, 5.0]);
    }

    #[test]
    fn test_sample_tap_downmixes_frames() {
        let mut tap = SampleTap::new(8);
        tap.push_frame(&[0.5, -0.25]);
        tap.push_frame(&[]);
        let mut out = [0.0; 1];
        tap.copy_latest(&mut out);
        assert_eq!(out, [0.125]);
        assert_eq!(tap.len(), 1);
    }
}
