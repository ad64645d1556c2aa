//! Rendering backend contract, uniforms and surface sizing.

mod system;

use bytemuck::{Pod, Zeroable};

use crate::audio::BandEnergies;
use crate::error::RenderError;
use crate::params::Settings;

pub use system::RenderSystem;

/// Uniform buffer for the fractal shader (must match `fractal.wgsl`)
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct FractalUniforms {
    pub resolution: [f32; 2],
    pub time: f32,
    pub zoom: f32,
    pub iterations: f32,
    pub audio_reactivity: f32,
    pub bass: f32,
    pub mid: f32,
    pub high: f32,
    pub kaleidoscope_segments: f32,
    pub _padding: [f32; 2], // Pad to 48 bytes
}

impl FractalUniforms {
    /// Pack smoothed settings, band energies and speed-scaled time
    pub fn new(settings: &Settings, bands: BandEnergies, time: f32, size: SurfaceSize) -> Self {
        Self {
            resolution: [size.width as f32, size.height as f32],
            time,
            zoom: settings.zoom,
            iterations: settings.iterations,
            audio_reactivity: settings.audio_reactivity,
            bass: bands.bass,
            mid: bands.mid,
            high: bands.high,
            kaleidoscope_segments: settings.kaleidoscope_segments,
            _padding: [0.0; 2],
        }
    }
}

/// Backing size of the drawing surface in physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Viewport size in logical pixels scaled by the device pixel ratio
    pub fn from_logical(width: f64, height: f64, scale_factor: f64) -> Self {
        let scale = if scale_factor.is_finite() && scale_factor > 0.0 {
            scale_factor
        } else {
            1.0
        };
        let to_px = |v: f64| (v.max(0.0) * scale).round() as u32;
        Self {
            width: to_px(width),
            height: to_px(height),
        }
    }

    /// A zero-area surface cannot be configured; rendering is skipped
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl SurfaceSize {
    /// Backing size for a window reporting `size` at `scale_factor`.
    ///
    /// winit hands out physical sizes; they are taken back to CSS-style logical
    /// pixels first so the pixel ratio is applied in one place.
    pub fn from_physical(size: winit::dpi::PhysicalSize<u32>, scale_factor: f64) -> Self {
        let scale = if scale_factor.is_finite() && scale_factor > 0.0 {
            scale_factor
        } else {
            1.0
        };
        Self::from_logical(
            f64::from(size.width) / scale,
            f64::from(size.height) / scale,
            scale,
        )
    }

    pub fn of_window(window: &winit::window::Window) -> Self {
        Self::from_physical(window.inner_size(), window.scale_factor())
    }
}

/// Anything that can draw the fractal over the full viewport
pub trait RenderBackend {
    /// Reconfigure the drawing surface
    fn resize(&mut self, size: SurfaceSize);

    /// Upload uniforms and issue one full-viewport draw
    fn draw(&mut self, uniforms: &FractalUniforms) -> Result<(), RenderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backing_size_scales_by_pixel_ratio() {
        assert_eq!(
            SurfaceSize::from_logical(800.0, 600.0, 2.0),
            SurfaceSize::new(1600, 1200)
        );
        assert_eq!(
            SurfaceSize::from_logical(1280.0, 720.0, 1.5),
            SurfaceSize::new(1920, 1080)
        );
    }

    #[test]
    fn test_invalid_pixel_ratio_falls_back_to_one() {
        assert_eq!(
            SurfaceSize::from_logical(800.0, 600.0, 0.0),
            SurfaceSize::new(800, 600)
        );
        assert!(SurfaceSize::from_logical(0.0, 600.0, 2.0).is_empty());
    }

    #[test]
    fn test_window_size_round_trips_through_pixel_ratio() {
        use winit::dpi::PhysicalSize;

        assert_eq!(
            SurfaceSize::from_physical(PhysicalSize::new(1600, 1200), 2.0),
            SurfaceSize::new(1600, 1200)
        );
        assert_eq!(
            SurfaceSize::from_physical(PhysicalSize::new(1281, 721), 1.5),
            SurfaceSize::new(1281, 721)
        );
        assert_eq!(
            SurfaceSize::from_physical(PhysicalSize::new(640, 480), f64::NAN),
            SurfaceSize::new(640, 480)
        );
        assert!(SurfaceSize::from_physical(PhysicalSize::new(0, 480), 2.0).is_empty());
    }

    #[test]
    fn test_uniform_layout_is_48_bytes() {
        assert_eq!(std::mem::size_of::<FractalUniforms>(), 48);
    }

    #[test]
    fn test_uniforms_carry_settings_and_bands() {
        let settings = Settings {
            zoom: 2.0,
            ..Default::default()
        };
        let bands = BandEnergies {
            bass: 0.5,
            mid: 0.25,
            high: 0.125,
        };
        let u = FractalUniforms::new(&settings, bands, 3.0, SurfaceSize::new(640, 480));
        assert_eq!(u.resolution, [640.0, 480.0]);
        assert_eq!(u.time, 3.0);
        assert_eq!(u.zoom, 2.0);
        assert_eq!(u.iterations, 200.0);
        assert_eq!(u.kaleidoscope_segments, 6.0);
        assert_eq!((u.bass, u.mid, u.high), (0.5, 0.25, 0.125));
    }
}
