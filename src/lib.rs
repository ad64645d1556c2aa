//! Juliascope library - audio-reactive kaleidoscopic Julia-set visualization

pub mod audio;
pub mod cli;
pub mod controls;
pub mod error;
pub mod fractal;
pub mod frame;
pub mod params;
pub mod rendering;
pub mod smoothing;
pub mod visualizer;
