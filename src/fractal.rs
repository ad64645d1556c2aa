//! CPU reference model of the fractal shader math.
//!
//! Mirrors `rendering/fractal.wgsl` function by function so the shading can be
//! checked without a GPU. The renderer never calls into this module; the tests
//! below pin every shared expression against the shader source so the two
//! cannot drift apart silently.

use std::f32::consts::PI;

use glam::{Vec2, Vec3, Vec4};

use crate::rendering::FractalUniforms;

/// Floored modulo (result takes the sign of `y`)
pub fn floor_mod(x: f32, y: f32) -> f32 {
    x - y * (x / y).floor()
}

fn fract(v: Vec3) -> Vec3 {
    v - v.floor()
}

pub fn hsv_to_rgb(c: Vec3) -> Vec3 {
    let k = Vec4::new(1.0, 2.0 / 3.0, 1.0 / 3.0, 3.0);
    let p = (fract(Vec3::splat(c.x) + k.truncate()) * 6.0 - Vec3::splat(k.w)).abs();
    let kx = Vec3::splat(k.x);
    let chroma = (p - kx).clamp(Vec3::ZERO, Vec3::ONE);
    c.z * kx.lerp(chroma, c.y)
}

/// Fold `uv` into one mirrored wedge of `segments` around the origin
pub fn kaleidoscope(uv: Vec2, segments: f32) -> Vec2 {
    let radius = uv.length();
    let mut angle = uv.y.atan2(uv.x);
    angle = floor_mod(angle, 2.0 * PI / segments);
    angle = (angle - PI / segments).abs();
    Vec2::new(angle.cos(), angle.sin()) * radius
}

/// Normalized escape time of `z` under `z^2 + c`, or 0 if it never escapes
pub fn julia(start: Vec2, c: Vec2, iterations: f32) -> f32 {
    let mut z = start;
    let mut i = 0.0;
    while i < 1000.0 {
        if i > iterations {
            return 0.0;
        }
        z = Vec2::new(z.x * z.x - z.y * z.y, 2.0 * z.x * z.y) + c;
        if z.dot(z) > 4.0 {
            return i / iterations;
        }
        i += 1.0;
    }
    0.0
}

/// Color of the pixel at `frag` (bottom-left origin, pixel units)
pub fn shade(frag: Vec2, u: &FractalUniforms) -> Vec3 {
    let resolution = Vec2::from_array(u.resolution);
    let t = u.time;

    let mut uv = (frag - 0.5 * resolution) / resolution.y.min(resolution.x);
    uv += Vec2::new((uv.y * 5.0 + t * 0.5).sin(), (uv.x * 5.0 + t * 0.5).cos()) * 0.005;
    uv = kaleidoscope(uv, u.kaleidoscope_segments);

    let z = uv * 3.0 / u.zoom;
    let c1 = Vec2::new(
        0.285 + 0.01 * (t * 0.17).sin(),
        0.01 + 0.01 * (t * 0.23).cos(),
    );
    let c2 = Vec2::new(
        -0.4 + 0.1 * (t * 0.13).cos(),
        0.6 + 0.1 * (t * 0.19).sin(),
    );

    let f1 = julia(z, c1, u.iterations);
    let f2 = julia(z, c2, u.iterations);
    let blend = 0.5 + 0.5 * (t * 0.1).sin();
    let f = f1 + (f2 - f1) * blend;

    let hue = (f * 3.0 + t * 0.1 + u.bass * 0.2 + u.mid * 0.1).rem_euclid(1.0);
    let sat = 0.7 + 0.3 * (f * 20.0).sin() + u.high * 0.3;
    let val = 0.6 + 0.4 * f + u.bass * 0.3;
    let mut color = hsv_to_rgb(Vec3::new(hue, sat, val));

    let glow = (-f * 2.5).exp() * (0.3 + 0.1 * u.bass);
    color += glow * Vec3::new(0.7, 0.5, 0.2);
    color += u.audio_reactivity * u.bass * Vec3::new(0.1, 0.0, 0.25);
    color *= 0.9 + 0.15 * (t * 2.0 + f * 10.0).sin() * (1.0 + u.bass * u.audio_reactivity);

    color.clamp(Vec3::ZERO, Vec3::ONE)
}
