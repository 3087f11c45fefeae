//! Small GLSL-flavoured vector types used by the evaluator.
//!
//! Only the operations the shading code needs are provided. Everything is
//! `f32` so the CPU path rounds the same way a GPU fragment stage does.

use std::ops::{Add, Div, Mul, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub const fn splat(value: f32) -> Self {
        Self { x: value, y: value }
    }

    /// Euclidean length, computed as `sqrt(x*x + y*y)` like GLSL `length`.
    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Component-wise sine.
    pub fn sin(self) -> Self {
        Self::new(self.x.sin(), self.y.sin())
    }
}

impl From<Vec2> for [f32; 2] {
    fn from(value: Vec2) -> Self {
        [value.x, value.y]
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Add<f32> for Vec2 {
    type Output = Self;

    fn add(self, rhs: f32) -> Self {
        Self::new(self.x + rhs, self.y + rhs)
    }
}

impl Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f32> for Vec2 {
    type Output = Self;

    fn div(self, rhs: f32) -> Self {
        Self::new(self.x / rhs, self.y / rhs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub const fn splat(value: f32) -> Self {
        Self {
            x: value,
            y: value,
            z: value,
        }
    }

    /// Applies `f` to every component.
    pub fn map(self, f: impl Fn(f32) -> f32) -> Self {
        Self::new(f(self.x), f(self.y), f(self.z))
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

impl Add for Vec3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul for Vec3 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::new(self.x * rhs.x, self.y * rhs.y, self.z * rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// GLSL `mix`: `a + (b - a) * t`.
pub fn mix(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    a + (b - a) * t
}

/// Cubic Hermite ease between two edges, equivalent to GLSL `smoothstep`.
///
/// The interpolation fraction is clamped to `[0, 1]` before easing, so the
/// result is exactly 0 below `edge0` and exactly 1 above `edge1`.
pub fn smooth_mix(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smooth_mix_is_constant_outside_edges() {
        for step in 0..=30 {
            let x = -1.0 + step as f32 * 0.043;
            if x <= 0.3 {
                assert_eq!(smooth_mix(0.3, 0.7, x), 0.0, "x = {x}");
            }
        }
        for step in 0..=30 {
            let x = 0.7 + step as f32 * 0.05;
            assert_eq!(smooth_mix(0.3, 0.7, x), 1.0, "x = {x}");
        }
    }

    #[test]
    fn smooth_mix_is_monotonic_between_edges() {
        let mut last = smooth_mix(0.3, 0.7, 0.3);
        for step in 1..=400 {
            let x = 0.3 + step as f32 * 0.001;
            let value = smooth_mix(0.3, 0.7, x);
            assert!(value >= last, "smooth_mix decreased at x = {x}");
            last = value;
        }
        assert!((smooth_mix(0.3, 0.7, 0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn mix_hits_both_endpoints() {
        let a = Vec3::new(0.1, 0.2, 0.3);
        let b = Vec3::new(0.9, 0.8, 0.7);
        assert_eq!(mix(a, b, 0.0), a);
        let end = mix(a, b, 1.0);
        assert!((end.x - b.x).abs() < 1e-6);
        assert!((end.y - b.y).abs() < 1e-6);
        assert!((end.z - b.z).abs() < 1e-6);
    }

    #[test]
    fn length_matches_pythagoras() {
        assert!((Vec2::new(3.0, 4.0).length() - 5.0).abs() < 1e-6);
        assert_eq!(Vec2::ZERO.length(), 0.0);
    }
}
