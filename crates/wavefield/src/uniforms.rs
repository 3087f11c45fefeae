//! Per-frame inputs shared by every pixel invocation.

use crate::math::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum UniformError {
    #[error("resolution must be finite and strictly positive, got {width}x{height}")]
    InvalidResolution { width: f32, height: f32 },
}

/// Viewport size in pixels.
///
/// Both components are guaranteed finite and `> 0`, which keeps the
/// coordinate normalisation free of divisions by zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    width: f32,
    height: f32,
}

impl Resolution {
    pub fn new(width: f32, height: f32) -> Result<Self, UniformError> {
        let valid = |value: f32| value.is_finite() && value > 0.0;
        if valid(width) && valid(height) {
            Ok(Self { width, height })
        } else {
            Err(UniformError::InvalidResolution { width, height })
        }
    }

    pub fn from_pixels(width: u32, height: u32) -> Result<Self, UniformError> {
        Self::new(width as f32, height as f32)
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn as_vec2(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Fragment coordinate of the exact screen centre.
    pub fn center(&self) -> Vec2 {
        self.as_vec2() * 0.5
    }
}

/// Uniform values written by the host once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUniforms {
    /// Seconds since the animation started.
    pub time: f32,
    pub resolution: Resolution,
    /// Pointer in normalised device coordinates (x right, y up).
    pub pointer: Vec2,
}

impl FrameUniforms {
    /// Uniforms at `time = 0` with the pointer at the origin.
    pub fn new(resolution: Resolution) -> Self {
        Self {
            time: 0.0,
            resolution,
            pointer: Vec2::ZERO,
        }
    }

    pub fn with_time(mut self, time: f32) -> Self {
        self.time = time;
        self
    }

    pub fn with_pointer(mut self, pointer: Vec2) -> Self {
        self.pointer = pointer;
        self
    }
}
