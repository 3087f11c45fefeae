use image::{Rgba as ImageRgba, RgbaImage};
use wavefield::Rgba;

use crate::types::ColorSpaceMode;

/// A rendered frame of floating point colors, stored top row first.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl FrameBuffer {
    pub(crate) fn from_pixels(width: u32, height: u32, pixels: Vec<Rgba>) -> Self {
        debug_assert_eq!(pixels.len(), width as usize * height as usize);
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Color at column `x`, row `y` (row 0 is the top of the image).
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Quantizes the frame to 8-bit RGBA.
    ///
    /// Values outside `[0, 1]` are clamped, so the infinite glow at a ring
    /// center saturates to white and NaN channels collapse to zero.
    pub fn to_rgba8(&self, color_space: ColorSpaceMode) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            let color = self.pixel(x, y).unwrap_or(Rgba::BLACK);
            ImageRgba([
                encode_channel(color.r, color_space),
                encode_channel(color.g, color_space),
                encode_channel(color.b, color_space),
                encode_channel(color.a, ColorSpaceMode::Gamma),
            ])
        })
    }
}

fn encode_channel(value: f32, color_space: ColorSpaceMode) -> u8 {
    if value.is_nan() {
        return 0;
    }
    let value = value.clamp(0.0, 1.0);
    let encoded = match color_space {
        ColorSpaceMode::Auto | ColorSpaceMode::Gamma => value,
        ColorSpaceMode::Linear => linear_to_srgb(value),
    };
    (encoded * 255.0).round() as u8
}

fn linear_to_srgb(value: f32) -> f32 {
    if value <= 0.003_130_8 {
        value * 12.92
    } else {
        1.055 * value.powf(1.0 / 2.4) - 0.055
    }
}
