//! The per-pixel wave evaluator.
//!
//! `shade` is a pure function of the fragment coordinate, the frame uniforms
//! and the four base colors. It runs the same arithmetic as the GLSL in
//! [`crate::glsl`], in the same order:
//!
//! ```text
//!   frag_coord ─▶ uv/uv0 ─▶ quadrant blend ─▶ radial pulse ─┐
//!        │                                                  ▼
//!        └──────▶ wave distance ───────────────▶ ring glow × palette ─▶ Rgba
//! ```
//!
//! The ring glow is an inverse square and is deliberately left unclamped: as
//! the ring term approaches zero the output grows without bound and reaches
//! `+inf` when it hits zero exactly. Display hosts tone-map.

use std::f32::consts::TAU;

use crate::color::{BaseColors, Rgba};
use crate::math::{mix, smooth_mix, Vec2, Vec3};
use crate::uniforms::{FrameUniforms, Resolution};

/// Lower edge of the quadrant blend band in normalised `[0, 1]` space.
pub const BLEND_EDGE_LOW: f32 = 0.3;
/// Upper edge of the quadrant blend band.
pub const BLEND_EDGE_HIGH: f32 = 0.7;

const PULSE_BASE: f32 = 0.9;
const PULSE_AMPLITUDE: f32 = 0.1;
const PULSE_RADIAL_FREQUENCY: f32 = 3.0;
const PULSE_SPEED: f32 = 0.5;

const WAVE_SCALE: f32 = 0.5;
const PALETTE_SPEED: f32 = 0.4;
const PALETTE_OFFSET: Vec3 = Vec3::splat(0.5);
const PALETTE_AMPLITUDE: Vec3 = Vec3::splat(0.5);
const PALETTE_FREQUENCY: Vec3 = Vec3::splat(1.0);

const RING_FREQUENCY: f32 = 8.0;
const GLOW_STRENGTH: f32 = 0.02;

/// Every intermediate of one evaluation, in algorithm order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadeTrace {
    /// Centred, aspect-corrected coordinate.
    pub uv: Vec2,
    /// Copy of `uv` reserved for radial falloff.
    pub uv0: Vec2,
    /// `uv` remapped towards `[0, 1]` for blending.
    pub normalized_uv: Vec2,
    pub mix_x: f32,
    pub mix_y: f32,
    /// Quadrant blend before the radial pulse.
    pub quadrant_color: Vec3,
    pub variation: f32,
    /// Quadrant blend after the radial pulse; the palette phase.
    pub blended: Vec3,
    pub wave_uv: Vec2,
    /// Centre-weighted distance feeding the ring term.
    pub distance: f32,
    pub palette_t: f32,
    pub palette: Vec3,
    pub ring: f32,
    pub glow: f32,
    pub output: Rgba,
}

/// Result of the smooth four-corner blend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadrantBlend {
    pub mix_x: f32,
    pub mix_y: f32,
    pub color: Vec3,
}

/// Maps a fragment coordinate into centred space where the vertical axis
/// spans `[-1, 1]` whatever the aspect ratio.
pub fn normalize_coords(frag_coord: Vec2, resolution: Resolution) -> Vec2 {
    (frag_coord * 2.0 - resolution.as_vec2()) / resolution.height()
}

/// Blends color1→color3 along the bottom and color2→color4 along the top,
/// then blends bottom→top vertically.
pub fn blend_quadrants(normalized_uv: Vec2, colors: &BaseColors) -> QuadrantBlend {
    let mix_x = smooth_mix(BLEND_EDGE_LOW, BLEND_EDGE_HIGH, normalized_uv.x);
    let mix_y = smooth_mix(BLEND_EDGE_LOW, BLEND_EDGE_HIGH, normalized_uv.y);

    let bottom = mix(colors.color1.to_vec3(), colors.color3.to_vec3(), mix_x);
    let top = mix(colors.color2.to_vec3(), colors.color4.to_vec3(), mix_x);

    QuadrantBlend {
        mix_x,
        mix_y,
        color: mix(bottom, top, mix_y),
    }
}

/// Slow radial brightness pulse in `[0.8, 1.0]`.
pub fn color_variation(radius: f32, time: f32) -> f32 {
    (radius * PULSE_RADIAL_FREQUENCY + time * PULSE_SPEED).sin() * PULSE_AMPLITUDE + PULSE_BASE
}

/// Bends the field towards the pointer and weights it by distance from the
/// centre. Returns the displaced coordinate and the weighted distance.
pub fn wave_distance(uv: Vec2, radius: f32, pointer: Vec2) -> (Vec2, f32) {
    let wave_uv = (uv * WAVE_SCALE).sin() - pointer;
    (wave_uv, wave_uv.length() * (-radius).exp())
}

/// Cosine palette `a + b * cos(2π * (c * t + phase))` with `a = b = 0.5`
/// and `c = 1`.
pub fn palette(t: f32, phase: Vec3) -> Vec3 {
    let angle = (PALETTE_FREQUENCY * Vec3::splat(t) + phase) * TAU;
    PALETTE_OFFSET + PALETTE_AMPLITUDE * angle.map(f32::cos)
}

/// Turns the weighted distance into thin animated rings.
///
/// Returns `(ring, glow)` where `ring = |sin(distance * 8 + time) / 8|` and
/// `glow = (0.02 / ring)^2`.
pub fn ring_glow(distance: f32, time: f32) -> (f32, f32) {
    let ring = ((distance * RING_FREQUENCY + time).sin() / RING_FREQUENCY).abs();
    (ring, (GLOW_STRENGTH / ring).powi(2))
}

/// Evaluates one pixel.
pub fn shade(frag_coord: Vec2, uniforms: &FrameUniforms, colors: &BaseColors) -> Rgba {
    shade_traced(frag_coord, uniforms, colors).output
}

/// Evaluates one pixel and keeps every intermediate value.
pub fn shade_traced(
    frag_coord: Vec2,
    uniforms: &FrameUniforms,
    colors: &BaseColors,
) -> ShadeTrace {
    let time = uniforms.time;

    let uv = normalize_coords(frag_coord, uniforms.resolution);
    let uv0 = uv;
    let radius = uv0.length();

    let normalized_uv = (uv + 1.0) * 0.5;
    let quadrant = blend_quadrants(normalized_uv, colors);

    let variation = color_variation(radius, time);
    let blended = quadrant.color * variation;

    let (wave_uv, distance) = wave_distance(uv, radius, uniforms.pointer);

    let palette_t = radius + time * PALETTE_SPEED;
    let palette_color = palette(palette_t, blended);

    let (ring, glow) = ring_glow(distance, time);

    let rgb = palette_color * glow;
    ShadeTrace {
        uv,
        uv0,
        normalized_uv,
        mix_x: quadrant.mix_x,
        mix_y: quadrant.mix_y,
        quadrant_color: quadrant.color,
        variation,
        blended,
        wave_uv,
        distance,
        palette_t,
        palette: palette_color,
        ring,
        glow,
        output: Rgba::opaque(rgb.x, rgb.y, rgb.z),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;

    fn uniforms(width: f32, height: f32, time: f32, pointer: Vec2) -> FrameUniforms {
        FrameUniforms::new(Resolution::new(width, height).unwrap())
            .with_time(time)
            .with_pointer(pointer)
    }

    fn assert_close(actual: f32, expected: f64, tolerance: f64, what: &str) {
        let diff = (f64::from(actual) - expected).abs();
        assert!(
            diff <= tolerance,
            "{what}: expected {expected}, got {actual} (diff {diff})"
        );
    }

    fn bits(color: Rgba) -> [u32; 4] {
        color.to_array().map(f32::to_bits)
    }

    #[test]
    fn repeated_evaluation_is_bit_identical() {
        let colors = BaseColors::default();
        let frame = uniforms(1280.0, 720.0, 3.25, Vec2::new(0.4, -0.2));
        for coord in [
            Vec2::new(0.5, 0.5),
            Vec2::new(640.0, 360.0),
            Vec2::new(1279.5, 12.5),
        ] {
            let first = shade(coord, &frame, &colors);
            for _ in 0..8 {
                assert_eq!(bits(shade(coord, &frame, &colors)), bits(first));
            }
        }
    }

    #[test]
    fn centre_at_time_zero_collapses_to_closed_form() {
        let colors = BaseColors::default();
        let frame = uniforms(800.0, 600.0, 0.0, Vec2::ZERO);
        let trace = shade_traced(frame.resolution.center(), &frame, &colors);

        assert_eq!(trace.uv0, Vec2::ZERO);
        assert_close(trace.mix_x, 0.5, 1e-6, "mix_x");
        assert_close(trace.mix_y, 0.5, 1e-6, "mix_y");
        assert_eq!(trace.variation, 0.9);
        assert_eq!(trace.distance, 0.0);
        assert_eq!(trace.ring, 0.0);
        assert_eq!(trace.glow, f32::INFINITY);

        // palette = 0.5 + 0.5 * cos(2π * 0.9 * average(colors))
        assert_close(trace.palette.x, 0.049_172_496_217_251_67, 1e-5, "palette.r");
        assert_close(trace.palette.y, 0.826_477_086_092_072_3, 1e-5, "palette.g");
        assert_close(trace.palette.z, 0.163_835_595_613_107, 1e-5, "palette.b");

        for channel in [trace.output.r, trace.output.g, trace.output.b] {
            assert_eq!(channel, f32::INFINITY);
        }
        assert_eq!(trace.output.a, 1.0);
    }

    #[test]
    fn quadrant_blend_pins_corner_colors() {
        let colors = BaseColors::default();

        for low in [0.3, 0.2, 0.0, -0.5] {
            let blend = blend_quadrants(Vec2::splat(low), &colors);
            assert_eq!(blend.color, colors.color1.to_vec3(), "at {low}");
        }

        for high in [0.7, 0.8, 1.0, 1.5] {
            let blend = blend_quadrants(Vec2::splat(high), &colors);
            let expected = colors.color4;
            assert!((blend.color.x - expected.r).abs() < 1e-6, "at {high}");
            assert!((blend.color.y - expected.g).abs() < 1e-6, "at {high}");
            assert!((blend.color.z - expected.b).abs() < 1e-6, "at {high}");
        }
    }

    #[test]
    fn quadrant_blend_uses_top_left_and_bottom_right() {
        let colors = BaseColors {
            color1: Rgb::new(1.0, 0.0, 0.0),
            color2: Rgb::new(0.0, 1.0, 0.0),
            color3: Rgb::new(0.0, 0.0, 1.0),
            color4: Rgb::new(1.0, 1.0, 1.0),
        };
        let top_left = blend_quadrants(Vec2::new(0.1, 0.9), &colors);
        assert_eq!(top_left.color, Vec3::new(0.0, 1.0, 0.0));
        let bottom_right = blend_quadrants(Vec2::new(0.9, 0.1), &colors);
        assert_eq!(bottom_right.color, Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn corner_pixels_see_their_quadrant_colors() {
        let colors = BaseColors::default();
        let frame = uniforms(800.0, 600.0, 1.0, Vec2::ZERO);
        let trace = shade_traced(Vec2::new(200.0, 100.0), &frame, &colors);
        assert!(trace.normalized_uv.x < BLEND_EDGE_LOW);
        assert!(trace.normalized_uv.y < BLEND_EDGE_LOW);
        assert_eq!(trace.mix_x, 0.0);
        assert_eq!(trace.mix_y, 0.0);
        assert_eq!(trace.quadrant_color, colors.color1.to_vec3());
    }

    #[test]
    fn output_varies_continuously_with_time() {
        let colors = BaseColors::default();
        let coord = Vec2::new(100.0, 50.0);
        let pointer = Vec2::new(0.25, -0.5);
        let step = 1e-3_f32;

        let mut previous = shade(coord, &uniforms(800.0, 600.0, 0.0, pointer), &colors);
        for index in 1..=1000 {
            let time = index as f32 * step;
            let current = shade(coord, &uniforms(800.0, 600.0, time, pointer), &colors);
            for (a, b) in previous.to_array().iter().zip(current.to_array()) {
                assert!(
                    (a - b).abs() < 2e-3,
                    "jump of {} at t = {time}",
                    (a - b).abs()
                );
            }
            previous = current;
        }
    }

    #[test]
    fn centre_value_is_resolution_scale_invariant() {
        let colors = BaseColors::default();
        let reference = {
            let frame = uniforms(800.0, 600.0, 1.0, Vec2::ZERO);
            shade(frame.resolution.center(), &frame, &colors)
        };
        for scale in [0.5_f32, 2.0, 4.0] {
            let frame = uniforms(800.0 * scale, 600.0 * scale, 1.0, Vec2::ZERO);
            let trace = shade_traced(frame.resolution.center(), &frame, &colors);
            assert_eq!(trace.uv0, Vec2::ZERO);
            assert_eq!(bits(trace.output), bits(reference), "scale {scale}");
        }
    }

    #[test]
    fn alpha_is_always_opaque() {
        let colors = BaseColors::default();
        let pointers = [
            Vec2::ZERO,
            Vec2::new(1.0, -1.0),
            Vec2::new(1e6, -1e6),
            Vec2::new(-250.0, 3.5),
        ];
        for pointer in pointers {
            for time in [0.0, 0.5, 17.0, 1e5] {
                for coord in [
                    Vec2::new(0.0, 0.0),
                    Vec2::new(320.0, 240.0),
                    Vec2::new(639.5, 479.5),
                    Vec2::new(-100.0, 10_000.0),
                ] {
                    let color = shade(coord, &uniforms(640.0, 480.0, time, pointer), &colors);
                    assert_eq!(color.a, 1.0);
                }
            }
        }
    }

    #[test]
    fn default_palette_matches_recorded_reference() {
        let colors = BaseColors::default();
        let frame = uniforms(800.0, 600.0, 1.0, Vec2::ZERO);
        let color = shade(Vec2::new(400.0, 300.0), &frame, &colors);

        assert_close(color.r, 0.028_855_317_839_581_656, 1e-5, "r");
        assert_close(color.g, 0.000_687_988_093_801_95, 1e-5, "g");
        assert_close(color.b, 0.034_606_280_452_610_1, 1e-5, "b");
        assert_eq!(color.a, 1.0);
    }

    #[test]
    fn off_centre_pixel_with_pointer_matches_reference() {
        let colors = BaseColors::default();
        let frame = uniforms(800.0, 600.0, 2.5, Vec2::new(0.25, -0.5));
        let trace = shade_traced(Vec2::new(100.0, 50.0), &frame, &colors);

        assert_close(trace.distance, 0.200_138_421_145_259_98, 1e-5, "distance");
        assert_close(trace.glow, 0.038_173_701_539_616_83, 1e-5, "glow");
        assert_close(trace.output.r, 7.848_023_173_158_003e-5, 1e-5, "r");
        assert_close(trace.output.g, 0.004_356_481_822_803_652, 1e-5, "g");
        assert_close(trace.output.b, 0.036_946_872_594_187_36, 1e-5, "b");
    }

    #[test]
    fn pointer_shifts_the_wave_distance() {
        let colors = BaseColors::default();
        let centre = Vec2::new(400.0, 300.0);
        let at_rest = shade_traced(centre, &uniforms(800.0, 600.0, 1.0, Vec2::ZERO), &colors);
        let moved = shade_traced(
            centre,
            &uniforms(800.0, 600.0, 1.0, Vec2::new(0.6, 0.8)),
            &colors,
        );
        assert_eq!(at_rest.distance, 0.0);
        assert!((moved.distance - 1.0).abs() < 1e-6);
        assert_eq!(at_rest.palette, moved.palette);
    }
}
