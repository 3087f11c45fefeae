//! Procedural wave material: a pointer-reactive, animated four-color field.
//!
//! The crate is split the same way a host consumes it:
//!
//! - [`shade`] holds the pure per-pixel evaluator and its three building
//!   blocks (quadrant blending, wave distortion, cosine palette).
//! - [`program`] wraps the evaluator in the [`ShadingProgram`] capability that
//!   hosts render through, together with its uniform schema.
//! - [`registry`] is the explicit material table hosts populate at start-up.
//! - [`glsl`] carries the GPU rendition of the same program.
//!
//! No I/O happens here; the `renderer` crate owns rasterization and output.

mod color;
pub mod glsl;
mod math;
pub mod program;
pub mod registry;
pub mod shade;
mod uniforms;

pub use color::{BaseColors, ColorParseError, ColorSlot, Rgb, Rgba};
pub use math::{Vec2, Vec3};
pub use program::{
    MaterialBlock, ShadingProgram, UniformDescriptor, UniformKind, UpdateCadence, WaveProgram,
};
pub use registry::{register_builtin_materials, MaterialRegistry, RegistryError};
pub use shade::{shade, shade_traced, ShadeTrace};
pub use uniforms::{FrameUniforms, Resolution, UniformError};
