//! The `ShadingProgram` capability and the wave material that implements it.
//!
//! A host renders any program the same way: it asks for the uniform schema
//! once, writes the frame uniforms every frame, and either calls
//! [`ShadingProgram::shade`] per pixel (CPU) or compiles the GLSL sources and
//! uploads [`ShadingProgram::material_block`] next to the frame uniforms (GPU).

use std::fmt;

use crate::color::{BaseColors, ColorSlot, Rgb, Rgba};
use crate::glsl;
use crate::math::Vec2;
use crate::shade::shade;
use crate::uniforms::FrameUniforms;

/// Shape of a uniform as seen by the shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformKind {
    Float,
    Vec2,
    Color3,
}

/// How often the host is expected to refresh a uniform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateCadence {
    EveryFrame,
    OnResize,
    OnPointerMove,
    Configuration,
}

/// One entry of a program's uniform schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformDescriptor {
    pub name: &'static str,
    pub kind: UniformKind,
    pub cadence: UpdateCadence,
    /// Hosts must supply a value before shading.
    pub required: bool,
    /// The host may seed the value from a built-in default (zero pointer,
    /// default base colors) until it has its own.
    pub has_default: bool,
}

impl UniformDescriptor {
    const fn new(
        name: &'static str,
        kind: UniformKind,
        cadence: UpdateCadence,
        has_default: bool,
    ) -> Self {
        Self {
            name,
            kind,
            cadence,
            required: true,
            has_default,
        }
    }
}

/// Per-material uniform values a GPU host packs after the frame uniforms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialBlock {
    pub colors: [[f32; 3]; 4],
}

/// A procedural material a host can rasterize.
pub trait ShadingProgram: Send + Sync {
    /// Registry name of the program.
    fn name(&self) -> &'static str;

    fn uniform_schema(&self) -> &'static [UniformDescriptor];

    /// Evaluates one fragment. Must be pure.
    fn shade(&self, frag_coord: Vec2, uniforms: &FrameUniforms) -> Rgba;

    fn vertex_glsl(&self) -> &'static str;

    fn fragment_glsl(&self) -> &'static str;

    fn material_block(&self) -> MaterialBlock;

    /// Replaces the configurable base colors.
    fn set_colors(&mut self, colors: BaseColors);

    fn box_clone(&self) -> Box<dyn ShadingProgram>;
}

impl Clone for Box<dyn ShadingProgram> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

impl fmt::Debug for dyn ShadingProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShadingProgram")
            .field("name", &self.name())
            .finish()
    }
}

const WAVE_SCHEMA: [UniformDescriptor; 7] = [
    UniformDescriptor::new("time", UniformKind::Float, UpdateCadence::EveryFrame, false),
    UniformDescriptor::new(
        "resolution",
        UniformKind::Vec2,
        UpdateCadence::OnResize,
        false,
    ),
    UniformDescriptor::new(
        "pointer",
        UniformKind::Vec2,
        UpdateCadence::OnPointerMove,
        true,
    ),
    UniformDescriptor::new(
        "color1",
        UniformKind::Color3,
        UpdateCadence::Configuration,
        true,
    ),
    UniformDescriptor::new(
        "color2",
        UniformKind::Color3,
        UpdateCadence::Configuration,
        true,
    ),
    UniformDescriptor::new(
        "color3",
        UniformKind::Color3,
        UpdateCadence::Configuration,
        true,
    ),
    UniformDescriptor::new(
        "color4",
        UniformKind::Color3,
        UpdateCadence::Configuration,
        true,
    ),
];

/// The pointer-reactive four-color wave material.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WaveProgram {
    colors: BaseColors,
}

impl WaveProgram {
    pub const NAME: &'static str = "wave";

    pub fn new(colors: BaseColors) -> Self {
        Self { colors }
    }

    pub fn colors(&self) -> &BaseColors {
        &self.colors
    }

    pub fn set_colors(&mut self, colors: BaseColors) {
        self.colors = colors;
    }

    pub fn set_color(&mut self, slot: ColorSlot, color: Rgb) {
        self.colors.set(slot, color);
    }
}

impl ShadingProgram for WaveProgram {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn uniform_schema(&self) -> &'static [UniformDescriptor] {
        &WAVE_SCHEMA
    }

    fn shade(&self, frag_coord: Vec2, uniforms: &FrameUniforms) -> Rgba {
        shade(frag_coord, uniforms, &self.colors)
    }

    fn vertex_glsl(&self) -> &'static str {
        glsl::FULLSCREEN_VERTEX
    }

    fn fragment_glsl(&self) -> &'static str {
        glsl::WAVE_FRAGMENT
    }

    fn material_block(&self) -> MaterialBlock {
        MaterialBlock {
            colors: ColorSlot::ALL.map(|slot| self.colors.get(slot).to_array()),
        }
    }

    fn set_colors(&mut self, colors: BaseColors) {
        self.colors = colors;
    }

    fn box_clone(&self) -> Box<dyn ShadingProgram> {
        Box::new(self.clone())
    }
}
