use wavefield::{ShadingProgram, Vec2, WaveProgram};

use crate::runtime::RenderPolicy;

/// Which rasterizer evaluates the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderBackend {
    /// Evaluate every pixel on CPU worker threads.
    #[default]
    Cpu,
    /// Compile the program's GLSL and draw it through `wgpu`.
    Gpu,
}

impl std::fmt::Display for RenderBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderBackend::Cpu => f.write_str("cpu"),
            RenderBackend::Gpu => f.write_str("gpu"),
        }
    }
}

/// Output color handling for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorSpaceMode {
    /// Same as `Gamma`: shader outputs are already display values.
    #[default]
    Auto,
    /// Treat shader outputs as gamma-encoded; use non-sRGB surfaces.
    Gamma,
    /// Treat shader outputs as linear and apply the sRGB transfer curve.
    Linear,
}

/// How the renderer should present frames.
///
/// * `Windowed` opens an interactive preview driven by `winit`; pointer
///   movement inside the window feeds the `pointer` uniform.
/// * `Headless` never touches a display and only supports still export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Windowed,
    Headless,
}

/// Immutable configuration passed to the renderer at start-up.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Window or export size in physical pixels.
    pub surface_size: (u32, u32),
    /// Material to render.
    pub program: Box<dyn ShadingProgram>,
    pub mode: RenderMode,
    pub backend: RenderBackend,
    pub color_space: ColorSpaceMode,
    /// High-level render behaviour requested by the caller.
    pub policy: RenderPolicy,
    /// Pointer used until the first cursor event (and for exports).
    pub pointer: Vec2,
}

impl Default for RendererConfig {
    /// A 1080p animated preview of the default wave material.
    fn default() -> Self {
        Self {
            surface_size: (1920, 1080),
            program: Box::new(WaveProgram::default()),
            mode: RenderMode::Windowed,
            backend: RenderBackend::default(),
            color_space: ColorSpaceMode::default(),
            policy: RenderPolicy::default(),
            pointer: Vec2::ZERO,
        }
    }
}
