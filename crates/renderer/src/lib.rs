//! Host side of the wavepaper material: rasterization, preview and export.
//!
//! The flow mirrors how the CLI drives it:
//!
//! ```text
//!   CLI / wavepaper
//!          │ RendererConfig
//!          ▼
//!   Renderer::run ──▶ Headless ──▶ export::export_still ──▶ CpuRasterizer | GpuOffscreen ──▶ PNG
//!          │
//!          └────────▶ Windowed ──▶ PreviewHandle ──▶ winit event loop ──▶ GpuState
//! ```
//!
//! The CPU path calls [`wavefield::ShadingProgram::shade`] for every pixel
//! center; the GPU path compiles the program's GLSL stages. Both place the
//! fragment origin at the bottom-left corner so they agree pixel for pixel.

mod compile;
pub mod cpu;
pub mod export;
pub mod frame;
mod gpu;
pub mod input;
pub mod runtime;
mod types;
mod window;

use anyhow::{bail, Result};

pub use cpu::CpuRasterizer;
pub use export::{export_still, render_image, write_image};
pub use frame::FrameBuffer;
pub use gpu::GpuOffscreen;
pub use input::{normalize_pointer, PointerState};
pub use runtime::{
    time_source_for_policy, ExportFormat, FixedTimeSource, FrameScheduler, RenderPolicy,
    SystemTimeSource, TimeSample, TimeSource,
};
pub use types::{ColorSpaceMode, RenderBackend, RenderMode, RendererConfig};
pub use window::{PreviewCommand, PreviewHandle};

/// Thin entry point that picks the presentation path for a configuration.
pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Runs to completion: exports the still frame, or blocks until the
    /// preview window closes.
    pub fn run(&mut self) -> Result<()> {
        match self.config.mode {
            RenderMode::Headless => {
                export_still(&self.config)?;
                Ok(())
            }
            RenderMode::Windowed => self.spawn_preview()?.wait(),
        }
    }

    /// Opens the preview window on its own thread and returns a handle to it.
    ///
    /// The CPU backend cannot present to a window, so the preview always
    /// draws through the GPU.
    pub fn spawn_preview(&self) -> Result<PreviewHandle> {
        if self.config.mode != RenderMode::Windowed {
            bail!("preview requires windowed mode");
        }
        let mut config = self.config.clone();
        if config.backend == RenderBackend::Cpu {
            tracing::warn!("the CPU backend cannot drive a window; previewing on the GPU");
            config.backend = RenderBackend::Gpu;
        }
        PreviewHandle::spawn(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_is_rejected_in_headless_mode() {
        let renderer = Renderer::new(RendererConfig {
            mode: RenderMode::Headless,
            ..RendererConfig::default()
        });
        assert!(renderer.spawn_preview().is_err());
    }

    #[test]
    fn default_config_previews_the_wave_material() {
        let renderer = Renderer::new(RendererConfig::default());
        assert_eq!(renderer.config().program.name(), "wave");
        assert_eq!(renderer.config().mode, RenderMode::Windowed);
        assert_eq!(renderer.config().policy, RenderPolicy::default());
    }
}
