use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use image::RgbaImage;
use wavefield::{FrameUniforms, Resolution};

use crate::cpu::CpuRasterizer;
use crate::gpu::GpuOffscreen;
use crate::runtime::{ExportFormat, RenderPolicy};
use crate::types::{RenderBackend, RendererConfig};

/// Renders one frame of `config.program` at `time` with the configured backend.
pub fn render_image(config: &RendererConfig, time: f32) -> Result<RgbaImage> {
    let (width, height) = config.surface_size;
    let resolution = Resolution::from_pixels(width, height)
        .with_context(|| format!("cannot render a {width}x{height} frame"))?;
    let uniforms = FrameUniforms::new(resolution)
        .with_time(time)
        .with_pointer(config.pointer);

    match config.backend {
        RenderBackend::Cpu => {
            let rasterizer = CpuRasterizer::new();
            tracing::debug!(threads = rasterizer.threads(), "rendering on CPU");
            let frame = rasterizer.render(config.program.as_ref(), &uniforms, width, height);
            Ok(frame.to_rgba8(config.color_space))
        }
        RenderBackend::Gpu => GpuOffscreen::new(config.color_space)?.render(
            config.program.as_ref(),
            &uniforms,
            width,
            height,
        ),
    }
}

/// Writes `image` to `path`, creating parent directories as needed.
pub fn write_image(image: &RgbaImage, path: &Path, format: ExportFormat) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    let image_format = match format {
        ExportFormat::Png => image::ImageFormat::Png,
    };
    image
        .save_with_format(path, image_format)
        .with_context(|| format!("failed to write {}", path.display()))
}

/// Renders and saves the still frame described by an export policy.
pub fn export_still(config: &RendererConfig) -> Result<PathBuf> {
    let RenderPolicy::Export { time, path, format } = &config.policy else {
        bail!("still export requires an export render policy");
    };
    let image = render_image(config, *time)?;
    write_image(&image, path, *format)?;
    tracing::info!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        backend = %config.backend,
        "exported still frame"
    );
    Ok(path.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RenderMode;

    fn cpu_config(policy: RenderPolicy) -> RendererConfig {
        RendererConfig {
            surface_size: (24, 16),
            mode: RenderMode::Headless,
            backend: RenderBackend::Cpu,
            policy,
            ..RendererConfig::default()
        }
    }

    #[test]
    fn cpu_export_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("frame.png");
        let config = cpu_config(RenderPolicy::Export {
            time: 1.0,
            path: path.clone(),
            format: ExportFormat::Png,
        });

        let written = export_still(&config).unwrap();
        assert_eq!(written, path);
        let decoded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (24, 16));
        assert!(decoded.pixels().all(|pixel| pixel.0[3] == 255));
    }

    #[test]
    fn export_requires_export_policy() {
        let config = cpu_config(RenderPolicy::Still { time: 0.0 });
        assert!(export_still(&config).is_err());
    }

    #[test]
    fn zero_sized_render_is_an_error() {
        let mut config = cpu_config(RenderPolicy::default());
        config.surface_size = (0, 16);
        assert!(render_image(&config, 0.0).is_err());
    }
}
