use anyhow::{anyhow, Context, Result};
use image::RgbaImage;
use wavefield::{FrameUniforms, ShadingProgram};

use super::context::{GpuDevice, SurfaceColorSpace};
use super::pipeline::WavePipeline;
use super::uniforms::WaveUniforms;
use crate::types::ColorSpaceMode;

const BYTES_PER_PIXEL: u32 = 4;

/// Renders programs into a texture and reads the pixels back.
pub struct GpuOffscreen {
    gpu: GpuDevice,
    format: wgpu::TextureFormat,
}

impl GpuOffscreen {
    pub fn new(color_space: ColorSpaceMode) -> Result<Self> {
        let gpu = GpuDevice::headless()?;
        let format = SurfaceColorSpace::from(color_space).offscreen_format();
        Ok(Self { gpu, format })
    }

    /// Draws one frame of `program` at `width` x `height` pixels.
    pub fn render(
        &self,
        program: &dyn ShadingProgram,
        uniforms: &FrameUniforms,
        width: u32,
        height: u32,
    ) -> Result<RgbaImage> {
        if width == 0 || height == 0 {
            return Err(anyhow!("cannot render a {width}x{height} frame"));
        }
        self.gpu.check_dimensions(width, height)?;
        let device = &self.gpu.device;

        let pipeline = WavePipeline::new(device, program, self.format)?;
        pipeline.write_uniforms(
            &self.gpu.queue,
            &WaveUniforms::new(uniforms, &program.material_block()),
        );

        let extent = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("offscreen color target"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let unpadded_bytes_per_row = width * BYTES_PER_PIXEL;
        let padded_bytes_per_row = padded_row_size(unpadded_bytes_per_row);
        let readback = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("offscreen readback"),
            size: padded_bytes_per_row as u64 * height as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("offscreen encoder"),
        });
        pipeline.encode(&mut encoder, &view);
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            extent,
        );
        self.gpu.queue.submit(Some(encoder.finish()));

        let slice = readback.slice(..);
        let (sender, receiver) = crossbeam_channel::bounded(1);
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        device
            .poll(wgpu::PollType::Wait)
            .map_err(|err| anyhow!("failed waiting for the GPU: {err:?}"))?;
        receiver
            .recv()
            .map_err(|_| anyhow!("failed receiving GPU map callback"))?
            .context("GPU buffer mapping failed")?;

        let mapped = slice.get_mapped_range();
        let pixels = tight_rows(
            &mapped,
            unpadded_bytes_per_row as usize,
            padded_bytes_per_row as usize,
            height as usize,
        );
        drop(mapped);
        readback.unmap();

        tracing::debug!(width, height, format = ?self.format, "read back offscreen frame");
        RgbaImage::from_raw(width, height, pixels)
            .context("readback buffer does not match the frame size")
    }
}

fn padded_row_size(unpadded: u32) -> u32 {
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

/// Strips the per-row alignment padding from a readback buffer.
fn tight_rows(padded: &[u8], unpadded_row: usize, padded_row: usize, rows: usize) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(unpadded_row * rows);
    for row in padded.chunks(padded_row).take(rows) {
        pixels.extend_from_slice(&row[..unpadded_row.min(row.len())]);
    }
    pixels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_padded_to_copy_alignment() {
        assert_eq!(padded_row_size(4), 256);
        assert_eq!(padded_row_size(256), 256);
        assert_eq!(padded_row_size(800 * 4), 3328);
    }

    #[test]
    fn gpu_frame_matches_cpu_rasterizer() {
        use crate::cpu::CpuRasterizer;
        use wavefield::{Resolution, Vec2, WaveProgram};

        let offscreen = match GpuOffscreen::new(ColorSpaceMode::Gamma) {
            Ok(offscreen) => offscreen,
            Err(err) => {
                eprintln!("skipping GPU comparison, no adapter available: {err:#}");
                return;
            }
        };
        let (width, height) = (64, 48);
        let program = WaveProgram::default();
        let uniforms = FrameUniforms::new(Resolution::from_pixels(width, height).unwrap())
            .with_time(2.5)
            .with_pointer(Vec2::new(0.25, -0.5));

        let gpu = offscreen.render(&program, &uniforms, width, height).unwrap();
        let cpu = CpuRasterizer::new()
            .render(&program, &uniforms, width, height)
            .to_rgba8(ColorSpaceMode::Gamma);
        assert_eq!(gpu.dimensions(), cpu.dimensions());

        // Hardware trig may differ from libm in the last bits; a handful of
        // pixels on a ring crest can round differently.
        let mismatched = gpu
            .pixels()
            .zip(cpu.pixels())
            .filter(|(g, c)| g.0.iter().zip(c.0.iter()).any(|(a, b)| a.abs_diff(*b) > 2))
            .count();
        let total = (width * height) as usize;
        assert!(
            mismatched * 100 <= total,
            "{mismatched} of {total} pixels differ between GPU and CPU"
        );
    }

    #[test]
    fn padding_is_stripped() {
        let mut padded = vec![0u8; 16];
        padded[..3].copy_from_slice(&[1, 2, 3]);
        padded[8..11].copy_from_slice(&[4, 5, 6]);
        assert_eq!(tight_rows(&padded, 3, 8, 2), vec![1, 2, 3, 4, 5, 6]);
    }
}
