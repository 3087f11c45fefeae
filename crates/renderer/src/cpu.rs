use anyhow::{Context, Result};
use wavefield::{FrameUniforms, Resolution, Rgba, ShadingProgram, Vec2};

use crate::frame::FrameBuffer;

/// Evaluates a shading program for every pixel on scoped worker threads.
///
/// The image is split into horizontal bands of whole rows; each thread owns
/// one band of the output buffer so no synchronisation is needed.
#[derive(Debug, Clone, Copy)]
pub struct CpuRasterizer {
    threads: usize,
}

impl Default for CpuRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuRasterizer {
    /// Uses one worker per available core.
    pub fn new() -> Self {
        let threads = std::thread::available_parallelism()
            .map(|count| count.get())
            .unwrap_or(1);
        Self::with_threads(threads)
    }

    pub fn with_threads(threads: usize) -> Self {
        Self {
            threads: threads.max(1),
        }
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Renders a `width` x `height` frame.
    ///
    /// The resolution carried by `uniforms` is used for shading, so callers
    /// may render a thumbnail of a larger surface. Row 0 of the result is the
    /// top of the image; pixel centers are passed to the program with a
    /// bottom-left origin.
    pub fn render(
        &self,
        program: &dyn ShadingProgram,
        uniforms: &FrameUniforms,
        width: u32,
        height: u32,
    ) -> FrameBuffer {
        let row_len = width as usize;
        let rows = height as usize;
        let mut pixels = vec![Rgba::BLACK; row_len * rows];
        if pixels.is_empty() {
            return FrameBuffer::from_pixels(width, height, pixels);
        }

        let workers = self.threads.min(rows);
        let band_rows = rows.div_ceil(workers);
        let frame_height = height as f32;

        std::thread::scope(|scope| {
            for (band, chunk) in pixels.chunks_mut(band_rows * row_len).enumerate() {
                scope.spawn(move || {
                    let first_row = band * band_rows;
                    for (offset, row) in chunk.chunks_mut(row_len).enumerate() {
                        let y = frame_height - (first_row + offset) as f32 - 0.5;
                        for (x, pixel) in row.iter_mut().enumerate() {
                            let frag_coord = Vec2::new(x as f32 + 0.5, y);
                            *pixel = program.shade(frag_coord, uniforms);
                        }
                    }
                });
            }
        });

        tracing::trace!(width, height, workers, "rasterized frame on CPU");
        FrameBuffer::from_pixels(width, height, pixels)
    }

    /// Renders a frame whose shading resolution matches its pixel size.
    pub fn render_at(
        &self,
        program: &dyn ShadingProgram,
        width: u32,
        height: u32,
        time: f32,
        pointer: Vec2,
    ) -> Result<FrameBuffer> {
        let resolution = Resolution::from_pixels(width, height)
            .with_context(|| format!("cannot render a {width}x{height} frame"))?;
        let uniforms = FrameUniforms::new(resolution)
            .with_time(time)
            .with_pointer(pointer);
        Ok(self.render(program, &uniforms, width, height))
    }
}
