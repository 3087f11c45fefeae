use anyhow::Result;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use wavefield::{FrameUniforms, MaterialBlock, ShadingProgram};
use winit::dpi::PhysicalSize;

use super::context::SurfaceContext;
use super::pipeline::WavePipeline;
use super::uniforms::WaveUniforms;
use crate::types::ColorSpaceMode;

/// Everything needed to draw a shading program into a window surface.
pub(crate) struct GpuState {
    context: SurfaceContext,
    pipeline: WavePipeline,
    uniforms: WaveUniforms,
}

impl GpuState {
    pub(crate) fn new<T>(
        target: &T,
        initial_size: PhysicalSize<u32>,
        program: &dyn ShadingProgram,
        frame: &FrameUniforms,
        color_space: ColorSpaceMode,
    ) -> Result<Self>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let context = SurfaceContext::new(target, initial_size, color_space)?;
        let pipeline = WavePipeline::new(&context.gpu.device, program, context.config.format)?;
        let mut uniforms = WaveUniforms::new(frame, &program.material_block());
        uniforms.set_resolution(context.size.width, context.size.height);
        pipeline.write_uniforms(&context.gpu.queue, &uniforms);
        tracing::info!(
            width = context.size.width,
            height = context.size.height,
            program = program.name(),
            "initialised GPU surface"
        );

        Ok(Self {
            context,
            pipeline,
            uniforms,
        })
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.context.size
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.context.resize(new_size);
        self.uniforms
            .set_resolution(self.context.size.width, self.context.size.height);
    }

    pub(crate) fn set_material(&mut self, material: &MaterialBlock) {
        self.uniforms.set_material(material);
    }

    /// Draws and presents one frame at `time` seconds.
    pub(crate) fn render(
        &mut self,
        time: f32,
        pointer: [f32; 2],
    ) -> Result<(), wgpu::SurfaceError> {
        let frame = self.context.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.uniforms.set_time(time);
        self.uniforms.set_pointer(pointer);
        self.pipeline
            .write_uniforms(&self.context.gpu.queue, &self.uniforms);

        let mut encoder =
            self.context
                .gpu
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("render encoder"),
                });
        self.pipeline.encode(&mut encoder, &view);
        self.context.gpu.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }

    /// Recovers from a lost or outdated swapchain.
    pub(crate) fn reconfigure(&self) {
        self.context.reconfigure();
    }
}
