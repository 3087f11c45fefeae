use anyhow::{anyhow, bail, Context as AnyhowContext, Result};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use winit::dpi::PhysicalSize;

use crate::types::ColorSpaceMode;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SurfaceColorSpace {
    Gamma,
    Linear,
}

impl From<ColorSpaceMode> for SurfaceColorSpace {
    fn from(mode: ColorSpaceMode) -> Self {
        match mode {
            ColorSpaceMode::Auto | ColorSpaceMode::Gamma => SurfaceColorSpace::Gamma,
            ColorSpaceMode::Linear => SurfaceColorSpace::Linear,
        }
    }
}

impl SurfaceColorSpace {
    /// Texture format for offscreen targets in this color space.
    pub fn offscreen_format(self) -> wgpu::TextureFormat {
        match self {
            SurfaceColorSpace::Gamma => wgpu::TextureFormat::Rgba8Unorm,
            SurfaceColorSpace::Linear => wgpu::TextureFormat::Rgba8UnormSrgb,
        }
    }
}

fn create_instance() -> wgpu::Instance {
    wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        flags: wgpu::InstanceFlags::default(),
        memory_budget_thresholds: wgpu::MemoryBudgetThresholds::default(),
        backend_options: wgpu::BackendOptions::default(),
    })
}

/// Adapter, device and queue shared by the windowed and offscreen paths.
pub(crate) struct GpuDevice {
    pub _instance: wgpu::Instance,
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl GpuDevice {
    /// Opens a device with no presentation surface.
    pub(crate) fn headless() -> Result<Self> {
        let instance = create_instance();
        Self::open(instance, None)
    }

    fn open(instance: wgpu::Instance, surface: Option<&wgpu::Surface<'_>>) -> Result<Self> {
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: surface,
            force_fallback_adapter: false,
        }))
        .context("failed to find a suitable GPU adapter")?;

        let info = adapter.get_info();
        tracing::debug!(
            name = %info.name,
            backend = ?info.backend,
            device_type = ?info.device_type,
            "selected GPU adapter"
        );

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("wavepaper device"),
            required_features: wgpu::Features::empty(),
            required_limits: adapter.limits(),
            memory_hints: wgpu::MemoryHints::MemoryUsage,
            trace: wgpu::Trace::default(),
        }))
        .context("failed to create GPU device")?;

        Ok(Self {
            _instance: instance,
            adapter,
            device,
            queue,
        })
    }

    /// Fails when `width` x `height` exceeds the adapter's texture limit.
    pub(crate) fn check_dimensions(&self, width: u32, height: u32) -> Result<()> {
        let max_dimension = self.device.limits().max_texture_dimension_2d;
        if width > max_dimension || height > max_dimension {
            bail!(
                "GPU max texture dimension is {max_dimension}, requested target is {width}x{height}"
            );
        }
        Ok(())
    }
}

/// A window surface plus the device that presents to it.
pub(crate) struct SurfaceContext {
    pub surface: wgpu::Surface<'static>,
    pub gpu: GpuDevice,
    pub config: wgpu::SurfaceConfiguration,
    pub size: PhysicalSize<u32>,
}

impl SurfaceContext {
    pub(crate) fn new<T>(
        target: &T,
        initial_size: PhysicalSize<u32>,
        color_space: ColorSpaceMode,
    ) -> Result<Self>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let instance = create_instance();

        let window_handle = target
            .window_handle()
            .map_err(|err| anyhow!("failed to acquire window handle: {err}"))?;
        let display_handle = target
            .display_handle()
            .map_err(|err| anyhow!("failed to acquire display handle: {err}"))?;

        // The window outlives the surface: `WindowState` drops its GPU state first.
        let surface = unsafe {
            instance.create_surface_unsafe(wgpu::SurfaceTargetUnsafe::RawHandle {
                raw_display_handle: display_handle.as_raw(),
                raw_window_handle: window_handle.as_raw(),
            })
        }
        .context("failed to create rendering surface")?;

        let gpu = GpuDevice::open(instance, Some(&surface))?;
        let size = PhysicalSize::new(initial_size.width.max(1), initial_size.height.max(1));
        gpu.check_dimensions(size.width, size.height)?;

        let caps = surface.get_capabilities(&gpu.adapter);
        let format = select_surface_format(&caps.formats, color_space.into())?;
        let present_mode = caps
            .present_modes
            .iter()
            .copied()
            .find(|mode| *mode == wgpu::PresentMode::Fifo)
            .or_else(|| caps.present_modes.first().copied())
            .unwrap_or(wgpu::PresentMode::Fifo);
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        tracing::debug!(?format, ?present_mode, "configuring surface");

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&gpu.device, &config);

        Ok(Self {
            surface,
            gpu,
            config,
            size,
        })
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }

        self.size = new_size;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.gpu.device, &self.config);
    }

    pub(crate) fn reconfigure(&self) {
        self.surface.configure(&self.gpu.device, &self.config);
    }
}

/// Picks an sRGB format for linear output and a non-sRGB one otherwise.
pub(crate) fn select_surface_format(
    formats: &[wgpu::TextureFormat],
    color_space: SurfaceColorSpace,
) -> Result<wgpu::TextureFormat> {
    let wants_srgb = color_space == SurfaceColorSpace::Linear;
    if let Some(format) = formats
        .iter()
        .copied()
        .find(|format| format.is_srgb() == wants_srgb)
    {
        return Ok(format);
    }
    let fallback = formats
        .first()
        .copied()
        .context("surface reports no supported formats")?;
    tracing::warn!(
        ?fallback,
        ?color_space,
        "no matching surface format available; falling back"
    );
    Ok(fallback)
}
