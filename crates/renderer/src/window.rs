use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use anyhow::{anyhow, Result};
use crossbeam_channel::{bounded, Sender};
use wavefield::{FrameUniforms, MaterialBlock, Resolution};
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoopBuilder, EventLoopProxy};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowBuilder};

use tracing::{error, info, warn};

use crate::gpu::GpuState;
use crate::input::PointerState;
use crate::runtime::{time_source_for_policy, BoxedTimeSource, FrameScheduler};
use crate::types::RendererConfig;

/// Messages the owning thread can send to a running preview.
#[derive(Debug, Clone)]
pub enum PreviewCommand {
    /// Replace the material uniforms (base colors) without rebuilding the pipeline.
    SetMaterial(MaterialBlock),
    Shutdown,
}

/// Aggregates GPU state for the windowed preview path.
///
/// `gpu` is declared before `window` so the surface is dropped first.
struct WindowState {
    gpu: GpuState,
    window: Arc<Window>,
    pointer: PointerState,
}

impl WindowState {
    fn new(window: Arc<Window>, config: &RendererConfig) -> Result<Self> {
        let size = window.inner_size();
        let resolution = Resolution::from_pixels(size.width.max(1), size.height.max(1))?;
        let frame = FrameUniforms::new(resolution).with_pointer(config.pointer);
        let gpu = GpuState::new(
            window.as_ref(),
            size,
            config.program.as_ref(),
            &frame,
            config.color_space,
        )?;
        Ok(Self {
            gpu,
            window,
            pointer: PointerState::new(config.pointer),
        })
    }

    fn window(&self) -> &Window {
        self.window.as_ref()
    }

    fn render_frame(&mut self, time: f32) -> Result<(), wgpu::SurfaceError> {
        self.gpu.render(time, self.pointer.position().into())
    }
}

/// Handle to an interactive preview running on its own thread.
pub struct PreviewHandle {
    proxy: EventLoopProxy<PreviewCommand>,
    running: Arc<AtomicBool>,
    join_handle: Option<JoinHandle<Result<()>>>,
}

impl PreviewHandle {
    /// Opens the preview window and blocks until the GPU is ready.
    pub fn spawn(config: RendererConfig) -> Result<Self> {
        let (ready_tx, ready_rx) = bounded(1);
        let running = Arc::new(AtomicBool::new(true));
        let thread_running = Arc::clone(&running);
        let handle = thread::Builder::new()
            .name("wavepaper-window".into())
            .spawn(move || {
                let result = run_window_thread(config, ready_tx);
                thread_running.store(false, Ordering::Release);
                result
            })
            .map_err(|err| anyhow!("failed to spawn window thread: {err}"))?;

        let proxy = ready_rx
            .recv()
            .map_err(|err| anyhow!("window thread failed to initialise: {err}"))??;

        Ok(Self {
            proxy,
            running,
            join_handle: Some(handle),
        })
    }

    /// Whether the preview window is still open.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn set_material(&self, material: MaterialBlock) -> Result<()> {
        self.proxy
            .send_event(PreviewCommand::SetMaterial(material))
            .map_err(|err| anyhow!("preview window is closed: {err}"))
    }

    /// Waits for the user to close the window.
    pub fn wait(mut self) -> Result<()> {
        self.join()
    }

    fn join(&mut self) -> Result<()> {
        if let Some(handle) = self.join_handle.take() {
            handle
                .join()
                .map_err(|err| anyhow!("window thread panicked: {err:?}"))??;
        }
        Ok(())
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        if let Some(handle) = self.join_handle.take() {
            let _ = self.proxy.send_event(PreviewCommand::Shutdown);
            let _ = handle.join();
        }
    }
}

struct PolicyDriver {
    scheduler: FrameScheduler,
    time_source: BoxedTimeSource,
}

fn is_escape(event: &KeyEvent) -> bool {
    event.state == ElementState::Pressed
        && matches!(event.logical_key, Key::Named(NamedKey::Escape))
}

fn run_window_thread(
    config: RendererConfig,
    ready_tx: Sender<Result<EventLoopProxy<PreviewCommand>>>,
) -> Result<()> {
    let mut builder = EventLoopBuilder::<PreviewCommand>::with_user_event();
    #[cfg(any(target_os = "linux", target_os = "android"))]
    {
        use winit::platform::wayland::EventLoopBuilderExtWayland;
        EventLoopBuilderExtWayland::with_any_thread(&mut builder, true);
    }

    #[cfg(any(
        target_os = "freebsd",
        target_os = "openbsd",
        target_os = "netbsd",
        target_os = "dragonfly"
    ))]
    {
        use winit::platform::x11::EventLoopBuilderExtX11;
        EventLoopBuilderExtX11::with_any_thread(&mut builder, true);
    }
    let event_loop = match builder.build() {
        Ok(event_loop) => event_loop,
        Err(err) => {
            let message = format!("failed to create event loop: {err}");
            let _ = ready_tx.send(Err(anyhow!(message.clone())));
            return Err(anyhow!(message));
        }
    };
    let proxy = event_loop.create_proxy();

    let window_size = PhysicalSize::new(config.surface_size.0, config.surface_size.1);
    let window = match WindowBuilder::new()
        .with_title(format!("wavepaper: {}", config.program.name()))
        .with_inner_size(window_size)
        .build(&event_loop)
    {
        Ok(window) => Arc::new(window),
        Err(err) => {
            let message = format!("failed to create preview window: {err}");
            let _ = ready_tx.send(Err(anyhow!(message.clone())));
            return Err(anyhow!(message));
        }
    };

    let mut state = match WindowState::new(window, &config) {
        Ok(state) => state,
        Err(err) => {
            let wrapped = anyhow!("failed to initialise window renderer: {err}");
            let message = wrapped.to_string();
            let _ = ready_tx.send(Err(anyhow!(message)));
            return Err(wrapped);
        }
    };

    let mut driver = PolicyDriver {
        scheduler: FrameScheduler::for_policy(&config.policy),
        time_source: time_source_for_policy(&config.policy),
    };
    info!(
        program = config.program.name(),
        policy = ?config.policy,
        "preview window ready"
    );
    state.window().request_redraw();

    let _ = ready_tx.send(Ok(proxy));

    let run_result = event_loop.run(move |event, elwt| match event {
        Event::UserEvent(command) => match command {
            PreviewCommand::SetMaterial(material) => {
                state.gpu.set_material(&material);
                driver.scheduler.invalidate();
                state.window().request_redraw();
            }
            PreviewCommand::Shutdown => elwt.exit(),
        },
        Event::WindowEvent { window_id, event } if window_id == state.window().id() => {
            match event {
                WindowEvent::CloseRequested | WindowEvent::Destroyed => elwt.exit(),
                WindowEvent::KeyboardInput { event, .. } if is_escape(&event) => elwt.exit(),
                WindowEvent::CursorMoved { position, .. } => {
                    if state.pointer.update(position, state.gpu.size()) {
                        driver.scheduler.invalidate();
                    }
                }
                WindowEvent::Resized(new_size) => {
                    state.gpu.resize(new_size);
                    driver.scheduler.invalidate();
                }
                WindowEvent::ScaleFactorChanged {
                    mut inner_size_writer,
                    ..
                } => {
                    let _ = inner_size_writer.request_inner_size(state.gpu.size());
                }
                WindowEvent::RedrawRequested => {
                    let sample = driver.time_source.sample();
                    match state.render_frame(sample.seconds) {
                        Ok(()) => {
                            tracing::trace!(
                                frame = sample.frame_index,
                                time = sample.seconds,
                                "presented preview frame"
                            );
                            driver.scheduler.mark_rendered(Instant::now());
                        }
                        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                            state.gpu.reconfigure();
                            driver.scheduler.invalidate();
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            error!("surface out of memory; exiting preview");
                            elwt.exit();
                        }
                        Err(wgpu::SurfaceError::Timeout) => {
                            warn!("surface timeout; retrying next frame");
                        }
                        Err(other) => {
                            warn!("surface error: {other:?}; retrying next frame");
                        }
                    }
                }
                _ => {}
            }
        }
        Event::AboutToWait => {
            let now = Instant::now();
            if driver.scheduler.ready_for_frame(now) {
                tracing::trace!("scheduler: issuing redraw now");
                state.window().request_redraw();
                elwt.set_control_flow(ControlFlow::Wait);
            } else if let Some(deadline) = driver.scheduler.next_deadline() {
                elwt.set_control_flow(ControlFlow::WaitUntil(deadline));
            } else {
                elwt.set_control_flow(ControlFlow::Wait);
            }
        }
        _ => {}
    });

    run_result.map_err(|err| anyhow!("window event loop error: {err}"))
}
