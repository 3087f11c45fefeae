use std::fs;
use std::path::Path;
use std::thread;
use std::time::{Duration, SystemTime};

use anyhow::{bail, Context, Result};
use renderer::{ExportFormat, PreviewHandle, RenderMode, RenderPolicy, Renderer, RendererConfig};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use wavefield::{
    register_builtin_materials, shade_traced, FrameUniforms, MaterialRegistry, Resolution,
    ShadeTrace, ShadingProgram, Vec2,
};

use crate::cli::{Cli, Command, ConfigAction, ProbeArgs, RunArgs};
use crate::config::AppConfig;
use crate::paths::AppPaths;

const CONFIG_POLL_INTERVAL: Duration = Duration::from_millis(500);

pub fn run(cli: Cli) -> Result<()> {
    initialise_tracing();

    let paths = AppPaths::discover()?;
    let config_path = cli
        .run
        .config
        .clone()
        .unwrap_or_else(|| paths.config_file());
    tracing::debug!(
        config_dir = %paths.config_dir().display(),
        config = %config_path.display(),
        "resolved wavepaper paths"
    );

    match cli.command {
        None => run_render(&cli.run, &config_path),
        Some(Command::Probe(probe)) => {
            let config = load_config(&cli.run, &config_path)?;
            run_probe(&cli.run, &probe, &config)
        }
        Some(Command::Config(command)) => match command.action {
            ConfigAction::Where => {
                println!("{}", config_path.display());
                Ok(())
            }
            ConfigAction::Show => {
                let config = load_config(&cli.run, &config_path)?;
                let text = config
                    .to_toml_string()
                    .context("failed to serialise configuration")?;
                print!("{text}");
                Ok(())
            }
        },
    }
}

fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &RunArgs, path: &Path) -> Result<AppConfig> {
    let mut config = AppConfig::load_or_default(path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))?;
    config
        .apply_overrides(args)
        .context("invalid command-line override")?;
    Ok(config)
}

fn build_program(config: &AppConfig) -> Result<Box<dyn ShadingProgram>> {
    let mut registry = MaterialRegistry::new();
    register_builtin_materials(&mut registry)?;
    let name = config.material.name.as_str();
    if !registry.contains(name) {
        bail!(
            "unknown material '{name}'; available materials: {}",
            registry.names().collect::<Vec<_>>().join(", ")
        );
    }
    let mut program = registry.instantiate(name)?;
    program.set_colors(config.material.colors);
    Ok(program)
}

fn renderer_config(args: &RunArgs, config: &AppConfig) -> Result<RendererConfig> {
    let (mode, policy) = match (&args.still_export, args.still_time) {
        (Some(path), time) => (
            RenderMode::Headless,
            RenderPolicy::Export {
                time: time.unwrap_or(0.0),
                path: path.clone(),
                format: ExportFormat::from_path(path)?,
            },
        ),
        (None, Some(time)) => (RenderMode::Windowed, RenderPolicy::Still { time }),
        (None, None) => (
            RenderMode::Windowed,
            RenderPolicy::Animate {
                target_fps: config.target_fps(),
            },
        ),
    };

    Ok(RendererConfig {
        surface_size: (config.render.width, config.render.height),
        program: build_program(config)?,
        mode,
        backend: config.render.backend.into(),
        color_space: config.render.color_space.into(),
        policy,
        pointer: args.pointer.unwrap_or(Vec2::ZERO),
    })
}

fn run_render(args: &RunArgs, config_path: &Path) -> Result<()> {
    let config = load_config(args, config_path)?;
    let renderer_config = renderer_config(args, &config)?;
    tracing::info!(
        material = renderer_config.program.name(),
        width = renderer_config.surface_size.0,
        height = renderer_config.surface_size.1,
        backend = %renderer_config.backend,
        "starting wavepaper"
    );

    let mut renderer = Renderer::new(renderer_config);
    match renderer.config().mode {
        RenderMode::Headless => renderer.run(),
        RenderMode::Windowed => {
            let preview = renderer.spawn_preview()?;
            watch_config(&preview, args, config_path, config);
            preview.wait()
        }
    }
}

/// Pushes color changes from the config file into the running preview.
fn watch_config(preview: &PreviewHandle, args: &RunArgs, path: &Path, initial: AppConfig) {
    let mut last_modified = modified_time(path);
    let mut current = initial;
    while preview.is_running() {
        thread::sleep(CONFIG_POLL_INTERVAL);
        let modified = modified_time(path);
        if modified == last_modified {
            continue;
        }
        last_modified = modified;

        let reloaded = match load_config(args, path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!("ignoring configuration change: {err:#}");
                continue;
            }
        };
        if reloaded.material.colors == current.material.colors {
            continue;
        }
        match build_program(&reloaded) {
            Ok(program) => {
                if let Err(err) = preview.set_material(program.material_block()) {
                    tracing::debug!("preview closed before reload: {err:#}");
                    return;
                }
                tracing::info!(path = %path.display(), "reloaded material colors");
                current = reloaded;
            }
            Err(err) => tracing::warn!("ignoring configuration change: {err:#}"),
        }
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|meta| meta.modified()).ok()
}

#[derive(Debug, Serialize)]
struct ProbeReport {
    frag_coord: [f32; 2],
    resolution: [f32; 2],
    time: f32,
    pointer: [f32; 2],
    uv: [f32; 2],
    normalized_uv: [f32; 2],
    mix: [f32; 2],
    quadrant_color: [f32; 3],
    variation: f32,
    blended: [f32; 3],
    wave_uv: [f32; 2],
    distance: f32,
    palette_t: f32,
    palette: [f32; 3],
    ring: f32,
    glow: f32,
    rgba: [f32; 4],
}

impl ProbeReport {
    fn new(frag_coord: Vec2, uniforms: &FrameUniforms, trace: &ShadeTrace) -> Self {
        Self {
            frag_coord: frag_coord.into(),
            resolution: uniforms.resolution.as_vec2().into(),
            time: uniforms.time,
            pointer: uniforms.pointer.into(),
            uv: trace.uv.into(),
            normalized_uv: trace.normalized_uv.into(),
            mix: [trace.mix_x, trace.mix_y],
            quadrant_color: trace.quadrant_color.to_array(),
            variation: trace.variation,
            blended: trace.blended.to_array(),
            wave_uv: trace.wave_uv.into(),
            distance: trace.distance,
            palette_t: trace.palette_t,
            palette: trace.palette.to_array(),
            ring: trace.ring,
            glow: trace.glow,
            rgba: trace.output.to_array(),
        }
    }

    fn print_text(&self) {
        println!(
            "fragment     ({}, {}) in {}x{} at t={} pointer ({}, {})",
            self.frag_coord[0],
            self.frag_coord[1],
            self.resolution[0],
            self.resolution[1],
            self.time,
            self.pointer[0],
            self.pointer[1]
        );
        println!("uv           {:?}", self.uv);
        println!("normalized   {:?}", self.normalized_uv);
        println!("mix          {:?}", self.mix);
        println!("quadrant     {:?}", self.quadrant_color);
        println!("variation    {}", self.variation);
        println!("blended      {:?}", self.blended);
        println!("wave_uv      {:?}", self.wave_uv);
        println!("distance     {}", self.distance);
        println!("palette_t    {}", self.palette_t);
        println!("palette      {:?}", self.palette);
        println!("ring         {}", self.ring);
        println!("glow         {}", self.glow);
        println!("rgba         {:?}", self.rgba);
    }
}

fn run_probe(args: &RunArgs, probe: &ProbeArgs, config: &AppConfig) -> Result<()> {
    let program = build_program(config)?;
    tracing::debug!(material = program.name(), "probing material");
    let (width, height) = probe
        .size
        .unwrap_or((config.render.width, config.render.height));
    let resolution = Resolution::from_pixels(width, height)?;
    let pointer = probe.pointer.or(args.pointer).unwrap_or(Vec2::ZERO);
    let uniforms = FrameUniforms::new(resolution)
        .with_time(probe.time)
        .with_pointer(pointer);
    let frag_coord = Vec2::new(probe.x, probe.y);

    let trace = shade_traced(frag_coord, &uniforms, &config.material.colors);
    let report = ProbeReport::new(frag_coord, &uniforms, &trace);
    if probe.json {
        let json =
            serde_json::to_string_pretty(&report).context("failed to serialise probe report")?;
        println!("{json}");
    } else {
        report.print_text();
    }
    Ok(())
}
