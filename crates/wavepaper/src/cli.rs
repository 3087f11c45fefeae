use std::path::PathBuf;

use clap::{Parser, Subcommand};
use renderer::{ColorSpaceMode, RenderBackend};
use wavefield::{Rgb, Vec2};

#[derive(Parser, Debug)]
#[command(
    name = "wavepaper",
    author,
    version,
    about = "Pointer-reactive procedural wave material",
    arg_required_else_help = false
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Parser, Debug, Default)]
pub struct RunArgs {
    /// Open an interactive preview window.
    #[arg(long, conflicts_with = "still_export")]
    pub window: bool,

    /// Render a single frame to this PNG file and exit.
    #[arg(long, value_name = "PATH")]
    pub still_export: Option<PathBuf>,

    /// Timestamp (seconds) for still exports, or to freeze the preview.
    #[arg(long, value_name = "SECONDS")]
    pub still_time: Option<f32>,

    /// Override the render resolution (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_surface_size)]
    pub size: Option<(u32, u32)>,

    /// Optional FPS cap for the preview window (0=uncapped).
    #[arg(long, value_name = "FPS")]
    pub fps: Option<f32>,

    /// Rasterizer for still exports: `cpu` or `gpu`.
    #[arg(long, value_name = "BACKEND", value_parser = parse_backend)]
    pub backend: Option<RenderBackend>,

    /// Output color space handling: `auto`, `gamma`, or `linear`.
    #[arg(long, value_name = "MODE", value_parser = parse_color_space)]
    pub color_space: Option<ColorSpaceMode>,

    /// Initial pointer in normalised coordinates (e.g. `0.25,-0.5`).
    #[arg(long, value_name = "X,Y", value_parser = parse_pointer, allow_hyphen_values = true)]
    pub pointer: Option<Vec2>,

    /// Bottom-left base color (`#RRGGBB`).
    #[arg(long, value_name = "HEX", value_parser = parse_color)]
    pub color1: Option<Rgb>,

    /// Top-left base color (`#RRGGBB`).
    #[arg(long, value_name = "HEX", value_parser = parse_color)]
    pub color2: Option<Rgb>,

    /// Bottom-right base color (`#RRGGBB`).
    #[arg(long, value_name = "HEX", value_parser = parse_color)]
    pub color3: Option<Rgb>,

    /// Top-right base color (`#RRGGBB`).
    #[arg(long, value_name = "HEX", value_parser = parse_color)]
    pub color4: Option<Rgb>,

    /// Configuration file; defaults to `config.toml` in the config directory.
    #[arg(long, value_name = "FILE", env = "WAVEPAPER_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Evaluate a single pixel and print every intermediate value.
    Probe(ProbeArgs),
    /// Inspect the configuration file.
    Config(ConfigCommand),
}

#[derive(Parser, Debug)]
pub struct ProbeArgs {
    /// Fragment x coordinate in pixels (origin bottom-left).
    #[arg(long, allow_hyphen_values = true)]
    pub x: f32,

    /// Fragment y coordinate in pixels (origin bottom-left).
    #[arg(long, allow_hyphen_values = true)]
    pub y: f32,

    /// Animation time in seconds.
    #[arg(long, default_value_t = 0.0)]
    pub time: f32,

    /// Viewport resolution; defaults to the configured size.
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_surface_size)]
    pub size: Option<(u32, u32)>,

    /// Pointer in normalised coordinates (e.g. `0.25,-0.5`).
    #[arg(long, value_name = "X,Y", value_parser = parse_pointer, allow_hyphen_values = true)]
    pub pointer: Option<Vec2>,

    /// Print the breakdown as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the resolved configuration file path.
    Where,
    /// Print the effective configuration (file plus command-line overrides) as TOML.
    Show,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_surface_size(value: &str) -> Result<(u32, u32), String> {
    let trimmed = value.trim();
    let (width, height) = trimmed
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("invalid size '{trimmed}'; expected WIDTHxHEIGHT"))?;
    let parse = |part: &str| -> Result<u32, String> {
        let parsed: u32 = part
            .trim()
            .parse()
            .map_err(|_| format!("invalid size '{trimmed}'; expected WIDTHxHEIGHT"))?;
        if parsed == 0 {
            return Err(format!("size '{trimmed}' must be non-zero in both dimensions"));
        }
        Ok(parsed)
    };
    Ok((parse(width)?, parse(height)?))
}

pub fn parse_pointer(value: &str) -> Result<Vec2, String> {
    let trimmed = value.trim();
    let (x, y) = trimmed
        .split_once(',')
        .ok_or_else(|| format!("invalid pointer '{trimmed}'; expected X,Y"))?;
    let parse = |part: &str| -> Result<f32, String> {
        let parsed: f32 = part
            .trim()
            .parse()
            .map_err(|_| format!("invalid pointer component '{}'", part.trim()))?;
        if !parsed.is_finite() {
            return Err(format!("pointer component '{}' must be finite", part.trim()));
        }
        Ok(parsed)
    };
    Ok(Vec2::new(parse(x)?, parse(y)?))
}

pub fn parse_backend(value: &str) -> Result<RenderBackend, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("backend must not be empty".to_string());
    }

    match trimmed.to_ascii_lowercase().as_str() {
        "cpu" => Ok(RenderBackend::Cpu),
        "gpu" | "wgpu" => Ok(RenderBackend::Gpu),
        other => Err(format!("unknown backend '{other}'; expected cpu or gpu")),
    }
}

pub fn parse_color_space(value: &str) -> Result<ColorSpaceMode, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("color space must not be empty".to_string());
    }

    let normalized = trimmed.to_ascii_lowercase();
    match normalized.as_str() {
        "auto" => Ok(ColorSpaceMode::Auto),
        "gamma" | "srgb-off" => Ok(ColorSpaceMode::Gamma),
        "linear" | "srgb" => Ok(ColorSpaceMode::Linear),
        other => Err(format!(
            "unknown color space '{other}'; expected auto, gamma, or linear"
        )),
    }
}

pub fn parse_color(value: &str) -> Result<Rgb, String> {
    Rgb::from_hex(value).map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_parse_with_either_separator_case() {
        assert_eq!(parse_surface_size("1280x720"), Ok((1280, 720)));
        assert_eq!(parse_surface_size(" 64X32 "), Ok((64, 32)));
        assert!(parse_surface_size("0x10").is_err());
        assert!(parse_surface_size("1280").is_err());
        assert!(parse_surface_size("wide x tall").is_err());
    }

    #[test]
    fn pointers_accept_negative_components() {
        assert_eq!(parse_pointer("0.25,-0.5"), Ok(Vec2::new(0.25, -0.5)));
        assert!(parse_pointer("0.25").is_err());
        assert!(parse_pointer("inf,0").is_err());
    }

    #[test]
    fn backend_and_color_space_names() {
        assert_eq!(parse_backend("GPU"), Ok(RenderBackend::Gpu));
        assert!(parse_backend("vulkan").is_err());
        assert_eq!(parse_color_space("srgb"), Ok(ColorSpaceMode::Linear));
        assert!(parse_color_space("").is_err());
    }

    #[test]
    fn cli_parses_export_and_colors() {
        let cli = Cli::try_parse_from([
            "wavepaper",
            "--still-export",
            "out.png",
            "--still-time",
            "2.5",
            "--size",
            "64x48",
            "--pointer",
            "-0.5,0.5",
            "--color1",
            "#FF0000",
        ])
        .unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.run.still_export, Some(PathBuf::from("out.png")));
        assert_eq!(cli.run.still_time, Some(2.5));
        assert_eq!(cli.run.size, Some((64, 48)));
        assert_eq!(cli.run.pointer, Some(Vec2::new(-0.5, 0.5)));
        assert_eq!(cli.run.color1, Some(Rgb::from_bytes(255, 0, 0)));
    }

    #[test]
    fn window_conflicts_with_export() {
        assert!(Cli::try_parse_from(["wavepaper", "--window", "--still-export", "a.png"]).is_err());
    }

    #[test]
    fn probe_subcommand_parses() {
        let cli = Cli::try_parse_from([
            "wavepaper", "probe", "--x", "400", "--y", "300", "--time", "1", "--json",
        ])
        .unwrap();
        match cli.command {
            Some(Command::Probe(args)) => {
                assert_eq!((args.x, args.y, args.time), (400.0, 300.0, 1.0));
                assert!(args.json);
                assert!(args.size.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
