use std::fs;
use std::path::{Path, PathBuf};

use renderer::{ColorSpaceMode, RenderBackend};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use wavefield::{BaseColors, ColorSlot, Rgb, WaveProgram};

use crate::cli::RunArgs;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Contents of `config.toml`.
///
/// ```toml
/// [material]
/// name = "wave"
///
/// [material.colors]
/// color1 = "#4361EE"
///
/// [render]
/// width = 1920
/// height = 1080
/// fps = 60.0
/// backend = "cpu"
/// color_space = "auto"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub material: MaterialSection,
    pub render: RenderSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MaterialSection {
    pub name: String,
    pub colors: BaseColors,
}

impl Default for MaterialSection {
    fn default() -> Self {
        Self {
            name: WaveProgram::NAME.to_string(),
            colors: BaseColors::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderSection {
    pub width: u32,
    pub height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fps: Option<f32>,
    pub backend: BackendSetting,
    pub color_space: ColorSpaceSetting,
}

impl Default for RenderSection {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            fps: None,
            backend: BackendSetting::Cpu,
            color_space: ColorSpaceSetting::Auto,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendSetting {
    Cpu,
    Gpu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorSpaceSetting {
    Auto,
    Gamma,
    Linear,
}

impl From<BackendSetting> for RenderBackend {
    fn from(value: BackendSetting) -> Self {
        match value {
            BackendSetting::Cpu => RenderBackend::Cpu,
            BackendSetting::Gpu => RenderBackend::Gpu,
        }
    }
}

impl From<RenderBackend> for BackendSetting {
    fn from(value: RenderBackend) -> Self {
        match value {
            RenderBackend::Cpu => BackendSetting::Cpu,
            RenderBackend::Gpu => BackendSetting::Gpu,
        }
    }
}

impl From<ColorSpaceSetting> for ColorSpaceMode {
    fn from(value: ColorSpaceSetting) -> Self {
        match value {
            ColorSpaceSetting::Auto => ColorSpaceMode::Auto,
            ColorSpaceSetting::Gamma => ColorSpaceMode::Gamma,
            ColorSpaceSetting::Linear => ColorSpaceMode::Linear,
        }
    }
}

impl From<ColorSpaceMode> for ColorSpaceSetting {
    fn from(value: ColorSpaceMode) -> Self {
        match value {
            ColorSpaceMode::Auto => ColorSpaceSetting::Auto,
            ColorSpaceMode::Gamma => ColorSpaceSetting::Gamma,
            ColorSpaceMode::Linear => ColorSpaceSetting::Linear,
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path`, falling back to defaults when the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no configuration file; using defaults");
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.material.name.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "material.name must not be empty".to_string(),
            ));
        }
        if self.render.width == 0 || self.render.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "render size must be non-zero, got {}x{}",
                self.render.width, self.render.height
            )));
        }
        if let Some(fps) = self.render.fps {
            if !fps.is_finite() || fps < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "render.fps must be a non-negative number, got {fps}"
                )));
            }
        }
        Ok(())
    }

    /// Applies command-line overrides on top of the file values.
    pub fn apply_overrides(&mut self, args: &RunArgs) -> Result<(), ConfigError> {
        if let Some((width, height)) = args.size {
            self.render.width = width;
            self.render.height = height;
        }
        if let Some(fps) = args.fps {
            self.render.fps = Some(fps);
        }
        if let Some(backend) = args.backend {
            self.render.backend = backend.into();
        }
        if let Some(color_space) = args.color_space {
            self.render.color_space = color_space.into();
        }
        let overrides: [(ColorSlot, Option<Rgb>); 4] = [
            (ColorSlot::Color1, args.color1),
            (ColorSlot::Color2, args.color2),
            (ColorSlot::Color3, args.color3),
            (ColorSlot::Color4, args.color4),
        ];
        for (slot, color) in overrides {
            if let Some(color) = color {
                self.material.colors.set(slot, color);
            }
        }
        self.validate()
    }

    /// FPS cap for the preview; `0` means uncapped.
    pub fn target_fps(&self) -> Option<f32> {
        self.render.fps.filter(|fps| *fps > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.material.name, "wave");
        assert_eq!(config.material.colors, BaseColors::default());
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = AppConfig::from_toml_str(
            r##"
            [material.colors]
            color3 = "#00FF00"

            [render]
            width = 640
            backend = "gpu"
            color_space = "linear"
            "##,
        )
        .unwrap();
        assert_eq!(config.material.colors.color3, Rgb::from_bytes(0, 255, 0));
        assert_eq!(config.material.colors.color1, BaseColors::default().color1);
        assert_eq!(config.render.width, 640);
        assert_eq!(config.render.height, 1080);
        assert_eq!(RenderBackend::from(config.render.backend), RenderBackend::Gpu);
        assert_eq!(
            ColorSpaceMode::from(config.render.color_space),
            ColorSpaceMode::Linear
        );
    }

    #[test]
    fn bad_colors_and_unknown_keys_are_parse_errors() {
        let err = AppConfig::from_toml_str("[material.colors]\ncolor1 = \"#12\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        let err = AppConfig::from_toml_str("[render]\nvsync = true").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = AppConfig::from_toml_str("[render]\nwidth = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        let err = AppConfig::from_toml_str("[render]\nfps = -1.0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn overrides_win_over_file_values() {
        let mut config = AppConfig::default();
        let args = RunArgs {
            size: Some((320, 200)),
            fps: Some(0.0),
            backend: Some(RenderBackend::Gpu),
            color4: Some(Rgb::from_bytes(0, 0, 0)),
            ..RunArgs::default()
        };
        config.apply_overrides(&args).unwrap();
        assert_eq!((config.render.width, config.render.height), (320, 200));
        assert_eq!(config.target_fps(), None);
        assert_eq!(config.render.backend, BackendSetting::Gpu);
        assert_eq!(config.material.colors.color4, Rgb::from_bytes(0, 0, 0));
        assert_eq!(config.material.colors.color1, BaseColors::default().color1);
    }

    #[test]
    fn serialised_config_parses_back() {
        let mut config = AppConfig::default();
        config.render.fps = Some(30.0);
        let text = config.to_toml_string().unwrap();
        assert!(text.contains("color1 = \"#4361EE\""));
        assert_eq!(AppConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_or_default(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }
}
