//! Configuration for the driftweb backdrop.
//!
//! Settings live in `config.toml` under the platform config directory and
//! can be overridden by environment variables. Every key is optional.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use driftweb_core::{FieldConfig, InvalidFieldConfig, Rgba, Variant};
use serde::{Deserialize, Serialize};

/// Overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "DRIFTWEB_CONFIG";
/// Truthy values force reduced motion.
pub const REDUCED_MOTION_ENV: &str = "DRIFTWEB_REDUCED_MOTION";
/// Overrides the preset variant.
pub const VARIANT_ENV: &str = "DRIFTWEB_VARIANT";

/// User settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Preset to draw with.
    pub variant: Variant,
    /// Skip the animation entirely.
    pub reduced_motion: bool,
    /// Delay between frames in milliseconds.
    pub frame_interval_ms: u64,
    /// Device pixel ratio reported to the field.
    pub pixel_ratio: f64,
    /// Width of a terminal cell in logical pixels.
    pub cell_width_px: u16,
    /// Height of a terminal cell in logical pixels.
    pub cell_height_px: u16,
    /// Where to write logs. Logging is off when unset.
    pub log_file: Option<PathBuf>,
    /// Replaces the preset palette when non-empty. Hex colors.
    pub palette: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            variant: Variant::Standard,
            reduced_motion: false,
            frame_interval_ms: 16,
            pixel_ratio: 1.0,
            cell_width_px: 8,
            cell_height_px: 16,
            log_file: None,
            palette: Vec::new(),
        }
    }
}

impl Config {
    /// Load from the default location with environment overrides applied.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match config_path() {
            Some(path) => Self::load_from(&path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load a specific file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(contents) => {
                tracing::debug!(path = %path.display(), "loading config");
                Self::parse(&contents).map_err(|err| err.at(path))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Parse TOML contents.
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents).map_err(|err| ConfigError::Parse {
            path: None,
            message: err.to_string(),
        })?;
        config.field_config()?;
        Ok(config)
    }

    /// Apply environment overrides read through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup(REDUCED_MOTION_ENV) {
            self.reduced_motion = is_truthy(&value);
        }
        if let Some(value) = lookup(VARIANT_ENV) {
            self.variant = Variant::from_tag(Some(value.trim()));
        }
    }

    /// The field settings these options select.
    pub fn field_config(&self) -> Result<FieldConfig, ConfigError> {
        let mut field = FieldConfig::preset(self.variant);
        if !self.palette.is_empty() {
            field.palette = self
                .palette
                .iter()
                .map(|hex| {
                    Rgba::parse_hex(hex).ok_or_else(|| ConfigError::Color(hex.clone()))
                })
                .collect::<Result<_, _>>()?;
        }
        field.validate()?;
        Ok(field)
    }
}

/// Path of the config file, honouring [`CONFIG_PATH_ENV`].
pub fn config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        return Some(PathBuf::from(path));
    }
    ProjectDirs::from("", "", "driftweb").map(|dirs| dirs.config_dir().join("config.toml"))
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Errors raised while loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, source: io::Error },
    Parse {
        path: Option<PathBuf>,
        message: String,
    },
    Color(String),
    Field(InvalidFieldConfig),
}

impl ConfigError {
    fn at(self, path: &Path) -> Self {
        match self {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                path: Some(path.to_path_buf()),
                message,
            },
            other => other,
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
            Self::Parse {
                path: Some(path),
                message,
            } => write!(f, "invalid config {}: {message}", path.display()),
            Self::Parse {
                path: None,
                message,
            } => write!(f, "invalid config: {message}"),
            Self::Color(hex) => write!(f, "invalid palette color {hex:?}"),
            Self::Field(err) => write!(f, "invalid field settings: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Field(err) => Some(err),
            _ => None,
        }
    }
}

impl From<InvalidFieldConfig> for ConfigError {
    fn from(err: InvalidFieldConfig) -> Self {
        Self::Field(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_parse_full() {
        let config = Config::parse(
            r##"
            variant = "subtle"
            reduced_motion = true
            frame_interval_ms = 33
            pixel_ratio = 2.0
            cell_width_px = 9
            cell_height_px = 18
            log_file = "/tmp/driftweb.log"
            palette = ["#ff0000", "#00ff0080"]
            "##,
        )
        .unwrap();

        assert_eq!(config.variant, Variant::Subtle);
        assert!(config.reduced_motion);
        assert_eq!(config.frame_interval_ms, 33);
        assert_eq!(config.cell_height_px, 18);
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/driftweb.log")));

        let field = config.field_config().unwrap();
        assert_eq!(field.max_particles, 75);
        assert_eq!(field.palette[0], Rgba::rgb(255, 0, 0));
    }

    #[test]
    fn test_unknown_variant_is_error() {
        assert!(matches!(
            Config::parse(r#"variant = "loud""#),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_bad_palette_color() {
        let err = Config::parse(r#"palette = ["teal"]"#).unwrap_err();
        assert!(matches!(err, ConfigError::Color(ref c) if c == "teal"));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env(|key| match key {
            REDUCED_MOTION_ENV => Some("yes".to_string()),
            VARIANT_ENV => Some("subtle".to_string()),
            _ => None,
        });
        assert!(config.reduced_motion);
        assert_eq!(config.variant, Variant::Subtle);

        config.apply_env(|key| (key == REDUCED_MOTION_ENV).then(|| "0".to_string()));
        assert!(!config.reduced_motion);
    }

    #[test]
    fn test_missing_file_is_default() {
        let path = std::env::temp_dir().join("driftweb-does-not-exist/config.toml");
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());
    }

    #[test]
    fn test_parse_error_names_file() {
        let path = std::env::temp_dir().join(format!("driftweb-test-{}.toml", std::process::id()));
        fs::write(&path, "frame_interval_ms = \"fast\"").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        fs::remove_file(&path).ok();
        assert!(err.to_string().contains(&path.display().to_string()));
    }
}
