// TOML config adapter - Application configuration from TOML files and environment

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::domain::model::VideoQuality;
use crate::error::{CaptionError, CaptionResult};

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "caption_animator.toml";

/// Prefix of environment overrides, e.g. `CAPTION_ANIMATOR_FPS`
pub const ENV_PREFIX: &str = "CAPTION_ANIMATOR_";

/// Application configuration.
///
/// Every field is optional so a file only needs the keys it changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Explicit ffmpeg binary; PATH lookup otherwise
    pub ffmpeg_path: Option<PathBuf>,
    /// Preset used when `--preset` is not given
    pub default_preset: Option<String>,
    /// Directories searched for preset files
    pub preset_dirs: Option<Vec<PathBuf>>,
    pub fps: Option<String>,
    pub safety_scale: Option<f64>,
    /// ffmpeg `-loglevel`
    pub loglevel: Option<String>,
    pub quality: Option<VideoQuality>,
    /// Merged over every loaded preset
    pub preset_overrides: toml::Table,
}

impl AppConfig {
    /// Parse a TOML document
    pub fn from_toml(content: &str) -> CaptionResult<Self> {
        toml::from_str(content).map_err(|e| CaptionError::Config {
            message: format!("Failed to parse TOML config: {}", e),
        })
    }

    /// Load a config file, failing if it is missing or malformed
    pub fn load_file(path: &Path) -> CaptionResult<Self> {
        if !path.exists() {
            return Err(CaptionError::Config {
                message: format!("Config file does not exist: {}", path.display()),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Candidate locations, most specific first
    pub fn search_paths(explicit: Option<&Path>) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(path) = explicit {
            paths.push(path.to_path_buf());
        }
        paths.push(PathBuf::from(LOCAL_CONFIG_FILE));
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("caption-animator").join("config.toml"));
        }
        paths
    }

    /// Load the first config file found.
    ///
    /// An explicit path must exist; the implicit locations are optional.
    pub fn discover(explicit: Option<&Path>) -> CaptionResult<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            return Ok((Self::load_file(path)?, Some(path.to_path_buf())));
        }
        for path in Self::search_paths(None) {
            if path.is_file() {
                return Ok((Self::load_file(&path)?, Some(path)));
            }
        }
        debug!("No configuration file found, using defaults");
        Ok((Self::default(), None))
    }

    /// Apply `CAPTION_ANIMATOR_*` variables over the file values
    pub fn apply_env<I>(&mut self, vars: I) -> CaptionResult<usize>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut applied = 0;
        for (name, value) in vars {
            let Some(key) = name.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            match key {
                "FFMPEG_PATH" => self.ffmpeg_path = Some(PathBuf::from(&value)),
                "DEFAULT_PRESET" => self.default_preset = Some(value.clone()),
                "PRESET_DIRS" => {
                    self.preset_dirs = Some(std::env::split_paths(&value).collect())
                }
                "FPS" => self.fps = Some(value.clone()),
                "SAFETY_SCALE" => {
                    let scale = value.parse::<f64>().map_err(|_| CaptionError::Config {
                        message: format!("Invalid {}: {}", name, value),
                    })?;
                    self.safety_scale = Some(scale);
                }
                "LOGLEVEL" => self.loglevel = Some(value.clone()),
                "QUALITY" => self.quality = Some(value.parse()?),
                _ => continue,
            }
            info!("Found environment override: {} = {}", name, value);
            applied += 1;
        }
        Ok(applied)
    }

    /// `[preset_overrides]` as a JSON mapping
    pub fn preset_overrides_value(&self) -> CaptionResult<Option<Value>> {
        if self.preset_overrides.is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::to_value(&self.preset_overrides)?))
    }
}
