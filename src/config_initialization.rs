//! Configuration initialization and hierarchy management

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{debug, info};

use crate::adapters::toml_config::AppConfig;
use crate::cli::args::parse_fps;
use crate::cli::Cli;
use crate::domain::model::VideoQuality;
use crate::engine::FFMPEG_LOGLEVELS;
use crate::error::{CaptionError, CaptionResult};
use crate::pipeline::{AnimationMode, RenderOptions};
use crate::presets::{LoadedPreset, PresetLoader};
use crate::sizing::DEFAULT_SAFETY_SCALE;

pub const DEFAULT_PRESET: &str = "modern_box";
pub const DEFAULT_FPS: &str = "30";
pub const DEFAULT_FFMPEG_LOGLEVEL: &str = "error";
pub const DEFAULT_PRESET_DIR: &str = "presets";

/// Settings after merging CLI, environment, config file and defaults
#[derive(Debug, Clone)]
pub struct ResolvedSettings {
    pub preset_ref: String,
    pub preset_dirs: Vec<PathBuf>,
    pub ffmpeg_path: Option<PathBuf>,
    pub ffmpeg_loglevel: String,
    pub options: RenderOptions,
    /// Print pipeline steps
    pub show_steps: bool,
    /// Print ffmpeg progress lines
    pub show_ffmpeg_progress: bool,
    /// Partial preset merged over every loaded preset
    pub preset_overrides: Option<Value>,
    pub config_path: Option<PathBuf>,
}

impl ResolvedSettings {
    pub fn preset_loader(&self) -> PresetLoader {
        PresetLoader::new(self.preset_dirs.clone())
    }

    /// Load a preset reference and apply the configured overrides
    pub fn load_preset(&self, reference: &str) -> CaptionResult<LoadedPreset> {
        let mut loaded = self.preset_loader().load(reference)?;
        if let Some(overrides) = &self.preset_overrides {
            loaded.config = loaded.config.merge_value(overrides)?;
            debug!("Applied configured preset overrides");
        }
        Ok(loaded)
    }
}

/// Initialize configuration hierarchy following precedence: CLI > Env > File > Defaults
pub fn initialize_configuration_hierarchy(cli: &Cli) -> Result<ResolvedSettings> {
    info!("Initializing configuration hierarchy");

    let (mut file_config, config_path) =
        AppConfig::discover(cli.config.as_deref()).context("Failed to load configuration file")?;

    let env_overrides = file_config
        .apply_env(std::env::vars())
        .context("Invalid environment override")?;
    if env_overrides > 0 {
        info!("Applied {} environment variable overrides", env_overrides);
    }

    let settings = resolve_settings(cli, file_config, config_path)?;
    info!("Configuration hierarchy initialized successfully");
    Ok(settings)
}

/// Merge CLI values over an already env-adjusted file config
pub fn resolve_settings(
    cli: &Cli,
    config: AppConfig,
    config_path: Option<PathBuf>,
) -> CaptionResult<ResolvedSettings> {
    let preset_overrides = config.preset_overrides_value()?;

    let ffmpeg_loglevel = cli
        .loglevel
        .clone()
        .or(config.loglevel)
        .unwrap_or_else(|| DEFAULT_FFMPEG_LOGLEVEL.to_string());
    if !FFMPEG_LOGLEVELS.contains(&ffmpeg_loglevel.as_str()) {
        return Err(CaptionError::Config {
            message: format!(
                "Invalid ffmpeg loglevel: {}. Choose from: {}",
                ffmpeg_loglevel,
                FFMPEG_LOGLEVELS.join(", ")
            ),
        });
    }

    let safety_scale = cli
        .safety_scale
        .or(config.safety_scale)
        .unwrap_or(DEFAULT_SAFETY_SCALE);
    if !(safety_scale.is_finite() && safety_scale > 0.0) {
        return Err(CaptionError::Config {
            message: format!("safety_scale must be positive, got {}", safety_scale),
        });
    }

    let quality: Option<VideoQuality> = cli.quality.or(config.quality);

    let fps = match cli.fps.clone().or(config.fps) {
        Some(raw) => parse_fps(&raw).map_err(|e| CaptionError::Config {
            message: format!("Invalid fps: {}", e),
        })?,
        None => DEFAULT_FPS.to_string(),
    };

    let options = RenderOptions {
        fps,
        safety_scale,
        quality,
        animation: AnimationMode::from_flags(cli.apply_animation, cli.no_animation),
        reskin: cli.reskin,
        strip_overrides: cli.strip_overrides,
        use_preset_for_ass: !cli.no_preset_for_ass,
        keep_ass: cli.keep_ass,
        keep_temp: cli.keep_temp,
    };

    Ok(ResolvedSettings {
        preset_ref: cli
            .preset
            .clone()
            .or(config.default_preset)
            .unwrap_or_else(|| DEFAULT_PRESET.to_string()),
        preset_dirs: config
            .preset_dirs
            .unwrap_or_else(|| vec![PathBuf::from(DEFAULT_PRESET_DIR)]),
        ffmpeg_path: config.ffmpeg_path,
        ffmpeg_loglevel,
        options,
        show_steps: !cli.quiet,
        show_ffmpeg_progress: !(cli.quiet || cli.hide_ffmpeg_progress),
        preset_overrides,
        config_path,
    })
}
