//! CLI module for Caption Animator
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::Parser;

use crate::domain::model::VideoQuality;
use crate::utils::logging::{LogFormat, LogLevel};

pub mod args;
pub mod commands;
pub mod interactive;

/// Caption Animator
///
/// Render transparent subtitle overlay videos (ProRes 4444 alpha) for video editors.
#[derive(Parser, Debug)]
#[command(name = "caption-animator")]
#[command(about = "Render transparent subtitle overlay videos from SRT/ASS files")]
#[command(version)]
#[command(after_help = args::EXAMPLES)]
pub struct Cli {
    /// Input subtitle file (.srt or .ass)
    #[arg(required_unless_present_any = ["list_presets", "list_animations"])]
    pub input: Option<PathBuf>,

    /// Output overlay video path (.mov recommended). Default: <input>.mov
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Preset reference: built-in name, file path, or path:name for multi-preset files
    #[arg(long)]
    pub preset: Option<String>,

    /// If input is .ass, ignore --preset unless --reskin is provided
    #[arg(long)]
    pub no_preset_for_ass: bool,

    /// For .ass: apply preset style to Default and assign all events
    #[arg(long)]
    pub reskin: bool,

    /// When --reskin, strip existing ASS override tags before reapplying
    #[arg(long, requires = "reskin")]
    pub strip_overrides: bool,

    /// Inject preset animation tags (auto for SRT conversion)
    #[arg(long, conflicts_with = "no_animation")]
    pub apply_animation: bool,

    /// Disable animation injection even if preset includes it
    #[arg(long)]
    pub no_animation: bool,

    /// Overlay framerate (e.g., 30, 60, or 30000/1001). Default: 30
    #[arg(long, value_parser = args::parse_fps)]
    pub fps: Option<String>,

    /// Multiplier to avoid edge clipping. Default: 1.12
    #[arg(long, value_parser = args::parse_safety_scale)]
    pub safety_scale: Option<f64>,

    /// Output quality: small (H.264), medium (ProRes 422 HQ), large (ProRes 4444 alpha)
    #[arg(long)]
    pub quality: Option<VideoQuality>,

    /// Save intermediate ASS file alongside output
    #[arg(long)]
    pub keep_ass: bool,

    /// Keep temporary working directory for debugging
    #[arg(long)]
    pub keep_temp: bool,

    /// FFmpeg log level. Default: error
    #[arg(long, value_parser = ["quiet", "error", "warning", "info", "debug"])]
    pub loglevel: Option<String>,

    /// Suppress progress output (errors still print)
    #[arg(long)]
    pub quiet: bool,

    /// Hide FFmpeg render progress (frames/time)
    #[arg(long)]
    pub hide_ffmpeg_progress: bool,

    /// Interactive mode: tweak preset settings and re-render
    #[arg(short, long)]
    pub interactive: bool,

    /// List available presets (built-in and preset directories) and exit
    #[arg(long)]
    pub list_presets: bool,

    /// List available animations with their default parameters and exit
    #[arg(long)]
    pub list_animations: bool,

    /// Application config file (TOML)
    #[arg(long, env = "CAPTION_ANIMATOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Logging level for diagnostics
    #[arg(long, default_value = "warn")]
    pub log_level: LogLevel,

    /// Log output format
    #[arg(long, default_value = "compact")]
    pub log_format: LogFormat,
}
