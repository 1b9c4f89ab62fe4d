//! Error handling module for Caption Animator

use thiserror::Error;

/// Main error type for Caption Animator operations
#[derive(Error, Debug)]
pub enum CaptionError {
    /// Input file not found or inaccessible
    #[error("Input file not found: {path}")]
    InputFileNotFound { path: String },

    /// Subtitle file extension is not .srt or .ass
    #[error("Unsupported subtitle format: {extension}. Use .srt or .ass")]
    UnsupportedFormat { extension: String },

    /// Subtitle file could not be parsed
    #[error("Failed to parse subtitle file: {message}")]
    SubtitleParse { message: String },

    /// Preset could not be resolved or is malformed
    #[error("Preset error: {message}")]
    Preset { message: String },

    /// Animation type unknown or parameters invalid
    #[error("Animation error: {message}")]
    Animation { message: String },

    /// Color string is not #RRGGBB
    #[error("Invalid color '{color}'. Use #RRGGBB format.")]
    InvalidColor { color: String },

    /// Font could not be located or parsed
    #[error("Font error: {message}")]
    Font { message: String },

    /// Overlay sizing failed
    #[error("Sizing error: {message}")]
    Sizing { message: String },

    /// FFmpeg could not be located
    #[error("FFmpeg not found: {message}")]
    FFmpegNotFound { message: String },

    /// FFmpeg render failed
    #[error("Render failed: {message}")]
    Render { message: String },

    /// Application configuration error
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl CaptionError {
    pub(crate) fn preset(message: impl Into<String>) -> Self {
        Self::Preset { message: message.into() }
    }

    pub(crate) fn animation(message: impl Into<String>) -> Self {
        Self::Animation { message: message.into() }
    }

    pub(crate) fn render(message: impl Into<String>) -> Self {
        Self::Render { message: message.into() }
    }
}

/// Result type alias for Caption Animator operations
pub type CaptionResult<T> = std::result::Result<T, CaptionError>;
