//! Caption Animator Library
//!
//! Converts SRT/ASS subtitles into transparent overlay videos sized tightly
//! around the rendered text, with optional animation effects injected as ASS
//! override tags.

pub mod adapters;
pub mod animations;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod ports;
pub mod presets;
pub mod sizing;
pub mod subtitle;
pub mod text;
pub mod utils;

// Re-export commonly used types
pub use animations::{Animation, AnimationContext, AnimationRegistry};
pub use domain::model::{AnimationConfig, OverlaySize, Position, PresetConfig, VideoQuality};
pub use error::{CaptionError, CaptionResult};
pub use pipeline::{OverlayPipeline, RenderOptions, RenderOutcome};
pub use presets::{LoadedPreset, PresetLoader};
pub use subtitle::{SubtitleFile, SubtitleFormat};
