//! Render orchestration: subtitles in, overlay video out
//!
//! Preparation (styling, sizing, animation, positioning) is synchronous and
//! independent of the encoder; rendering goes through a [`RenderPort`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::animations::{AnimationContext, AnimationRegistry};
use crate::domain::model::{OverlaySize, Position, PresetConfig, VideoQuality};
use crate::engine::ProgressTracker;
use crate::error::{CaptionError, CaptionResult};
use crate::ports::{RenderPort, RenderRequest};
use crate::sizing::{SizeCalculator, DEFAULT_SAFETY_SCALE};
use crate::subtitle::{StyleBuilder, SubtitleFile, SubtitleFormat};
use crate::text::{FontMeasurer, TextMeasurer};
use crate::utils::path::{debug_dir_for, ensure_parent_dir, kept_ass_path, replace_dir_with_copy};

/// Seconds added after the last subtitle so its fade-out is not cut
pub const TAIL_PAD_SEC: f64 = 0.25;

/// Builds the text measurer for a preset
pub type MeasurerFactory =
    dyn Fn(&PresetConfig) -> CaptionResult<Box<dyn TextMeasurer>> + Send + Sync;

/// Whether the preset animation is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimationMode {
    /// SRT inputs animate, ASS inputs keep their own effects
    #[default]
    Auto,
    Force,
    Disable,
}

impl AnimationMode {
    pub fn from_flags(apply: bool, disable: bool) -> Self {
        if disable {
            Self::Disable
        } else if apply {
            Self::Force
        } else {
            Self::Auto
        }
    }

    pub fn applies_to(&self, format: SubtitleFormat) -> bool {
        match self {
            Self::Disable => false,
            Self::Force => true,
            Self::Auto => format == SubtitleFormat::Srt,
        }
    }
}

/// Per-render options
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub fps: String,
    pub safety_scale: f64,
    /// Overrides the preset's quality tier
    pub quality: Option<VideoQuality>,
    pub animation: AnimationMode,
    /// Restyle ASS input with the preset
    pub reskin: bool,
    /// Drop existing override tags (only with `reskin`)
    pub strip_overrides: bool,
    /// When false, ASS input without `reskin` ignores the selected preset
    pub use_preset_for_ass: bool,
    pub keep_ass: bool,
    pub keep_temp: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            fps: "30".to_string(),
            safety_scale: DEFAULT_SAFETY_SCALE,
            quality: None,
            animation: AnimationMode::Auto,
            reskin: false,
            strip_overrides: false,
            use_preset_for_ass: true,
            keep_ass: false,
            keep_temp: false,
        }
    }
}

/// Subtitles ready to be written and rendered
#[derive(Debug, Clone)]
pub struct PreparedOverlay {
    pub subtitles: SubtitleFile,
    pub size: OverlaySize,
    pub position: Position,
    pub duration_sec: f64,
    /// Animation applied, if any
    pub animation: Option<String>,
    /// Preset the overlay was prepared with
    pub preset: PresetConfig,
}

/// Result of a completed render
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOutcome {
    pub output_path: PathBuf,
    pub size: OverlaySize,
    pub fps: String,
    pub bytes: u64,
    pub kept_ass: Option<PathBuf>,
    pub debug_dir: Option<PathBuf>,
}

pub struct OverlayPipeline {
    renderer: Arc<dyn RenderPort>,
    measurer: Box<MeasurerFactory>,
    progress: ProgressTracker,
}

impl OverlayPipeline {
    /// Pipeline measuring text with the preset's font
    pub fn new(renderer: Arc<dyn RenderPort>, progress: ProgressTracker) -> Self {
        Self {
            renderer,
            measurer: Box::new(font_measurer),
            progress,
        }
    }

    /// Replace the text measurer factory
    pub fn with_measurer<F>(mut self, factory: F) -> Self
    where
        F: Fn(&PresetConfig) -> CaptionResult<Box<dyn TextMeasurer>> + Send + Sync + 'static,
    {
        self.measurer = Box::new(factory);
        self
    }

    /// Load, style, size, animate and position the subtitles
    pub fn prepare(
        &self,
        input: &Path,
        preset: &PresetConfig,
        options: &RenderOptions,
    ) -> CaptionResult<PreparedOverlay> {
        let format = SubtitleFormat::from_path(input)?;
        let mut subtitles = SubtitleFile::load(input)?;
        self.progress.step(&format!(
            "Loaded {} subtitle events",
            subtitles.dialogue_count()
        ));

        let restyle = format == SubtitleFormat::Srt || options.reskin;
        let preset = if format == SubtitleFormat::Ass && !options.reskin && !options.use_preset_for_ass {
            debug!("Ignoring preset for ASS input");
            PresetConfig::default()
        } else {
            preset.clone()
        };

        let animation = match (&preset.animation, options.animation.applies_to(format)) {
            (Some(config), true) => Some(AnimationRegistry::from_config(config)?),
            _ => None,
        };

        let measurer = (self.measurer)(&preset)?;

        if options.reskin && options.strip_overrides {
            subtitles.strip_overrides();
        }
        if restyle {
            self.progress.step("Building ASS style from preset...");
            let style = StyleBuilder::new(&preset).build("Default")?;
            subtitles.apply_style(style, &preset, Some(measurer.as_ref()));
            subtitles.apply_base_blur(preset.blur_px);
        }

        self.progress.step("Computing tight overlay size...");
        let calculator = SizeCalculator::new(&preset, options.safety_scale, measurer.as_ref());
        let size = calculator.compute_size(&subtitles)?;
        let position = calculator.compute_anchor_position(size)?;
        self.progress
            .step(&format!("Computed overlay size: {}", size));

        if let Some(animation) = &animation {
            self.progress
                .step(&format!("Applying animation: {}", animation.kind()));
            subtitles.apply_animation(animation.as_ref(), &AnimationContext::new(position, size))?;
        }

        subtitles.apply_center_positioning(position, true);
        subtitles.set_play_resolution(size);

        let end_ms = subtitles.duration_ms();
        let duration_sec = end_ms as f64 / 1000.0 + TAIL_PAD_SEC;
        self.progress.step(&format!(
            "Subtitle duration: {}ms (~{:.2}s)",
            end_ms, duration_sec
        ));

        Ok(PreparedOverlay {
            subtitles,
            size,
            position,
            duration_sec,
            animation: animation.map(|a| a.kind().to_string()),
            preset,
        })
    }

    /// Prepare and render `input` to `output`
    pub async fn render(
        &self,
        input: &Path,
        output: &Path,
        preset: &PresetConfig,
        options: &RenderOptions,
    ) -> CaptionResult<RenderOutcome> {
        if options.strip_overrides && !options.reskin {
            return Err(CaptionError::Config {
                message: "--strip-overrides requires --reskin".to_string(),
            });
        }
        self.progress.step(&format!("Input: {}", display_name(input)));
        self.progress.step(&format!("Output: {}", display_name(output)));

        let prepared = self.prepare(input, preset, options)?;

        let temp_dir = tempfile::Builder::new()
            .prefix("caption_animator_")
            .tempdir()?;
        let ass_path = temp_dir.path().join("work.ass");
        prepared.subtitles.save(&ass_path)?;

        ensure_parent_dir(output)?;
        let request = RenderRequest {
            ass_path: ass_path.clone(),
            output_path: output.to_path_buf(),
            size: prepared.size,
            fps: options.fps.clone(),
            duration_sec: prepared.duration_sec,
            quality: options.quality.unwrap_or(prepared.preset.video_quality),
            h264_crf: prepared.preset.h264_crf,
        };

        self.progress.step(&format!(
            "Rendering overlay video via FFmpeg ({})...",
            request.quality.description()
        ));
        let bytes = self.renderer.render(&request).await?;
        self.progress.step("FFmpeg render complete");

        let kept_ass = if options.keep_ass {
            let path = kept_ass_path(output);
            std::fs::copy(&ass_path, &path)?;
            info!("Saved ASS: {}", path.display());
            Some(path)
        } else {
            None
        };

        let debug_dir = if options.keep_temp {
            let dir = debug_dir_for(output);
            replace_dir_with_copy(temp_dir.path(), &dir)?;
            info!("Kept debug directory: {}", dir.display());
            Some(dir)
        } else {
            None
        };

        Ok(RenderOutcome {
            output_path: output.to_path_buf(),
            size: prepared.size,
            fps: options.fps.clone(),
            bytes,
            kept_ass,
            debug_dir,
        })
    }
}

fn font_measurer(preset: &PresetConfig) -> CaptionResult<Box<dyn TextMeasurer>> {
    Ok(Box::new(FontMeasurer::for_preset(preset)?))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
