//! Command implementations

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::info;

use crate::animations::AnimationRegistry;
use crate::config_initialization::ResolvedSettings;
use crate::domain::model::{AnimationParams, PresetConfig};
use crate::engine::{FfmpegRenderer, ProgressTracker};
use crate::pipeline::{OverlayPipeline, RenderOptions, RenderOutcome};
use crate::presets::PresetLoader;
use crate::utils::path::format_file_size;

/// Execute `--list-presets`
pub fn list_presets(loader: &PresetLoader) -> Result<()> {
    let mut stderr = std::io::stderr().lock();
    write_preset_listing(&mut stderr, loader)?;
    Ok(())
}

pub fn write_preset_listing(out: &mut dyn Write, loader: &PresetLoader) -> std::io::Result<()> {
    writeln!(out, "Available presets:\n")?;

    let listing = loader.list_available();
    writeln!(out, "Built-in:")?;
    for entry in listing.iter().filter(|e| e.path.is_none()) {
        writeln!(out, "  {}", entry.name)?;
    }

    for dir in loader.preset_dirs() {
        let files: Vec<&str> = listing
            .iter()
            .filter(|e| e.path.as_deref().and_then(Path::parent) == Some(dir.as_path()))
            .map(|e| e.name.as_str())
            .collect();
        if files.is_empty() {
            writeln!(out, "\n{}/ directory: (none found)", dir.display())?;
        } else {
            writeln!(out, "\n{}/ directory:", dir.display())?;
            for name in files {
                writeln!(out, "  {}", name)?;
            }
        }
    }

    writeln!(
        out,
        "\nUsage:\n  \
         --preset <name>              # Built-in preset\n  \
         --preset presets/<file>      # File in presets/ directory\n  \
         --preset <file>:name         # Named preset in multi-preset file"
    )
}

/// Execute `--list-animations`
pub fn list_animations() -> Result<()> {
    let mut stderr = std::io::stderr().lock();
    write_animation_listing(&mut stderr)?;
    Ok(())
}

pub fn write_animation_listing(out: &mut dyn Write) -> std::io::Result<()> {
    writeln!(out, "Available animations:")?;
    let mut infos = AnimationRegistry::info();
    infos.sort_by_key(|info| info.kind);
    for info in infos {
        writeln!(out, "  {}: {}", info.kind, format_params(&info.defaults))?;
        writeln!(out, "      {}", info.description)?;
    }
    Ok(())
}

/// `key=value` pairs; strings are shown without quotes
pub fn format_params(params: &AnimationParams) -> String {
    params
        .iter()
        .map(|(k, v)| match v {
            Value::String(s) => format!("{}={}", k, s),
            other => format!("{}={}", k, other),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Pipeline backed by ffmpeg
pub fn build_pipeline(settings: &ResolvedSettings) -> Result<OverlayPipeline> {
    let renderer = FfmpegRenderer::new(
        settings.ffmpeg_path.clone(),
        settings.ffmpeg_loglevel.clone(),
        settings.show_ffmpeg_progress,
    )
    .context("FFmpeg is required to render overlays")?;
    info!("Using ffmpeg at {}", renderer.ffmpeg_path().display());
    Ok(OverlayPipeline::new(
        Arc::new(renderer),
        ProgressTracker::new(settings.show_steps),
    ))
}

/// Execute a render and report the result
pub async fn render(
    pipeline: &OverlayPipeline,
    input: &Path,
    output: &Path,
    preset: &PresetConfig,
    options: &RenderOptions,
) -> Result<RenderOutcome> {
    let outcome = pipeline
        .render(input, output, preset, options)
        .await
        .with_context(|| format!("Failed to render {}", input.display()))?;

    let mut stderr = std::io::stderr().lock();
    write_report(&mut stderr, &outcome)?;
    Ok(outcome)
}

pub fn write_report(out: &mut dyn Write, outcome: &RenderOutcome) -> std::io::Result<()> {
    if let Some(path) = &outcome.kept_ass {
        writeln!(out, "Saved ASS: {}", path.display())?;
    }
    if let Some(dir) = &outcome.debug_dir {
        writeln!(out, "Kept debug directory: {}", dir.display())?;
    }
    writeln!(
        out,
        "Overlay rendered: {} ({})",
        outcome.output_path.display(),
        format_file_size(outcome.bytes)
    )?;
    writeln!(out, "Overlay size: {} @ {} fps", outcome.size, outcome.fps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::OverlaySize;
    use std::path::PathBuf;

    fn captured<F: FnOnce(&mut dyn Write) -> std::io::Result<()>>(f: F) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_preset_listing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.yaml"), "font_size: 50\n").unwrap();
        std::fs::write(dir.path().join("a.json"), "{\"font_size\": 50}").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();
        let missing = dir.path().join("missing");
        let loader = PresetLoader::new(vec![dir.path().to_path_buf(), missing.clone()]);

        let text = captured(|out| write_preset_listing(out, &loader));
        assert!(text.starts_with("Available presets:\n\nBuilt-in:\n  clean_outline\n  modern_box\n"));
        assert!(text.contains(&format!("{}/ directory:\n  a.json\n  b.yaml\n", dir.path().display())));
        assert!(text.contains(&format!("{}/ directory: (none found)", missing.display())));
        assert!(!text.contains("notes.txt"));
        assert!(text.contains("--preset <file>:name"));
    }

    #[test]
    fn test_animation_listing() {
        let text = captured(write_animation_listing);
        assert!(text.starts_with("Available animations:\n"));
        for kind in AnimationRegistry::list_types() {
            assert!(text.contains(&format!("  {}: ", kind)));
        }
        assert!(text.contains("fade: in_ms=120, out_ms=120"));
    }

    #[test]
    fn test_report() {
        let outcome = RenderOutcome {
            output_path: PathBuf::from("out/overlay.mov"),
            size: OverlaySize::new(640, 180),
            fps: "30".to_string(),
            bytes: 2048,
            kept_ass: Some(PathBuf::from("out/overlay.ass")),
            debug_dir: None,
        };
        let text = captured(|out| write_report(out, &outcome));
        assert_eq!(
            text,
            "Saved ASS: out/overlay.ass\n\
             Overlay rendered: out/overlay.mov (2.00 KB)\n\
             Overlay size: 640x180 @ 30 fps\n"
        );
    }
}
