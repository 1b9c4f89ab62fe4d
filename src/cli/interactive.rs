//! Interactive mode for tweaking presets and re-rendering

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use super::commands::{self, format_params};
use crate::animations::AnimationRegistry;
use crate::domain::model::{AnimationConfig, PresetConfig, VideoQuality, PRESET_KEYS};
use crate::pipeline::{OverlayPipeline, RenderOptions};
use crate::presets::{save_preset, LoadedPreset, PresetSource};
use crate::subtitle::SubtitleFormat;
use crate::utils::path::ensure_parent_dir;

const HELP: &str = "\
Commands:
  r | render                 Render with current settings
  p | print                  Print preset/settings summary
  set <key> <value>          Set preset value (e.g., set font_size 72)
  set animation <type>       Switch animation type (resets its params)
  set animation.<p> <value>  Set an animation parameter
  get <key>                  Show current value of a key
  keys                       List all available preset keys
  animations                 List available animations and their parameters
  load <path>                Load different SRT/ASS file
  out <path>                 Change output path
  fps <value>                Change FPS
  quality <small|medium|large> Change output quality
  scale <value>              Change safety_scale
  save [path]                Save preset (defaults to loaded preset file if available)
  reset                      Reset preset to initial state
  quit                       Exit";

/// What the loop should do after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Render,
    Quit,
}

/// Mutable state of an interactive session
#[derive(Debug, Clone)]
pub struct InteractiveSession {
    pub input: PathBuf,
    pub output: PathBuf,
    pub preset: PresetConfig,
    baseline: PresetConfig,
    source: PresetSource,
    pub options: RenderOptions,
}

impl InteractiveSession {
    pub fn new(input: PathBuf, output: PathBuf, loaded: LoadedPreset, options: RenderOptions) -> Self {
        Self {
            input,
            output,
            baseline: loaded.config.clone(),
            preset: loaded.config,
            source: loaded.source,
            options,
        }
    }

    /// Handle one input line, writing feedback to `out`
    pub fn handle(&mut self, line: &str, out: &mut dyn Write) -> std::io::Result<Action> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Action::Continue);
        }
        let (cmd, rest) = match line.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd.to_lowercase(), rest.trim()),
            None => (line.to_lowercase(), ""),
        };

        match cmd.as_str() {
            "q" | "quit" | "exit" => return Ok(Action::Quit),
            "h" | "help" | "?" => writeln!(out, "{}", HELP)?,
            "r" | "render" => return Ok(Action::Render),
            "p" | "print" => self.print_summary(out)?,
            "reset" => {
                self.preset = self.baseline.clone();
                writeln!(out, "Preset reset to initial state.")?;
            }
            "get" => self.get(rest, out)?,
            "set" => self.set(rest, out)?,
            "keys" => self.keys(out)?,
            "animations" => {
                writeln!(out, "Available animations:")?;
                for kind in AnimationRegistry::list_types() {
                    let defaults = AnimationRegistry::defaults(kind).unwrap_or_default();
                    writeln!(out, "  {}: {}", kind, format_params(&defaults))?;
                }
                writeln!(out, "\nTo change animation type, use: set animation <name>")?;
            }
            "load" => self.load(rest, out)?,
            "out" => {
                if rest.is_empty() {
                    writeln!(out, "Usage: out <path.mov>")?;
                } else {
                    let path = PathBuf::from(unquote(rest));
                    match ensure_parent_dir(&path) {
                        Ok(()) => {
                            writeln!(out, "Output set: {}", path.display())?;
                            self.output = path;
                        }
                        Err(e) => writeln!(out, "Cannot use output path: {}", e)?,
                    }
                }
            }
            "fps" => {
                if rest.is_empty() {
                    writeln!(out, "Usage: fps <value>")?;
                } else {
                    match super::args::parse_fps(rest) {
                        Ok(fps) => {
                            writeln!(out, "FPS set: {}", fps)?;
                            self.options.fps = fps;
                        }
                        Err(e) => writeln!(out, "Invalid FPS: {}", e)?,
                    }
                }
            }
            "quality" => {
                if rest.is_empty() {
                    writeln!(out, "Usage: quality <small|medium|large>")?;
                } else {
                    match rest.parse::<VideoQuality>() {
                        Ok(quality) => {
                            writeln!(out, "Quality set: {} ({})", quality, quality.description())?;
                            self.options.quality = Some(quality);
                        }
                        Err(_) => writeln!(
                            out,
                            "Invalid quality: {}. Choose from: small, medium, large",
                            rest
                        )?,
                    }
                }
            }
            "scale" => {
                if rest.is_empty() {
                    writeln!(out, "Usage: scale <value>")?;
                } else {
                    match super::args::parse_safety_scale(rest) {
                        Ok(scale) => {
                            writeln!(out, "safety_scale set: {}", scale)?;
                            self.options.safety_scale = scale;
                        }
                        Err(e) => writeln!(out, "Invalid scale: {}", e)?,
                    }
                }
            }
            "save" => self.save(rest, out)?,
            other => writeln!(out, "Unknown command: {}. Type 'help' for commands.", other)?,
        }
        Ok(Action::Continue)
    }

    fn print_summary(&self, out: &mut dyn Write) -> std::io::Result<()> {
        let p = &self.preset;
        let quality = self.options.quality.unwrap_or(p.video_quality);
        writeln!(out, "Current preset/settings:")?;
        match &self.source {
            PresetSource::BuiltIn(name) => writeln!(out, "  preset       : {} (built-in)", name)?,
            source => writeln!(out, "  preset       : {}", source)?,
        }
        writeln!(out, "  input        : {}", self.input.display())?;
        writeln!(out, "  out          : {}", self.output.display())?;
        writeln!(out, "  fps          : {}", self.options.fps)?;
        writeln!(out, "  quality      : {}", quality)?;
        writeln!(out, "  safety_scale : {}", self.options.safety_scale)?;
        writeln!(out, "  font         : {} size={} bold={}", p.font_name, p.font_size, p.bold)?;
        writeln!(out, "  colors       : primary={} outline={}", p.primary_color, p.outline_color)?;
        writeln!(out, "  outline/shadow: outline_px={} shadow_px={}", p.outline_px, p.shadow_px)?;
        writeln!(out, "  wrap         : max_width_px={} line_spacing={}", p.max_width_px, p.line_spacing)?;
        if let Some(animation) = &p.animation {
            writeln!(
                out,
                "  animation    : type={} params={}",
                animation.kind,
                format_params(&animation.params)
            )?;
        }
        Ok(())
    }

    fn get(&self, key: &str, out: &mut dyn Write) -> std::io::Result<()> {
        if key.is_empty() {
            return writeln!(out, "Usage: get <key>");
        }
        match self.preset.get_field(key) {
            Ok(value) => writeln!(out, "{} = {}", key, display_value(&value)),
            Err(e) => writeln!(out, "{}", error_message(&e)),
        }
    }

    fn set(&mut self, rest: &str, out: &mut dyn Write) -> std::io::Result<()> {
        let Some((key, raw)) = rest.split_once(char::is_whitespace) else {
            return writeln!(out, "Usage: set <key> <value>");
        };
        let raw = raw.trim();

        if key == "animation" {
            let kind = unquote(raw);
            return match AnimationRegistry::defaults(kind) {
                Ok(defaults) => {
                    writeln!(
                        out,
                        "Animation changed to: {} (with default params: {})",
                        kind,
                        format_params(&defaults)
                    )?;
                    self.preset.animation = Some(AnimationConfig::new(kind, defaults));
                    Ok(())
                }
                Err(_) => writeln!(
                    out,
                    "Unknown animation type: {}. Available: {}",
                    kind,
                    AnimationRegistry::list_types().join(", ")
                ),
            };
        }

        let mut candidate = self.preset.clone();
        let value = match candidate.set_field(key, raw) {
            Ok(value) => value,
            Err(e) => return writeln!(out, "{}", error_message(&e)),
        };
        // Parameters are checked by building the effect before committing
        if key.starts_with("animation.") {
            if let Some(animation) = &candidate.animation {
                if let Err(e) = AnimationRegistry::from_config(animation) {
                    return writeln!(out, "Invalid value for {}: {}", key, error_message(&e));
                }
            }
        }
        self.preset = candidate;
        writeln!(out, "{} = {}", key, display_value(&value))
    }

    fn keys(&self, out: &mut dyn Write) -> std::io::Result<()> {
        writeln!(out, "Available preset keys:")?;
        let top: Vec<&str> = PRESET_KEYS
            .iter()
            .copied()
            .filter(|k| *k != "animation")
            .collect();
        for chunk in top.chunks(5) {
            writeln!(out, "  {}", chunk.join(", "))?;
        }
        match &self.preset.animation {
            Some(animation) => {
                writeln!(out, "\n  Animation ({}):", animation.kind)?;
                let names: Vec<String> = AnimationRegistry::defaults(&animation.kind)
                    .map(|d| d.keys().cloned().collect())
                    .unwrap_or_default();
                writeln!(out, "    {}", names.join(", "))?;
                writeln!(out, "\n  Set animation params with: set animation.<param> <value>")
            }
            None => writeln!(out, "\n  No animation configured"),
        }
    }

    fn load(&mut self, rest: &str, out: &mut dyn Write) -> std::io::Result<()> {
        if rest.is_empty() {
            return writeln!(out, "Usage: load <path.srt|path.ass>");
        }
        let path = PathBuf::from(unquote(rest));
        if !path.exists() {
            return writeln!(out, "File not found: {}", path.display());
        }
        if SubtitleFormat::from_path(&path).is_err() {
            return writeln!(out, "Only .srt and .ass files are supported");
        }
        writeln!(out, "Loaded: {}", path.display())?;
        self.input = path;
        Ok(())
    }

    fn save(&self, rest: &str, out: &mut dyn Write) -> std::io::Result<()> {
        let (path, name) = if rest.is_empty() {
            match &self.source {
                PresetSource::File(path) => (path.clone(), None),
                PresetSource::Named { path, name } => (path.clone(), Some(name.as_str())),
                PresetSource::BuiltIn(_) => {
                    writeln!(out, "Usage: save <path.json>")?;
                    return writeln!(out, "  (No default available - preset was loaded from built-in)");
                }
            }
        } else {
            (PathBuf::from(unquote(rest)), None)
        };

        match save_preset(&path, name, &self.preset) {
            Ok(()) => writeln!(out, "Saved preset: {}", path.display()),
            Err(e) => writeln!(out, "Save failed: {}", e),
        }
    }
}

fn unquote(s: &str) -> &str {
    let s = s.trim();
    for quote in ['"', '\''] {
        if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
            return &s[1..s.len() - 1];
        }
    }
    s
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Error text without the category prefix
fn error_message(err: &crate::error::CaptionError) -> String {
    match err {
        crate::error::CaptionError::Preset { message } => message.clone(),
        other => other.to_string(),
    }
}

/// Run the REPL on stdin until quit or EOF
pub async fn run(mut session: InteractiveSession, pipeline: &OverlayPipeline) -> Result<()> {
    eprintln!("\nInteractive mode. Type 'help' for commands.\n");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        eprint!("> ");
        std::io::stderr().flush()?;

        let Some(line) = lines.next_line().await? else {
            eprintln!("\nExiting.");
            return Ok(());
        };

        let action = {
            let mut stderr = std::io::stderr().lock();
            session.handle(&line, &mut stderr)?
        };
        match action {
            Action::Continue => {}
            Action::Quit => return Ok(()),
            Action::Render => {
                debug!("Interactive render of {}", session.input.display());
                if let Err(e) = commands::render(
                    pipeline,
                    &session.input,
                    &session.output,
                    &session.preset,
                    &session.options,
                )
                .await
                {
                    eprintln!("Render failed: {:#}", e);
                }
            }
        }
    }
}
