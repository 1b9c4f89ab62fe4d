//! Text measurement
//!
//! Measurements approximate how libass lays the text out: line width is the
//! sum of glyph advances plus kerning, line height is ascent plus descent.

use std::path::{Path, PathBuf};

use fontdue::{Font, FontSettings};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::domain::model::PresetConfig;
use crate::error::{CaptionError, CaptionResult};

/// Fonts tried, in order, when a preset does not name a font file
pub const FALLBACK_FONTS: &[&str] = &[
    "arial.ttf",
    "Arial.ttf",
    "DejaVuSans.ttf",
    "LiberationSans-Regular.ttf",
];

/// Measures single lines of text in pixels
pub trait TextMeasurer {
    /// Advance width of one line
    fn line_width(&self, text: &str) -> f32;

    /// Height of one line (ascent + descent)
    fn line_height(&self) -> u32;
}

/// Measurer backed by a TrueType/OpenType font file
pub struct FontMeasurer {
    font: Font,
    px: f32,
    source: PathBuf,
}

impl FontMeasurer {
    /// Load a font file at the given pixel size
    pub fn from_file(path: &Path, px: f32) -> CaptionResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| CaptionError::Font {
            message: format!("Failed to read font file {}: {}", path.display(), e),
        })?;
        let settings = FontSettings {
            scale: px,
            ..FontSettings::default()
        };
        let font = Font::from_bytes(bytes, settings).map_err(|e| CaptionError::Font {
            message: format!("Failed to parse font {}: {}", path.display(), e),
        })?;
        debug!("Loaded font {} at {}px", path.display(), px);
        Ok(Self {
            font,
            px,
            source: path.to_path_buf(),
        })
    }

    /// Load the preset's font, falling back to common system fonts
    pub fn for_preset(preset: &PresetConfig) -> CaptionResult<Self> {
        let px = preset.font_size as f32;
        if !preset.font_file.is_empty() {
            let path = Path::new(&preset.font_file);
            if !path.exists() {
                return Err(CaptionError::Font {
                    message: format!("Font file not found: {}", preset.font_file),
                });
            }
            return Self::from_file(path, px);
        }

        let path = locate_fallback_font().ok_or_else(|| CaptionError::Font {
            message: "No usable font found. Provide 'font_file' in preset configuration \
                      pointing to a TTF/OTF file for deterministic measurement."
                .to_string(),
        })?;
        info!("Using fallback font for measurement: {}", path.display());
        Self::from_file(&path, px)
    }

    /// Path the font was loaded from
    pub fn source(&self) -> &Path {
        &self.source
    }
}

impl TextMeasurer for FontMeasurer {
    fn line_width(&self, text: &str) -> f32 {
        let mut width = 0.0;
        let mut previous: Option<char> = None;
        for c in text.chars() {
            if let Some(prev) = previous {
                width += self.font.horizontal_kern(prev, c, self.px).unwrap_or(0.0);
            }
            width += self.font.metrics(c, self.px).advance_width;
            previous = Some(c);
        }
        width
    }

    fn line_height(&self) -> u32 {
        match self.font.horizontal_line_metrics(self.px) {
            Some(metrics) => (metrics.ascent.ceil() + metrics.descent.abs().ceil()) as u32,
            None => self.px.ceil() as u32,
        }
    }
}

/// Measurer with a constant advance per character.
///
/// Deterministic across machines, which makes it useful when no font is
/// installed and in tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedWidthMeasurer {
    pub advance: f32,
    pub height: u32,
}

impl FixedWidthMeasurer {
    pub fn new(advance: f32, height: u32) -> Self {
        Self { advance, height }
    }
}

impl TextMeasurer for FixedWidthMeasurer {
    fn line_width(&self, text: &str) -> f32 {
        text.chars().count() as f32 * self.advance
    }

    fn line_height(&self) -> u32 {
        self.height
    }
}

/// Measure multi-line text.
///
/// Returns `(max_line_width, total_height, line_count)`. Empty text counts as
/// a single empty line.
pub fn measure_multiline(
    text: &str,
    measurer: &dyn TextMeasurer,
    line_spacing_px: u32,
) -> (u32, u32, usize) {
    let lines: Vec<&str> = text.split('\n').collect();
    let max_width = lines
        .iter()
        .map(|line| measure_single_line(line, measurer))
        .max()
        .unwrap_or(0);

    let count = lines.len() as u32;
    let total_height =
        count * measurer.line_height() + count.saturating_sub(1) * line_spacing_px;

    (max_width, total_height, lines.len())
}

/// Width of a single line, rounded up
pub fn measure_single_line(text: &str, measurer: &dyn TextMeasurer) -> u32 {
    measurer.line_width(text).ceil() as u32
}

/// Directories searched for fallback fonts
fn font_search_dirs() -> Vec<PathBuf> {
    let mut dirs_out = Vec::new();
    if let Some(dir) = dirs::font_dir() {
        dirs_out.push(dir);
    }
    if let Some(home) = dirs::home_dir() {
        dirs_out.push(home.join(".fonts"));
    }
    if let Some(windir) = std::env::var_os("WINDIR") {
        dirs_out.push(PathBuf::from(windir).join("Fonts"));
    }
    for dir in [
        "/usr/share/fonts",
        "/usr/local/share/fonts",
        "/Library/Fonts",
        "/System/Library/Fonts",
    ] {
        dirs_out.push(PathBuf::from(dir));
    }
    dirs_out
}

/// Find the first fallback font, checking the working directory first
pub fn locate_fallback_font() -> Option<PathBuf> {
    for name in FALLBACK_FONTS {
        let local = PathBuf::from(name);
        if local.is_file() {
            return Some(local);
        }
    }

    let dirs = font_search_dirs();
    for name in FALLBACK_FONTS {
        for dir in dirs.iter().filter(|d| d.is_dir()) {
            let found = WalkDir::new(dir)
                .follow_links(true)
                .max_depth(6)
                .into_iter()
                .filter_map(|entry| entry.ok())
                .find(|entry| {
                    entry.file_type().is_file() && entry.file_name() == std::ffi::OsStr::new(name)
                });
            if let Some(entry) = found {
                return Some(entry.into_path());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_width_measurer() {
        let m = FixedWidthMeasurer::new(10.0, 20);
        assert_eq!(m.line_width("abcd"), 40.0);
        assert_eq!(m.line_height(), 20);
    }

    #[test]
    fn test_measure_multiline() {
        let m = FixedWidthMeasurer::new(10.0, 20);
        let (w, h, lines) = measure_multiline("Hello\nHi", &m, 8);
        assert_eq!(w, 50);
        assert_eq!(h, 2 * 20 + 8);
        assert_eq!(lines, 2);
    }

    #[test]
    fn test_measure_empty_is_one_line() {
        let m = FixedWidthMeasurer::new(10.0, 20);
        assert_eq!(measure_multiline("", &m, 8), (0, 20, 1));
    }

    #[test]
    fn test_measure_single_line_rounds_up() {
        let m = FixedWidthMeasurer::new(2.5, 10);
        assert_eq!(measure_single_line("abc", &m), 8);
    }

    #[test]
    fn test_missing_font_file_is_error() {
        let mut preset = PresetConfig::default();
        preset.font_file = "/definitely/not/here.ttf".to_string();
        let err = FontMeasurer::for_preset(&preset).err().unwrap();
        assert!(err.to_string().contains("Font file not found"));
    }

    #[test]
    fn test_invalid_font_bytes_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ttf");
        std::fs::write(&path, b"not a font").unwrap();
        assert!(FontMeasurer::from_file(&path, 48.0).is_err());
    }
}
