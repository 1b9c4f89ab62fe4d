//! Subtitle documents: loading, restyling and saving
//!
//! SRT and ASS inputs are held as one ASS document. Every operation that
//! walks events only touches dialogue lines; comments pass through as is.

pub mod ass;
pub mod srt;
pub mod style;

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

use crate::animations::{inject_override, Animation, AnimationContext};
use crate::domain::model::{OverlaySize, Position, PresetConfig};
use crate::error::{CaptionError, CaptionResult};
use crate::text::{
    ass_newlines_to_real, normalize_whitespace, real_newlines_to_ass, strip_ass_tags,
    wrap_text_to_width, TextMeasurer,
};

pub use ass::{AssColor, AssDocument, AssEvent, AssStyle, EventKind, ScriptInfo};
pub use style::{parse_color, StyleBuilder};

static MOVE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\move\s*\(").unwrap());

/// Format a subtitle file was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtitleFormat {
    Srt,
    Ass,
}

impl SubtitleFormat {
    /// Detect from the file extension, case-insensitively
    pub fn from_path(path: &Path) -> CaptionResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "srt" => Ok(Self::Srt),
            "ass" => Ok(Self::Ass),
            _ => Err(CaptionError::UnsupportedFormat {
                extension: if ext.is_empty() {
                    "(none)".to_string()
                } else {
                    format!(".{}", ext)
                },
            }),
        }
    }
}

/// A loaded subtitle document
#[derive(Debug, Clone)]
pub struct SubtitleFile {
    pub document: AssDocument,
    pub format: SubtitleFormat,
}

impl SubtitleFile {
    /// Load an `.srt` or `.ass` file
    pub fn load(path: &Path) -> CaptionResult<Self> {
        let format = SubtitleFormat::from_path(path)?;
        if !path.exists() {
            return Err(CaptionError::InputFileNotFound {
                path: path.display().to_string(),
            });
        }
        let bytes = std::fs::read(path)?;
        let content = String::from_utf8_lossy(&bytes);
        let file = Self::parse(&content, format)?;
        info!(
            "Loaded {} dialogue events from {}",
            file.dialogue_count(),
            path.display()
        );
        Ok(file)
    }

    /// Parse subtitle text in the given format
    pub fn parse(content: &str, format: SubtitleFormat) -> CaptionResult<Self> {
        let document = match format {
            SubtitleFormat::Srt => AssDocument {
                info: ScriptInfo::with_defaults(),
                styles: vec![AssStyle::default()],
                events: srt::parse_srt(content)?,
            },
            SubtitleFormat::Ass => AssDocument::parse(content)?,
        };
        Ok(Self { document, format })
    }

    pub fn is_srt(&self) -> bool {
        self.format == SubtitleFormat::Srt
    }

    /// Dialogue events in file order
    pub fn dialogue_events(&self) -> impl Iterator<Item = &AssEvent> {
        self.document.events.iter().filter(|e| e.is_dialogue())
    }

    fn dialogue_events_mut(&mut self) -> impl Iterator<Item = &mut AssEvent> {
        self.document.events.iter_mut().filter(|e| e.is_dialogue())
    }

    pub fn dialogue_count(&self) -> usize {
        self.dialogue_events().count()
    }

    /// Install `style` as `Default` and move every dialogue event onto it.
    ///
    /// With a measurer, event text is re-wrapped to the preset's
    /// `max_width_px`.
    pub fn apply_style(
        &mut self,
        mut style: AssStyle,
        preset: &PresetConfig,
        measurer: Option<&dyn TextMeasurer>,
    ) {
        style.name = "Default".to_string();
        self.document.set_style(style);

        let info = &mut self.document.info;
        info.set("WrapStyle", preset.wrap_style.to_string());
        info.set("ScaledBorderAndShadow", "yes");
        info.set("ScriptType", "v4.00+");

        for event in self.dialogue_events_mut() {
            event.style = "Default".to_string();
            if let Some(measurer) = measurer {
                let plain = normalize_whitespace(&ass_newlines_to_real(&event.text));
                let wrapped = wrap_text_to_width(&plain, measurer, preset.max_width_px);
                event.text = real_newlines_to_ass(&wrapped);
            }
        }
        debug!("Applied preset style to {} events", self.dialogue_count());
    }

    /// Remove every override block from dialogue text
    pub fn strip_overrides(&mut self) {
        for event in self.dialogue_events_mut() {
            event.text = strip_ass_tags(&event.text);
        }
    }

    /// Add a constant `\blur` to every dialogue event
    pub fn apply_base_blur(&mut self, blur_px: f64) {
        if blur_px <= 0.0 {
            return;
        }
        let tag = format!(r"\blur{}", blur_px.round() as i64);
        for event in self.dialogue_events_mut() {
            event.text = inject_override(&event.text, &tag);
        }
    }

    /// Apply an animation to every dialogue event
    pub fn apply_animation(
        &mut self,
        animation: &dyn Animation,
        ctx: &AnimationContext,
    ) -> CaptionResult<()> {
        for event in self.dialogue_events_mut() {
            animation.apply_to_event(event, ctx)?;
        }
        debug!("Applied {} animation", animation.kind());
        Ok(())
    }

    /// Centre every event on `position` with `\an5\pos(x,y)`.
    ///
    /// When `keep_existing_motion` is set, events already carrying `\move`
    /// only receive `\an5` so their motion path is preserved.
    pub fn apply_center_positioning(&mut self, position: Position, keep_existing_motion: bool) {
        let pos_tag = format!(r"\an5\pos({},{})", position.x, position.y);
        for event in self.dialogue_events_mut() {
            let tag = if keep_existing_motion && MOVE_TAG.is_match(&event.text) {
                r"\an5"
            } else {
                pos_tag.as_str()
            };
            event.text = inject_override(&event.text, tag);
        }
        if let Some(style) = self.document.style_mut("Default") {
            style.alignment = 5;
        }
    }

    /// Latest dialogue end time
    pub fn duration_ms(&self) -> u64 {
        self.dialogue_events().map(|e| e.end_ms).max().unwrap_or(0)
    }

    pub fn set_play_resolution(&mut self, size: OverlaySize) {
        self.document.info.set("PlayResX", size.width.to_string());
        self.document.info.set("PlayResY", size.height.to_string());
    }

    pub fn to_ass_string(&self) -> String {
        self.document.to_ass_string()
    }

    /// Write the document as ASS
    pub fn save(&self, path: &Path) -> CaptionResult<()> {
        std::fs::write(path, self.to_ass_string())?;
        debug!("Wrote ASS to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animations::AnimationRegistry;
    use crate::text::FixedWidthMeasurer;
    use std::path::PathBuf;

    const SRT: &str = "1\n00:00:00,000 --> 00:00:02,000\nHello world\n\n2\n00:00:02,500 --> 00:00:04,000\n<i>Second</i> line\n";

    fn srt_file() -> SubtitleFile {
        SubtitleFile::parse(SRT, SubtitleFormat::Srt).unwrap()
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            SubtitleFormat::from_path(&PathBuf::from("a/b.SRT")).unwrap(),
            SubtitleFormat::Srt
        );
        assert_eq!(
            SubtitleFormat::from_path(&PathBuf::from("x.ass")).unwrap(),
            SubtitleFormat::Ass
        );
        let err = SubtitleFormat::from_path(&PathBuf::from("x.vtt")).unwrap_err();
        assert!(err.to_string().contains("Unsupported subtitle format: .vtt"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = SubtitleFile::load(&PathBuf::from("/no/such/file.srt")).unwrap_err();
        assert!(matches!(err, CaptionError::InputFileNotFound { .. }));
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subs.srt");
        std::fs::write(&path, SRT).unwrap();
        let file = SubtitleFile::load(&path).unwrap();
        assert!(file.is_srt());
        assert_eq!(file.dialogue_count(), 2);
        assert_eq!(file.duration_ms(), 4000);
    }

    #[test]
    fn test_apply_style_rewraps() {
        let mut file = srt_file();
        let mut preset = PresetConfig::default();
        preset.max_width_px = 60;
        let style = StyleBuilder::new(&preset).build("Custom").unwrap();
        let measurer = FixedWidthMeasurer::new(10.0, 20);
        file.apply_style(style, &preset, Some(&measurer));

        assert_eq!(file.document.styles.len(), 1);
        assert_eq!(file.document.info.get("WrapStyle"), Some("2"));
        let texts: Vec<&str> = file.dialogue_events().map(|e| e.text.as_str()).collect();
        assert_eq!(texts[0], r"Hello\Nworld");
        assert!(file.dialogue_events().all(|e| e.style == "Default"));
    }

    #[test]
    fn test_strip_overrides_and_blur() {
        let mut file = srt_file();
        file.strip_overrides();
        assert_eq!(file.document.events[1].text, "Second line");
        file.apply_base_blur(1.6);
        assert_eq!(file.document.events[0].text, r"{\blur2}Hello world");
    }

    #[test]
    fn test_blur_zero_is_noop() {
        let mut file = srt_file();
        file.apply_base_blur(0.0);
        assert_eq!(file.document.events[0].text, "Hello world");
    }

    #[test]
    fn test_center_positioning_keeps_move() {
        let mut file = srt_file();
        file.document.events[1].text = r"{\move(1,2,3,4)}Moving".to_string();
        file.apply_center_positioning(Position::new(100, 50), true);

        assert_eq!(file.document.events[0].text, r"{\an5\pos(100,50)}Hello world");
        assert_eq!(file.document.events[1].text, r"{\an5\move(1,2,3,4)}Moving");
        assert_eq!(file.document.style("Default").unwrap().alignment, 5);
    }

    #[test]
    fn test_center_positioning_merges_leading_block() {
        let mut file = srt_file();
        file.document.events[0].text = r"{\b1}word{\b0} rest".to_string();
        file.apply_center_positioning(Position::new(320, 90), true);

        assert_eq!(file.document.events[0].text, r"{\an5\pos(320,90)\b1}word{\b0} rest");
        assert_eq!(file.document.events[1].text, r"{\an5\pos(320,90)\i1}Second{\i0} line");
    }

    #[test]
    fn test_center_positioning_leads_existing_pos() {
        let mut file = srt_file();
        file.document.events[0].text = r"{\pos(10,10)\fs40}Placed".to_string();
        file.apply_center_positioning(Position::new(320, 90), true);

        // libass honours the first positioning tag in a line
        assert_eq!(
            file.document.events[0].text,
            r"{\an5\pos(320,90)\pos(10,10)\fs40}Placed"
        );
    }

    #[test]
    fn test_center_positioning_without_keeping_motion() {
        let mut file = srt_file();
        file.document.events[0].text = r"{\move(1,2,3,4)}Moving".to_string();
        file.apply_center_positioning(Position::new(100, 50), false);
        assert_eq!(file.document.events[0].text, r"{\an5\pos(100,50)\move(1,2,3,4)}Moving");
    }

    #[test]
    fn test_comments_are_untouched() {
        let ass = "[Script Info]\nScriptType: v4.00+\n\n[Events]\nFormat: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\nDialogue: 0,0:00:00.00,0:00:01.00,Default,,0,0,0,,Spoken\nComment: 0,0:00:00.00,0:00:09.00,Default,,0,0,0,,Note\n";
        let mut file = SubtitleFile::parse(ass, SubtitleFormat::Ass).unwrap();
        let fade = AnimationRegistry::create(
            "fade",
            &AnimationRegistry::defaults("fade").unwrap(),
        )
        .unwrap();
        file.apply_animation(fade.as_ref(), &AnimationContext::default())
            .unwrap();

        assert_eq!(file.document.events[0].text, r"{\fad(120,120)}Spoken");
        assert_eq!(file.document.events[1].text, "Note");
        assert_eq!(file.duration_ms(), 1000);
    }

    #[test]
    fn test_play_resolution_and_save() {
        let mut file = srt_file();
        file.set_play_resolution(OverlaySize::new(640, 200));
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.ass");
        file.save(&out).unwrap();
        let written = std::fs::read_to_string(&out).unwrap();
        assert!(written.contains("PlayResX: 640"));
        assert!(written.contains("PlayResY: 200"));
        assert!(written.contains(r"{\i1}Second{\i0} line"));
    }
}
