//! Advanced SubStation Alpha document model, parser and writer

use std::fmt::Write as FmtWrite;

use tracing::{debug, warn};

use crate::error::{CaptionError, CaptionResult};

/// `[Script Info]` entries, kept in file order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptInfo {
    entries: Vec<(String, String)>,
}

impl ScriptInfo {
    /// Defaults for a freshly converted script
    pub fn with_defaults() -> Self {
        let mut info = Self::default();
        info.set("ScriptType", "v4.00+");
        info.set("WrapStyle", "0");
        info.set("ScaledBorderAndShadow", "yes");
        info.set("Collisions", "Normal");
        info
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Replace an existing entry in place or append a new one
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Color in ASS convention: alpha 0 is opaque, 255 fully transparent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl AssColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Format as `&HAABBGGRR`
    pub fn to_ass(&self) -> String {
        format!("&H{:02X}{:02X}{:02X}{:02X}", self.a, self.b, self.g, self.r)
    }

    /// Parse `&HAABBGGRR`, `&HBBGGRR` or a decimal value
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().trim_end_matches('&');
        let value = if let Some(hex) = s.strip_prefix("&H").or_else(|| s.strip_prefix("&h")) {
            u32::from_str_radix(hex, 16).ok()?
        } else {
            s.parse::<i64>().ok()? as u32
        };
        Some(Self {
            r: (value & 0xFF) as u8,
            g: ((value >> 8) & 0xFF) as u8,
            b: ((value >> 16) & 0xFF) as u8,
            a: ((value >> 24) & 0xFF) as u8,
        })
    }
}

/// A `[V4+ Styles]` entry
#[derive(Debug, Clone, PartialEq)]
pub struct AssStyle {
    pub name: String,
    pub fontname: String,
    pub fontsize: f64,
    pub primary_color: AssColor,
    pub secondary_color: AssColor,
    pub outline_color: AssColor,
    pub back_color: AssColor,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikeout: bool,
    pub scale_x: f64,
    pub scale_y: f64,
    pub spacing: f64,
    pub angle: f64,
    pub border_style: u8,
    pub outline: f64,
    pub shadow: f64,
    pub alignment: u8,
    pub margin_l: i64,
    pub margin_r: i64,
    pub margin_v: i64,
    pub encoding: i64,
}

impl Default for AssStyle {
    fn default() -> Self {
        Self {
            name: "Default".to_string(),
            fontname: "Arial".to_string(),
            fontsize: 20.0,
            primary_color: AssColor::new(255, 255, 255, 0),
            secondary_color: AssColor::new(255, 0, 0, 0),
            outline_color: AssColor::new(0, 0, 0, 0),
            back_color: AssColor::new(0, 0, 0, 0),
            bold: false,
            italic: false,
            underline: false,
            strikeout: false,
            scale_x: 100.0,
            scale_y: 100.0,
            spacing: 0.0,
            angle: 0.0,
            border_style: 1,
            outline: 2.0,
            shadow: 2.0,
            alignment: 2,
            margin_l: 10,
            margin_r: 10,
            margin_v: 10,
            encoding: 1,
        }
    }
}

impl AssStyle {
    fn set_field(&mut self, field: &str, value: &str) {
        let value = value.trim();
        match field {
            "name" => self.name = value.to_string(),
            "fontname" => self.fontname = value.to_string(),
            "fontsize" => set_parsed(&mut self.fontsize, value),
            "primarycolour" => set_color(&mut self.primary_color, value),
            "secondarycolour" => set_color(&mut self.secondary_color, value),
            "outlinecolour" | "tertiarycolour" => set_color(&mut self.outline_color, value),
            "backcolour" => set_color(&mut self.back_color, value),
            "bold" => self.bold = parse_flag(value),
            "italic" => self.italic = parse_flag(value),
            "underline" => self.underline = parse_flag(value),
            "strikeout" => self.strikeout = parse_flag(value),
            "scalex" => set_parsed(&mut self.scale_x, value),
            "scaley" => set_parsed(&mut self.scale_y, value),
            "spacing" => set_parsed(&mut self.spacing, value),
            "angle" => set_parsed(&mut self.angle, value),
            "borderstyle" => set_parsed(&mut self.border_style, value),
            "outline" => set_parsed(&mut self.outline, value),
            "shadow" => set_parsed(&mut self.shadow, value),
            "alignment" => set_parsed(&mut self.alignment, value),
            "marginl" => set_parsed(&mut self.margin_l, value),
            "marginr" => set_parsed(&mut self.margin_r, value),
            "marginv" => set_parsed(&mut self.margin_v, value),
            "encoding" => set_parsed(&mut self.encoding, value),
            other => debug!("Ignoring style field {}", other),
        }
    }

    fn to_line(&self) -> String {
        format!(
            "Style: {},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
            self.name,
            self.fontname,
            format_number(self.fontsize),
            self.primary_color.to_ass(),
            self.secondary_color.to_ass(),
            self.outline_color.to_ass(),
            self.back_color.to_ass(),
            format_flag(self.bold),
            format_flag(self.italic),
            format_flag(self.underline),
            format_flag(self.strikeout),
            format_number(self.scale_x),
            format_number(self.scale_y),
            format_number(self.spacing),
            format_number(self.angle),
            self.border_style,
            format_number(self.outline),
            format_number(self.shadow),
            self.alignment,
            self.margin_l,
            self.margin_r,
            self.margin_v,
            self.encoding,
        )
    }
}

/// Event line type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Dialogue,
    Comment,
}

/// An `[Events]` entry; text keeps ASS markup (`\N`, `{...}`)
#[derive(Debug, Clone, PartialEq)]
pub struct AssEvent {
    pub kind: EventKind,
    pub layer: i64,
    pub start_ms: u64,
    pub end_ms: u64,
    pub style: String,
    pub name: String,
    pub margin_l: i64,
    pub margin_r: i64,
    pub margin_v: i64,
    pub effect: String,
    pub text: String,
}

impl AssEvent {
    /// A dialogue event on the Default style
    pub fn dialogue(start_ms: u64, end_ms: u64, text: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Dialogue,
            layer: 0,
            start_ms,
            end_ms,
            style: "Default".to_string(),
            name: String::new(),
            margin_l: 0,
            margin_r: 0,
            margin_v: 0,
            effect: String::new(),
            text: text.into(),
        }
    }

    pub fn is_dialogue(&self) -> bool {
        self.kind == EventKind::Dialogue
    }

    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }

    fn set_field(&mut self, field: &str, value: &str) {
        match field {
            "layer" | "marked" => set_parsed(&mut self.layer, value.trim().trim_start_matches("Marked=")),
            "start" => self.start_ms = parse_ass_time(value).unwrap_or(self.start_ms),
            "end" => self.end_ms = parse_ass_time(value).unwrap_or(self.end_ms),
            "style" => self.style = value.trim().to_string(),
            "name" | "actor" => self.name = value.trim().to_string(),
            "marginl" => set_parsed(&mut self.margin_l, value.trim()),
            "marginr" => set_parsed(&mut self.margin_r, value.trim()),
            "marginv" => set_parsed(&mut self.margin_v, value.trim()),
            "effect" => self.effect = value.trim().to_string(),
            "text" => self.text = value.to_string(),
            other => debug!("Ignoring event field {}", other),
        }
    }

    fn to_line(&self) -> String {
        let prefix = match self.kind {
            EventKind::Dialogue => "Dialogue",
            EventKind::Comment => "Comment",
        };
        format!(
            "{}: {},{},{},{},{},{},{},{},{},{}",
            prefix,
            self.layer,
            format_ass_time(self.start_ms),
            format_ass_time(self.end_ms),
            self.style,
            self.name,
            self.margin_l,
            self.margin_r,
            self.margin_v,
            self.effect,
            self.text,
        )
    }
}

/// Parsed ASS script
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssDocument {
    pub info: ScriptInfo,
    pub styles: Vec<AssStyle>,
    pub events: Vec<AssEvent>,
}

const STYLE_FORMAT: &str = "Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, \
BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, \
Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding";

const EVENT_FORMAT: &str = "Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text";

#[derive(Debug, Clone, Copy, PartialEq)]
enum Section {
    None,
    Info,
    Styles,
    Events,
    Other,
}

impl AssDocument {
    /// Look up a style by name
    pub fn style(&self, name: &str) -> Option<&AssStyle> {
        self.styles.iter().find(|s| s.name == name)
    }

    pub fn style_mut(&mut self, name: &str) -> Option<&mut AssStyle> {
        self.styles.iter_mut().find(|s| s.name == name)
    }

    /// Insert a style, replacing one with the same name
    pub fn set_style(&mut self, style: AssStyle) {
        match self.style_mut(&style.name) {
            Some(existing) => *existing = style,
            None => self.styles.push(style),
        }
    }

    /// Parse ASS/SSA script text
    pub fn parse(content: &str) -> CaptionResult<Self> {
        let content = content.trim_start_matches('\u{feff}');
        let mut doc = AssDocument::default();
        let mut section = Section::None;
        let mut style_format: Vec<String> = split_format(STYLE_FORMAT);
        let mut event_format: Vec<String> = split_format(EVENT_FORMAT);
        let mut saw_header = false;

        for (lineno, raw) in content.lines().enumerate() {
            let line = raw.trim_end_matches('\r');
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with(';') {
                continue;
            }

            if trimmed.starts_with('[') && trimmed.ends_with(']') {
                saw_header = true;
                section = match trimmed.to_lowercase().as_str() {
                    "[script info]" => Section::Info,
                    "[v4+ styles]" | "[v4 styles]" | "[v4 styles+]" => Section::Styles,
                    "[events]" => Section::Events,
                    _ => Section::Other,
                };
                continue;
            }

            // Trailing spaces belong to event text
            let Some((key, value)) = line.trim_start().split_once(':') else {
                warn!("Skipping malformed line {}: {}", lineno + 1, trimmed);
                continue;
            };
            let key = key.trim();
            // Keep event text verbatim apart from the single separator space
            let value = value.strip_prefix(' ').unwrap_or(value);

            match section {
                Section::Info => doc.info.set(key, value.trim()),
                Section::Styles => match key.to_lowercase().as_str() {
                    "format" => style_format = split_format(value),
                    "style" => {
                        let mut style = AssStyle::default();
                        for (field, part) in style_format.iter().zip(value.splitn(style_format.len(), ',')) {
                            style.set_field(field, part);
                        }
                        doc.set_style(style);
                    }
                    _ => {}
                },
                Section::Events => {
                    let kind = match key.to_lowercase().as_str() {
                        "format" => {
                            event_format = split_format(value);
                            continue;
                        }
                        "dialogue" => EventKind::Dialogue,
                        "comment" => EventKind::Comment,
                        _ => continue,
                    };
                    let mut event = AssEvent::dialogue(0, 0, "");
                    event.kind = kind;
                    for (field, part) in event_format.iter().zip(value.splitn(event_format.len(), ',')) {
                        event.set_field(field, part);
                    }
                    doc.events.push(event);
                }
                Section::None | Section::Other => {}
            }
        }

        if !saw_header {
            return Err(CaptionError::SubtitleParse {
                message: "No ASS sections found".to_string(),
            });
        }
        Ok(doc)
    }

    /// Serialize as an ASS v4.00+ script
    pub fn to_ass_string(&self) -> String {
        let mut out = String::new();
        out.push_str("[Script Info]\n");
        out.push_str("; Script generated by caption-animator\n");
        for (key, value) in self.info.iter() {
            let _ = writeln!(out, "{}: {}", key, value);
        }

        out.push_str("\n[V4+ Styles]\n");
        let _ = writeln!(out, "Format: {}", STYLE_FORMAT);
        for style in &self.styles {
            let _ = writeln!(out, "{}", style.to_line());
        }

        out.push_str("\n[Events]\n");
        let _ = writeln!(out, "Format: {}", EVENT_FORMAT);
        for event in &self.events {
            let _ = writeln!(out, "{}", event.to_line());
        }
        out
    }
}

fn split_format(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|f| f.trim().to_lowercase())
        .collect()
}

fn set_parsed<T: std::str::FromStr>(target: &mut T, value: &str) {
    if let Ok(parsed) = value.trim().parse::<T>() {
        *target = parsed;
    }
}

fn set_color(target: &mut AssColor, value: &str) {
    if let Some(color) = AssColor::parse(value) {
        *target = color;
    }
}

fn parse_flag(value: &str) -> bool {
    value.trim().parse::<i64>().map(|v| v != 0).unwrap_or(false)
}

fn format_flag(value: bool) -> &'static str {
    if value {
        "-1"
    } else {
        "0"
    }
}

/// Integers print without a fractional part
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Parse `H:MM:SS.cc` into milliseconds
pub fn parse_ass_time(value: &str) -> Option<u64> {
    let parts: Vec<&str> = value.trim().split(':').collect();
    if parts.len() != 3 {
        return None;
    }
    let hours: u64 = parts[0].parse().ok()?;
    let minutes: u64 = parts[1].parse().ok()?;
    let seconds: f64 = parts[2].parse().ok()?;
    Some(hours * 3_600_000 + minutes * 60_000 + (seconds * 1000.0).round() as u64)
}

/// Format milliseconds as `H:MM:SS.cc`
pub fn format_ass_time(ms: u64) -> String {
    let cs = (ms + 5) / 10;
    let hours = cs / 360_000;
    let minutes = (cs % 360_000) / 6_000;
    let seconds = (cs % 6_000) / 100;
    let centis = cs % 100;
    format!("{}:{:02}:{:02}.{:02}", hours, minutes, seconds, centis)
}
