// Domain models - Preset configuration and overlay geometry

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CaptionError, CaptionResult};

/// Animation parameters, keyed by parameter name
pub type AnimationParams = Map<String, Value>;

/// Animation configuration extracted from a preset.
///
/// Serialized flat: the `type` key names the animation and every other key is
/// a parameter, e.g. `{"type": "fade", "in_ms": 120, "out_ms": 120}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationConfig {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub params: AnimationParams,
}

impl AnimationConfig {
    /// Create a new animation config
    pub fn new(kind: impl Into<String>, params: AnimationParams) -> Self {
        Self {
            kind: kind.into(),
            params,
        }
    }

    /// Build from a JSON value, requiring a `type` field
    pub fn from_value(value: Value) -> CaptionResult<Self> {
        if !value.is_object() {
            return Err(CaptionError::preset(format!(
                "Animation config must be a mapping, got {}",
                value
            )));
        }
        if value.get("type").is_none() {
            return Err(CaptionError::preset("Animation config must have 'type' field"));
        }
        Ok(serde_json::from_value(value)?)
    }
}

/// Output quality tier, which selects codec and pixel format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoQuality {
    /// H.264, small files, no alpha channel
    Small,
    /// ProRes 422 HQ, no alpha channel
    Medium,
    /// ProRes 4444 with alpha channel
    #[default]
    Large,
}

impl VideoQuality {
    /// Short human description used in listings
    pub fn description(&self) -> &'static str {
        match self {
            Self::Small => "H.264 (~5-10MB/min, no alpha)",
            Self::Medium => "ProRes 422 HQ (~220Mbps, no alpha)",
            Self::Large => "ProRes 4444 (~330Mbps, with alpha)",
        }
    }

    /// Whether the output keeps a transparent background
    pub fn has_alpha(&self) -> bool {
        matches!(self, Self::Large)
    }
}

impl FromStr for VideoQuality {
    type Err = CaptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "small" => Ok(Self::Small),
            "medium" => Ok(Self::Medium),
            "large" => Ok(Self::Large),
            other => Err(CaptionError::Config {
                message: format!(
                    "Invalid quality: {}. Choose from: small, medium, large",
                    other
                ),
            }),
        }
    }
}

impl fmt::Display for VideoQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        };
        write!(f, "{}", name)
    }
}

/// Complete preset configuration.
///
/// Missing keys take their defaults and unknown keys are ignored, so partial
/// preset files stay valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresetConfig {
    // Font settings
    pub font_file: String,
    pub font_name: String,
    pub font_size: u32,
    pub bold: bool,
    pub italic: bool,

    // Colors (#RRGGBB)
    pub primary_color: String,
    pub outline_color: String,
    pub shadow_color: String,

    // Styling
    pub outline_px: f64,
    pub shadow_px: f64,
    pub blur_px: f64,

    // Layout
    pub line_spacing: u32,
    pub max_width_px: i64,
    /// [top, right, bottom, left]
    pub padding: Vec<i64>,
    pub alignment: u8,
    pub margin_l: i64,
    pub margin_r: i64,
    pub margin_v: i64,
    pub wrap_style: u8,

    pub animation: Option<AnimationConfig>,

    // Encoding
    pub video_quality: VideoQuality,
    pub h264_crf: u8,
}

impl Default for PresetConfig {
    fn default() -> Self {
        Self {
            font_file: String::new(),
            font_name: "Arial".to_string(),
            font_size: 64,
            bold: false,
            italic: false,
            primary_color: "#FFFFFF".to_string(),
            outline_color: "#000000".to_string(),
            shadow_color: "#000000".to_string(),
            outline_px: 4.0,
            shadow_px: 2.0,
            blur_px: 0.0,
            line_spacing: 8,
            max_width_px: 1200,
            padding: vec![40, 60, 50, 60],
            alignment: 2,
            margin_l: 0,
            margin_r: 0,
            margin_v: 0,
            wrap_style: 2,
            animation: None,
            video_quality: VideoQuality::Large,
            h264_crf: 18,
        }
    }
}

/// Top-level preset keys, in display order
pub const PRESET_KEYS: &[&str] = &[
    "font_file",
    "font_name",
    "font_size",
    "bold",
    "italic",
    "primary_color",
    "outline_color",
    "shadow_color",
    "outline_px",
    "shadow_px",
    "blur_px",
    "line_spacing",
    "max_width_px",
    "padding",
    "alignment",
    "margin_l",
    "margin_r",
    "margin_v",
    "wrap_style",
    "animation",
    "video_quality",
    "h264_crf",
];

impl PresetConfig {
    /// Build from a JSON value (a mapping of preset keys)
    pub fn from_value(value: Value) -> CaptionResult<Self> {
        let Value::Object(mut map) = value else {
            return Err(CaptionError::preset("Preset must be a mapping"));
        };

        // Validate the animation block separately for a clearer message
        if let Some(animation) = map.remove("animation") {
            if !animation.is_null() {
                let config = AnimationConfig::from_value(animation)?;
                map.insert("animation".to_string(), serde_json::to_value(config)?);
            }
        }

        serde_json::from_value(Value::Object(map)).map_err(|e| {
            CaptionError::preset(format!("Invalid preset value: {}", e))
        })
    }

    /// Convert to a JSON value
    pub fn to_value(&self) -> CaptionResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Pretty JSON with sorted keys
    pub fn to_json(&self) -> CaptionResult<String> {
        // serde_json::Map is a BTreeMap without `preserve_order`, so keys sort
        let value = self.to_value()?;
        Ok(serde_json::to_string_pretty(&value)?)
    }

    /// Parse from a JSON string
    pub fn from_json(json: &str) -> CaptionResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Merge with another preset; non-null values from `other` win
    pub fn merge_with(&self, other: &PresetConfig) -> CaptionResult<PresetConfig> {
        self.merge_value(&other.to_value()?)
    }

    /// Merge a partial mapping over this preset; non-null values win
    pub fn merge_value(&self, overrides: &Value) -> CaptionResult<PresetConfig> {
        let mut merged = self.to_value()?;
        if let (Value::Object(base), Value::Object(over)) = (&mut merged, overrides) {
            for (key, value) in over {
                if !value.is_null() {
                    base.insert(key.clone(), value.clone());
                }
            }
        }
        Self::from_value(merged)
    }

    /// Read a value by key; `animation.<param>` reaches animation parameters
    pub fn get_field(&self, key: &str) -> CaptionResult<Value> {
        match key.split_once('.') {
            None => {
                let value = self.to_value()?;
                value
                    .get(key)
                    .cloned()
                    .ok_or_else(|| CaptionError::preset(format!("Unknown key: {}", key)))
            }
            Some(("animation", param)) => {
                let animation = self
                    .animation
                    .as_ref()
                    .ok_or_else(|| CaptionError::preset("No animation configured"))?;
                animation.params.get(param).cloned().ok_or_else(|| {
                    CaptionError::preset(format!("Animation parameter not set: {}", param))
                })
            }
            Some(_) => Err(CaptionError::preset(format!("Unsupported nested key: {}", key))),
        }
    }

    /// Set a value by key from raw user input.
    ///
    /// Top-level values are type-checked by round-tripping through the preset
    /// schema; the preset is left untouched on error.
    pub fn set_field(&mut self, key: &str, raw: &str) -> CaptionResult<Value> {
        let value = parse_raw_value(raw);
        match key.split_once('.') {
            None => {
                if !PRESET_KEYS.contains(&key) {
                    return Err(CaptionError::preset(format!("Unknown key: {}", key)));
                }
                let mut patch = Map::new();
                patch.insert(key.to_string(), value.clone());
                let mut current = self.to_value()?;
                if let Value::Object(map) = &mut current {
                    map.extend(patch);
                }
                *self = Self::from_value(current)?;
                self.get_field(key)
            }
            Some(("animation", param)) => {
                let animation = self
                    .animation
                    .as_mut()
                    .ok_or_else(|| CaptionError::preset("No animation configured"))?;
                animation.params.insert(param.to_string(), value.clone());
                Ok(value)
            }
            Some(_) => Err(CaptionError::preset(format!("Unsupported nested key: {}", key))),
        }
    }
}

/// Interpret a raw string the way a user typing at a prompt would expect
pub fn parse_raw_value(raw: &str) -> Value {
    let raw = raw.trim();
    match raw.to_lowercase().as_str() {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        "none" | "null" => return Value::Null,
        _ => {}
    }
    if let Ok(i) = raw.parse::<i64>() {
        return Value::from(i);
    }
    if let Ok(f) = raw.parse::<f64>() {
        if f.is_finite() {
            return Value::from(f);
        }
    }
    if raw.starts_with('[') || raw.starts_with('{') {
        if let Ok(v) = serde_json::from_str::<Value>(raw) {
            return v;
        }
    }
    Value::String(raw.to_string())
}

/// Dimensions of the overlay canvas in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlaySize {
    pub width: u32,
    pub height: u32,
}

impl OverlaySize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for OverlaySize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Anchor point on the overlay canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: i64,
    pub y: i64,
}

impl Position {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

#[cfg(test)]
mod tests;
