//! Built-in presets shipped with the binary

use serde_json::{json, Value};

use crate::domain::model::PresetConfig;
use crate::error::{CaptionError, CaptionResult};

/// Names of the built-in presets, sorted
pub const BUILTIN_PRESET_NAMES: &[&str] = &["clean_outline", "modern_box"];

fn builtin_value(name: &str) -> Option<Value> {
    let value = match name {
        "clean_outline" => json!({
            "font_file": "",
            "font_name": "Arial",
            "font_size": 64,
            "bold": false,
            "italic": false,
            "primary_color": "#FFFFFF",
            "outline_color": "#000000",
            "shadow_color": "#000000",
            "outline_px": 5,
            "shadow_px": 2,
            "blur_px": 0,
            "line_spacing": 8,
            "max_width_px": 1200,
            "padding": [40, 60, 50, 60],
            "alignment": 2,
            "margin_l": 0,
            "margin_r": 0,
            "margin_v": 0,
            "wrap_style": 2,
            "animation": {"type": "fade", "in_ms": 120, "out_ms": 120}
        }),
        "modern_box" => json!({
            "font_file": "",
            "font_name": "Arial",
            "font_size": 62,
            "bold": true,
            "italic": false,
            "primary_color": "#FFFFFF",
            "outline_color": "#000000",
            "shadow_color": "#000000",
            "outline_px": 6,
            "shadow_px": 3,
            "blur_px": 0,
            "line_spacing": 10,
            "max_width_px": 1100,
            "padding": [44, 70, 56, 70],
            "alignment": 2,
            "margin_l": 0,
            "margin_r": 0,
            "margin_v": 0,
            "wrap_style": 2,
            "animation": {"type": "slide_up", "in_ms": 140, "out_ms": 120, "move_px": 26}
        }),
        _ => return None,
    };
    Some(value)
}

pub fn is_builtin(name: &str) -> bool {
    BUILTIN_PRESET_NAMES.contains(&name)
}

/// Load a built-in preset by name
pub fn builtin_preset(name: &str) -> CaptionResult<PresetConfig> {
    let value = builtin_value(name).ok_or_else(|| {
        CaptionError::preset(format!(
            "Built-in preset '{}' not found. Available: {}",
            name,
            BUILTIN_PRESET_NAMES.join(", ")
        ))
    })?;
    PresetConfig::from_value(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_load() {
        for name in BUILTIN_PRESET_NAMES {
            let preset = builtin_preset(name).unwrap();
            assert!(preset.animation.is_some(), "{} has no animation", name);
        }
    }

    #[test]
    fn test_modern_box_values() {
        let preset = builtin_preset("modern_box").unwrap();
        assert_eq!(preset.font_size, 62);
        assert!(preset.bold);
        assert_eq!(preset.padding, vec![44, 70, 56, 70]);
        let anim = preset.animation.unwrap();
        assert_eq!(anim.kind, "slide_up");
        assert_eq!(anim.params.get("move_px"), Some(&json!(26)));
    }

    #[test]
    fn test_clean_outline_values() {
        let preset = builtin_preset("clean_outline").unwrap();
        assert_eq!(preset.outline_px, 5.0);
        assert_eq!(preset.animation.unwrap().kind, "fade");
    }

    #[test]
    fn test_unknown_builtin() {
        assert!(!is_builtin("neon"));
        assert!(builtin_preset("neon").is_err());
    }
}
