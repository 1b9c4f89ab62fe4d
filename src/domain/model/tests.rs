// Unit tests for domain models

#[cfg(test)]
mod tests {
    use crate::domain::model::*;
    use serde_json::json;

    #[test]
    fn test_preset_defaults() {
        let preset = PresetConfig::default();
        assert_eq!(preset.font_name, "Arial");
        assert_eq!(preset.font_size, 64);
        assert_eq!(preset.padding, vec![40, 60, 50, 60]);
        assert_eq!(preset.video_quality, VideoQuality::Large);
        assert!(preset.animation.is_none());
    }

    #[test]
    fn test_preset_from_partial_value_keeps_defaults() {
        let preset = PresetConfig::from_value(json!({
            "font_size": 48,
            "bold": true,
            "unknown_key": "ignored"
        }))
        .unwrap();
        assert_eq!(preset.font_size, 48);
        assert!(preset.bold);
        assert_eq!(preset.max_width_px, 1200);
    }

    #[test]
    fn test_preset_outline_accepts_integers() {
        let preset = PresetConfig::from_value(json!({"outline_px": 5, "shadow_px": 2})).unwrap();
        assert_eq!(preset.outline_px, 5.0);
        assert_eq!(preset.shadow_px, 2.0);
    }

    #[test]
    fn test_animation_config_flattens_params() {
        let preset = PresetConfig::from_value(json!({
            "animation": {"type": "fade", "in_ms": 150, "out_ms": 100}
        }))
        .unwrap();
        let animation = preset.animation.unwrap();
        assert_eq!(animation.kind, "fade");
        assert_eq!(animation.params.get("in_ms"), Some(&json!(150)));
        assert!(!animation.params.contains_key("type"));

        let value = serde_json::to_value(&animation).unwrap();
        assert_eq!(value, json!({"type": "fade", "in_ms": 150, "out_ms": 100}));
    }

    #[test]
    fn test_animation_config_requires_type() {
        let err = PresetConfig::from_value(json!({"animation": {"in_ms": 100}})).unwrap_err();
        assert!(err.to_string().contains("'type'"));
    }

    #[test]
    fn test_null_animation_is_none() {
        let preset = PresetConfig::from_value(json!({"animation": null})).unwrap();
        assert!(preset.animation.is_none());
    }

    #[test]
    fn test_json_round_trip_sorted() {
        let mut preset = PresetConfig::default();
        preset.animation = Some(AnimationConfig::new("fade", AnimationParams::new()));
        let text = preset.to_json().unwrap();
        assert!(text.find("\"alignment\"").unwrap() < text.find("\"bold\"").unwrap());
        assert_eq!(PresetConfig::from_json(&text).unwrap(), preset);
    }

    #[test]
    fn test_merge_with_prefers_other() {
        let base = PresetConfig::default();
        let mut other = PresetConfig::default();
        other.font_size = 90;
        other.primary_color = "#FF0000".to_string();
        let merged = base.merge_with(&other).unwrap();
        assert_eq!(merged.font_size, 90);
        assert_eq!(merged.primary_color, "#FF0000");
    }

    #[test]
    fn test_merge_value_skips_nulls() {
        let mut base = PresetConfig::default();
        base.animation = Some(AnimationConfig::new("fade", AnimationParams::new()));
        let merged = base
            .merge_value(&json!({"animation": null, "font_name": "Inter"}))
            .unwrap();
        assert_eq!(merged.font_name, "Inter");
        assert!(merged.animation.is_some());
    }

    #[test]
    fn test_set_field_top_level() {
        let mut preset = PresetConfig::default();
        assert_eq!(preset.set_field("font_size", "72").unwrap(), json!(72));
        assert_eq!(preset.font_size, 72);
        preset.set_field("padding", "[1, 2, 3, 4]").unwrap();
        assert_eq!(preset.padding, vec![1, 2, 3, 4]);
        preset.set_field("bold", "TRUE").unwrap();
        assert!(preset.bold);
    }

    #[test]
    fn test_set_field_rejects_bad_type_and_keeps_state() {
        let mut preset = PresetConfig::default();
        assert!(preset.set_field("font_size", "huge").is_err());
        assert_eq!(preset.font_size, 64);
        assert!(preset.set_field("not_a_key", "1").is_err());
    }

    #[test]
    fn test_set_field_animation_param() {
        let mut preset = PresetConfig::default();
        assert!(preset.set_field("animation.in_ms", "100").is_err());

        preset.animation = Some(AnimationConfig::new("fade", AnimationParams::new()));
        preset.set_field("animation.in_ms", "100").unwrap();
        assert_eq!(preset.get_field("animation.in_ms").unwrap(), json!(100));
        assert!(preset.get_field("animation.missing").is_err());
        assert!(preset.get_field("style.font").is_err());
    }

    #[test]
    fn test_parse_raw_value() {
        assert_eq!(parse_raw_value("false"), json!(false));
        assert_eq!(parse_raw_value("None"), json!(null));
        assert_eq!(parse_raw_value("12"), json!(12));
        assert_eq!(parse_raw_value("1.5"), json!(1.5));
        assert_eq!(parse_raw_value("{\"a\": 1}"), json!({"a": 1}));
        assert_eq!(parse_raw_value("[broken"), json!("[broken"));
        assert_eq!(parse_raw_value(" #FFFFFF "), json!("#FFFFFF"));
    }

    #[test]
    fn test_video_quality_parse() {
        assert_eq!("Small".parse::<VideoQuality>().unwrap(), VideoQuality::Small);
        assert_eq!("large".parse::<VideoQuality>().unwrap(), VideoQuality::Large);
        assert!("huge".parse::<VideoQuality>().is_err());
        assert!(VideoQuality::Large.has_alpha());
        assert!(!VideoQuality::Medium.has_alpha());
    }

    #[test]
    fn test_overlay_size_display() {
        assert_eq!(OverlaySize::new(1280, 240).to_string(), "1280x240");
    }
}
