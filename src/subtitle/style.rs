//! Preset to ASS style conversion

use super::ass::{AssColor, AssStyle};
use crate::domain::model::PresetConfig;
use crate::error::{CaptionError, CaptionResult};

/// Parse `#RRGGBB` (or bare `RRGGBB`) into RGB components
pub fn parse_color(color: &str) -> CaptionResult<(u8, u8, u8)> {
    let hex = color.trim();
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    let invalid = || CaptionError::InvalidColor {
        color: color.to_string(),
    };
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
    Ok((channel(0)?, channel(2)?, channel(4)?))
}

fn opaque(color: &str) -> CaptionResult<AssColor> {
    let (r, g, b) = parse_color(color)?;
    Ok(AssColor::new(r, g, b, 0))
}

/// Builds ASS styles from a preset
pub struct StyleBuilder<'a> {
    preset: &'a PresetConfig,
}

impl<'a> StyleBuilder<'a> {
    pub fn new(preset: &'a PresetConfig) -> Self {
        Self { preset }
    }

    /// Build the named style. Blur is applied per event, not here.
    pub fn build(&self, name: &str) -> CaptionResult<AssStyle> {
        let p = self.preset;
        Ok(AssStyle {
            name: name.to_string(),
            fontname: p.font_name.clone(),
            fontsize: p.font_size as f64,
            primary_color: opaque(&p.primary_color)?,
            outline_color: opaque(&p.outline_color)?,
            back_color: opaque(&p.shadow_color)?,
            bold: p.bold,
            italic: p.italic,
            outline: p.outline_px,
            shadow: p.shadow_px,
            spacing: 0.0,
            alignment: p.alignment,
            margin_l: p.margin_l,
            margin_r: p.margin_r,
            margin_v: p.margin_v,
            ..AssStyle::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#FF8000").unwrap(), (255, 128, 0));
        assert_eq!(parse_color("00ff00").unwrap(), (0, 255, 0));
        assert!(parse_color("#FFF").is_err());
        assert!(parse_color("#GGGGGG").is_err());
        let err = parse_color("red").unwrap_err();
        assert!(err.to_string().contains("Invalid color 'red'"));
    }

    #[test]
    fn test_build_style_from_preset() {
        let mut preset = PresetConfig::default();
        preset.bold = true;
        preset.primary_color = "#FF0000".to_string();
        preset.shadow_color = "#112233".to_string();
        preset.outline_px = 5.0;

        let style = StyleBuilder::new(&preset).build("Default").unwrap();
        assert_eq!(style.name, "Default");
        assert_eq!(style.fontname, "Arial");
        assert_eq!(style.fontsize, 64.0);
        assert!(style.bold);
        assert_eq!(style.primary_color.to_ass(), "&H000000FF");
        assert_eq!(style.back_color.to_ass(), "&H00332211");
        assert_eq!(style.outline, 5.0);
        assert_eq!(style.alignment, 2);
    }

    #[test]
    fn test_bad_color_fails_build() {
        let mut preset = PresetConfig::default();
        preset.outline_color = "black".to_string();
        assert!(StyleBuilder::new(&preset).build("Default").is_err());
    }
}
