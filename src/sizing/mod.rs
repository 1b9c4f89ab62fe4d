//! Tight overlay canvas sizing
//!
//! The canvas is the largest wrapped event plus outline/shadow allowance and
//! preset padding, scaled by a safety factor and rounded to even pixels.

use tracing::debug;

use crate::domain::model::{OverlaySize, Position, PresetConfig};
use crate::error::{CaptionError, CaptionResult};
use crate::subtitle::SubtitleFile;
use crate::text::{measure_multiline, visible_text, wrap_text_to_width, TextMeasurer};

/// Default multiplier applied to the measured canvas
pub const DEFAULT_SAFETY_SCALE: f64 = 1.12;

/// Smallest canvas edge
pub const MIN_DIMENSION: u32 = 64;

/// Padding as `(top, right, bottom, left)`
fn padding(preset: &PresetConfig) -> CaptionResult<(i64, i64, i64, i64)> {
    match preset.padding.as_slice() {
        [t, r, b, l] => Ok((*t, *r, *b, *l)),
        other => Err(CaptionError::Sizing {
            message: format!(
                "Preset 'padding' must have 4 values [top, right, bottom, left], got {}",
                other.len()
            ),
        }),
    }
}

pub struct SizeCalculator<'a> {
    preset: &'a PresetConfig,
    safety_scale: f64,
    measurer: &'a dyn TextMeasurer,
}

impl<'a> SizeCalculator<'a> {
    pub fn new(preset: &'a PresetConfig, safety_scale: f64, measurer: &'a dyn TextMeasurer) -> Self {
        Self {
            preset,
            safety_scale,
            measurer,
        }
    }

    /// Canvas size that fits every dialogue event
    pub fn compute_size(&self, subs: &SubtitleFile) -> CaptionResult<OverlaySize> {
        let (pad_t, pad_r, pad_b, pad_l) = padding(self.preset)?;

        let mut max_w = 0u32;
        let mut max_h = 0u32;
        for event in subs.dialogue_events() {
            let text = visible_text(&event.text);
            let text = wrap_text_to_width(&text, self.measurer, self.preset.max_width_px);
            let (w, h, _) = measure_multiline(&text, self.measurer, self.preset.line_spacing);
            max_w = max_w.max(w);
            max_h = max_h.max(h);
        }

        // Outline grows every edge, shadow offsets down-right
        let extra = (self.preset.outline_px * 2.0 + self.preset.shadow_px * 2.0).ceil();
        let width = self.finish(max_w as f64 + (pad_l + pad_r) as f64 + extra);
        let height = self.finish(max_h as f64 + (pad_t + pad_b) as f64 + extra);

        debug!(
            "Measured text {}x{}, overlay {}x{} (safety {})",
            max_w, max_h, width, height, self.safety_scale
        );
        Ok(OverlaySize::new(width, height))
    }

    fn finish(&self, raw: f64) -> u32 {
        let scaled = (raw * self.safety_scale).ceil().max(0.0) as u32;
        let value = scaled.max(MIN_DIMENSION);
        if value % 2 == 1 {
            value + 1
        } else {
            value
        }
    }

    /// Centre of the padded interior of the canvas
    pub fn compute_anchor_position(&self, size: OverlaySize) -> CaptionResult<Position> {
        let (pad_t, pad_r, pad_b, pad_l) = padding(self.preset)?;
        let right = size.width as i64 - pad_r;
        let bottom = size.height as i64 - pad_b;
        Ok(Position::new(
            (pad_l + right).div_euclid(2),
            (pad_t + bottom).div_euclid(2),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subtitle::{SubtitleFile, SubtitleFormat};
    use crate::text::FixedWidthMeasurer;

    fn subs(text: &str) -> SubtitleFile {
        let srt = format!("1\n00:00:00,000 --> 00:00:01,000\n{}\n", text);
        SubtitleFile::parse(&srt, SubtitleFormat::Srt).unwrap()
    }

    #[test]
    fn test_compute_size_with_defaults() {
        let preset = PresetConfig::default();
        let measurer = FixedWidthMeasurer::new(10.0, 20);
        let calc = SizeCalculator::new(&preset, DEFAULT_SAFETY_SCALE, &measurer);

        let size = calc.compute_size(&subs("Hello")).unwrap();
        // (50 + 120 + 12) * 1.12 and (20 + 90 + 12) * 1.12, evened up
        assert_eq!(size, OverlaySize::new(204, 138));

        let anchor = calc.compute_anchor_position(size).unwrap();
        assert_eq!(anchor, Position::new(102, 64));
    }

    #[test]
    fn test_tags_do_not_count() {
        let preset = PresetConfig::default();
        let measurer = FixedWidthMeasurer::new(10.0, 20);
        let calc = SizeCalculator::new(&preset, 1.0, &measurer);
        let plain = calc.compute_size(&subs("Hello")).unwrap();
        let tagged = calc.compute_size(&subs("<b>Hello</b>")).unwrap();
        assert_eq!(plain, tagged);
    }

    #[test]
    fn test_wrapping_adds_height() {
        let mut preset = PresetConfig::default();
        preset.max_width_px = 60;
        let measurer = FixedWidthMeasurer::new(10.0, 20);
        let calc = SizeCalculator::new(&preset, 1.0, &measurer);
        let size = calc.compute_size(&subs("Hello world")).unwrap();
        // two lines: 20 + 8 + 20
        assert_eq!(size.height, 48 + 90 + 12);
        assert_eq!(size.width, 50 + 120 + 12);
    }

    #[test]
    fn test_minimum_dimension() {
        let mut preset = PresetConfig::default();
        preset.padding = vec![0, 0, 0, 0];
        preset.outline_px = 0.0;
        preset.shadow_px = 0.0;
        let measurer = FixedWidthMeasurer::new(1.0, 10);
        let calc = SizeCalculator::new(&preset, 1.0, &measurer);
        let size = calc.compute_size(&subs("a")).unwrap();
        assert_eq!(size, OverlaySize::new(64, 64));
    }

    #[test]
    fn test_bad_padding_rejected() {
        let mut preset = PresetConfig::default();
        preset.padding = vec![10, 10];
        let measurer = FixedWidthMeasurer::new(10.0, 20);
        let calc = SizeCalculator::new(&preset, 1.0, &measurer);
        let err = calc.compute_size(&subs("x")).unwrap_err();
        assert!(err.to_string().contains("must have 4 values"));
    }
}
