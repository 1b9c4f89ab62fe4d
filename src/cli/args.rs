//! Argument value parsers and help text

use std::ops::RangeInclusive;

/// Accepted `--safety-scale` values
pub const SAFETY_SCALE_RANGE: RangeInclusive<f64> = 1.0..=3.0;

pub const EXAMPLES: &str = "\
Examples:
  # Render with built-in preset
  caption-animator input.srt --preset modern_box --out overlay.mov

  # Use custom preset
  caption-animator input.srt --preset my_preset.json --out overlay.mov

  # Use named preset from multi-preset file
  caption-animator input.srt --preset presets.yaml:fancy --out overlay.mov

  # Interactive mode for tweaking
  caption-animator input.srt --interactive

  # List available presets
  caption-animator --list-presets";

/// Frame rate as an integer, decimal or `num/den` rational
pub fn parse_fps(s: &str) -> Result<String, String> {
    let s = s.trim();
    let valid = match s.split_once('/') {
        Some((num, den)) => matches!(
            (num.parse::<u32>(), den.parse::<u32>()),
            (Ok(n), Ok(d)) if n > 0 && d > 0
        ),
        None => matches!(s.parse::<f64>(), Ok(v) if v.is_finite() && v > 0.0),
    };
    if valid {
        Ok(s.to_string())
    } else {
        Err(format!("invalid frame rate '{}' (use e.g. 30, 59.94 or 30000/1001)", s))
    }
}

pub fn parse_safety_scale(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", s))?;
    if SAFETY_SCALE_RANGE.contains(&value) {
        Ok(value)
    } else {
        Err(format!(
            "safety scale must be between {} and {}",
            SAFETY_SCALE_RANGE.start(),
            SAFETY_SCALE_RANGE.end()
        ))
    }
}
