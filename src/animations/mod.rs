//! Text animations expressed as ASS override tags
//!
//! Every effect implements [`Animation`] and is listed in the compiled-in
//! [`registry`]. Parameters are validated when the effect is created, so
//! applying an effect to an event cannot fail on bad configuration.

pub mod blur;
pub mod fade;
pub mod registry;
pub mod scale;
pub mod slide;
pub mod word_reveal;

use serde_json::Value;

use crate::domain::model::{AnimationParams, OverlaySize, Position};
use crate::error::{CaptionError, CaptionResult};
use crate::subtitle::AssEvent;

pub use blur::BlurSettleAnimation;
pub use fade::FadeAnimation;
pub use registry::{AnimationInfo, AnimationRegistry};
pub use scale::ScaleSettleAnimation;
pub use slide::SlideUpAnimation;
pub use word_reveal::WordRevealAnimation;

/// Layout facts known once the overlay has been sized
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnimationContext {
    /// Anchor point of the text (centre of the padded interior)
    pub position: Option<Position>,
    /// Overlay canvas size
    pub size: Option<OverlaySize>,
}

impl AnimationContext {
    pub fn new(position: Position, size: OverlaySize) -> Self {
        Self {
            position: Some(position),
            size: Some(size),
        }
    }
}

/// A subtitle animation effect
pub trait Animation: Send + Sync {
    /// Registry name, e.g. `fade`
    fn kind(&self) -> &'static str;

    /// Override tags for one event, without braces
    fn generate_override(&self, event: &AssEvent, ctx: &AnimationContext) -> String;

    /// Rewrite the event text. The default merges the generated override
    /// into the leading override block.
    fn apply_to_event(&self, event: &mut AssEvent, ctx: &AnimationContext) -> CaptionResult<()> {
        let tags = self.generate_override(event, ctx);
        event.text = inject_override(&event.text, &tags);
        Ok(())
    }

    /// Whether the effect needs the anchor position
    fn needs_positioning(&self) -> bool {
        false
    }

    /// Validate parameters and build the effect
    fn from_params(params: &AnimationParams) -> CaptionResult<Self>
    where
        Self: Sized;

    /// Parameters a fresh preset gets for this effect
    fn default_params() -> AnimationParams
    where
        Self: Sized;
}

/// Insert override tags at the start of the text.
///
/// Tags are merged into an existing leading `{...}` block, otherwise a new
/// block is prepended. An empty override leaves the text untouched.
pub fn inject_override(text: &str, tags: &str) -> String {
    if tags.is_empty() {
        return text.to_string();
    }
    if text.starts_with('{') {
        if let Some(end) = text.find('}') {
            return format!("{{{}{}}}{}", tags, &text[1..end], &text[end + 1..]);
        }
    }
    format!("{{{}}}{}", tags, text)
}

/// Clamp a millisecond value into `[min, max]`
pub(crate) fn clamp_ms(value: i64, min: i64, max: i64) -> i64 {
    value.clamp(min, max)
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Check that every required key is present
pub(crate) fn require_params(
    params: &AnimationParams,
    owner: &str,
    keys: &[&str],
) -> CaptionResult<()> {
    for key in keys {
        if !params.contains_key(*key) {
            let got: Vec<&String> = params.keys().collect();
            return Err(CaptionError::animation(format!(
                "{} requires '{}' parameter. Got: {:?}",
                owner, key, got
            )));
        }
    }
    Ok(())
}

/// Integer parameter; floats are truncated, numeric strings accepted
pub(crate) fn int_param(params: &AnimationParams, key: &str, default: i64) -> CaptionResult<i64> {
    float_param(params, key, default as f64).map(|v| v.trunc() as i64)
}

/// Float parameter; numeric strings accepted
pub(crate) fn float_param(params: &AnimationParams, key: &str, default: f64) -> CaptionResult<f64> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(value) => as_number(value).ok_or_else(|| {
            CaptionError::animation(format!(
                "Parameter '{}' must be a number, got {}",
                key, value
            ))
        }),
    }
}

/// String parameter; non-string scalars are stringified
pub(crate) fn string_param(params: &AnimationParams, key: &str, default: &str) -> String {
    match params.get(key) {
        None | Some(Value::Null) => default.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Format a float the way ASS transform accelerations are written (`1.0`, `1.5`)
pub(crate) fn format_float(value: f64) -> String {
    format!("{:?}", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> AnimationParams {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_inject_into_plain_text() {
        assert_eq!(inject_override("Hello", r"\fad(100,100)"), r"{\fad(100,100)}Hello");
    }

    #[test]
    fn test_inject_merges_leading_block() {
        assert_eq!(
            inject_override(r"{\b1}Hello", r"\fad(100,100)"),
            r"{\fad(100,100)\b1}Hello"
        );
    }

    #[test]
    fn test_inject_empty_is_noop() {
        assert_eq!(inject_override(r"{\b1}Hello", ""), r"{\b1}Hello");
    }

    #[test]
    fn test_inject_unterminated_block_prepends() {
        assert_eq!(inject_override("{oops", r"\an5"), r"{\an5}{oops");
    }

    #[test]
    fn test_param_helpers() {
        let p = params(json!({"a": 120, "b": "250", "c": 1.9, "d": "x", "m": "weighted"}));
        assert_eq!(int_param(&p, "a", 0).unwrap(), 120);
        assert_eq!(int_param(&p, "b", 0).unwrap(), 250);
        assert_eq!(int_param(&p, "c", 0).unwrap(), 1);
        assert_eq!(int_param(&p, "missing", 7).unwrap(), 7);
        assert!(int_param(&p, "d", 0).is_err());
        assert_eq!(float_param(&p, "c", 0.0).unwrap(), 1.9);
        assert_eq!(string_param(&p, "m", "even"), "weighted");
        assert_eq!(string_param(&p, "missing", "even"), "even");
    }

    #[test]
    fn test_require_params_message() {
        let p = params(json!({"in_ms": 100}));
        let err = require_params(&p, "FadeAnimation", &["in_ms", "out_ms"]).unwrap_err();
        assert!(err.to_string().contains("FadeAnimation requires 'out_ms' parameter"));
    }

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(1.0), "1.0");
        assert_eq!(format_float(1.5), "1.5");
    }
}
