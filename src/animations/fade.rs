//! Fade in/out via `\fad`

use serde_json::json;

use super::{clamp_ms, int_param, require_params, Animation, AnimationContext};
use crate::domain::model::AnimationParams;
use crate::error::CaptionResult;
use crate::subtitle::AssEvent;

/// Simple fade-in and fade-out
#[derive(Debug, Clone, PartialEq)]
pub struct FadeAnimation {
    in_ms: i64,
    out_ms: i64,
}

impl Animation for FadeAnimation {
    fn kind(&self) -> &'static str {
        "fade"
    }

    fn generate_override(&self, _event: &AssEvent, _ctx: &AnimationContext) -> String {
        format!(r"\fad({},{})", self.in_ms, self.out_ms)
    }

    fn from_params(params: &AnimationParams) -> CaptionResult<Self> {
        require_params(params, "FadeAnimation", &["in_ms", "out_ms"])?;
        Ok(Self {
            in_ms: clamp_ms(int_param(params, "in_ms", 0)?, 0, 2000),
            out_ms: clamp_ms(int_param(params, "out_ms", 0)?, 0, 2000),
        })
    }

    fn default_params() -> AnimationParams {
        let defaults = json!({"in_ms": 120, "out_ms": 120});
        defaults.as_object().cloned().unwrap_or_default()
    }
}
