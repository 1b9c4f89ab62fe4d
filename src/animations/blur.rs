//! Blur settle: start blurred, sharpen over the entrance

use serde_json::json;

use super::{
    clamp_ms, float_param, format_float, int_param, require_params, Animation, AnimationContext,
};
use crate::domain::model::AnimationParams;
use crate::error::CaptionResult;
use crate::subtitle::AssEvent;

#[derive(Debug, Clone, PartialEq)]
pub struct BlurSettleAnimation {
    in_ms: i64,
    out_ms: i64,
    start_blur: i64,
    end_blur: i64,
    accel: f64,
}

impl Animation for BlurSettleAnimation {
    fn kind(&self) -> &'static str {
        "blur_settle"
    }

    fn generate_override(&self, _event: &AssEvent, _ctx: &AnimationContext) -> String {
        format!(
            r"\blur{}\t(0,{},{},\blur{})\fad({},{})",
            self.start_blur,
            self.in_ms,
            format_float(self.accel),
            self.end_blur,
            self.in_ms,
            self.out_ms
        )
    }

    fn from_params(params: &AnimationParams) -> CaptionResult<Self> {
        require_params(params, "BlurSettleAnimation", &["in_ms", "out_ms"])?;
        Ok(Self {
            in_ms: clamp_ms(int_param(params, "in_ms", 0)?, 0, 4000),
            out_ms: clamp_ms(int_param(params, "out_ms", 0)?, 0, 2000),
            start_blur: int_param(params, "start_blur", 4)?,
            end_blur: int_param(params, "end_blur", 0)?,
            accel: float_param(params, "accel", 1.0)?,
        })
    }

    fn default_params() -> AnimationParams {
        let defaults = json!({
            "in_ms": 200,
            "out_ms": 120,
            "start_blur": 4,
            "end_blur": 0,
            "accel": 1.0
        });
        defaults.as_object().cloned().unwrap_or_default()
    }
}
