//! Scale settle: start enlarged, ease back to normal size

use serde_json::json;

use super::{
    clamp_ms, float_param, format_float, int_param, require_params, Animation, AnimationContext,
};
use crate::domain::model::AnimationParams;
use crate::error::CaptionResult;
use crate::subtitle::AssEvent;

#[derive(Debug, Clone, PartialEq)]
pub struct ScaleSettleAnimation {
    in_ms: i64,
    out_ms: i64,
    start_scale: i64,
    end_scale: i64,
    accel: f64,
}

impl Animation for ScaleSettleAnimation {
    fn kind(&self) -> &'static str {
        "scale_settle"
    }

    fn generate_override(&self, _event: &AssEvent, _ctx: &AnimationContext) -> String {
        format!(
            r"\fscx{s}\fscy{s}\t(0,{i},{a},\fscx{e}\fscy{e})\fad({i},{o})",
            s = self.start_scale,
            e = self.end_scale,
            i = self.in_ms,
            o = self.out_ms,
            a = format_float(self.accel),
        )
    }

    fn from_params(params: &AnimationParams) -> CaptionResult<Self> {
        require_params(params, "ScaleSettleAnimation", &["in_ms", "out_ms"])?;
        Ok(Self {
            in_ms: clamp_ms(int_param(params, "in_ms", 0)?, 0, 4000),
            out_ms: clamp_ms(int_param(params, "out_ms", 0)?, 0, 2000),
            start_scale: int_param(params, "start_scale", 110)?,
            end_scale: int_param(params, "end_scale", 100)?,
            accel: float_param(params, "accel", 1.0)?,
        })
    }

    fn default_params() -> AnimationParams {
        let defaults = json!({
            "in_ms": 200,
            "out_ms": 120,
            "start_scale": 110,
            "end_scale": 100,
            "accel": 1.0
        });
        defaults.as_object().cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_defaults_for_optional_params() {
        let params = json!({"in_ms": 200, "out_ms": 120});
        let anim = ScaleSettleAnimation::from_params(params.as_object().unwrap()).unwrap();
        let event = AssEvent::dialogue(0, 1000, "Hi");
        assert_eq!(
            anim.generate_override(&event, &AnimationContext::default()),
            r"\fscx110\fscy110\t(0,200,1.0,\fscx100\fscy100)\fad(200,120)"
        );
    }

    #[test]
    fn test_scale_custom_values() {
        let params = json!({"in_ms": "300", "out_ms": 50, "start_scale": 130, "end_scale": 95, "accel": 1.5});
        let anim = ScaleSettleAnimation::from_params(params.as_object().unwrap()).unwrap();
        let event = AssEvent::dialogue(0, 1000, "Hi");
        assert_eq!(
            anim.generate_override(&event, &AnimationContext::default()),
            r"\fscx130\fscy130\t(0,300,1.5,\fscx95\fscy95)\fad(300,50)"
        );
    }

    #[test]
    fn test_scale_requires_out_ms() {
        let params = json!({"in_ms": 200});
        assert!(ScaleSettleAnimation::from_params(params.as_object().unwrap()).is_err());
    }
}
