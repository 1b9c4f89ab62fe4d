//! Slide up from below the anchor while fading in

use serde_json::json;

use super::{clamp_ms, int_param, require_params, Animation, AnimationContext};
use crate::domain::model::AnimationParams;
use crate::error::CaptionResult;
use crate::subtitle::AssEvent;

/// Text starts `move_px` below its anchor and slides up over `in_ms`
#[derive(Debug, Clone, PartialEq)]
pub struct SlideUpAnimation {
    in_ms: i64,
    out_ms: i64,
    move_px: i64,
}

impl Animation for SlideUpAnimation {
    fn kind(&self) -> &'static str {
        "slide_up"
    }

    fn generate_override(&self, _event: &AssEvent, ctx: &AnimationContext) -> String {
        let fade = format!(r"\fad({},{})", self.in_ms, self.out_ms);
        match ctx.position {
            Some(pos) => format!(
                r"{}\move({},{},{},{},0,{})",
                fade,
                pos.x,
                pos.y + self.move_px,
                pos.x,
                pos.y,
                self.in_ms
            ),
            None => fade,
        }
    }

    fn needs_positioning(&self) -> bool {
        true
    }

    fn from_params(params: &AnimationParams) -> CaptionResult<Self> {
        require_params(params, "SlideUpAnimation", &["in_ms", "out_ms", "move_px"])?;
        Ok(Self {
            in_ms: clamp_ms(int_param(params, "in_ms", 0)?, 0, 4000),
            out_ms: clamp_ms(int_param(params, "out_ms", 0)?, 0, 2000),
            move_px: int_param(params, "move_px", 0)?,
        })
    }

    fn default_params() -> AnimationParams {
        let defaults = json!({"in_ms": 140, "out_ms": 120, "move_px": 26});
        defaults.as_object().cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{OverlaySize, Position};

    fn slide() -> SlideUpAnimation {
        SlideUpAnimation::from_params(&SlideUpAnimation::default_params()).unwrap()
    }

    #[test]
    fn test_slide_with_position() {
        let ctx = AnimationContext::new(Position::new(300, 100), OverlaySize::new(600, 200));
        let mut event = AssEvent::dialogue(0, 2000, "Hello");
        slide().apply_to_event(&mut event, &ctx).unwrap();
        assert_eq!(event.text, r"{\fad(140,120)\move(300,126,300,100,0,140)}Hello");
    }

    #[test]
    fn test_slide_without_position_only_fades() {
        let event = AssEvent::dialogue(0, 2000, "Hello");
        assert_eq!(
            slide().generate_override(&event, &AnimationContext::default()),
            r"\fad(140,120)"
        );
    }

    #[test]
    fn test_slide_requires_move_px() {
        let params = json!({"in_ms": 100, "out_ms": 100});
        let err = SlideUpAnimation::from_params(params.as_object().unwrap()).unwrap_err();
        assert!(err.to_string().contains("'move_px'"));
    }

    #[test]
    fn test_slide_needs_positioning() {
        assert!(slide().needs_positioning());
    }
}
