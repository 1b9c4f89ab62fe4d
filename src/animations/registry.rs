//! Closed registry of compiled-in animation effects

use tracing::debug;

use super::{
    Animation, BlurSettleAnimation, FadeAnimation, ScaleSettleAnimation, SlideUpAnimation,
    WordRevealAnimation,
};
use crate::domain::model::{AnimationConfig, AnimationParams};
use crate::error::{CaptionError, CaptionResult};

type Constructor = fn(&AnimationParams) -> CaptionResult<Box<dyn Animation>>;

struct Entry {
    kind: &'static str,
    description: &'static str,
    defaults: fn() -> AnimationParams,
    build: Constructor,
}

fn construct<A: Animation + 'static>(params: &AnimationParams) -> CaptionResult<Box<dyn Animation>> {
    Ok(Box::new(A::from_params(params)?))
}

const ENTRIES: &[Entry] = &[
    Entry {
        kind: "blur_settle",
        description: "Text starts blurred and sharpens while fading in",
        defaults: BlurSettleAnimation::default_params,
        build: construct::<BlurSettleAnimation>,
    },
    Entry {
        kind: "fade",
        description: "Simple fade-in and fade-out",
        defaults: FadeAnimation::default_params,
        build: construct::<FadeAnimation>,
    },
    Entry {
        kind: "scale_settle",
        description: "Text starts enlarged and settles to normal size",
        defaults: ScaleSettleAnimation::default_params,
        build: construct::<ScaleSettleAnimation>,
    },
    Entry {
        kind: "slide_up",
        description: "Text slides up into place while fading in",
        defaults: SlideUpAnimation::default_params,
        build: construct::<SlideUpAnimation>,
    },
    Entry {
        kind: "word_reveal",
        description: "Karaoke-style word-by-word reveal",
        defaults: WordRevealAnimation::default_params,
        build: construct::<WordRevealAnimation>,
    },
];

/// Registry metadata for one effect
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationInfo {
    pub kind: &'static str,
    pub description: &'static str,
    pub defaults: AnimationParams,
}

/// Lookup and construction of animation effects
pub struct AnimationRegistry;

impl AnimationRegistry {
    fn entry(kind: &str) -> CaptionResult<&'static Entry> {
        ENTRIES.iter().find(|e| e.kind == kind).ok_or_else(|| {
            CaptionError::animation(format!(
                "Unknown animation type: '{}'. Available animations: {}",
                kind,
                Self::list_types().join(", ")
            ))
        })
    }

    /// Build and validate an effect
    pub fn create(kind: &str, params: &AnimationParams) -> CaptionResult<Box<dyn Animation>> {
        let entry = Self::entry(kind)?;
        debug!("Creating animation {} with {:?}", kind, params);
        (entry.build)(params)
    }

    /// Build the effect a preset's animation block describes
    pub fn from_config(config: &AnimationConfig) -> CaptionResult<Box<dyn Animation>> {
        Self::create(&config.kind, &config.params)
    }

    /// Registered kinds, sorted
    pub fn list_types() -> Vec<&'static str> {
        let mut kinds: Vec<&'static str> = ENTRIES.iter().map(|e| e.kind).collect();
        kinds.sort_unstable();
        kinds
    }

    pub fn defaults(kind: &str) -> CaptionResult<AnimationParams> {
        Ok((Self::entry(kind)?.defaults)())
    }

    pub fn info() -> Vec<AnimationInfo> {
        ENTRIES
            .iter()
            .map(|e| AnimationInfo {
                kind: e.kind,
                description: e.description,
                defaults: (e.defaults)(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_types_sorted() {
        assert_eq!(
            AnimationRegistry::list_types(),
            vec!["blur_settle", "fade", "scale_settle", "slide_up", "word_reveal"]
        );
    }

    #[test]
    fn test_create_each_with_defaults() {
        for kind in AnimationRegistry::list_types() {
            let defaults = AnimationRegistry::defaults(kind).unwrap();
            let anim = AnimationRegistry::create(kind, &defaults).unwrap();
            assert_eq!(anim.kind(), kind);
        }
    }

    #[test]
    fn test_unknown_type_lists_available() {
        let err = AnimationRegistry::create("spin", &AnimationParams::new())
            .err()
            .unwrap();
        let message = err.to_string();
        assert!(message.contains("Unknown animation type: 'spin'"));
        assert!(message.contains("fade, scale_settle"));
    }

    #[test]
    fn test_from_config() {
        let config = AnimationConfig::from_value(json!({"type": "fade", "in_ms": 80, "out_ms": 90}))
            .unwrap();
        let anim = AnimationRegistry::from_config(&config).unwrap();
        assert_eq!(anim.kind(), "fade");
        assert!(!anim.needs_positioning());
    }

    #[test]
    fn test_info_has_descriptions() {
        let info = AnimationRegistry::info();
        assert_eq!(info.len(), 5);
        let slide = info.iter().find(|i| i.kind == "slide_up").unwrap();
        assert_eq!(slide.defaults.get("move_px"), Some(&json!(26)));
        assert!(!slide.description.is_empty());
    }
}
