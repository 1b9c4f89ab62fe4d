//! Karaoke-style word-by-word reveal using `\k` tags

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;

use super::{int_param, string_param, Animation, AnimationContext};
use crate::domain::model::AnimationParams;
use crate::error::{CaptionError, CaptionResult};
use crate::subtitle::AssEvent;
use crate::text::{ass_newlines_to_real, strip_ass_tags};

static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+(?:'\w+)?|[^\w\s]").unwrap());

const PAUSE_PUNCTUATION: &[&str] = &[",", ".", "!", "?", ";", ":", "…"];
const OPENERS: &[&str] = &["'", "\"", "\u{2018}", "\u{201c}", "(", "[", "{"];

/// How the event time is split across words
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealMode {
    Even,
    Weighted,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Text(String),
    Newline,
}

impl Token {
    fn is_word(&self) -> bool {
        match self {
            Token::Text(t) => t.chars().next().is_some_and(|c| c.is_alphanumeric() || c == '_'),
            Token::Newline => false,
        }
    }
}

/// Words appear progressively across the event duration
#[derive(Debug, Clone, PartialEq)]
pub struct WordRevealAnimation {
    mode: RevealMode,
    lead_in_ms: i64,
    min_word_ms: i64,
    max_word_ms: i64,
    punct_pause_ms: i64,
}

impl Animation for WordRevealAnimation {
    fn kind(&self) -> &'static str {
        "word_reveal"
    }

    /// The whole text is rebuilt, so there is no single override
    fn generate_override(&self, _event: &AssEvent, _ctx: &AnimationContext) -> String {
        String::new()
    }

    fn apply_to_event(&self, event: &mut AssEvent, _ctx: &AnimationContext) -> CaptionResult<()> {
        if let Some(text) = self.build_karaoke(&event.text, event.duration_ms() as i64) {
            event.text = text;
        }
        Ok(())
    }

    fn from_params(params: &AnimationParams) -> CaptionResult<Self> {
        let mode = match string_param(params, "mode", "even").trim().to_lowercase().as_str() {
            "even" => RevealMode::Even,
            "weighted" => RevealMode::Weighted,
            other => {
                return Err(CaptionError::animation(format!(
                    "Unsupported word_reveal mode '{}' (use 'even' or 'weighted')",
                    other
                )))
            }
        };
        Ok(Self {
            mode,
            lead_in_ms: int_param(params, "lead_in_ms", 0)?,
            min_word_ms: int_param(params, "min_word_ms", 60)?,
            max_word_ms: int_param(params, "max_word_ms", 400)?,
            punct_pause_ms: int_param(params, "punct_pause_ms", 120)?,
        })
    }

    fn default_params() -> AnimationParams {
        let defaults = json!({
            "mode": "even",
            "lead_in_ms": 0,
            "min_word_ms": 60,
            "max_word_ms": 400,
            "punct_pause_ms": 120
        });
        defaults.as_object().cloned().unwrap_or_default()
    }
}

impl WordRevealAnimation {
    /// Karaoke text for the event, or `None` when the text should stay as is
    fn build_karaoke(&self, text: &str, duration_ms: i64) -> Option<String> {
        let tokens = tokenize(&ass_newlines_to_real(&strip_ass_tags(text)));
        if tokens.is_empty() {
            return None;
        }
        let available = (duration_ms - self.lead_in_ms).max(0);
        if available <= 0 {
            return None;
        }
        let word_indices: Vec<usize> = tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_word())
            .map(|(i, _)| i)
            .collect();
        if word_indices.is_empty() {
            return None;
        }

        let token_ms = self.allocate(&tokens, &word_indices, available);
        Some(self.render(&tokens, &token_ms))
    }

    fn allocate(&self, tokens: &[Token], word_indices: &[usize], available: i64) -> Vec<i64> {
        let mut token_ms = vec![0i64; tokens.len()];

        match self.mode {
            RevealMode::Even => {
                let base = available as f64 / word_indices.len() as f64;
                for &i in word_indices {
                    token_ms[i] = base.round_ties_even() as i64;
                }
            }
            RevealMode::Weighted => {
                let lengths: Vec<usize> = word_indices
                    .iter()
                    .map(|&i| match &tokens[i] {
                        Token::Text(t) => t.chars().count(),
                        Token::Newline => 0,
                    })
                    .collect();
                let total = lengths.iter().sum::<usize>().max(1) as f64;
                for (&i, &len) in word_indices.iter().zip(&lengths) {
                    token_ms[i] = (available as f64 * (len as f64 / total)).round_ties_even() as i64;
                }
            }
        }

        for &i in word_indices {
            token_ms[i] = self.min_word_ms.max(self.max_word_ms.min(token_ms[i]));
        }

        for (i, token) in tokens.iter().enumerate() {
            if let Token::Text(t) = token {
                if PAUSE_PUNCTUATION.contains(&t.as_str()) {
                    token_ms[i] = self.punct_pause_ms;
                }
            }
        }

        let total: i64 = token_ms.iter().sum();
        if total > 0 {
            let scale = available as f64 / total as f64;
            for ms in token_ms.iter_mut() {
                *ms = (*ms as f64 * scale).round_ties_even() as i64;
            }
        }
        token_ms
    }

    fn render(&self, tokens: &[Token], token_ms: &[i64]) -> String {
        let mut out = String::new();
        if self.lead_in_ms > 0 {
            out.push_str(&format!(r"{{\k{}}}", to_centis(self.lead_in_ms)));
        }

        let mut prev: Option<&Token> = None;
        for (token, &ms) in tokens.iter().zip(token_ms) {
            let text = match token {
                Token::Newline => {
                    out.push_str(r"\N");
                    prev = Some(token);
                    continue;
                }
                Token::Text(t) => t,
            };

            if let Some(Token::Text(p)) = prev {
                let before_punct = PAUSE_PUNCTUATION.contains(&text.as_str());
                let after_opener = OPENERS.contains(&p.as_str());
                if !before_punct && !after_opener {
                    out.push(' ');
                }
            }
            out.push_str(&format!(r"{{\k{}}}{}", to_centis(ms), text));
            prev = Some(token);
        }
        out
    }
}

fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let lines: Vec<&str> = text.split('\n').collect();
    for (i, line) in lines.iter().enumerate() {
        tokens.extend(
            TOKEN
                .find_iter(line)
                .map(|m| Token::Text(m.as_str().to_string())),
        );
        if i + 1 != lines.len() {
            tokens.push(Token::Newline);
        }
    }
    tokens
}

fn to_centis(ms: i64) -> i64 {
    (ms as f64 / 10.0).round_ties_even().max(0.0) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reveal(overrides: serde_json::Value) -> WordRevealAnimation {
        let mut params = WordRevealAnimation::default_params();
        if let Some(map) = overrides.as_object() {
            params.extend(map.clone());
        }
        WordRevealAnimation::from_params(&params).unwrap()
    }

    fn apply(anim: &WordRevealAnimation, text: &str, duration: u64) -> String {
        let mut event = AssEvent::dialogue(1000, 1000 + duration, text);
        anim.apply_to_event(&mut event, &AnimationContext::default()).unwrap();
        event.text
    }

    #[test]
    fn test_even_mode_rescales_to_duration() {
        assert_eq!(apply(&reveal(json!({})), "one two", 2000), r"{\k100}one {\k100}two");
    }

    #[test]
    fn test_punctuation_pause_and_spacing() {
        assert_eq!(
            apply(&reveal(json!({})), "Hello, world!", 1000),
            r"{\k38}Hello{\k12}, {\k38}world{\k12}!"
        );
    }

    #[test]
    fn test_weighted_mode() {
        let anim = reveal(json!({"mode": "weighted", "min_word_ms": 0, "max_word_ms": 1000}));
        assert_eq!(apply(&anim, "a bbb", 400), r"{\k10}a {\k30}bbb");
    }

    #[test]
    fn test_lead_in() {
        let anim = reveal(json!({"lead_in_ms": 500}));
        assert_eq!(apply(&anim, "hi", 1500), r"{\k50}{\k100}hi");
    }

    #[test]
    fn test_line_breaks_and_tags() {
        assert_eq!(
            apply(&reveal(json!({})), r"{\i1}one{\i0}\Ntwo", 2000),
            r"{\k100}one\N{\k100}two"
        );
    }

    #[test]
    fn test_no_space_after_opener() {
        let out = apply(&reveal(json!({})), "(aside)", 1000);
        assert!(out.contains(r"("));
        assert!(!out.contains("( "));
    }

    #[test]
    fn test_unchanged_without_time_or_words() {
        let anim = reveal(json!({}));
        assert_eq!(apply(&anim, "words here", 0), "words here");
        assert_eq!(apply(&anim, "...", 1000), "...");
        assert_eq!(apply(&reveal(json!({"lead_in_ms": 2000})), "late", 1000), "late");
    }

    #[test]
    fn test_unknown_mode_rejected() {
        let mut params = WordRevealAnimation::default_params();
        params.insert("mode".into(), json!("random"));
        let err = WordRevealAnimation::from_params(&params).unwrap_err();
        assert!(err.to_string().contains("Unsupported word_reveal mode 'random'"));
    }

    #[test]
    fn test_mode_is_case_insensitive() {
        assert_eq!(reveal(json!({"mode": " Weighted "})).mode, RevealMode::Weighted);
    }
}
