//! ASS text helpers: override stripping, newline conversion, whitespace cleanup

use once_cell::sync::Lazy;
use regex::Regex;

static OVERRIDE_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[^}]*\}").unwrap());
static HORIZONTAL_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").unwrap());

/// Remove every `{...}` override block, leaving only visible text
pub fn strip_ass_tags(text: &str) -> String {
    OVERRIDE_BLOCK.replace_all(text, "").into_owned()
}

/// Convert ASS `\N` (hard) and `\n` (soft) breaks to real newlines
pub fn ass_newlines_to_real(text: &str) -> String {
    text.replace(r"\N", "\n").replace(r"\n", "\n")
}

/// Convert real newlines to ASS hard breaks
pub fn real_newlines_to_ass(text: &str) -> String {
    text.replace('\n', r"\N")
}

/// Normalize line endings, collapse runs of spaces/tabs, trim the ends.
///
/// Explicit newlines are kept.
pub fn normalize_whitespace(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    HORIZONTAL_SPACE.replace_all(&text, " ").trim().to_string()
}

/// Visible text of an event, with real newlines and tidy whitespace
pub fn visible_text(text: &str) -> String {
    normalize_whitespace(&ass_newlines_to_real(&strip_ass_tags(text)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_ass_tags() {
        assert_eq!(strip_ass_tags(r"{\fad(120,120)}Hello world"), "Hello world");
        assert_eq!(strip_ass_tags(r"{\b1}Bold{\b0} text"), "Bold text");
        assert_eq!(strip_ass_tags("No tags"), "No tags");
    }

    #[test]
    fn test_newline_conversion() {
        assert_eq!(ass_newlines_to_real(r"Line 1\NLine 2\nLine 3"), "Line 1\nLine 2\nLine 3");
        assert_eq!(real_newlines_to_ass("Line 1\nLine 2"), r"Line 1\NLine 2");
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("Hello    world\r\nNew line"), "Hello world\nNew line");
        assert_eq!(normalize_whitespace("\t  padded \t"), "padded");
        assert_eq!(normalize_whitespace("a\rb"), "a\nb");
    }

    #[test]
    fn test_visible_text() {
        assert_eq!(visible_text(r"{\an5}One  two\NThree"), "One two\nThree");
    }
}
