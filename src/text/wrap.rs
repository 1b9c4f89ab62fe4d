//! Greedy word wrapping against a pixel width

use super::measure::TextMeasurer;
use super::utils::normalize_whitespace;

/// Wrap text so no line exceeds `max_width_px`.
///
/// Existing line breaks are kept. The first word of a line is always placed,
/// so a single word wider than the limit gets a line of its own. A limit of
/// zero or less disables wrapping.
pub fn wrap_text_to_width(text: &str, measurer: &dyn TextMeasurer, max_width_px: i64) -> String {
    let text = normalize_whitespace(text);
    if max_width_px <= 0 {
        return text;
    }
    let limit = max_width_px as f32;

    let mut lines_out: Vec<String> = Vec::new();
    for raw_line in text.split('\n') {
        let raw_line = raw_line.trim();
        if raw_line.is_empty() {
            lines_out.push(String::new());
            continue;
        }

        let mut current: Vec<&str> = Vec::new();
        for word in raw_line.split(' ') {
            if current.is_empty() {
                current.push(word);
                continue;
            }
            let candidate = format!("{} {}", current.join(" "), word);
            if measurer.line_width(&candidate) <= limit {
                current.push(word);
            } else {
                lines_out.push(current.join(" "));
                current = vec![word];
            }
        }
        if !current.is_empty() {
            lines_out.push(current.join(" "));
        }
    }

    lines_out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::measure::FixedWidthMeasurer;

    fn measurer() -> FixedWidthMeasurer {
        FixedWidthMeasurer::new(10.0, 20)
    }

    #[test]
    fn test_wraps_greedily() {
        let wrapped = wrap_text_to_width("This is a very long line", &measurer(), 100);
        assert_eq!(wrapped, "This is a\nvery long\nline");
    }

    #[test]
    fn test_keeps_existing_breaks() {
        let wrapped = wrap_text_to_width("one two\nthree", &measurer(), 1000);
        assert_eq!(wrapped, "one two\nthree");
    }

    #[test]
    fn test_long_word_gets_own_line() {
        let wrapped = wrap_text_to_width("a supercalifragilistic b", &measurer(), 50);
        assert_eq!(wrapped, "a\nsupercalifragilistic\nb");
    }

    #[test]
    fn test_zero_width_disables_wrapping() {
        let text = "words   that would wrap";
        assert_eq!(wrap_text_to_width(text, &measurer(), 0), "words that would wrap");
    }

    #[test]
    fn test_blank_lines_preserved() {
        assert_eq!(wrap_text_to_width("a\n\nb", &measurer(), 100), "a\n\nb");
    }

    #[test]
    fn test_exact_fit_stays_on_line() {
        // "ab cd" is exactly 50px
        assert_eq!(wrap_text_to_width("ab cd", &measurer(), 50), "ab cd");
    }
}
