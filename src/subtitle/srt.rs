//! SubRip parser

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use super::ass::AssEvent;
use crate::error::{CaptionError, CaptionResult};

static TIMING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(\d+):(\d{1,2}):(\d{1,2})[,.](\d{1,3})\s*-->\s*(\d+):(\d{1,2}):(\d{1,2})[,.](\d{1,3})",
    )
    .unwrap()
});
static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<(/?)([a-z]+)[^>]*>").unwrap());

/// Parse SRT content into dialogue events.
///
/// Blocks without a timing line are skipped. Multi-line text is joined with
/// `\N`, and basic HTML styling tags become ASS overrides.
pub fn parse_srt(content: &str) -> CaptionResult<Vec<AssEvent>> {
    let content = content
        .trim_start_matches('\u{feff}')
        .replace("\r\n", "\n")
        .replace('\r', "\n");

    let mut events = Vec::new();
    let mut block: Vec<&str> = Vec::new();
    for line in content.lines().chain(std::iter::once("")) {
        if line.trim().is_empty() {
            if !block.is_empty() {
                if let Some(event) = parse_block(&block) {
                    events.push(event);
                }
                block.clear();
            }
            continue;
        }
        block.push(line);
    }

    if events.is_empty() && !content.trim().is_empty() {
        return Err(CaptionError::SubtitleParse {
            message: "No SRT cues found".to_string(),
        });
    }
    Ok(events)
}

fn parse_block(block: &[&str]) -> Option<AssEvent> {
    let Some(timing_idx) = block.iter().position(|l| l.contains("-->")) else {
        warn!("Skipping SRT block without timing: {:?}", block.first());
        return None;
    };
    let Some(caps) = TIMING.captures(block[timing_idx]) else {
        warn!("Skipping SRT block with malformed timing: {:?}", block[timing_idx]);
        return None;
    };
    let field = |i: usize| caps.get(i).map(|m| m.as_str()).unwrap_or("0");
    let start = to_ms(field(1), field(2), field(3), field(4));
    let end = to_ms(field(5), field(6), field(7), field(8));

    let text = block[timing_idx + 1..]
        .iter()
        .map(|line| convert_html(line.trim_end()))
        .collect::<Vec<_>>()
        .join(r"\N");

    Some(AssEvent::dialogue(start, end.max(start), text))
}

fn to_ms(h: &str, m: &str, s: &str, frac: &str) -> u64 {
    let num = |v: &str| v.parse::<u64>().unwrap_or(0);
    // "5" after the separator means 500ms
    let millis = num(&format!("{:0<3}", frac));
    num(h) * 3_600_000 + num(m) * 60_000 + num(s) * 1000 + millis
}

/// `<i>`, `<b>`, `<u>`, `<s>` become `{\x1}`/`{\x0}`; other tags are dropped
fn convert_html(line: &str) -> String {
    HTML_TAG
        .replace_all(line, |caps: &regex::Captures| {
            let closing = &caps[1] == "/";
            match caps[2].to_lowercase().as_str() {
                tag @ ("i" | "b" | "u" | "s") => {
                    format!("{{\\{}{}}}", tag, if closing { 0 } else { 1 })
                }
                _ => String::new(),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_srt() {
        let srt = "1\n00:00:01,000 --> 00:00:03,500\nHello world\n\n2\n00:00:04,000 --> 00:00:06,000\nLine one\nLine two\n";
        let events = parse_srt(srt).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].start_ms, 1000);
        assert_eq!(events[0].end_ms, 3500);
        assert_eq!(events[0].text, "Hello world");
        assert_eq!(events[1].text, r"Line one\NLine two");
    }

    #[test]
    fn test_parse_crlf_and_bom() {
        let srt = "\u{feff}1\r\n00:00:00,500 --> 00:00:01,000\r\nHi\r\n\r\n";
        let events = parse_srt(srt).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].start_ms, 500);
        assert_eq!(events[0].text, "Hi");
    }

    #[test]
    fn test_html_tags_converted() {
        let srt = "1\n00:00:00,000 --> 00:00:01,000\n<i>soft</i> <font color=\"red\">loud</font>\n";
        let events = parse_srt(srt).unwrap();
        assert_eq!(events[0].text, r"{\i1}soft{\i0} loud");
    }

    #[test]
    fn test_missing_index_line_tolerated() {
        let srt = "00:00:02.25 --> 00:00:03.5\nNo index\n";
        let events = parse_srt(srt).unwrap();
        assert_eq!(events[0].start_ms, 2250);
        assert_eq!(events[0].end_ms, 3500);
    }

    #[test]
    fn test_malformed_timing_block_skipped() {
        let srt = "1\n00:00:xx,000 --> 00:00:01,000\nBroken\n\n2\n00:00:01,000 --> 00:00:02,000\nKept\n";
        let events = parse_srt(srt).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].text, "Kept");
    }

    #[test]
    fn test_garbage_is_error() {
        assert!(parse_srt("this is not a subtitle file").is_err());
        assert!(parse_srt("").unwrap().is_empty());
    }
}
