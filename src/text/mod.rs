//! Text processing: ASS markup helpers, measurement and wrapping

pub mod measure;
pub mod utils;
pub mod wrap;

pub use measure::{
    measure_multiline, measure_single_line, FixedWidthMeasurer, FontMeasurer, TextMeasurer,
};
pub use utils::{
    ass_newlines_to_real, normalize_whitespace, real_newlines_to_ass, strip_ass_tags,
    visible_text,
};
pub use wrap::wrap_text_to_width;
