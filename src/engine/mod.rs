//! Core rendering engine module

pub mod ffmpeg;
pub mod progress;

pub use ffmpeg::{
    codec_args, escape_filter_path, find_ffmpeg, verify_output, FfmpegRenderer, FFMPEG_LOGLEVELS,
    MIN_OUTPUT_BYTES,
};
pub use progress::{FfmpegProgress, ProgressTracker, ProgressUpdate};
