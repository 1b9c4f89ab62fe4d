//! ffmpeg subprocess renderer
//!
//! Renders an ASS file onto a fully transparent lavfi colour source through
//! libass (`subtitles` filter) and encodes it with the codec of the selected
//! quality tier.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

use super::progress::{is_progress_line, FfmpegProgress};
use crate::domain::model::VideoQuality;
use crate::error::{CaptionError, CaptionResult};
use crate::ports::{RenderPort, RenderRequest};

/// Outputs smaller than this are treated as failed renders
pub const MIN_OUTPUT_BYTES: u64 = 1024;

/// Log levels ffmpeg accepts through `-loglevel`
pub const FFMPEG_LOGLEVELS: &[&str] = &["quiet", "error", "warning", "info", "debug"];

pub struct FfmpegRenderer {
    ffmpeg_path: PathBuf,
    loglevel: String,
    show_progress: bool,
}

impl FfmpegRenderer {
    /// Create a renderer, locating ffmpeg on PATH when no path is given
    pub fn new(
        ffmpeg_path: Option<PathBuf>,
        loglevel: impl Into<String>,
        show_progress: bool,
    ) -> CaptionResult<Self> {
        let ffmpeg_path = match ffmpeg_path {
            Some(path) => path,
            None => find_ffmpeg()?,
        };
        debug!("Using ffmpeg at {}", ffmpeg_path.display());
        Ok(Self {
            ffmpeg_path,
            loglevel: loglevel.into(),
            show_progress,
        })
    }

    pub fn ffmpeg_path(&self) -> &Path {
        &self.ffmpeg_path
    }

    /// Command-line arguments, excluding the program itself
    pub fn build_args(&self, request: &RenderRequest) -> Vec<String> {
        let size = request.size.to_string();
        let (pix_fmt, codec_args) = codec_args(request.quality, request.h264_crf);
        let filter = format!(
            "format=rgba,subtitles=filename='{}':alpha=1:original_size={},format={}",
            escape_filter_path(&request.ass_path),
            size,
            pix_fmt
        );

        let mut args: Vec<String> = ["-y", "-hide_banner", "-loglevel"].map(String::from).to_vec();
        args.push(self.loglevel.clone());
        if self.show_progress {
            args.extend(["-progress", "pipe:2", "-nostats"].map(String::from));
        }
        args.extend(["-f", "lavfi", "-t"].map(String::from));
        args.push(format!("{:.3}", request.duration_sec));
        args.push("-i".to_string());
        args.push(format!("color=c=black@0.0:s={}:r={}", size, request.fps));
        args.push("-vf".to_string());
        args.push(filter);
        args.extend(codec_args);
        args.push("-r".to_string());
        args.push(request.fps.clone());
        args.push("-an".to_string());
        args.push(request.output_path.display().to_string());
        args
    }

    async fn run_with_progress(&self, mut cmd: Command, duration_sec: f64) -> CaptionResult<()> {
        cmd.stderr(Stdio::piped());
        let mut child = cmd.spawn().map_err(spawn_error)?;

        if let Some(stderr) = child.stderr.take() {
            let mut progress = FfmpegProgress::new(duration_sec);
            // ffmpeg echoes file names and metadata in their original encoding
            let mut segments = BufReader::new(stderr).split(b'\n');
            while let Some(raw) = segments.next_segment().await? {
                let decoded = String::from_utf8_lossy(&raw);
                let line = decoded.trim_end_matches('\r');
                if !is_progress_line(line) {
                    eprintln!("{}", line);
                    continue;
                }
                if let Some(update) = progress.feed_line(line) {
                    eprintln!("{}", update.describe());
                }
            }
        }

        let status = child.wait().await?;
        check_status(status)
    }

    async fn run_simple(&self, mut cmd: Command) -> CaptionResult<()> {
        cmd.stderr(Stdio::inherit());
        let status = cmd.status().await.map_err(spawn_error)?;
        check_status(status)
    }
}

#[async_trait]
impl RenderPort for FfmpegRenderer {
    async fn render(&self, request: &RenderRequest) -> CaptionResult<u64> {
        let args = self.build_args(request);
        info!(
            "FFmpeg command: {} {}",
            self.ffmpeg_path.display(),
            args.join(" ")
        );

        let mut cmd = Command::new(&self.ffmpeg_path);
        cmd.args(&args).stdin(Stdio::null()).kill_on_drop(true);

        if self.show_progress {
            self.run_with_progress(cmd, request.duration_sec).await?;
        } else {
            self.run_simple(cmd).await?;
        }
        verify_output(&request.output_path)
    }
}

/// Locate ffmpeg on PATH
pub fn find_ffmpeg() -> CaptionResult<PathBuf> {
    which::which("ffmpeg").map_err(|_| CaptionError::FFmpegNotFound {
        message: "FFmpeg not found on PATH. Please install FFmpeg and ensure it is available \
                  in your system PATH."
            .to_string(),
    })
}

/// Pixel format and encoder arguments for a quality tier
pub fn codec_args(quality: VideoQuality, h264_crf: u8) -> (&'static str, Vec<String>) {
    let (pix_fmt, mut args): (&'static str, Vec<String>) = match quality {
        VideoQuality::Large => (
            "yuva444p10le",
            ["-c:v", "prores_ks", "-profile:v", "4"].map(String::from).to_vec(),
        ),
        VideoQuality::Medium => (
            "yuv422p10le",
            ["-c:v", "prores_ks", "-profile:v", "3"].map(String::from).to_vec(),
        ),
        VideoQuality::Small => (
            "yuv420p",
            vec![
                "-c:v".to_string(),
                "libx264".to_string(),
                "-crf".to_string(),
                h264_crf.to_string(),
            ],
        ),
    };
    args.push("-pix_fmt".to_string());
    args.push(pix_fmt.to_string());
    (pix_fmt, args)
}

/// Escape a path for use inside a filter argument.
///
/// The path is made absolute, backslashes become forward slashes, and `:`
/// and `'` are backslash-escaped.
pub fn escape_filter_path(path: &Path) -> String {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };
    absolute
        .display()
        .to_string()
        .replace('\\', "/")
        .replace(':', r"\:")
        .replace('\'', r"\'")
}

/// Check the output exists and is plausibly a video; returns its size
pub fn verify_output(path: &Path) -> CaptionResult<u64> {
    let metadata = std::fs::metadata(path).map_err(|_| {
        CaptionError::render(format!("Output file was not created: {}", path.display()))
    })?;
    if metadata.len() < MIN_OUTPUT_BYTES {
        return Err(CaptionError::render(format!(
            "Output file is too small ({} bytes), render likely failed",
            metadata.len()
        )));
    }
    Ok(metadata.len())
}

fn check_status(status: std::process::ExitStatus) -> CaptionResult<()> {
    if status.success() {
        Ok(())
    } else {
        Err(CaptionError::render(format!(
            "FFmpeg render failed ({}). Check output above for details.",
            status
        )))
    }
}

fn spawn_error(e: std::io::Error) -> CaptionError {
    CaptionError::render(format!("Failed to start ffmpeg: {}", e))
}
