//! Progress reporting: timestamped pipeline steps and ffmpeg progress parsing

use std::time::{Duration, Instant};

use tracing::info;

/// Logs pipeline steps with the time elapsed since creation
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    enabled: bool,
    start_time: Instant,
}

impl ProgressTracker {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            start_time: Instant::now(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Format a step line, e.g. `[   1.2s] Rendering video...`
    pub fn format_step(&self, message: &str) -> String {
        format!("[{:6.1}s] {}", self.start_time.elapsed().as_secs_f64(), message)
    }

    /// Print a step to stderr unless disabled
    pub fn step(&self, message: &str) {
        if !self.enabled {
            return;
        }
        eprintln!("{}", self.format_step(message));
        info!("{}", message);
    }

    /// Restart the clock
    pub fn reset(&mut self) {
        self.start_time = Instant::now();
    }
}

/// Snapshot of encoder progress
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    pub frame: Option<u64>,
    /// Encoded media time in seconds
    pub out_time: Option<f64>,
    pub speed: Option<String>,
    /// Percentage of the expected duration, 0 to 100
    pub percent: Option<f64>,
    pub finished: bool,
}

impl ProgressUpdate {
    /// Human-readable one-liner
    pub fn describe(&self) -> String {
        let mut msg = String::from("FFmpeg");
        if let Some(percent) = self.percent {
            msg.push_str(&format!(" {:5.1}%", percent));
        }
        if let Some(frame) = self.frame {
            msg.push_str(&format!(" frame={}", frame));
        }
        if let Some(t) = self.out_time {
            msg.push_str(&format!(" time={:.2}s", t));
        }
        if let Some(speed) = &self.speed {
            msg.push_str(&format!(" speed={}", speed));
        }
        msg
    }
}

/// Parses `-progress` key=value output into throttled updates
#[derive(Debug)]
pub struct FfmpegProgress {
    duration_sec: f64,
    frame: Option<u64>,
    out_time: Option<f64>,
    speed: Option<String>,
    last_report: Option<Instant>,
    update_interval: Duration,
}

impl FfmpegProgress {
    pub fn new(duration_sec: f64) -> Self {
        Self {
            duration_sec,
            frame: None,
            out_time: None,
            speed: None,
            last_report: None,
            // At most twice per second
            update_interval: Duration::from_millis(500),
        }
    }

    pub fn with_update_interval(mut self, interval: Duration) -> Self {
        self.update_interval = interval;
        self
    }

    /// Feed one line; returns an update when one is due.
    ///
    /// `progress=end` always produces a final update.
    pub fn feed_line(&mut self, line: &str) -> Option<ProgressUpdate> {
        let (key, value) = line.trim().split_once('=')?;
        let value = value.trim();
        match key.trim() {
            "frame" => self.frame = value.parse().ok(),
            "out_time_us" | "out_time_ms" => {
                // ffmpeg reports both in microseconds
                if let Ok(us) = value.parse::<i64>() {
                    self.out_time = Some(us.max(0) as f64 / 1_000_000.0);
                }
            }
            "out_time" => {
                if let Some(secs) = parse_clock(value) {
                    self.out_time = Some(secs);
                }
            }
            "speed" => self.speed = Some(value.to_string()),
            "progress" if value == "end" => return Some(self.snapshot(true)),
            _ => {}
        }

        if self.frame.is_none() && self.out_time.is_none() {
            return None;
        }
        let now = Instant::now();
        let due = self
            .last_report
            .map_or(true, |last| now.duration_since(last) >= self.update_interval);
        if !due {
            return None;
        }
        self.last_report = Some(now);
        Some(self.snapshot(false))
    }

    pub fn percent(&self) -> Option<f64> {
        let t = self.out_time?;
        if self.duration_sec <= 0.0 {
            return None;
        }
        Some((t / self.duration_sec * 100.0).clamp(0.0, 100.0))
    }

    fn snapshot(&self, finished: bool) -> ProgressUpdate {
        ProgressUpdate {
            frame: self.frame,
            out_time: self.out_time,
            speed: self.speed.clone(),
            percent: if finished { Some(100.0) } else { self.percent() },
            finished,
        }
    }
}

/// Keys ffmpeg writes in a `-progress` block
const PROGRESS_KEYS: &[&str] = &[
    "frame",
    "fps",
    "bitrate",
    "total_size",
    "out_time_us",
    "out_time_ms",
    "out_time",
    "dup_frames",
    "drop_frames",
    "speed",
    "progress",
];

/// Whether a stderr line belongs to a `-progress` block rather than diagnostics
pub fn is_progress_line(line: &str) -> bool {
    let Some((key, _)) = line.trim().split_once('=') else {
        return false;
    };
    // Per-stream quality, e.g. `stream_0_0_q=-0.0`
    PROGRESS_KEYS.contains(&key) || (key.starts_with("stream_") && key.ends_with("_q"))
}

/// Parse `HH:MM:SS.micro` into seconds
fn parse_clock(value: &str) -> Option<f64> {
    let parts: Vec<&str> = value.split(':').collect();
    if parts.len() != 3 {
        return None;
    }
    let h: f64 = parts[0].parse().ok()?;
    let m: f64 = parts[1].parse().ok()?;
    let s: f64 = parts[2].parse().ok()?;
    Some(h * 3600.0 + m * 60.0 + s)
}
