// Ports - Interface definitions (contracts)

use std::path::PathBuf;

use async_trait::async_trait;

use crate::domain::model::{OverlaySize, VideoQuality};
use crate::error::CaptionResult;

/// Everything the encoder needs to turn an ASS file into an overlay video
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    pub ass_path: PathBuf,
    pub output_path: PathBuf,
    pub size: OverlaySize,
    /// Frame rate as given by the user, e.g. `30` or `30000/1001`
    pub fps: String,
    pub duration_sec: f64,
    pub quality: VideoQuality,
    /// CRF for the H.264 tier
    pub h264_crf: u8,
}

/// Port for overlay video rendering
#[async_trait]
pub trait RenderPort: Send + Sync {
    /// Render the request, returning the size of the written file in bytes
    async fn render(&self, request: &RenderRequest) -> CaptionResult<u64>;
}
