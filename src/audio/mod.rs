pub mod chunk;
pub mod ffmpeg;

pub use chunk::{plan_windows, ChunkPolicy};
pub use ffmpeg::FfmpegEngine;

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

/// Metadata about an audio file.
#[derive(Debug, Clone)]
pub struct AudioInfo {
    pub duration: Duration,
}

/// A fixed time window of audio scheduled for transcription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioWindow {
    pub index: usize,
    pub start: Duration,
    pub end: Duration,
}

impl AudioWindow {
    /// Get the duration of this window.
    pub fn duration(&self) -> Duration {
        self.end.saturating_sub(self.start)
    }
}

/// Media operations backed by an external tool.
#[async_trait]
pub trait AudioEngine: Send + Sync {
    /// Extract the audio track of a video into a standalone audio file.
    async fn extract_audio(&self, video: &Path, audio: &Path) -> Result<()>;

    /// Probe a media file for its metadata.
    async fn probe(&self, media: &Path) -> Result<AudioInfo>;

    /// Export one time window of an audio file into its own file.
    async fn export_window(&self, audio: &Path, window: &AudioWindow, output: &Path)
        -> Result<()>;
}
