use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{Result, StudypackError};

use super::{AudioEngine, AudioInfo, AudioWindow};

/// Audio engine backed by the ffmpeg and ffprobe binaries.
#[derive(Debug, Clone, Copy, Default)]
pub struct FfmpegEngine;

impl FfmpegEngine {
    pub fn new() -> Self {
        Self
    }

    /// Check that ffmpeg and ffprobe are installed and runnable.
    pub async fn check() -> Result<()> {
        for tool in ["ffmpeg", "ffprobe"] {
            let output = Command::new(tool)
                .arg("-version")
                .output()
                .await
                .map_err(|e| {
                    StudypackError::Transcription(format!(
                        "{tool} not found. Please install FFmpeg and ensure it's in your PATH. Error: {e}"
                    ))
                })?;

            if !output.status.success() {
                return Err(StudypackError::Transcription(format!(
                    "{tool} check failed"
                )));
            }
        }

        debug!("ffmpeg and ffprobe are available");
        Ok(())
    }
}

#[async_trait]
impl AudioEngine for FfmpegEngine {
    async fn extract_audio(&self, video: &Path, audio: &Path) -> Result<()> {
        if !video.exists() {
            return Err(StudypackError::Transcription(format!(
                "Input file not found: {}",
                video.display()
            )));
        }

        info!("Extracting audio from {}", video.display());

        let output = Command::new("ffmpeg")
            .args(["-y", "-i"])
            .arg(video)
            .args(["-vn", "-acodec", "libmp3lame", "-b:a", "192k"])
            .arg(audio)
            .output()
            .await
            .map_err(|e| StudypackError::Transcription(format!("Failed to run FFmpeg: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(StudypackError::Transcription(format!(
                "FFmpeg audio extraction failed: {}",
                stderr.trim()
            )));
        }

        if !audio.exists() {
            return Err(StudypackError::Transcription(
                "Audio file was not created".to_string(),
            ));
        }

        info!("Audio extracted to {}", audio.display());
        Ok(())
    }

    async fn probe(&self, media: &Path) -> Result<AudioInfo> {
        let output = Command::new("ffprobe")
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(media)
            .output()
            .await
            .map_err(|e| StudypackError::Transcription(format!("Failed to run FFprobe: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(StudypackError::Transcription(format!(
                "FFprobe failed: {}",
                stderr.trim()
            )));
        }

        let duration_str = String::from_utf8_lossy(&output.stdout);
        let duration_secs: f64 = duration_str.trim().parse().map_err(|e| {
            StudypackError::Transcription(format!(
                "Failed to parse duration '{}': {e}",
                duration_str.trim()
            ))
        })?;

        Ok(AudioInfo {
            duration: std::time::Duration::from_secs_f64(duration_secs),
        })
    }

    async fn export_window(
        &self,
        audio: &Path,
        window: &AudioWindow,
        output_path: &Path,
    ) -> Result<()> {
        let start = format!("{:.3}", window.start.as_secs_f64());
        let duration = format!("{:.3}", window.duration().as_secs_f64());

        debug!(
            "Exporting window {}: start={}, duration={}",
            window.index, start, duration
        );

        let output = Command::new("ffmpeg")
            .args(["-y", "-ss"])
            .arg(&start)
            .arg("-t")
            .arg(&duration)
            .arg("-i")
            .arg(audio)
            .args(["-vn", "-acodec", "libmp3lame", "-b:a", "192k"])
            .arg(output_path)
            .output()
            .await
            .map_err(|e| StudypackError::Transcription(format!("Failed to run FFmpeg: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(StudypackError::Transcription(format!(
                "FFmpeg window export failed: {}",
                stderr.trim()
            )));
        }

        Ok(())
    }
}
