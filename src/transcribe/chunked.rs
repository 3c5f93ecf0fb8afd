use std::path::Path;
use std::time::Duration;

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::audio::{plan_windows, AudioEngine, ChunkPolicy};
use crate::config::LanguageMode;
use crate::error::{Result, StudypackError};

use super::SpeechToText;

/// Whisper API price per minute of audio, for the cost log line.
const COST_PER_MINUTE_USD: f64 = 0.006;

/// How a lecture was transcribed.
#[derive(Debug, Clone)]
pub struct TranscriptionReport {
    pub chunked: bool,
    pub windows: usize,
    pub duration: Duration,
    pub estimated_cost_usd: f64,
}

/// Estimated speech API cost for a clip of the given duration.
pub fn estimate_cost(duration: Duration) -> f64 {
    duration.as_secs_f64() / 60.0 * COST_PER_MINUTE_USD
}

/// Transcribe a lecture's audio into `transcript`, chunking into fixed
/// windows when the policy demands it.
///
/// Windows are transcribed strictly in order and each result is appended
/// and fsynced before the next window is touched, so a failure partway
/// leaves a usable transcript prefix on disk. A failed window is fatal:
/// it is recorded at the end of the transcript file and the error is
/// returned.
pub async fn transcribe_to_file(
    speech: &dyn SpeechToText,
    engine: &dyn AudioEngine,
    audio: &Path,
    transcript: &Path,
    chunks_dir: &Path,
    mode: LanguageMode,
    policy: &ChunkPolicy,
) -> Result<TranscriptionReport> {
    let audio_info = engine.probe(audio).await?;
    let file_size = fs::metadata(audio).await?.len();
    let cost = estimate_cost(audio_info.duration);

    info!(
        "Audio: {:.1} min, {:.1} MB, estimated transcription cost ${:.4}",
        audio_info.duration.as_secs_f64() / 60.0,
        file_size as f64 / (1024.0 * 1024.0),
        cost
    );

    let mut out = fs::File::create(transcript).await?;

    if !policy.needs_chunking(file_size, audio_info.duration, mode) {
        debug!("Transcribing whole file with {}", speech.name());

        match speech.transcribe(audio, mode).await {
            Ok(text) => {
                append_synced(&mut out, &text).await?;
                Ok(TranscriptionReport {
                    chunked: false,
                    windows: 1,
                    duration: audio_info.duration,
                    estimated_cost_usd: cost,
                })
            }
            Err(e) => {
                warn!("Transcription failed: {}", e);
                record_failure(&mut out, 0, &e).await;
                Err(e)
            }
        }
    } else {
        let windows = plan_windows(audio_info.duration, policy.window_duration);
        info!(
            "Chunking audio into {} windows of up to {:?}",
            windows.len(),
            policy.window_duration
        );

        for window in &windows {
            let window_file = chunks_dir.join(format!("window_{:04}.mp3", window.index));

            let result = async {
                engine.export_window(audio, window, &window_file).await?;
                speech.transcribe(&window_file, mode).await
            }
            .await;

            match result {
                Ok(text) => {
                    debug!(
                        "Window {}/{} transcribed ({} chars)",
                        window.index + 1,
                        windows.len(),
                        text.len()
                    );
                    append_synced(&mut out, &text).await?;
                }
                Err(e) => {
                    warn!("Transcription failed at window {}: {}", window.index, e);
                    record_failure(&mut out, window.index, &e).await;
                    return Err(e);
                }
            }

            if let Err(e) = fs::remove_file(&window_file).await {
                warn!(
                    "Failed to remove window file {}: {}",
                    window_file.display(),
                    e
                );
            }
        }

        Ok(TranscriptionReport {
            chunked: true,
            windows: windows.len(),
            duration: audio_info.duration,
            estimated_cost_usd: cost,
        })
    }
}

/// Append one chunk's text plus a newline, flushed and fsynced so it
/// survives a failure in a later chunk.
async fn append_synced(out: &mut fs::File, text: &str) -> Result<()> {
    out.write_all(text.as_bytes()).await?;
    out.write_all(b"\n").await?;
    out.flush().await?;
    out.sync_all().await?;
    Ok(())
}

/// Best-effort note of a failed window at the end of the transcript file.
async fn record_failure(out: &mut fs::File, window: usize, error: &StudypackError) {
    let line = format!("[transcription failed at window {}: {}]\n", window, error);
    let _ = out.write_all(line.as_bytes()).await;
    let _ = out.sync_all().await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioInfo, AudioWindow};
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubEngine {
        duration: Duration,
    }

    #[async_trait]
    impl AudioEngine for StubEngine {
        async fn extract_audio(&self, _video: &Path, audio: &Path) -> Result<()> {
            fs::write(audio, b"audio").await?;
            Ok(())
        }

        async fn probe(&self, _media: &Path) -> Result<AudioInfo> {
            Ok(AudioInfo {
                duration: self.duration,
            })
        }

        async fn export_window(
            &self,
            _audio: &Path,
            window: &AudioWindow,
            output: &Path,
        ) -> Result<()> {
            fs::write(output, format!("window {}", window.index)).await?;
            Ok(())
        }
    }

    struct ScriptedSpeech {
        texts: Vec<&'static str>,
        calls: AtomicUsize,
        fail_from: Option<usize>,
    }

    impl ScriptedSpeech {
        fn new(texts: Vec<&'static str>) -> Self {
            Self {
                texts,
                calls: AtomicUsize::new(0),
                fail_from: None,
            }
        }

        fn failing_from(mut self, call: usize) -> Self {
            self.fail_from = Some(call);
            self
        }
    }

    #[async_trait]
    impl SpeechToText for ScriptedSpeech {
        async fn transcribe(&self, _audio: &Path, _mode: LanguageMode) -> Result<String> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(fail_from) = self.fail_from {
                if call >= fail_from {
                    return Err(StudypackError::Transcription(
                        "speech backend unavailable".to_string(),
                    ));
                }
            }
            Ok(self.texts[call % self.texts.len()].to_string())
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    fn small_policy() -> ChunkPolicy {
        ChunkPolicy {
            max_file_size: 1024 * 1024,
            max_duration: Duration::from_secs(60),
            hinglish_max_duration: Duration::from_secs(30),
            window_duration: Duration::from_secs(30),
        }
    }

    async fn setup() -> (tempfile::TempDir, PathBuf, PathBuf, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("audio.mp3");
        fs::write(&audio, b"tiny").await.unwrap();
        let transcript = dir.path().join("transcript.txt");
        let chunks = dir.path().join("chunks");
        fs::create_dir_all(&chunks).await.unwrap();
        (dir, audio, transcript, chunks)
    }

    #[test]
    fn test_estimate_cost() {
        let cost = estimate_cost(Duration::from_secs(600));
        assert!((cost - 0.06).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_whole_file_when_under_limits() {
        let (_dir, audio, transcript, chunks) = setup().await;
        let engine = StubEngine {
            duration: Duration::from_secs(45),
        };
        let speech = ScriptedSpeech::new(vec!["hello lecture"]);

        let report = transcribe_to_file(
            &speech,
            &engine,
            &audio,
            &transcript,
            &chunks,
            LanguageMode::Standard,
            &small_policy(),
        )
        .await
        .unwrap();

        assert!(!report.chunked);
        assert_eq!(report.windows, 1);
        let text = fs::read_to_string(&transcript).await.unwrap();
        assert_eq!(text, "hello lecture\n");
    }

    #[tokio::test]
    async fn test_chunked_appends_in_order() {
        let (_dir, audio, transcript, chunks) = setup().await;
        let engine = StubEngine {
            duration: Duration::from_secs(80),
        };
        let speech = ScriptedSpeech::new(vec!["one", "two", "three"]);

        let report = transcribe_to_file(
            &speech,
            &engine,
            &audio,
            &transcript,
            &chunks,
            LanguageMode::Standard,
            &small_policy(),
        )
        .await
        .unwrap();

        assert!(report.chunked);
        assert_eq!(report.windows, 3);
        let text = fs::read_to_string(&transcript).await.unwrap();
        assert_eq!(text, "one\ntwo\nthree\n");

        // Window files are removed as they are consumed
        let mut entries = fs::read_dir(&chunks).await.unwrap();
        assert!(entries.next_entry().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_hinglish_duration_triggers_chunking() {
        let (_dir, audio, transcript, chunks) = setup().await;
        let engine = StubEngine {
            duration: Duration::from_secs(45),
        };
        let speech = ScriptedSpeech::new(vec!["pehla", "doosra"]);

        let report = transcribe_to_file(
            &speech,
            &engine,
            &audio,
            &transcript,
            &chunks,
            LanguageMode::Hinglish,
            &small_policy(),
        )
        .await
        .unwrap();

        assert!(report.chunked);
        assert_eq!(report.windows, 2);
    }

    #[tokio::test]
    async fn test_failure_keeps_durable_prefix() {
        let (_dir, audio, transcript, chunks) = setup().await;
        let engine = StubEngine {
            duration: Duration::from_secs(80),
        };
        let speech = ScriptedSpeech::new(vec!["one", "two", "three"]).failing_from(1);

        let result = transcribe_to_file(
            &speech,
            &engine,
            &audio,
            &transcript,
            &chunks,
            LanguageMode::Standard,
            &small_policy(),
        )
        .await;

        assert!(result.is_err());
        let text = fs::read_to_string(&transcript).await.unwrap();
        assert!(text.starts_with("one\n"));
        assert!(text.contains("[transcription failed at window 1:"));
    }

    #[tokio::test]
    async fn test_whole_file_failure_recorded() {
        let (_dir, audio, transcript, chunks) = setup().await;
        let engine = StubEngine {
            duration: Duration::from_secs(10),
        };
        let speech = ScriptedSpeech::new(vec!["unused"]).failing_from(0);

        let result = transcribe_to_file(
            &speech,
            &engine,
            &audio,
            &transcript,
            &chunks,
            LanguageMode::Standard,
            &small_policy(),
        )
        .await;

        assert!(result.is_err());
        let text = fs::read_to_string(&transcript).await.unwrap();
        assert!(text.contains("[transcription failed at window 0:"));
    }
}
