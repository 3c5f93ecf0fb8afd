pub mod chunked;
pub mod whisper;

pub use chunked::{estimate_cost, transcribe_to_file, TranscriptionReport};
pub use whisper::WhisperClient;

use crate::config::LanguageMode;
use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// A speech-to-text backend.
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Transcribe one audio file into plain English text.
    async fn transcribe(&self, audio: &Path, mode: LanguageMode) -> Result<String>;

    /// Get the name of this backend.
    fn name(&self) -> &'static str;
}
