use crate::config::LanguageMode;
use crate::error::{Result, StudypackError};
use crate::transcribe::SpeechToText;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::path::Path;
use tokio::fs;
use tracing::debug;

/// OpenAI audio API base.
const OPENAI_AUDIO_API_BASE: &str = "https://api.openai.com/v1/audio";

/// Model for standard lectures, translated into English.
const TRANSLATION_MODEL: &str = "whisper-1";

/// Model for hinglish lectures, transcribed as spoken.
const TRANSCRIPTION_MODEL: &str = "gpt-4o-transcribe";

/// Vocabulary hint that keeps Hindi words in Devanagari instead of
/// romanizing them.
const HINGLISH_PROMPT: &str = "This is a hinglish audio file. Please make sure to add Hindi words as-is like hai(है), accha(अच्छा).";

/// OpenAI speech API client.
pub struct WhisperClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl WhisperClient {
    /// Create a new client with the given API key.
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: OPENAI_AUDIO_API_BASE.to_string(),
        }
    }

    /// Override the API base URL (used in tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Standard audio goes through the translations endpoint so any
    /// source language comes back as English. Hinglish audio must keep
    /// its mixed wording, so it uses plain transcription instead.
    fn endpoint_for(&self, mode: LanguageMode) -> String {
        match mode {
            LanguageMode::Standard => format!("{}/translations", self.base_url),
            LanguageMode::Hinglish => format!("{}/transcriptions", self.base_url),
        }
    }

    fn model_for(mode: LanguageMode) -> &'static str {
        match mode {
            LanguageMode::Standard => TRANSLATION_MODEL,
            LanguageMode::Hinglish => TRANSCRIPTION_MODEL,
        }
    }

    /// Build the multipart form for the API request.
    async fn build_form(&self, audio_path: &Path, mode: LanguageMode) -> Result<Form> {
        let file_bytes = fs::read(audio_path).await?;
        let file_name = audio_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio.mp3")
            .to_string();

        let mime_type = match audio_path.extension().and_then(|e| e.to_str()) {
            Some("mp3") => "audio/mpeg",
            Some("wav") => "audio/wav",
            Some("m4a") => "audio/mp4",
            Some("ogg") => "audio/ogg",
            Some("webm") => "audio/webm",
            _ => "application/octet-stream",
        };

        let file_part = Part::bytes(file_bytes)
            .file_name(file_name)
            .mime_str(mime_type)?;

        let mut form = Form::new()
            .part("file", file_part)
            .text("model", Self::model_for(mode));

        if mode == LanguageMode::Hinglish {
            form = form
                .text("response_format", "text")
                .text("prompt", HINGLISH_PROMPT);
        }

        Ok(form)
    }

    async fn call_api(&self, url: &str, form: Form, mode: LanguageMode) -> Result<String> {
        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        debug!("Speech API response status: {}", status);

        if status.is_success() {
            return match mode {
                LanguageMode::Standard => {
                    let body = response.text().await?;
                    let parsed: TranslationResponse = serde_json::from_str(&body)?;
                    Ok(parsed.text)
                }
                // response_format=text returns the transcript as the body
                LanguageMode::Hinglish => Ok(response.text().await?),
            };
        }

        let error_body = response.text().await.unwrap_or_default();

        if let Ok(api_error) = serde_json::from_str::<ApiErrorResponse>(&error_body) {
            return Err(StudypackError::Transcription(format!(
                "Speech API error: {} ({})",
                api_error.error.message, api_error.error.r#type
            )));
        }

        Err(StudypackError::Transcription(format!(
            "Speech API error ({}): {}",
            status, error_body
        )))
    }
}

#[async_trait]
impl SpeechToText for WhisperClient {
    async fn transcribe(&self, audio: &Path, mode: LanguageMode) -> Result<String> {
        debug!("Transcribing {} in {} mode", audio.display(), mode);

        let url = self.endpoint_for(mode);
        let form = self.build_form(audio, mode).await?;
        let text = self.call_api(&url, form, mode).await?;

        Ok(text.trim().to_string())
    }

    fn name(&self) -> &'static str {
        "OpenAI Whisper"
    }
}

// API response types

#[derive(Debug, Deserialize)]
struct TranslationResponse {
    text: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
    r#type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_selection() {
        let client = WhisperClient::new("sk-test".to_string());
        assert_eq!(
            client.endpoint_for(LanguageMode::Standard),
            "https://api.openai.com/v1/audio/translations"
        );
        assert_eq!(
            client.endpoint_for(LanguageMode::Hinglish),
            "https://api.openai.com/v1/audio/transcriptions"
        );
    }

    #[test]
    fn test_model_selection() {
        assert_eq!(WhisperClient::model_for(LanguageMode::Standard), "whisper-1");
        assert_eq!(
            WhisperClient::model_for(LanguageMode::Hinglish),
            "gpt-4o-transcribe"
        );
    }

    #[test]
    fn test_base_url_override() {
        let client = WhisperClient::new("sk-test".to_string()).with_base_url("http://localhost:9");
        assert_eq!(
            client.endpoint_for(LanguageMode::Standard),
            "http://localhost:9/translations"
        );
    }

    #[test]
    fn test_error_body_parsing() {
        let body = r#"{"error": {"message": "Invalid file format.", "type": "invalid_request_error"}}"#;
        let parsed: ApiErrorResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.error.message, "Invalid file format.");
        assert_eq!(parsed.error.r#type, "invalid_request_error");
    }
}
