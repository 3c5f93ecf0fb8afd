use crate::error::{Result, StudypackError};
use crate::generate::StructuredGenerator;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Gemini API base for content generation.
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Google Gemini client for structured JSON generation.
///
/// Every call declares a response schema and requests `application/json`
/// output, so the model's reply parses directly into the wire types.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    temperature: f32,
    base_url: String,
}

impl GeminiClient {
    /// Create a new client for the given model.
    pub fn new(api_key: String, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model: model.into(),
            temperature: 0.5,
            base_url: GEMINI_API_BASE.to_string(),
        }
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Override the API base URL (used in tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn build_request(&self, prompt: &str, schema: &Value) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                response_mime_type: "application/json".to_string(),
                response_schema: schema.clone(),
            },
        }
    }

    async fn call_api(&self, request: &GenerateContentRequest) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        debug!("Gemini API response status for {}: {}", self.model, status);

        if status.is_success() {
            let body = response.text().await?;
            let parsed: GenerateContentResponse = serde_json::from_str(&body)?;

            return parsed
                .candidates
                .first()
                .and_then(|c| c.content.parts.first())
                .map(|p| p.text.clone())
                .ok_or_else(|| {
                    StudypackError::Generation(format!("{} returned no candidates", self.model))
                });
        }

        let error_body = response.text().await.unwrap_or_default();

        if let Ok(api_error) = serde_json::from_str::<GeminiApiErrorResponse>(&error_body) {
            return Err(StudypackError::Generation(format!(
                "Gemini API error from {}: {} ({})",
                self.model,
                api_error.error.message,
                api_error.error.status.as_deref().unwrap_or("unknown")
            )));
        }

        Err(StudypackError::Generation(format!(
            "Gemini API error from {} ({}): {}",
            self.model, status, error_body
        )))
    }
}

#[async_trait]
impl StructuredGenerator for GeminiClient {
    async fn generate(&self, prompt: &str, schema: &Value) -> Result<Value> {
        let request = self.build_request(prompt, schema);
        let text = self.call_api(&request).await?;

        serde_json::from_str(&text).map_err(|e| {
            StudypackError::Generation(format!("{} returned malformed JSON: {e}", self.model))
        })
    }

    fn name(&self) -> &str {
        &self.model
    }
}

// Request/Response types

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    response_mime_type: String,
    response_schema: Value,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: String,
}

#[derive(Deserialize)]
struct GeminiApiErrorResponse {
    error: GeminiApiErrorDetail,
}

#[derive(Deserialize)]
struct GeminiApiErrorDetail {
    message: String,
    status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_name_is_model() {
        let client = GeminiClient::new("key".to_string(), "gemini-2.0-flash");
        assert_eq!(client.name(), "gemini-2.0-flash");
    }

    #[test]
    fn test_request_carries_schema_and_temperature() {
        let client =
            GeminiClient::new("key".to_string(), "gemini-2.0-flash").with_temperature(0.7);
        let schema = json!({"type": "OBJECT"});

        let request = client.build_request("hello", &schema);
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["contents"][0]["parts"][0]["text"], "hello");
        let temperature = value["generation_config"]["temperature"].as_f64().unwrap();
        assert!((temperature - 0.7).abs() < 1e-6);
        assert_eq!(
            value["generation_config"]["response_mime_type"],
            "application/json"
        );
        assert_eq!(value["generation_config"]["response_schema"]["type"], "OBJECT");
    }

    #[test]
    fn test_error_body_parsing() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT"}}"#;
        let parsed: GeminiApiErrorResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.error.message, "API key not valid.");
        assert_eq!(parsed.error.status.as_deref(), Some("INVALID_ARGUMENT"));
    }
}
