pub mod gemini;
pub mod prompts;
pub mod schema;

pub use gemini::GeminiClient;

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// A text model that returns structured JSON conforming to a declared
/// response schema.
#[async_trait]
pub trait StructuredGenerator: Send + Sync {
    /// Run one prompt and return the parsed JSON payload.
    async fn generate(&self, prompt: &str, schema: &Value) -> Result<Value>;

    /// Identity of this backend, used to key merged candidate sets.
    fn name(&self) -> &str;
}
