use thiserror::Error;

#[derive(Error, Debug)]
pub enum StudypackError {
    #[error("{0}")]
    Validation(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Packaging failed: {0}")]
    Packaging(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StudypackError {
    /// HTTP status this error maps to at the response boundary. Only
    /// request validation is the caller's fault.
    pub fn status(&self) -> u16 {
        match self {
            StudypackError::Validation(_) => 400,
            _ => 500,
        }
    }

    /// Short stage label used in logs and error markers.
    pub fn stage(&self) -> &'static str {
        match self {
            StudypackError::Validation(_) => "validation",
            StudypackError::Transcription(_) => "transcription",
            StudypackError::Generation(_) => "generation",
            StudypackError::Packaging(_) => "packaging",
            StudypackError::Config(_) => "config",
            StudypackError::Io(_) => "io",
            StudypackError::Http(_) => "http",
            StudypackError::Json(_) => "json",
        }
    }
}

pub type Result<T> = std::result::Result<T, StudypackError>;
