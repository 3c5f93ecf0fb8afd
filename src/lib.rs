pub mod archive;
pub mod audio;
pub mod config;
pub mod course;
pub mod document;
pub mod error;
pub mod generate;
pub mod pipeline;
pub mod questions;
pub mod request;
pub mod sanitize;
pub mod summarize;
pub mod transcribe;
pub mod workspace;

pub use config::{Config, LanguageMode};
pub use error::{Result, StudypackError};
pub use pipeline::Pipeline;
pub use request::{StudyRequest, StudyResponse, VideoUpload};
