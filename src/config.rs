use crate::error::{Result, StudypackError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How the lecture audio should be treated during transcription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageMode {
    #[default]
    Standard,
    Hinglish,
}

impl std::fmt::Display for LanguageMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LanguageMode::Standard => write!(f, "standard"),
            LanguageMode::Hinglish => write!(f, "hinglish"),
        }
    }
}

impl std::str::FromStr for LanguageMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "standard" => Ok(LanguageMode::Standard),
            "hinglish" => Ok(LanguageMode::Hinglish),
            _ => Err(format!(
                "Unknown language mode: {}. Use 'standard' or 'hinglish'",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    /// Parent directory for per-request workspaces.
    pub data_dir: PathBuf,
    pub summary_model: String,
    pub combine_model: String,
    pub selection_model: String,
    /// Models queried in parallel for question candidates.
    pub question_models: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            gemini_api_key: None,
            data_dir: PathBuf::from("data"),
            summary_model: "gemini-2.0-flash".to_string(),
            combine_model: "gemini-2.0-flash".to_string(),
            selection_model: "gemini-2.5-flash".to_string(),
            question_models: vec![
                "gemini-2.5-flash".to_string(),
                "gemini-2.0-flash".to_string(),
                "gemini-2.0-flash-lite".to_string(),
            ],
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        // Load from config file if it exists
        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                let contents = std::fs::read_to_string(&config_path)?;
                if let Ok(file_config) = toml::from_str::<Config>(&contents) {
                    config = file_config;
                }
            }
        }

        // Override with environment variables
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            config.openai_api_key = Some(key);
        }
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            config.gemini_api_key = Some(key);
        }
        if let Ok(dir) = std::env::var("STUDYPACK_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Ok(model) = std::env::var("STUDYPACK_SUMMARY_MODEL") {
            config.summary_model = model;
        }
        if let Ok(model) = std::env::var("STUDYPACK_COMBINE_MODEL") {
            config.combine_model = model;
        }
        if let Ok(model) = std::env::var("STUDYPACK_SELECTION_MODEL") {
            config.selection_model = model;
        }
        if let Ok(models) = std::env::var("STUDYPACK_QUESTION_MODELS") {
            let parsed: Vec<String> = models
                .split(',')
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty())
                .collect();
            if !parsed.is_empty() {
                config.question_models = parsed;
            }
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.openai_api_key.is_none() {
            return Err(StudypackError::Config(
                "OPENAI_API_KEY not set. Export it with: export OPENAI_API_KEY=sk-...".to_string(),
            ));
        }

        if self.gemini_api_key.is_none() {
            return Err(StudypackError::Config(
                "GEMINI_API_KEY not set. Get one at https://aistudio.google.com/apikey".to_string(),
            ));
        }

        if self.question_models.is_empty() {
            return Err(StudypackError::Config(
                "At least one question model must be configured".to_string(),
            ));
        }

        Ok(())
    }

    fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("studypack").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_mode_parsing() {
        assert_eq!(
            "standard".parse::<LanguageMode>().unwrap(),
            LanguageMode::Standard
        );
        assert_eq!(
            "hinglish".parse::<LanguageMode>().unwrap(),
            LanguageMode::Hinglish
        );
        assert_eq!(
            "HINGLISH".parse::<LanguageMode>().unwrap(),
            LanguageMode::Hinglish
        );
        assert!("hindi".parse::<LanguageMode>().is_err());
    }

    #[test]
    fn test_language_mode_display() {
        assert_eq!(LanguageMode::Standard.to_string(), "standard");
        assert_eq!(LanguageMode::Hinglish.to_string(), "hinglish");
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.summary_model, "gemini-2.0-flash");
        assert_eq!(config.selection_model, "gemini-2.5-flash");
        assert_eq!(config.question_models.len(), 3);
    }

    #[test]
    fn test_validate_missing_api_keys() {
        let config = Config::default();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.openai_api_key = Some("sk-test".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_with_api_keys() {
        let mut config = Config::default();
        config.openai_api_key = Some("sk-test".to_string());
        config.gemini_api_key = Some("test-key".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_question_models() {
        let mut config = Config::default();
        config.openai_api_key = Some("sk-test".to_string());
        config.gemini_api_key = Some("test-key".to_string());
        config.question_models.clear();
        assert!(config.validate().is_err());
    }
}
