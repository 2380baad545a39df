use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use serde_json::Value;
use url::Url;
use wq_core::{Error, QuizModel, Result};

pub mod gemini;
pub mod openai;
pub mod scripted;

pub use gemini::GeminiModel;
pub use openai::OpenAiCompatModel;
pub use scripted::ScriptedModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelBackend {
    Gemini,
    /// Any `/chat/completions` endpoint: OpenAI, DeepSeek, Ollama.
    OpenAi,
}

impl FromStr for ModelBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "gemini" | "google" => Ok(Self::Gemini),
            "openai" | "deepseek" | "ollama" => Ok(Self::OpenAi),
            other => Err(Error::Inference(format!(
                "Unknown model backend: {}. Available backends: gemini, openai",
                other
            ))),
        }
    }
}

impl fmt::Display for ModelBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gemini => write!(f, "gemini"),
            Self::OpenAi => write!(f, "openai"),
        }
    }
}

#[derive(Clone)]
pub struct ModelConfig {
    pub backend: ModelBackend,
    pub model_name: Option<String>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("backend", &self.backend)
            .field("model_name", &self.model_name)
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            backend: ModelBackend::Gemini,
            model_name: None,
            api_key: None,
            base_url: None,
        }
    }
}

impl ModelConfig {
    /// The configured base URL without a trailing slash, or `default`.
    pub(crate) fn base_url_or(&self, default: &str) -> Result<String> {
        let raw = self.base_url.as_deref().unwrap_or(default);
        Url::parse(raw).map_err(|e| Error::InvalidUrl(format!("{}: {}", raw, e)))?;
        Ok(raw.trim_end_matches('/').to_string())
    }
}

pub fn create_model(config: &ModelConfig) -> Result<Arc<dyn QuizModel>> {
    let model: Arc<dyn QuizModel> = match config.backend {
        ModelBackend::Gemini => Arc::new(GeminiModel::new(config)?),
        ModelBackend::OpenAi => Arc::new(OpenAiCompatModel::new(config)?),
    };
    Ok(model)
}

/// Parses model text output as JSON, tolerating a surrounding markdown fence.
pub(crate) fn parse_json_output(text: &str) -> Result<Value> {
    let trimmed = text.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.trim_end().strip_suffix("```"))
        .unwrap_or(trimmed);

    serde_json::from_str(body.trim())
        .map_err(|e| Error::Inference(format!("Model returned invalid JSON: {}", e)))
}
