pub mod models;
pub mod prompts;
pub mod providers;

use crate::config::LlmConfig;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("LLM connection error: {0}")]
    ConnectionError(String),
    #[error("LLM request timed out after {0} seconds")]
    Timeout(u64),
    #[error("LLM response error: {0}")]
    ResponseError(String),
    #[error("LLM configuration error: {0}")]
    ConfigError(String),
}

impl LlmError {
    /// Maps a reqwest transport failure, keeping timeouts distinguishable.
    pub(crate) fn from_transport(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            LlmError::Timeout(timeout_secs)
        } else {
            LlmError::ConnectionError(err.to_string())
        }
    }
}

/// A generation model that turns one prompt into raw response text.
///
/// Implementations send the fixed system prompt alongside `prompt` and ask for
/// a `{"sql": "..."}` object. They make exactly one outbound call per
/// invocation and never retry.
#[async_trait]
pub trait SqlGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

pub struct LlmManager {
    generator: Box<dyn SqlGenerator>,
    backend: String,
    model: String,
}

impl LlmManager {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let generator: Box<dyn SqlGenerator> = match config.backend.as_str() {
            "gemini" => Box::new(providers::gemini::GeminiProvider::new(config)?),
            "remote" => Box::new(providers::remote::RemoteLlmProvider::new(config)?),
            "ollama" => Box::new(providers::ollama::OllamaProvider::new(config)?),
            _ => {
                return Err(LlmError::ConfigError(format!(
                    "Unsupported LLM backend: {}",
                    config.backend
                )))
            }
        };

        Ok(Self {
            generator,
            backend: config.backend.clone(),
            model: config.model.clone(),
        })
    }

    pub fn backend(&self) -> &str {
        &self.backend
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl SqlGenerator for LlmManager {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.generator.generate(prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn llm_config(backend: &str) -> LlmConfig {
        LlmConfig {
            backend: backend.to_string(),
            model: "test-model".to_string(),
            api_key: Some("test-key".to_string()),
            api_url: Some("http://localhost:9/v1/chat/completions".to_string()),
            timeout_secs: 600,
        }
    }

    #[test]
    fn test_manager_selects_known_backends() {
        for backend in ["gemini", "remote", "ollama"] {
            let manager = LlmManager::new(&llm_config(backend)).unwrap();
            assert_eq!(manager.backend(), backend);
            assert_eq!(manager.model(), "test-model");
        }
    }

    #[test]
    fn test_manager_rejects_unknown_backend() {
        let err = LlmManager::new(&llm_config("local")).err().unwrap();
        assert!(matches!(err, LlmError::ConfigError(_)));
        assert_eq!(
            err.to_string(),
            "LLM configuration error: Unsupported LLM backend: local"
        );
    }
}
