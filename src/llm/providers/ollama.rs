use crate::config::LlmConfig;
use crate::llm::models::sql_response_schema;
use crate::llm::prompts::SQL_GENERATION_SYSTEM_PROMPT;
use crate::llm::providers::{http_client, status_error};
use crate::llm::{LlmError, SqlGenerator};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info};

pub struct OllamaProvider {
    client: reqwest::Client,
    api_url: String,
    model: String,
    timeout_secs: u64,
}

#[derive(Serialize, Debug)]
struct OllamaRequest {
    model: String,
    system: String,
    prompt: String,
    format: Value,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize, Debug)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Deserialize, Debug)]
struct OllamaResponse {
    response: String,
}

impl OllamaProvider {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_url = config
            .api_url
            .clone()
            .unwrap_or_else(|| "http://localhost:11434/api/generate".to_string());

        Ok(Self {
            client: http_client(config.timeout_secs)?,
            api_url,
            model: config.model.clone(),
            timeout_secs: config.timeout_secs,
        })
    }
}

#[async_trait]
impl SqlGenerator for OllamaProvider {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        info!("Sending request to Ollama with model: {}", self.model);
        debug!("API URL: {}", self.api_url);

        let request = OllamaRequest {
            model: self.model.clone(),
            system: SQL_GENERATION_SYSTEM_PROMPT.clone(),
            prompt: prompt.to_string(),
            format: sql_response_schema(),
            stream: false, // Explicitly disable streaming
            options: OllamaOptions { temperature: 0.1 },
        };

        let response = self
            .client
            .post(&self.api_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::from_transport(e, self.timeout_secs))?;

        if !response.status().is_success() {
            return Err(status_error("Ollama", response).await);
        }

        // Get the raw text response first for diagnostics
        let response_text = response
            .text()
            .await
            .map_err(|e| LlmError::ResponseError(format!("Failed to read response body: {}", e)))?;

        let ollama_response = serde_json::from_str::<OllamaResponse>(&response_text).map_err(|e| {
            error!("Failed to parse Ollama response: {} - Response was: {}", e, response_text);
            LlmError::ResponseError(format!(
                "Failed to parse Ollama response: {} - Response was: {}",
                e, response_text
            ))
        })?;

        debug!("Raw response from Ollama: {}", ollama_response.response);
        Ok(ollama_response.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn config(api_url: String) -> LlmConfig {
        LlmConfig {
            backend: "ollama".to_string(),
            model: "sqlcoder".to_string(),
            api_key: None,
            api_url: Some(api_url),
            timeout_secs: 600,
        }
    }

    #[tokio::test]
    async fn test_generate_returns_response_field() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/generate")
            .match_body(Matcher::PartialJson(json!({
                "model": "sqlcoder",
                "prompt": "list airports in Texas",
                "stream": false,
                "format": { "required": ["sql"] }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "model": "sqlcoder",
                    "response": "{\"sql\": \"SELECT * FROM airports WHERE state = 'TX'\"}",
                    "done": true
                })
                .to_string(),
            )
            .create_async()
            .await;

        let provider = OllamaProvider::new(&config(format!("{}/api/generate", server.url()))).unwrap();
        let text = provider.generate("list airports in Texas").await.unwrap();

        assert_eq!(text, "{\"sql\": \"SELECT * FROM airports WHERE state = 'TX'\"}");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_malformed_body_is_response_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/generate")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let provider = OllamaProvider::new(&config(format!("{}/api/generate", server.url()))).unwrap();
        assert!(matches!(
            provider.generate("hello").await,
            Err(LlmError::ResponseError(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_connection_error() {
        // Port 9 (discard) is closed on test hosts
        let provider = OllamaProvider::new(&config("http://127.0.0.1:9/api/generate".to_string())).unwrap();
        assert!(matches!(
            provider.generate("hello").await,
            Err(LlmError::ConnectionError(_))
        ));
    }
}
