use crate::config::LlmConfig;
use crate::llm::models::sql_response_schema;
use crate::llm::prompts::SQL_GENERATION_SYSTEM_PROMPT;
use crate::llm::providers::{http_client, status_error};
use crate::llm::{LlmError, SqlGenerator};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

/// OpenAI-compatible chat completions endpoint.
pub struct RemoteLlmProvider {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    timeout_secs: u64,
}

#[derive(Serialize)]
struct PromptRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
    max_tokens: usize,
    response_format: Value,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct PromptResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl RemoteLlmProvider {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_url = config.api_url.clone().ok_or_else(|| {
            LlmError::ConfigError("API URL is required for remote LLM provider".to_string())
        })?;

        let api_key = config.api_key.clone().ok_or_else(|| {
            LlmError::ConfigError("API key is required for remote LLM provider".to_string())
        })?;

        Ok(Self {
            client: http_client(config.timeout_secs)?,
            api_url,
            api_key,
            model: config.model.clone(),
            timeout_secs: config.timeout_secs,
        })
    }

    fn build_request(&self, prompt: &str) -> PromptRequest {
        PromptRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: SQL_GENERATION_SYSTEM_PROMPT.clone(),
                },
                Message {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            temperature: 0.1,
            max_tokens: 2000,
            response_format: json!({
                "type": "json_schema",
                "json_schema": {
                    "name": "sql_query",
                    "strict": true,
                    "schema": sql_response_schema()
                }
            }),
        }
    }
}

#[async_trait]
impl SqlGenerator for RemoteLlmProvider {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        info!("Sending request to remote LLM with model: {}", self.model);

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&self.build_request(prompt))
            .send()
            .await
            .map_err(|e| LlmError::from_transport(e, self.timeout_secs))?;

        if !response.status().is_success() {
            return Err(status_error("Remote LLM", response).await);
        }

        let prompt_response: PromptResponse = response
            .json()
            .await
            .map_err(|e| LlmError::ResponseError(e.to_string()))?;

        prompt_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| LlmError::ResponseError("No choices in response".to_string()))
    }
}
