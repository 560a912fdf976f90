use crate::config::LlmConfig;
use crate::llm::models::gemini_response_schema;
use crate::llm::prompts::SQL_GENERATION_SYSTEM_PROMPT;
use crate::llm::providers::{http_client, status_error};
use crate::llm::{LlmError, SqlGenerator};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com";

/// Google Gemini `generateContent` with a declared response schema.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    timeout_secs: u64,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    system_instruction: Content,
    generation_config: GenerationConfig,
}

#[derive(Serialize, Debug)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Serialize, Debug)]
struct Part {
    text: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: Value,
}

#[derive(Deserialize, Debug)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize, Debug)]
struct CandidatePart {
    text: Option<String>,
}

impl GeminiProvider {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = config.api_key.clone().filter(|key| !key.is_empty()).ok_or_else(|| {
            LlmError::ConfigError("API key is required for the Gemini provider".to_string())
        })?;

        let api_url = config
            .api_url
            .clone()
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Ok(Self {
            client: http_client(config.timeout_secs)?,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            timeout_secs: config.timeout_secs,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.api_url, self.model)
    }

    fn build_request(&self, prompt: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: SQL_GENERATION_SYSTEM_PROMPT.clone(),
                }],
            },
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: gemini_response_schema(),
            },
        }
    }
}

#[async_trait]
impl SqlGenerator for GeminiProvider {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        info!("Sending request to Gemini with model: {}", self.model);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&self.build_request(prompt))
            .send()
            .await
            .map_err(|e| LlmError::from_transport(e, self.timeout_secs))?;

        if !response.status().is_success() {
            return Err(status_error("Gemini", response).await);
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| LlmError::ResponseError(format!("Failed to parse Gemini response: {}", e)))?;

        let text = body
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<String>()
            })
            .filter(|text| !text.is_empty())
            .ok_or_else(|| LlmError::ResponseError("No candidates in Gemini response".to_string()))?;

        debug!("Raw response from Gemini: {}", text);
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn config(api_url: String) -> LlmConfig {
        LlmConfig {
            backend: "gemini".to_string(),
            model: "gemini-2.0-flash".to_string(),
            api_key: Some("test-key".to_string()),
            api_url: Some(api_url),
            timeout_secs: 600,
        }
    }

    #[test]
    fn test_requires_api_key() {
        let mut config = config(DEFAULT_API_URL.to_string());
        config.api_key = None;
        assert!(matches!(
            GeminiProvider::new(&config),
            Err(LlmError::ConfigError(_))
        ));
    }

    #[tokio::test]
    async fn test_generate_sends_schema_and_returns_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1beta/models/gemini-2.0-flash:generateContent")
            .match_header("x-goog-api-key", "test-key")
            .match_body(Matcher::PartialJson(json!({
                "contents": [{ "role": "user", "parts": [{ "text": "how many airlines?" }] }],
                "generationConfig": {
                    "responseMimeType": "application/json",
                    "responseSchema": { "required": ["sql"] }
                }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "candidates": [{
                        "content": {
                            "role": "model",
                            "parts": [{ "text": "{\"sql\": \"SELECT COUNT(*) FROM airlines\"}" }]
                        },
                        "finishReason": "STOP"
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let provider = GeminiProvider::new(&config(server.url())).unwrap();
        let text = provider.generate("how many airlines?").await.unwrap();

        assert_eq!(text, "{\"sql\": \"SELECT COUNT(*) FROM airlines\"}");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_status_is_response_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1beta/models/gemini-2.0-flash:generateContent")
            .with_status(429)
            .with_body("quota exceeded")
            .create_async()
            .await;

        let provider = GeminiProvider::new(&config(server.url())).unwrap();
        let err = provider.generate("hello").await.unwrap_err();

        match err {
            LlmError::ResponseError(message) => {
                assert!(message.contains("429"));
                assert!(message.contains("quota exceeded"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_candidates_is_response_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1beta/models/gemini-2.0-flash:generateContent")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"candidates": []}"#)
            .create_async()
            .await;

        let provider = GeminiProvider::new(&config(server.url())).unwrap();
        assert!(matches!(
            provider.generate("hello").await,
            Err(LlmError::ResponseError(_))
        ));
    }
}
