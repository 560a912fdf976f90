pub mod gemini;
pub mod ollama;
pub mod remote;

use crate::llm::LlmError;
use std::time::Duration;

/// Builds the HTTP client shared by every provider call, bounded by the
/// configured per-call timeout.
pub(crate) fn http_client(timeout_secs: u64) -> Result<reqwest::Client, LlmError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| LlmError::ConnectionError(e.to_string()))
}

/// Turns a non-success response into a `ResponseError` carrying the body.
pub(crate) async fn status_error(provider: &str, response: reqwest::Response) -> LlmError {
    let status = response.status();
    let error_body = match response.text().await {
        Ok(body) if !body.is_empty() => format!(" - Response body: {}", body),
        _ => String::new(),
    };

    tracing::error!("{} API responded with status code: {}{}", provider, status, error_body);
    LlmError::ResponseError(format!(
        "{} API responded with status code: {}{}",
        provider, status, error_body
    ))
}
