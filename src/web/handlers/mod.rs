pub mod api;
pub mod ui;

use crate::assistant::OrchestratorError;
use crate::db::executor::Row;
use crate::web::state::AppState;
use axum::http::StatusCode;
use serde::Serialize;
use tracing::info;

pub const NO_QUERY_MESSAGE: &str = "No query entered.";
pub const NO_RESULTS_MESSAGE: &str = "No results found for this query.";

/// What a chat question resolves to, shared by the HTML and JSON surfaces.
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub text: String,
    pub sql: String,
    pub results: Vec<Row>,
    pub error_message: Option<String>,
}

pub(crate) async fn answer(state: &AppState, text: &str) -> (StatusCode, ChatResponse) {
    if text.trim().is_empty() {
        return (
            StatusCode::OK,
            ChatResponse {
                text: text.to_string(),
                sql: NO_QUERY_MESSAGE.to_string(),
                results: Vec::new(),
                error_message: None,
            },
        );
    }

    match state.orchestrator.run(text).await {
        Ok(outcome) if outcome.rows.is_empty() => {
            info!("Query returned no rows after {} attempt(s)", outcome.attempts);
            (
                StatusCode::OK,
                ChatResponse {
                    text: text.to_string(),
                    sql: outcome.sql,
                    results: Vec::new(),
                    error_message: Some(NO_RESULTS_MESSAGE.to_string()),
                },
            )
        }
        Ok(outcome) => (
            StatusCode::OK,
            ChatResponse {
                text: text.to_string(),
                sql: format!("{};", outcome.sql),
                results: outcome.rows,
                error_message: None,
            },
        ),
        Err(e @ OrchestratorError::Exhausted { .. }) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ChatResponse {
                text: text.to_string(),
                sql: String::new(),
                results: Vec::new(),
                error_message: Some(e.to_string()),
            },
        ),
    }
}
