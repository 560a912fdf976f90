use axum::{
    extract::{Form, State},
    response::Html,
};
use minijinja::context;
use serde::Deserialize;
use std::sync::Arc;

use crate::db::executor::display_value;
use crate::web::handlers::answer;
use crate::web::state::AppState;
use crate::web::templates::render_template;

#[derive(Debug, Deserialize)]
pub struct ChatForm {
    #[serde(default)]
    pub text: String,
}

// Main UI entry point
pub async fn index_handler(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(render_template(
        &state.template_env,
        "index.html",
        context! { model => state.config.llm.model.as_str() },
    ))
}

/// Renders the answer fragment the chat page appends to the conversation.
///
/// Always 200: failures are shown inside the fragment.
pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ChatForm>,
) -> Html<String> {
    let (_, response) = answer(&state, &form.text).await;

    let columns: Vec<String> = response
        .results
        .first()
        .map(|row| row.keys().cloned().collect())
        .unwrap_or_default();
    let rows: Vec<Vec<String>> = response
        .results
        .iter()
        .map(|row| row.values().map(display_value).collect())
        .collect();

    Html(render_template(
        &state.template_env,
        "chat_response.html",
        context! {
            text => response.text,
            sql => response.sql,
            columns => columns,
            rows => rows,
            error_message => response.error_message,
        },
    ))
}
