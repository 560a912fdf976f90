use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

// The response object every provider is asked to produce
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedSql {
    pub sql: String,
}

/// JSON Schema for [`GeneratedSql`], as accepted by OpenAI-compatible and
/// Ollama structured outputs.
pub fn sql_response_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "sql": { "type": "string" }
        },
        "required": ["sql"],
        "additionalProperties": false
    })
}

/// The same shape in the OpenAPI subset Gemini's `responseSchema` expects.
pub fn gemini_response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "sql": { "type": "STRING" }
        },
        "required": ["sql"]
    })
}
