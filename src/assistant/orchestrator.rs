use crate::assistant::prompts::correction_prompt;
use crate::assistant::sanitize::clean_generation_result;
use crate::db::executor::{ExecutionError, QueryExecutor, Row};
use crate::llm::models::GeneratedSql;
use crate::llm::{LlmError, SqlGenerator};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Generation attempts per question, the first one included.
pub const MAX_ATTEMPTS: u32 = 3;

/// Where an attempt is in its generate, parse, execute cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Generating,
    Parsing,
    Executing,
    Correcting,
}

/// Why a single attempt failed. The Display text is what the model sees in
/// the next correction prompt.
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error("Error generating SQL: {0}")]
    Generation(#[from] LlmError),
    #[error("Failed to parse LLM response: {0}")]
    ResponseShape(String),
    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

impl AttemptError {
    pub fn stage(&self) -> Stage {
        match self {
            AttemptError::Generation(_) => Stage::Generating,
            AttemptError::ResponseShape(_) => Stage::Parsing,
            AttemptError::Execution(_) => Stage::Executing,
        }
    }
}

/// A failed attempt, kept only until the next correction prompt is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptRecord {
    pub attempt: u32,
    pub sql: String,
    pub error: String,
}

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("SQL query execution failed after {attempts} attempts.")]
    Exhausted { attempts: u32, last_error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryOutcome {
    pub sql: String,
    pub rows: Vec<Row>,
    pub attempts: u32,
}

/// Drives the bounded generate, parse, execute and correct loop for one
/// question. Holds no per-question state, so one instance serves every
/// request concurrently.
pub struct Orchestrator {
    generator: Arc<dyn SqlGenerator>,
    executor: Arc<dyn QueryExecutor>,
}

impl Orchestrator {
    pub fn new(generator: Arc<dyn SqlGenerator>, executor: Arc<dyn QueryExecutor>) -> Self {
        Self {
            generator,
            executor,
        }
    }

    pub async fn run(&self, user_query: &str) -> Result<QueryOutcome, OrchestratorError> {
        info!("User query: {}", user_query);
        let mut previous: Option<AttemptRecord> = None;

        for attempt in 1..=MAX_ATTEMPTS {
            let prompt = match &previous {
                None => user_query.to_string(),
                Some(failed) => {
                    debug!(attempt, stage = ?Stage::Correcting, "Building correction prompt");
                    correction_prompt(user_query, &failed.sql, &failed.error)
                }
            };

            // Carries the last SQL forward when this attempt never produces one
            let mut sql = previous
                .as_ref()
                .map(|failed| failed.sql.clone())
                .unwrap_or_default();

            match self.attempt(attempt, &prompt, &mut sql).await {
                Ok(rows) => {
                    info!("Attempt {}: Query executed successfully ({} rows)", attempt, rows.len());
                    return Ok(QueryOutcome {
                        sql,
                        rows,
                        attempts: attempt,
                    });
                }
                Err(e) => {
                    warn!(stage = ?e.stage(), "Attempt {} failed: {}", attempt, e);
                    previous = Some(AttemptRecord {
                        attempt,
                        sql,
                        error: e.to_string(),
                    });
                }
            }
        }

        let last_error = previous.map(|failed| failed.error).unwrap_or_default();
        error!(
            "SQL query execution failed after {} attempts. Last error: {}",
            MAX_ATTEMPTS, last_error
        );
        Err(OrchestratorError::Exhausted {
            attempts: MAX_ATTEMPTS,
            last_error,
        })
    }

    async fn attempt(
        &self,
        attempt: u32,
        prompt: &str,
        sql: &mut String,
    ) -> Result<Vec<Row>, AttemptError> {
        debug!(attempt, stage = ?Stage::Generating, "Generating SQL");
        let raw = self.generator.generate(prompt).await?;

        debug!(attempt, stage = ?Stage::Parsing, "Parsing generation result");
        *sql = parse_generated_sql(&raw)?;

        debug!(attempt, stage = ?Stage::Executing, "Executing SQL: {}", sql);
        Ok(self.executor.execute(sql).await?)
    }
}

/// Sanitizes raw model output and extracts the `sql` field.
pub fn parse_generated_sql(raw: &str) -> Result<String, AttemptError> {
    let cleaned = clean_generation_result(raw);
    let parsed: GeneratedSql = serde_json::from_str(&cleaned)
        .map_err(|e| AttemptError::ResponseShape(e.to_string()))?;

    let sql = parsed.sql.trim();
    if sql.is_empty() {
        return Err(AttemptError::ResponseShape(
            "response contained an empty sql field".to_string(),
        ));
    }
    Ok(sql.to_string())
}
