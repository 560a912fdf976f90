//! The question-to-rows loop: generate SQL, clean and parse the model
//! output, execute it, and feed failures back to the model for repair.

pub mod orchestrator;
pub mod prompts;
pub mod sanitize;

pub use orchestrator::{AttemptError, AttemptRecord, Orchestrator, OrchestratorError, QueryOutcome, MAX_ATTEMPTS};
