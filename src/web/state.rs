use crate::assistant::Orchestrator;
use crate::config::AppConfig;
use crate::db::executor::QueryExecutor;
use crate::llm::SqlGenerator;
use crate::web::templates::init_templates;
use minijinja::Environment;
use std::sync::Arc;
use tracing::info;

/// Shared application state for the web server.
///
/// Nothing in here is mutated after start-up; requests only read it.
pub struct AppState {
    pub config: AppConfig,
    pub template_env: Environment<'static>,
    pub orchestrator: Orchestrator,
    pub startup_time: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        generator: Arc<dyn SqlGenerator>,
        executor: Arc<dyn QueryExecutor>,
    ) -> Result<Self, minijinja::Error> {
        let template_env = init_templates()?;
        info!("Templates loaded");

        Ok(Self {
            config,
            template_env,
            orchestrator: Orchestrator::new(generator, executor),
            startup_time: chrono::Utc::now(),
        })
    }
}
