use std::sync::Arc;

use sqlx::PgPool;

use crate::llm_client::ChatCompletion;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Feedback model. `LlmClient` in production, scripted backends in tests.
    pub llm: Arc<dyn ChatCompletion>,
}
