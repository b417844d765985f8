use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::embedder::Embedder;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Pluggable embedder. Production: `HttpEmbedder`; tests substitute
    /// fixed-vector doubles through the same trait.
    pub embedder: Arc<dyn Embedder>,
    /// Retained for handlers that need runtime settings; nothing reads it
    /// after startup today.
    #[allow(dead_code)]
    pub config: Config,
}
