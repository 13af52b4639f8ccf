use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::analysis::session::SessionStore;
use crate::config::Config;
use crate::llm_client::CompletionService;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable completion backend. Default: `LlmClient`.
    pub llm: Arc<dyn CompletionService>,
    pub sessions: SessionStore,
    pub config: Config,
    /// Cancelled on shutdown; every completion call runs under a child token.
    pub shutdown: CancellationToken,
}
