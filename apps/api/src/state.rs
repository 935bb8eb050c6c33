use std::sync::Arc;

use crate::config::Config;
use crate::matching::CandidateStore;
use crate::profiles::ProfileStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Position matching storage. Default: PgCandidateStore.
    pub candidates: Arc<dyn CandidateStore>,
    /// Jobseeker profile storage. Default: PgProfileStore.
    pub profiles: Arc<dyn ProfileStore>,
}
