pub mod health;

use axum::{
    routing::{get, patch},
    Router,
};

use crate::matching::handlers as matching;
use crate::profiles::handlers as profiles;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Matching API
        .route(
            "/api/v1/positions/:position_id/candidates",
            get(matching::handle_match_candidates),
        )
        // Profiles API
        .route("/api/v1/profiles", get(profiles::handle_list_profiles))
        .route("/api/v1/profiles/:id", get(profiles::handle_get_profile))
        .route(
            "/api/v1/profiles/:id/verification",
            patch(profiles::handle_update_verification),
        )
        .with_state(state)
}
