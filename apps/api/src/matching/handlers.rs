//! Axum route handlers for the Matching API.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::filtering::{AppliedFilters, FilterSpec, ListQuery, PaginationState};
use crate::matching::pipeline::match_candidates;
use crate::matching::ranker::RankedResult;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateView {
    pub id: Uuid,
    pub rank: usize,
    pub name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub bio: Option<String>,
    pub experience: Option<String>,
    pub weekend_availability: bool,
    pub availability: Option<String>,
    pub similarity_score: f64,
    pub is_available: bool,
    pub status: String,
}

impl From<RankedResult> for CandidateView {
    fn from(ranked: RankedResult) -> Self {
        let RankedResult { rank, candidate } = ranked;
        let name = candidate.profile.display_name();
        let profile = candidate.profile;
        CandidateView {
            id: profile.id,
            rank,
            name,
            email: profile.email,
            phone_number: profile.mobile,
            bio: profile.bio,
            experience: profile.experience,
            weekend_availability: profile.weekend_availability,
            availability: profile.availability,
            similarity_score: candidate.similarity_score,
            is_available: candidate.is_available,
            status: profile.verification_status,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResponse {
    pub candidates: Vec<CandidateView>,
    pub pagination: PaginationState,
    pub position_id: Uuid,
    pub filters: AppliedFilters,
    /// Retrieval hit the fetch cap; tighten filters to see every match.
    pub truncated: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/positions/:position_id/candidates
///
/// Candidates for a position ranked by similarity, filtered and paginated.
pub async fn handle_match_candidates(
    State(state): State<AppState>,
    Path(position_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Json<MatchResponse>, AppError> {
    let position_id = parse_id("Position", &position_id)?;
    let spec = FilterSpec::from_query(&query, &state.config.matching)?;

    let outcome = match_candidates(
        state.candidates.as_ref(),
        position_id,
        &spec,
        &state.config.matching,
    )
    .await?;

    Ok(Json(MatchResponse {
        candidates: outcome
            .page
            .items
            .into_iter()
            .map(CandidateView::from)
            .collect(),
        pagination: outcome.page.pagination,
        position_id,
        filters: outcome.applied,
        truncated: outcome.truncated,
    }))
}

/// Ids are opaque to callers: one that is not a UUID cannot name an existing
/// record, so it reads as unknown (404) rather than as a malformed request.
pub(crate) fn parse_id(kind: &str, raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::NotFound(format!("{kind} {raw} not found")))
}
