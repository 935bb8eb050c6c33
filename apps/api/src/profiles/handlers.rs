//! Axum route handlers for the Profiles API.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::filtering::{AppliedFilters, FilterSpec, ListQuery, PaginationState};
use crate::matching::handlers::parse_id;
use crate::models::{JobseekerProfile, VerificationStatus};
use crate::profiles::employee_code::EmployeeCodeSequencer;
use crate::profiles::listing::list_profiles;
use crate::profiles::verification::{transition_profile, VerificationOutcome};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub bio: Option<String>,
    pub experience: Option<String>,
    pub availability: Option<String>,
    pub weekend_availability: bool,
    pub city: Option<String>,
    pub province: Option<String>,
    pub status: String,
    pub rejection_reason: Option<String>,
    pub employee_code: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<JobseekerProfile> for ProfileView {
    fn from(profile: JobseekerProfile) -> Self {
        ProfileView {
            name: profile.display_name(),
            id: profile.id,
            email: profile.email,
            phone_number: profile.mobile,
            bio: profile.bio,
            experience: profile.experience,
            availability: profile.availability,
            weekend_availability: profile.weekend_availability,
            city: profile.city,
            province: profile.province,
            status: profile.verification_status,
            rejection_reason: profile.rejection_reason,
            employee_code: profile.employee_code,
            created_at: profile.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileListResponse {
    pub profiles: Vec<ProfileView>,
    pub pagination: PaginationState,
    pub filters: AppliedFilters,
    pub truncated: bool,
}

#[derive(Debug, Deserialize)]
pub struct VerificationRequest {
    pub status: String,
    pub reason: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/profiles
pub async fn handle_list_profiles(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ProfileListResponse>, AppError> {
    let spec = FilterSpec::from_query(&query, &state.config.matching)?;
    let listing = list_profiles(state.profiles.as_ref(), &spec, &state.config.matching).await?;

    Ok(Json(ProfileListResponse {
        profiles: listing
            .page
            .items
            .into_iter()
            .map(ProfileView::from)
            .collect(),
        pagination: listing.page.pagination,
        filters: listing.applied,
        truncated: listing.truncated,
    }))
}

/// GET /api/v1/profiles/:id
pub async fn handle_get_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProfileView>, AppError> {
    let id = parse_id("Profile", &id)?;
    let profile = state
        .profiles
        .get_profile(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {id} not found")))?;
    Ok(Json(profile.into()))
}

/// PATCH /api/v1/profiles/:id/verification
///
/// Moves a profile between pending / verified / rejected. The first move to
/// verified issues an employee code.
pub async fn handle_update_verification(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<VerificationRequest>, JsonRejection>,
) -> Result<Json<VerificationOutcome>, AppError> {
    let id = parse_id("Profile", &id)?;
    let Json(request) = body.map_err(|rejection| AppError::Validation(rejection.body_text()))?;
    let target: VerificationStatus = request.status.parse().map_err(AppError::Validation)?;

    let codes = &state.config.employee_codes;
    let outcome = transition_profile(
        state.profiles.as_ref(),
        &EmployeeCodeSequencer::from_config(codes),
        codes.max_allocation_attempts,
        id,
        target,
        request.reason.as_deref(),
    )
    .await?;

    Ok(Json(outcome))
}
