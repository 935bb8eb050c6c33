//! Profile verification: status transitions plus one-time employee-code issue.
//!
//! Any status may move to any other; the only guard is that `rejected`
//! needs a non-empty reason. Code assignment is gated on "profile has no code
//! yet", not on the edge taken, and a code once assigned is never removed.
//!
//! Allocation is a compare-and-set loop against storage: read existing codes,
//! pick the next one, write it only if the profile still has none. A
//! uniqueness collision re-runs just that step, up to a configured bound.

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::VerificationStatus;
use crate::profiles::employee_code::EmployeeCodeSequencer;
use crate::profiles::store::{CodeAssignment, ProfileStore};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationOutcome {
    pub profile_id: Uuid,
    pub previous_status: Option<VerificationStatus>,
    pub status: VerificationStatus,
    pub employee_code: Option<String>,
    /// True only when this call issued the code.
    pub code_assigned: bool,
}

/// Checks a transition and returns the reason to persist (trimmed, rejected only).
pub fn validate_transition(
    to: VerificationStatus,
    reason: Option<&str>,
) -> Result<Option<String>, AppError> {
    let reason = reason.map(str::trim).filter(|r| !r.is_empty());
    match to {
        VerificationStatus::Rejected => match reason {
            Some(reason) => Ok(Some(reason.to_string())),
            None => Err(AppError::Validation(
                "A non-empty reason is required to reject a profile".to_string(),
            )),
        },
        VerificationStatus::Pending | VerificationStatus::Verified => Ok(None),
    }
}

/// Moves a profile to `target`, issuing an employee code on first verification.
pub async fn transition_profile(
    store: &dyn ProfileStore,
    sequencer: &EmployeeCodeSequencer,
    max_attempts: u32,
    profile_id: Uuid,
    target: VerificationStatus,
    reason: Option<&str>,
) -> Result<VerificationOutcome, AppError> {
    let profile = store
        .get_profile(profile_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {profile_id} not found")))?;

    let previous_status = profile.status();
    if previous_status.is_none() {
        warn!(
            %profile_id,
            stored = %profile.verification_status,
            "Profile has an unrecognised verification status"
        );
    }

    let reason = validate_transition(target, reason)?;
    store
        .set_verification_status(profile_id, target, reason.as_deref())
        .await?;

    info!(
        %profile_id,
        from = previous_status.map(|s| s.as_str()).unwrap_or("unknown"),
        to = target.as_str(),
        "Profile verification status changed"
    );

    let mut employee_code = profile.employee_code;
    let mut code_assigned = false;

    if target == VerificationStatus::Verified && employee_code.is_none() {
        match allocate_employee_code(store, sequencer, max_attempts, profile_id).await? {
            Some(code) => {
                employee_code = Some(code);
                code_assigned = true;
            }
            None => {
                // Someone else assigned a code between our read and write.
                employee_code = store
                    .get_profile(profile_id)
                    .await?
                    .and_then(|p| p.employee_code);
            }
        }
    }

    Ok(VerificationOutcome {
        profile_id,
        previous_status,
        status: target,
        employee_code,
        code_assigned,
    })
}

/// Issues the next employee code to `profile_id`.
///
/// Returns `Ok(None)` when the profile turned out to already have a code.
/// Fails with `SequencingConflict` once `max_attempts` writes have collided.
pub async fn allocate_employee_code(
    store: &dyn ProfileStore,
    sequencer: &EmployeeCodeSequencer,
    max_attempts: u32,
    profile_id: Uuid,
) -> Result<Option<String>, AppError> {
    let max_attempts = max_attempts.max(1);

    for attempt in 1..=max_attempts {
        let existing = store.employee_codes(sequencer.prefix()).await?;
        let code = sequencer.next_code(&existing);

        match store.assign_employee_code(profile_id, &code).await {
            Ok(CodeAssignment::Assigned) => {
                info!(%profile_id, %code, attempt, "Assigned employee code");
                return Ok(Some(code));
            }
            Ok(CodeAssignment::AlreadyAssigned) => return Ok(None),
            Err(AppError::SequencingConflict { .. }) => {
                warn!(%profile_id, %code, attempt, max_attempts, "Employee code taken concurrently; retrying");
            }
            Err(e) => return Err(e),
        }
    }

    Err(AppError::SequencingConflict {
        attempts: max_attempts,
    })
}
