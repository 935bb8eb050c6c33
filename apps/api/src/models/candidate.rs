use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::profile::JobseekerProfile;

/// A jobseeker considered for a specific position.
///
/// `similarity_score` is written by the external ranking service; higher is a
/// better fit. `is_available` is false when the jobseeker already holds an
/// active assignment elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Candidate {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub profile: JobseekerProfile,
    pub similarity_score: f64,
    pub is_available: bool,
}

#[cfg(test)]
pub(crate) fn sample_candidate(first: &str, score: f64, is_available: bool) -> Candidate {
    Candidate {
        profile: crate::models::profile::sample_profile(first, "Tester"),
        similarity_score: score,
        is_available,
    }
}
