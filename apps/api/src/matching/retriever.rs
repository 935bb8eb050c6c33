//! Candidate retrieval: one storage round-trip per request.
//!
//! The store applies only storage-side rules and returns at most `cap` rows,
//! best similarity first. A result landing exactly on the cap means storage
//! filters were too loose to see everything; it is logged and flagged, never
//! silently treated as complete.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::filtering::FilterRule;
use crate::filtering::sql::push_storage_rules;
use crate::models::profile::PROFILE_COLUMNS;
use crate::models::Candidate;

// ────────────────────────────────────────────────────────────────────────────
// Storage contract
// ────────────────────────────────────────────────────────────────────────────

/// Storage collaborator for position matching.
///
/// Carried in `AppState` as `Arc<dyn CandidateStore>`. Implementations return
/// candidates ordered by similarity (descending) with a deterministic
/// tie-break, and surface faults as `AppError::Retrieval` without retrying.
#[async_trait]
pub trait CandidateStore: Send + Sync {
    async fn position_exists(&self, position_id: Uuid) -> Result<bool, AppError>;

    /// Number of scored candidates for the position before any filter.
    async fn count_candidates(&self, position_id: Uuid) -> Result<usize, AppError>;

    async fn fetch_candidates(
        &self,
        position_id: Uuid,
        storage_rules: &[FilterRule],
        cap: usize,
    ) -> Result<Vec<Candidate>, AppError> {
        let mut qb = candidate_query(position_id, storage_rules, cap)?;
        Ok(qb
            .build_query_as::<Candidate>()
            .fetch_all(&self.pool)
            .await?)
    }
}

/// Scored candidates for one position, best first. NaN scores sort after
/// every real score (Postgres would otherwise put them first under DESC) so
/// they never crowd real matches out of the cap.
fn candidate_query(
    position_id: Uuid,
    storage_rules: &[FilterRule],
    cap: usize,
) -> Result<QueryBuilder<'static, Postgres>, AppError> {
    let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
    qb.push(PROFILE_COLUMNS).push(
        r#",
            s.similarity_score,
            NOT EXISTS (
                SELECT 1 FROM assignments a
                WHERE a.jobseeker_id = j.id AND a.ended_at IS NULL
            ) AS is_available
        FROM position_candidate_scores s
        JOIN jobseeker_profiles j ON j.id = s.jobseeker_id
        WHERE j.deleted_at IS NULL AND s.position_id = "#,
    );
    qb.push_bind(position_id);

    push_storage_rules(&mut qb, storage_rules)?;

    qb.push(
        " ORDER BY (s.similarity_score = 'NaN') ASC, s.similarity_score DESC, \
         j.created_at ASC, j.id ASC LIMIT ",
    )
    .push_bind(i64::try_from(cap).unwrap_or(i64::MAX));

    Ok(qb)
}
