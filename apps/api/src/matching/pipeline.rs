//! Candidate matching: orchestrates the full pipeline for one position.
//!
//! Flow: compile FilterSpec → fetch storage-filtered superset → refine with
//! in-process rules → rank by similarity → paginate on the filtered count.

use tracing::info;
use uuid::Uuid;

use crate::config::MatchingConfig;
use crate::errors::AppError;
use crate::filtering::{compile, paginate, AppliedFilters, FilterSpec, Page};
use crate::matching::ranker::{rank, refine, RankedResult};
use crate::matching::retriever::{self, CandidateStore};

#[derive(Debug, Clone)]
pub struct MatchOutcome {
    pub page: Page<RankedResult>,
    pub applied: AppliedFilters,
    pub truncated: bool,
}

pub async fn match_candidates(
    store: &dyn CandidateStore,
    position_id: Uuid,
    spec: &FilterSpec,
    config: &MatchingConfig,
) -> Result<MatchOutcome, AppError> {
    let compiled = compile(spec, &config.gates);

    let retrieved =
        retriever::fetch(store, position_id, &compiled.storage, config.fetch_cap).await?;

    let refined = refine(retrieved.candidates, &compiled.in_process);
    let ranked = rank(refined);
    let page = paginate(ranked, spec.page, spec.limit, retrieved.total);

    info!(
        %position_id,
        total = page.pagination.total,
        total_filtered = page.pagination.total_filtered,
        page = page.pagination.page,
        returned = page.items.len(),
        filtered = !compiled.is_unfiltered(),
        "Matched candidates"
    );

    Ok(MatchOutcome {
        page,
        applied: compiled.applied,
        truncated: retrieved.truncated,
    })
}
