use tracing::{info, warn};

use crate::config::MatchingConfig;
use crate::errors::AppError;
use crate::filtering::{compile, paginate, AppliedFilters, FilterSpec, Page};
use crate::matching::ranker::refine;
use crate::models::JobseekerProfile;
use crate::profiles::store::ProfileStore;

#[derive(Debug, Clone)]
pub struct ProfileListing {
    pub page: Page<JobseekerProfile>,
    pub applied: AppliedFilters,
    pub truncated: bool,
}

/// Lists jobseeker profiles through the shared filter engine, newest first.
pub async fn list_profiles(
    store: &dyn ProfileStore,
    spec: &FilterSpec,
    config: &MatchingConfig,
) -> Result<ProfileListing, AppError> {
    if spec.only_available {
        return Err(AppError::Validation(
            "onlyAvailable applies only when matching candidates to a position".to_string(),
        ));
    }

    let compiled = compile(spec, &config.gates);
    let total = store.count_profiles().await?;
    let rows = store
        .list_profiles(&compiled.storage, config.fetch_cap)
        .await?;

    let truncated = rows.len() >= config.fetch_cap;
    if truncated {
        warn!(
            cap = config.fetch_cap,
            "Profile listing reached the fetch cap; results may be incomplete"
        );
    }

    let refined = refine(rows, &compiled.in_process);
    let page = paginate(refined, spec.page, spec.limit, total);

    info!(
        total = page.pagination.total,
        total_filtered = page.pagination.total_filtered,
        page = page.pagination.page,
        "Listed profiles"
    );

    Ok(ProfileListing {
        page,
        applied: compiled.applied,
        truncated,
    })
}
