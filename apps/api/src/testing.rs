//! In-memory store doubles for unit and router tests.
//!
//! Storage rules are evaluated with the same rule evaluator the refiner uses,
//! so these behave like the Postgres stores without a database.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::Barrier;
use uuid::Uuid;

use crate::errors::AppError;
use crate::filtering::{matches_all, FilterRule};
use crate::matching::ranker::compare_scores;
use crate::matching::CandidateStore;
use crate::models::{Candidate, JobseekerProfile, VerificationStatus};
use crate::profiles::store::{CodeAssignment, ProfileStore};

// ────────────────────────────────────────────────────────────────────────────
// Candidates
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryCandidateStore {
    positions: HashMap<Uuid, Vec<Candidate>>,
    failing: bool,
}

impl MemoryCandidateStore {
    pub fn with_position(position_id: Uuid, candidates: Vec<Candidate>) -> Self {
        let mut positions = HashMap::new();
        positions.insert(position_id, candidates);
        Self {
            positions,
            failing: false,
        }
    }

    /// Every call fails as if the connection pool timed out.
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    fn check(&self) -> Result<(), AppError> {
        if self.failing {
            Err(sqlx::Error::PoolTimedOut.into())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CandidateStore for MemoryCandidateStore {
    async fn position_exists(&self, position_id: Uuid) -> Result<bool, AppError> {
        self.check()?;
        Ok(self.positions.contains_key(&position_id))
    }

    async fn count_candidates(&self, position_id: Uuid) -> Result<usize, AppError> {
        self.check()?;
        Ok(self.positions.get(&position_id).map_or(0, Vec::len))
    }

    async fn fetch_candidates(
        &self,
        position_id: Uuid,
        storage_rules: &[FilterRule],
        cap: usize,
    ) -> Result<Vec<Candidate>, AppError> {
        self.check()?;
        let mut rows: Vec<Candidate> = self
            .positions
            .get(&position_id)
            .into_iter()
            .flatten()
            .filter(|c| matches_all(storage_rules, *c))
            .cloned()
            .collect();
        // Same order as the Postgres store: best first, NaN last.
        rows.sort_by(|a, b| compare_scores(b.similarity_score, a.similarity_score));
        rows.truncate(cap);
        Ok(rows)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Profiles
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct ProfileState {
    profiles: Vec<JobseekerProfile>,
    /// Codes taken by simulated concurrent writers.
    phantom_codes: Vec<String>,
    pending_conflicts: usize,
    /// Writes refused because another profile already holds the code.
    unique_violations: usize,
}

/// Holds the first `parties` code reads until all of them have read.
struct ReadBarrier {
    barrier: Barrier,
    parties: usize,
    arrivals: AtomicUsize,
}

#[derive(Default)]
pub struct MemoryProfileStore {
    state: Mutex<ProfileState>,
    read_barrier: Option<ReadBarrier>,
}

impl MemoryProfileStore {
    pub fn with_profiles(profiles: Vec<JobseekerProfile>) -> Self {
        Self {
            state: Mutex::new(ProfileState {
                profiles,
                ..ProfileState::default()
            }),
            read_barrier: None,
        }
    }

    /// The first `parties` calls to `employee_codes` each take their snapshot
    /// and then wait for one another, so every one of them sees the same
    /// maximum before any code is written. Later calls pass straight through.
    pub fn with_interleaved_code_reads(mut self, parties: usize) -> Self {
        self.read_barrier = Some(ReadBarrier {
            barrier: Barrier::new(parties),
            parties,
            arrivals: AtomicUsize::new(0),
        });
        self
    }

    /// Number of code writes the uniqueness constraint has refused.
    pub fn unique_violations(&self) -> usize {
        self.state.lock().unwrap().unique_violations
    }

    /// The next `n` code writes lose a race: the attempted code is taken by
    /// another writer and the write reports a uniqueness conflict.
    pub fn inject_conflicts(&self, n: usize) {
        self.state.lock().unwrap().pending_conflicts = n;
    }

    pub fn profile(&self, id: Uuid) -> Option<JobseekerProfile> {
        self.state
            .lock()
            .unwrap()
            .profiles
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn get_profile(&self, id: Uuid) -> Result<Option<JobseekerProfile>, AppError> {
        Ok(self.profile(id))
    }

    async fn count_profiles(&self) -> Result<usize, AppError> {
        Ok(self.state.lock().unwrap().profiles.len())
    }

    async fn list_profiles(
        &self,
        storage_rules: &[FilterRule],
        cap: usize,
    ) -> Result<Vec<JobseekerProfile>, AppError> {
        let state = self.state.lock().unwrap();
        let mut rows: Vec<JobseekerProfile> = state
            .profiles
            .iter()
            .filter(|p| matches_all(storage_rules, *p))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(cap);
        Ok(rows)
    }

    async fn set_verification_status(
        &self,
        id: Uuid,
        status: VerificationStatus,
        reason: Option<&str>,
    ) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        let profile = state
            .profiles
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Profile {id} not found")))?;
        profile.verification_status = status.as_str().to_string();
        profile.rejection_reason = reason.map(str::to_string);
        Ok(())
    }

    async fn employee_codes(&self, prefix: &str) -> Result<Vec<String>, AppError> {
        let codes: Vec<String> = {
            let state = self.state.lock().unwrap();
            state
                .profiles
                .iter()
                .filter_map(|p| p.employee_code.clone())
                .chain(state.phantom_codes.iter().cloned())
                .filter(|code| code.starts_with(prefix))
                .collect()
        };

        if let Some(gate) = &self.read_barrier {
            if gate.arrivals.fetch_add(1, Ordering::SeqCst) < gate.parties {
                gate.barrier.wait().await;
            }
        }
        Ok(codes)
    }

    async fn assign_employee_code(
        &self,
        id: Uuid,
        code: &str,
    ) -> Result<CodeAssignment, AppError> {
        let mut state = self.state.lock().unwrap();

        if state.pending_conflicts > 0 {
            state.pending_conflicts -= 1;
            state.phantom_codes.push(code.to_string());
            return Err(AppError::SequencingConflict { attempts: 1 });
        }

        let taken = state.phantom_codes.iter().any(|c| c == code)
            || state
                .profiles
                .iter()
                .any(|p| p.employee_code.as_deref() == Some(code));
        if taken {
            state.unique_violations += 1;
            return Err(AppError::SequencingConflict { attempts: 1 });
        }

        match state.profiles.iter_mut().find(|p| p.id == id) {
            Some(profile) if profile.employee_code.is_none() => {
                profile.employee_code = Some(code.to_string());
                Ok(CodeAssignment::Assigned)
            }
            _ => Ok(CodeAssignment::AlreadyAssigned),
        }
    }
}
