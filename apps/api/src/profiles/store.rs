use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::errors::AppError;
use crate::filtering::FilterRule;
use crate::filtering::sql::push_storage_rules;
use crate::models::profile::PROFILE_COLUMNS;
use crate::models::{JobseekerProfile, VerificationStatus};

/// Outcome of a conditional employee-code write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeAssignment {
    Assigned,
    /// The profile already carried a code; nothing was written.
    AlreadyAssigned,
}

/// Storage collaborator for jobseeker profiles.
///
/// Carried in `AppState` as `Arc<dyn ProfileStore>`. `assign_employee_code`
/// must be a compare-and-set: it writes only when the profile has no code
/// and reports a uniqueness collision as `AppError::SequencingConflict`.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_profile(&self, id: Uuid) -> Result<Option<JobseekerProfile>, AppError>;

    async fn count_profiles(&self) -> Result<usize, AppError>;

    /// Profiles matching the storage rules, newest first, at most `cap`.
    async fn list_profiles(
        &self,
        storage_rules: &[FilterRule],
        cap: usize,
    ) -> Result<Vec<JobseekerProfile>, AppError>;

    async fn set_verification_status(
        &self,
        id: Uuid,
        status: VerificationStatus,
        reason: Option<&str>,
    ) -> Result<(), AppError>;

    /// Every stored code starting with `prefix`, including soft-deleted profiles.
    async fn employee_codes(&self, prefix: &str) -> Result<Vec<String>, AppError>;

    async fn assign_employee_code(&self, id: Uuid, code: &str)
        -> Result<CodeAssignment, AppError>;
}

pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn get_profile(&self, id: Uuid) -> Result<Option<JobseekerProfile>, AppError> {
        let sql = format!(
            "SELECT {PROFILE_COLUMNS} FROM jobseeker_profiles j \
             WHERE j.id = $1 AND j.deleted_at IS NULL"
        );
        Ok(sqlx::query_as::<_, JobseekerProfile>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn count_profiles(&self) -> Result<usize, AppError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM jobseeker_profiles WHERE deleted_at IS NULL")
                .fetch_one(&self.pool)
                .await?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    async fn list_profiles(
        &self,
        storage_rules: &[FilterRule],
        cap: usize,
    ) -> Result<Vec<JobseekerProfile>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        qb.push(PROFILE_COLUMNS)
            .push(" FROM jobseeker_profiles j WHERE j.deleted_at IS NULL");

        push_storage_rules(&mut qb, storage_rules)?;

        qb.push(" ORDER BY j.created_at DESC, j.id ASC LIMIT ")
            .push_bind(i64::try_from(cap).unwrap_or(i64::MAX));

        Ok(qb
            .build_query_as::<JobseekerProfile>()
            .fetch_all(&self.pool)
            .await?)
    }

    async fn set_verification_status(
        &self,
        id: Uuid,
        status: VerificationStatus,
        reason: Option<&str>,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE jobseeker_profiles
            SET verification_status = $1,
                rejection_reason = $2,
                updated_at = NOW()
            WHERE id = $3 AND deleted_at IS NULL
            "#,
        )
        .bind(status.as_str())
        .bind(reason)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Profile {id} not found")));
        }
        Ok(())
    }

    async fn employee_codes(&self, prefix: &str) -> Result<Vec<String>, AppError> {
        Ok(sqlx::query_scalar::<_, String>(
            r#"
            SELECT employee_code
            FROM jobseeker_profiles
            WHERE employee_code IS NOT NULL
              AND left(employee_code, length($1)) = $1
            "#,
        )
        .bind(prefix)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn assign_employee_code(
        &self,
        id: Uuid,
        code: &str,
    ) -> Result<CodeAssignment, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE jobseeker_profiles
            SET employee_code = $1, updated_at = NOW()
            WHERE id = $2 AND employee_code IS NULL
            "#,
        )
        .bind(code)
        .bind(id)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) if done.rows_affected() == 1 => Ok(CodeAssignment::Assigned),
            Ok(_) => Ok(CodeAssignment::AlreadyAssigned),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(AppError::SequencingConflict { attempts: 1 })
            }
            Err(e) => Err(e.into()),
        }
    }
}
