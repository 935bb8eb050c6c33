use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Fallback shown when a profile has neither a first nor a last name.
pub const UNKNOWN_NAME: &str = "Unknown";

/// Select list for `JobseekerProfile` over the `jobseeker_profiles j` alias.
pub const PROFILE_COLUMNS: &str = "j.id, j.first_name, j.last_name, j.email, j.mobile, j.bio, \
     j.experience, j.availability, j.weekend_availability, j.city, j.province, \
     j.verification_status, j.rejection_reason, j.employee_code, j.created_at";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Pending,
    Verified,
    Rejected,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Pending => "pending",
            VerificationStatus::Verified => "verified",
            VerificationStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VerificationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(VerificationStatus::Pending),
            "verified" => Ok(VerificationStatus::Verified),
            "rejected" => Ok(VerificationStatus::Rejected),
            other => Err(format!(
                "status must be one of pending, verified, rejected (got '{other}')"
            )),
        }
    }
}

/// A jobseeker profile as stored in `jobseeker_profiles`.
/// Read-only from the point of view of filtering and matching.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobseekerProfile {
    pub id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub mobile: Option<String>,
    pub bio: Option<String>,
    pub experience: Option<String>,
    /// `Full-Time` | `Part-Time`
    pub availability: Option<String>,
    pub weekend_availability: bool,
    pub city: Option<String>,
    pub province: Option<String>,
    pub verification_status: String,
    pub rejection_reason: Option<String>,
    pub employee_code: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl JobseekerProfile {
    /// `first last`, trimmed; `Unknown` when both parts are blank.
    pub fn display_name(&self) -> String {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();

        if parts.is_empty() {
            UNKNOWN_NAME.to_string()
        } else {
            parts.join(" ")
        }
    }

    /// Parsed verification status. Unrecognised values read as `None`.
    pub fn status(&self) -> Option<VerificationStatus> {
        self.verification_status.parse().ok()
    }
}

#[cfg(test)]
pub(crate) fn sample_profile(first: &str, last: &str) -> JobseekerProfile {
    JobseekerProfile {
        id: Uuid::new_v4(),
        first_name: Some(first.to_string()),
        last_name: Some(last.to_string()),
        email: format!(
            "{}.{}@example.com",
            first.to_lowercase(),
            last.to_lowercase()
        ),
        mobile: None,
        bio: None,
        experience: None,
        availability: None,
        weekend_availability: false,
        city: None,
        province: None,
        verification_status: "pending".to_string(),
        rejection_reason: None,
        employee_code: None,
        created_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_joins_first_and_last() {
        assert_eq!(sample_profile("Ada", "Lovelace").display_name(), "Ada Lovelace");
    }

    #[test]
    fn test_display_name_uses_single_part() {
        let mut profile = sample_profile("Ada", "Lovelace");
        profile.last_name = None;
        assert_eq!(profile.display_name(), "Ada");
    }

    #[test]
    fn test_display_name_falls_back_to_unknown() {
        let mut profile = sample_profile("x", "y");
        profile.first_name = Some("   ".to_string());
        profile.last_name = None;
        assert_eq!(profile.display_name(), UNKNOWN_NAME);
    }

    #[test]
    fn test_status_parses_case_insensitively() {
        assert_eq!(
            "Verified".parse::<VerificationStatus>(),
            Ok(VerificationStatus::Verified)
        );
        assert!("archived".parse::<VerificationStatus>().is_err());
    }

    #[test]
    fn test_unknown_stored_status_reads_as_none() {
        let mut profile = sample_profile("Ada", "Lovelace");
        profile.verification_status = "archived".to_string();
        assert_eq!(profile.status(), None);
    }
}
