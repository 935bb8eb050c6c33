//! FilterSpec: the validated, per-request description of what a caller wants
//! filtered and which page they want back.
//!
//! Raw query strings are parsed here once; everything downstream works on
//! typed values. Free-text fields keep the caller's (trimmed) input; length
//! gating happens in [`FilterSpec::applied`] so a short value behaves exactly
//! like an absent one.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::{MatchingConfig, TextGates};
use crate::errors::AppError;
use crate::models::VerificationStatus;

// ────────────────────────────────────────────────────────────────────────────
// Raw query shape
// ────────────────────────────────────────────────────────────────────────────

/// Query parameters shared by every list endpoint. Everything arrives as text
/// so malformed values become a 400 with our own error body.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub name_filter: Option<String>,
    pub email_filter: Option<String>,
    pub phone_filter: Option<String>,
    pub experience_filter: Option<String>,
    pub availability_filter: Option<String>,
    pub weekend_availability_filter: Option<String>,
    pub city_filter: Option<String>,
    pub province_filter: Option<String>,
    pub status: Option<String>,
    pub created_from: Option<String>,
    pub created_to: Option<String>,
    pub only_available: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Availability {
    #[serde(rename = "Full-Time")]
    FullTime,
    #[serde(rename = "Part-Time")]
    PartTime,
}

impl Availability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Availability::FullTime => "Full-Time",
            Availability::PartTime => "Part-Time",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// FilterSpec
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    pub search: Option<String>,
    pub name_filter: Option<String>,
    pub email_filter: Option<String>,
    pub phone_filter: Option<String>,
    pub experience_filter: Option<String>,
    pub availability_filter: Option<Availability>,
    pub weekend_availability_filter: Option<bool>,
    pub city_filter: Option<String>,
    pub province_filter: Option<String>,
    pub status: Option<VerificationStatus>,
    pub created_from: Option<NaiveDate>,
    pub created_to: Option<NaiveDate>,
    pub only_available: bool,
    pub page: u32,
    pub limit: u32,
}

/// The filters that actually take effect after length gating.
/// Echoed back to the caller and fed to the predicate compiler.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability_filter: Option<Availability>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekend_availability_filter: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city_filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province_filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<VerificationStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_from: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_to: Option<NaiveDate>,
    pub only_available: bool,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            search: None,
            name_filter: None,
            email_filter: None,
            phone_filter: None,
            experience_filter: None,
            availability_filter: None,
            weekend_availability_filter: None,
            city_filter: None,
            province_filter: None,
            status: None,
            created_from: None,
            created_to: None,
            only_available: false,
            page: 1,
            limit: MatchingConfig::default().default_page_limit,
        }
    }
}

impl FilterSpec {
    /// Validates raw query parameters. Shape errors become `AppError::Validation`.
    pub fn from_query(query: &ListQuery, config: &MatchingConfig) -> Result<Self, AppError> {
        let page = parse_positive("page", query.page.as_deref(), 1, None)?;
        let limit = parse_positive(
            "limit",
            query.limit.as_deref(),
            config.default_page_limit,
            config.max_page_limit,
        )?;

        let availability_filter = match non_blank(query.availability_filter.as_deref()) {
            None => None,
            Some(raw) => Some(parse_availability(&raw)?),
        };

        let status = match non_blank(query.status.as_deref()) {
            None => None,
            Some(raw) => Some(raw.parse::<VerificationStatus>().map_err(AppError::Validation)?),
        };

        let created_from = parse_date("createdFrom", query.created_from.as_deref())?;
        let created_to = parse_date("createdTo", query.created_to.as_deref())?;
        if let (Some(from), Some(to)) = (created_from, created_to) {
            if from > to {
                return Err(AppError::Validation(format!(
                    "createdFrom ({from}) must not be after createdTo ({to})"
                )));
            }
        }

        Ok(FilterSpec {
            search: non_blank(query.search.as_deref()),
            name_filter: non_blank(query.name_filter.as_deref()),
            email_filter: non_blank(query.email_filter.as_deref()),
            phone_filter: non_blank(query.phone_filter.as_deref()),
            experience_filter: non_blank(query.experience_filter.as_deref()),
            availability_filter,
            weekend_availability_filter: parse_bool(
                "weekendAvailabilityFilter",
                query.weekend_availability_filter.as_deref(),
            )?,
            city_filter: non_blank(query.city_filter.as_deref()),
            province_filter: non_blank(query.province_filter.as_deref()),
            status,
            created_from,
            created_to,
            only_available: parse_bool("onlyAvailable", query.only_available.as_deref())?
                .unwrap_or(false),
            page,
            limit,
        })
    }

    /// Drops text filters shorter than their gate; everything else passes through.
    pub fn applied(&self, gates: &TextGates) -> AppliedFilters {
        let search_gate = |v: &Option<String>| gates.admit(v.as_deref(), gates.search_min_chars);
        let location_gate =
            |v: &Option<String>| gates.admit(v.as_deref(), gates.location_min_chars);

        AppliedFilters {
            search: search_gate(&self.search),
            name_filter: search_gate(&self.name_filter),
            email_filter: search_gate(&self.email_filter),
            phone_filter: search_gate(&self.phone_filter),
            experience_filter: self.experience_filter.clone(),
            availability_filter: self.availability_filter,
            weekend_availability_filter: self.weekend_availability_filter,
            city_filter: location_gate(&self.city_filter),
            province_filter: location_gate(&self.province_filter),
            status: self.status,
            created_from: self.created_from,
            created_to: self.created_to,
            only_available: self.only_available,
        }
    }
}

impl TextGates {
    /// `Some(value)` only when the trimmed value has at least `min_chars` characters.
    pub fn admit(&self, value: Option<&str>, min_chars: usize) -> Option<String> {
        value
            .map(str::trim)
            .filter(|v| !v.is_empty() && v.chars().count() >= min_chars)
            .map(str::to_string)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Parsing helpers
// ────────────────────────────────────────────────────────────────────────────

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn parse_positive(
    name: &str,
    raw: Option<&str>,
    default: u32,
    max: Option<u32>,
) -> Result<u32, AppError> {
    let Some(raw) = non_blank(raw) else {
        return Ok(default);
    };

    let value: i64 = raw
        .parse()
        .map_err(|_| AppError::Validation(format!("{name} must be an integer (got '{raw}')")))?;

    if value < 1 {
        return Err(AppError::Validation(format!(
            "{name} must be a positive integer (got {value})"
        )));
    }
    if let Some(max) = max {
        if value > i64::from(max) {
            return Err(AppError::Validation(format!(
                "{name} must be between 1 and {max}"
            )));
        }
    }

    u32::try_from(value)
        .map_err(|_| AppError::Validation(format!("{name} is out of range (got {value})")))
}

fn parse_bool(name: &str, raw: Option<&str>) -> Result<Option<bool>, AppError> {
    match non_blank(raw).map(|v| v.to_ascii_lowercase()).as_deref() {
        None => Ok(None),
        Some("true") => Ok(Some(true)),
        Some("false") => Ok(Some(false)),
        Some(other) => Err(AppError::Validation(format!(
            "{name} must be 'true' or 'false' (got '{other}')"
        ))),
    }
}

fn parse_availability(raw: &str) -> Result<Availability, AppError> {
    match raw.to_ascii_lowercase().as_str() {
        "full-time" => Ok(Availability::FullTime),
        "part-time" => Ok(Availability::PartTime),
        _ => Err(AppError::Validation(format!(
            "availabilityFilter must be 'Full-Time' or 'Part-Time' (got '{raw}')"
        ))),
    }
}

fn parse_date(name: &str, raw: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    match non_blank(raw) {
        None => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| AppError::Validation(format!("{name} must be YYYY-MM-DD (got '{raw}')"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(query: ListQuery) -> Result<FilterSpec, AppError> {
        FilterSpec::from_query(&query, &MatchingConfig::default())
    }

    #[test]
    fn test_defaults_when_query_is_empty() {
        let spec = parse(ListQuery::default()).unwrap();
        assert_eq!(spec.page, 1);
        assert_eq!(spec.limit, 10);
        assert!(!spec.only_available);
        assert_eq!(spec, FilterSpec::default());
    }

    #[test]
    fn test_non_positive_page_is_rejected() {
        for bad in ["0", "-3"] {
            let err = parse(ListQuery {
                page: Some(bad.to_string()),
                ..ListQuery::default()
            })
            .unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "page={bad}");
        }
    }

    #[test]
    fn test_non_numeric_limit_is_rejected() {
        let err = parse(ListQuery {
            limit: Some("ten".to_string()),
            ..ListQuery::default()
        })
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_large_limit_is_accepted_by_default() {
        let spec = parse(ListQuery {
            limit: Some("101".to_string()),
            ..ListQuery::default()
        })
        .unwrap();
        assert_eq!(spec.limit, 101);
    }

    #[test]
    fn test_limit_above_configured_ceiling_is_rejected() {
        let config = MatchingConfig {
            max_page_limit: Some(100),
            ..MatchingConfig::default()
        };
        let query = ListQuery {
            limit: Some("101".to_string()),
            ..ListQuery::default()
        };
        let err = FilterSpec::from_query(&query, &config).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_availability_must_be_known_value() {
        let ok = parse(ListQuery {
            availability_filter: Some("part-time".to_string()),
            ..ListQuery::default()
        })
        .unwrap();
        assert_eq!(ok.availability_filter, Some(Availability::PartTime));

        assert!(parse(ListQuery {
            availability_filter: Some("Weekends".to_string()),
            ..ListQuery::default()
        })
        .is_err());
    }

    #[test]
    fn test_boolean_flags_parse_strictly() {
        let spec = parse(ListQuery {
            weekend_availability_filter: Some("TRUE".to_string()),
            only_available: Some("false".to_string()),
            ..ListQuery::default()
        })
        .unwrap();
        assert_eq!(spec.weekend_availability_filter, Some(true));
        assert!(!spec.only_available);

        assert!(parse(ListQuery {
            only_available: Some("yes".to_string()),
            ..ListQuery::default()
        })
        .is_err());
    }

    #[test]
    fn test_inverted_date_range_is_rejected() {
        let err = parse(ListQuery {
            created_from: Some("2024-05-02".to_string()),
            created_to: Some("2024-05-01".to_string()),
            ..ListQuery::default()
        })
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_short_text_filters_are_not_applied() {
        let spec = parse(ListQuery {
            search: Some("ab".to_string()),
            name_filter: Some("  jo ".to_string()),
            city_filter: Some("T".to_string()),
            province_filter: Some("ON".to_string()),
            ..ListQuery::default()
        })
        .unwrap();

        let applied = spec.applied(&TextGates::default());
        assert_eq!(applied.search, None);
        assert_eq!(applied.name_filter, None);
        assert_eq!(applied.city_filter, None);
        assert_eq!(applied.province_filter.as_deref(), Some("ON"));
    }

    #[test]
    fn test_gate_counts_characters_not_bytes() {
        let gates = TextGates::default();
        assert_eq!(gates.admit(Some("Zoë"), 3).as_deref(), Some("Zoë"));
        assert_eq!(gates.admit(Some("ë "), 2), None);
    }

    #[test]
    fn test_applied_filters_echo_skips_absent_fields() {
        let spec = FilterSpec {
            experience_filter: Some("Forklift".to_string()),
            ..FilterSpec::default()
        };
        let echo = serde_json::to_value(spec.applied(&TextGates::default())).unwrap();
        assert_eq!(
            echo,
            serde_json::json!({ "experienceFilter": "Forklift", "onlyAvailable": false })
        );
    }
}
