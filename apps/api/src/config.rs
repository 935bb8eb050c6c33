use std::str::FromStr;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub port: u16,
    pub rust_log: String,
    pub matching: MatchingConfig,
    pub employee_codes: EmployeeCodeConfig,
}

/// Tunables for the filter / match / paginate pipeline.
#[derive(Debug, Clone)]
pub struct MatchingConfig {
    /// Upper bound on rows pulled from storage per request before in-process refinement.
    pub fetch_cap: usize,
    pub default_page_limit: u32,
    /// Optional ceiling on `limit`; unset means any positive limit is accepted.
    pub max_page_limit: Option<u32>,
    pub gates: TextGates,
}

/// Minimum trimmed lengths before a free-text filter takes effect.
/// Shorter input is treated as if the filter were absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextGates {
    /// search / name / email / phone
    pub search_min_chars: usize,
    /// city / province
    pub location_min_chars: usize,
}

#[derive(Debug, Clone)]
pub struct EmployeeCodeConfig {
    pub prefix: String,
    pub width: usize,
    pub max_allocation_attempts: u32,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            fetch_cap: 1000,
            default_page_limit: 10,
            max_page_limit: None,
            gates: TextGates::default(),
        }
    }
}

impl Default for TextGates {
    fn default() -> Self {
        Self {
            search_min_chars: 3,
            location_min_chars: 2,
        }
    }
}

impl Default for EmployeeCodeConfig {
    fn default() -> Self {
        Self {
            prefix: "GS".to_string(),
            width: 6,
            max_allocation_attempts: 5,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let matching_defaults = MatchingConfig::default();
        let code_defaults = EmployeeCodeConfig::default();

        let matching = MatchingConfig {
            fetch_cap: env_or("MATCH_FETCH_CAP", matching_defaults.fetch_cap)?,
            default_page_limit: env_or("DEFAULT_PAGE_LIMIT", matching_defaults.default_page_limit)?,
            max_page_limit: env_opt("MAX_PAGE_LIMIT")?.or(matching_defaults.max_page_limit),
            gates: TextGates {
                search_min_chars: env_or(
                    "SEARCH_MIN_CHARS",
                    matching_defaults.gates.search_min_chars,
                )?,
                location_min_chars: env_or(
                    "LOCATION_MIN_CHARS",
                    matching_defaults.gates.location_min_chars,
                )?,
            },
        };

        if matching.fetch_cap == 0 {
            anyhow::bail!("MATCH_FETCH_CAP must be at least 1");
        }
        if matching.default_page_limit == 0 {
            anyhow::bail!("DEFAULT_PAGE_LIMIT must be at least 1");
        }
        if let Some(max) = matching.max_page_limit {
            if max == 0 || matching.default_page_limit > max {
                anyhow::bail!("MAX_PAGE_LIMIT must be at least DEFAULT_PAGE_LIMIT");
            }
        }

        let employee_codes = EmployeeCodeConfig {
            prefix: std::env::var("EMPLOYEE_CODE_PREFIX").unwrap_or(code_defaults.prefix),
            width: env_or("EMPLOYEE_CODE_WIDTH", code_defaults.width)?,
            max_allocation_attempts: env_or(
                "CODE_ALLOCATION_ATTEMPTS",
                code_defaults.max_allocation_attempts,
            )?,
        };

        if employee_codes.prefix.is_empty() || employee_codes.width == 0 {
            anyhow::bail!("EMPLOYEE_CODE_PREFIX and EMPLOYEE_CODE_WIDTH must be non-empty");
        }

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            db_max_connections: env_or("DB_MAX_CONNECTIONS", 10)?,
            port: env_or("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            matching,
            employee_codes,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid {}", std::any::type_name::<T>())),
        Err(_) => Ok(default),
    }
}

fn env_opt<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("{key} must be a valid {}", std::any::type_name::<T>())),
        _ => Ok(None),
    }
}

#[cfg(test)]
impl Config {
    /// Config with production defaults and a placeholder database URL.
    pub fn for_tests() -> Self {
        Config {
            database_url: "postgres://localhost/staffing_test".to_string(),
            db_max_connections: 1,
            port: 0,
            rust_log: "debug".to_string(),
            matching: MatchingConfig::default(),
            employee_codes: EmployeeCodeConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_thresholds() {
        let gates = TextGates::default();
        assert_eq!(gates.search_min_chars, 3);
        assert_eq!(gates.location_min_chars, 2);

        let codes = EmployeeCodeConfig::default();
        assert_eq!(codes.prefix, "GS");
        assert_eq!(codes.width, 6);
    }

    #[test]
    fn test_page_limit_has_no_ceiling_by_default() {
        assert_eq!(MatchingConfig::default().max_page_limit, None);
    }

    #[test]
    fn test_env_opt_is_none_when_unset() {
        let value: Option<u32> = env_opt("STAFFING_API_TEST_UNSET_CEILING").unwrap();
        assert_eq!(value, None);
    }

    #[test]
    fn test_env_or_falls_back_when_unset() {
        let value: usize = env_or("STAFFING_API_TEST_UNSET_VARIABLE", 42).unwrap();
        assert_eq!(value, 42);
    }
}
