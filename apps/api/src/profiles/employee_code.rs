//! Employee codes: `<prefix><zero-padded integer>`, e.g. `GS000001`.
//!
//! The next code is derived from the maximum code already stored rather than
//! a separate counter, so profiles created outside this service are honoured.
//! The sequencer only computes; uniqueness is enforced by storage and a
//! conflicting write re-runs it (see `verification::allocate_employee_code`).

use tracing::warn;

use crate::config::EmployeeCodeConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeCodeSequencer {
    prefix: String,
    width: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedCode {
    Valid(u64),
    /// Carries our prefix but the suffix is not a full-width integer.
    Malformed,
    /// Belongs to a different prefix.
    Foreign,
}

/// Summary of an existing code set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeScan<'a> {
    pub max: Option<u64>,
    pub malformed: Vec<&'a str>,
}

impl CodeScan<'_> {
    /// Numeric value of the code that should be issued next.
    pub fn next_value(&self) -> u64 {
        self.max.map_or(1, |max| max.saturating_add(1))
    }
}

impl EmployeeCodeSequencer {
    pub fn new(prefix: impl Into<String>, width: usize) -> Self {
        Self {
            prefix: prefix.into(),
            width: width.max(1),
        }
    }

    pub fn from_config(config: &EmployeeCodeConfig) -> Self {
        Self::new(config.prefix.clone(), config.width)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn parse(&self, code: &str) -> ParsedCode {
        let Some(suffix) = code.strip_prefix(self.prefix.as_str()) else {
            return ParsedCode::Foreign;
        };
        if suffix.len() < self.width || !suffix.bytes().all(|b| b.is_ascii_digit()) {
            return ParsedCode::Malformed;
        }
        suffix
            .parse::<u64>()
            .map(ParsedCode::Valid)
            .unwrap_or(ParsedCode::Malformed)
    }

    pub fn scan<'a, S: AsRef<str>>(&self, existing: &'a [S]) -> CodeScan<'a> {
        let mut scan = CodeScan::default();
        for code in existing {
            let code = code.as_ref();
            match self.parse(code) {
                ParsedCode::Valid(n) => scan.max = Some(scan.max.map_or(n, |m| m.max(n))),
                ParsedCode::Malformed => scan.malformed.push(code),
                ParsedCode::Foreign => {}
            }
        }
        scan
    }

    /// The code after the highest well-formed one; the first code when none exist.
    /// Malformed entries are skipped with a data-quality warning, never fatal.
    pub fn next_code<S: AsRef<str>>(&self, existing: &[S]) -> String {
        let scan = self.scan(existing);
        for malformed in &scan.malformed {
            warn!(code = %malformed, "Ignoring malformed employee code");
        }
        self.format(scan.next_value())
    }

    fn format(&self, n: u64) -> String {
        format!("{}{:0width$}", self.prefix, n, width = self.width)
    }
}

impl Default for EmployeeCodeSequencer {
    fn default() -> Self {
        Self::from_config(&EmployeeCodeConfig::default())
    }
}
