//! Filter rules: the unit the predicate compiler emits and both the storage
//! layer and the in-process refiner consume.
//!
//! Every rule declares where it runs via [`FilterRule::placement`]. Placement
//! is derived from the field catalogue below, so a rule lands storage-side
//! whenever its field has a backing column and an indexable shape.

use std::borrow::Cow;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{Candidate, JobseekerProfile};

// ────────────────────────────────────────────────────────────────────────────
// Field catalogue
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// `first_name + ' ' + last_name`; not stored as a single column.
    Name,
    Email,
    Phone,
    Bio,
    Experience,
    Availability,
    WeekendAvailability,
    City,
    Province,
    Status,
    CreatedAt,
    /// Derived from active assignments; only known after retrieval.
    IsAvailable,
}

impl Field {
    /// Backing column in the `jobseeker_profiles j` projection, if any.
    pub fn column(&self) -> Option<&'static str> {
        match self {
            Field::Name | Field::IsAvailable => None,
            Field::Email => Some("j.email"),
            Field::Phone => Some("j.mobile"),
            Field::Bio => Some("j.bio"),
            Field::Experience => Some("j.experience"),
            Field::Availability => Some("j.availability"),
            Field::WeekendAvailability => Some("j.weekend_availability"),
            Field::City => Some("j.city"),
            Field::Province => Some("j.province"),
            Field::Status => Some("j.verification_status"),
            Field::CreatedAt => Some("j.created_at"),
        }
    }

    /// Substring matches on these columns are cheap enough to push down.
    fn substring_pushdown(&self) -> bool {
        matches!(self, Field::City | Field::Province)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Rules
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    Storage,
    InProcess,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RuleValue {
    Text(String),
    Bool(bool),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterRule {
    /// Case-insensitive equality for text, plain equality for flags.
    Exact { field: Field, value: RuleValue },
    /// Case-insensitive containment in any of `fields`. `needle` is stored lowercased.
    Substring { fields: Vec<Field>, needle: String },
    /// Inclusive date range; at least one bound is set.
    Range {
        field: Field,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    },
}

impl FilterRule {
    pub fn exact_text(field: Field, value: impl Into<String>) -> Self {
        FilterRule::Exact {
            field,
            value: RuleValue::Text(value.into()),
        }
    }

    pub fn exact_flag(field: Field, value: bool) -> Self {
        FilterRule::Exact {
            field,
            value: RuleValue::Bool(value),
        }
    }

    pub fn substring(fields: Vec<Field>, needle: &str) -> Self {
        FilterRule::Substring {
            fields,
            needle: needle.to_lowercase(),
        }
    }

    pub fn placement(&self) -> Placement {
        let pushable = match self {
            FilterRule::Exact { field, .. } | FilterRule::Range { field, .. } => {
                field.column().is_some()
            }
            FilterRule::Substring { fields, .. } => match fields.as_slice() {
                [field] => field.substring_pushdown() && field.column().is_some(),
                _ => false,
            },
        };

        if pushable {
            Placement::Storage
        } else {
            Placement::InProcess
        }
    }

    /// Evaluates the rule against a loaded record. Absent fields never match.
    /// Agrees with the SQL rendering: exact text compares untrimmed.
    pub fn matches<R: Filterable + ?Sized>(&self, record: &R) -> bool {
        match self {
            FilterRule::Exact {
                field,
                value: RuleValue::Text(expected),
            } => record
                .text(*field)
                .is_some_and(|actual| actual.to_lowercase() == expected.to_lowercase()),
            FilterRule::Exact {
                field,
                value: RuleValue::Bool(expected),
            } => record.flag(*field) == Some(*expected),
            FilterRule::Substring { fields, needle } => fields.iter().any(|field| {
                record
                    .text(*field)
                    .is_some_and(|haystack| haystack.to_lowercase().contains(needle.as_str()))
            }),
            FilterRule::Range { field, from, to } => record.date(*field).is_some_and(|date| {
                from.map_or(true, |from| date >= from) && to.map_or(true, |to| date <= to)
            }),
        }
    }
}

/// True when `record` satisfies every rule (logical AND; empty set matches all).
pub fn matches_all<R: Filterable + ?Sized>(rules: &[FilterRule], record: &R) -> bool {
    rules.iter().all(|rule| rule.matches(record))
}

// ────────────────────────────────────────────────────────────────────────────
// Record access
// ────────────────────────────────────────────────────────────────────────────

/// Field accessors for records that can be filtered in-process.
pub trait Filterable {
    fn text(&self, field: Field) -> Option<Cow<'_, str>>;
    fn flag(&self, field: Field) -> Option<bool>;
    fn date(&self, field: Field) -> Option<NaiveDate>;
}

impl Filterable for JobseekerProfile {
    fn text(&self, field: Field) -> Option<Cow<'_, str>> {
        fn borrowed(value: &Option<String>) -> Option<Cow<'_, str>> {
            value.as_deref().map(Cow::Borrowed)
        }

        match field {
            Field::Name => {
                let joined = [self.first_name.as_deref(), self.last_name.as_deref()]
                    .into_iter()
                    .flatten()
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ");
                (!joined.is_empty()).then_some(Cow::Owned(joined))
            }
            Field::Email => Some(Cow::Borrowed(self.email.as_str())),
            Field::Phone => borrowed(&self.mobile),
            Field::Bio => borrowed(&self.bio),
            Field::Experience => borrowed(&self.experience),
            Field::Availability => borrowed(&self.availability),
            Field::City => borrowed(&self.city),
            Field::Province => borrowed(&self.province),
            Field::Status => Some(Cow::Borrowed(self.verification_status.as_str())),
            Field::WeekendAvailability | Field::CreatedAt | Field::IsAvailable => None,
        }
    }

    fn flag(&self, field: Field) -> Option<bool> {
        match field {
            Field::WeekendAvailability => Some(self.weekend_availability),
            _ => None,
        }
    }

    fn date(&self, field: Field) -> Option<NaiveDate> {
        match field {
            Field::CreatedAt => Some(self.created_at.date_naive()),
            _ => None,
        }
    }
}

impl Filterable for Candidate {
    fn text(&self, field: Field) -> Option<Cow<'_, str>> {
        self.profile.text(field)
    }

    fn flag(&self, field: Field) -> Option<bool> {
        match field {
            Field::IsAvailable => Some(self.is_available),
            other => self.profile.flag(other),
        }
    }

    fn date(&self, field: Field) -> Option<NaiveDate> {
        self.profile.date(field)
    }
}
