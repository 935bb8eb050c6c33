//! Predicate compiler: turns a FilterSpec into two inspectable rule sets.
//!
//! `storage` rules are rendered into the retrieval query; `in_process` rules
//! are evaluated by the refiner after the rows are loaded. Placement is read
//! off each rule, never decided here.

use serde::Serialize;
use tracing::debug;

use crate::config::TextGates;
use crate::filtering::rule::{Field, FilterRule, Placement};
use crate::filtering::spec::{AppliedFilters, FilterSpec};

/// Fields the global `search` term is matched against.
const SEARCH_FIELDS: &[Field] = &[
    Field::Name,
    Field::Email,
    Field::Phone,
    Field::Bio,
    Field::Experience,
    Field::City,
    Field::Province,
];

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompiledFilters {
    pub storage: Vec<FilterRule>,
    pub in_process: Vec<FilterRule>,
    /// The gated filters the rules were built from.
    #[serde(skip)]
    pub applied: AppliedFilters,
}

impl CompiledFilters {
    pub fn is_unfiltered(&self) -> bool {
        self.storage.is_empty() && self.in_process.is_empty()
    }
}

pub fn compile(spec: &FilterSpec, gates: &TextGates) -> CompiledFilters {
    let applied = spec.applied(gates);
    let rules = build_rules(&applied);

    let (storage, in_process): (Vec<_>, Vec<_>) = rules
        .into_iter()
        .partition(|rule| rule.placement() == Placement::Storage);

    debug!(
        storage_rules = storage.len(),
        in_process_rules = in_process.len(),
        "Compiled filter spec"
    );

    CompiledFilters {
        storage,
        in_process,
        applied,
    }
}

fn build_rules(applied: &AppliedFilters) -> Vec<FilterRule> {
    let mut rules = Vec::new();

    if let Some(search) = &applied.search {
        rules.push(FilterRule::substring(SEARCH_FIELDS.to_vec(), search));
    }
    if let Some(name) = &applied.name_filter {
        rules.push(FilterRule::substring(vec![Field::Name], name));
    }
    if let Some(email) = &applied.email_filter {
        rules.push(FilterRule::substring(vec![Field::Email], email));
    }
    if let Some(phone) = &applied.phone_filter {
        rules.push(FilterRule::substring(vec![Field::Phone], phone));
    }
    if let Some(experience) = &applied.experience_filter {
        rules.push(FilterRule::exact_text(Field::Experience, experience.clone()));
    }
    if let Some(availability) = applied.availability_filter {
        rules.push(FilterRule::exact_text(
            Field::Availability,
            availability.as_str(),
        ));
    }
    if let Some(weekend) = applied.weekend_availability_filter {
        rules.push(FilterRule::exact_flag(Field::WeekendAvailability, weekend));
    }
    if let Some(city) = &applied.city_filter {
        rules.push(FilterRule::substring(vec![Field::City], city));
    }
    if let Some(province) = &applied.province_filter {
        rules.push(FilterRule::substring(vec![Field::Province], province));
    }
    if let Some(status) = applied.status {
        rules.push(FilterRule::exact_text(Field::Status, status.as_str()));
    }
    if applied.created_from.is_some() || applied.created_to.is_some() {
        rules.push(FilterRule::Range {
            field: Field::CreatedAt,
            from: applied.created_from,
            to: applied.created_to,
        });
    }
    if applied.only_available {
        rules.push(FilterRule::exact_flag(Field::IsAvailable, true));
    }

    rules
}
