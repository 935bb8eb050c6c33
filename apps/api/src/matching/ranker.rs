//! Ranker / refiner: narrows the retrieved superset with the in-process rules
//! and orders it by similarity.
//!
//! The sort is stable: candidates whose scores compare equal keep their input
//! order, so identical calls always return identical pages. NaN scores sort
//! after every real score.

use std::cmp::Ordering;

use serde::Serialize;

use crate::filtering::{matches_all, FilterRule, Filterable};
use crate::models::Candidate;

#[derive(Debug, Clone, Serialize)]
pub struct RankedResult {
    /// 1-based position in the full ranked list, not within the page.
    pub rank: usize,
    pub candidate: Candidate,
}

/// Keeps records satisfying every in-process rule (logical AND), in input order.
pub fn refine<T: Filterable>(records: Vec<T>, in_process_rules: &[FilterRule]) -> Vec<T> {
    if in_process_rules.is_empty() {
        return records;
    }
    records
        .into_iter()
        .filter(|record| matches_all(in_process_rules, record))
        .collect()
}

/// Sorts by similarity descending and assigns ranks.
pub fn rank(mut candidates: Vec<Candidate>) -> Vec<RankedResult> {
    // Vec::sort_by is stable.
    candidates.sort_by(|a, b| compare_scores(b.similarity_score, a.similarity_score));

    candidates
        .into_iter()
        .enumerate()
        .map(|(i, candidate)| RankedResult {
            rank: i + 1,
            candidate,
        })
        .collect()
}

/// Total order on scores with NaN below everything and NaN == NaN.
pub(crate) fn compare_scores(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filtering::rule::Field;
    use crate::models::candidate::sample_candidate;

    fn names(ranked: &[RankedResult]) -> Vec<String> {
        ranked
            .iter()
            .map(|r| r.candidate.profile.first_name.clone().unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_scores_are_non_increasing() {
        let ranked = rank(vec![
            sample_candidate("a", 0.2, true),
            sample_candidate("b", 0.9, true),
            sample_candidate("c", 0.5, true),
            sample_candidate("d", 0.7, true),
        ]);
        let scores: Vec<f64> = ranked.iter().map(|r| r.candidate.similarity_score).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]), "{scores:?}");
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[3].rank, 4);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let ranked = rank(vec![
            sample_candidate("first", 0.5, true),
            sample_candidate("top", 0.9, true),
            sample_candidate("second", 0.5, true),
            sample_candidate("third", 0.5, true),
        ]);
        assert_eq!(names(&ranked), vec!["top", "first", "second", "third"]);
    }

    #[test]
    fn test_refine_and_rank_is_idempotent() {
        let input = vec![
            sample_candidate("a", 0.5, true),
            sample_candidate("b", 0.5, false),
            sample_candidate("c", 0.8, true),
            sample_candidate("d", 0.5, true),
        ];
        let rules = vec![FilterRule::exact_flag(Field::IsAvailable, true)];

        let once = names(&rank(refine(input.clone(), &rules)));
        let twice = names(&rank(refine(input, &rules)));
        assert_eq!(once, twice);
        assert_eq!(once, vec!["c", "a", "d"]);
    }

    #[test]
    fn test_refine_requires_every_rule() {
        let mut leader = sample_candidate("Ada", 0.9, true);
        leader.profile.bio = Some("Forklift certified".to_string());
        let mut unavailable = sample_candidate("Bob", 0.8, false);
        unavailable.profile.bio = Some("Forklift certified".to_string());

        let rules = vec![
            FilterRule::substring(vec![Field::Bio], "forklift"),
            FilterRule::exact_flag(Field::IsAvailable, true),
        ];
        let refined = refine(vec![leader, unavailable], &rules);
        assert_eq!(refined.len(), 1);
        assert_eq!(refined[0].profile.first_name.as_deref(), Some("Ada"));
    }

    #[test]
    fn test_nan_scores_sort_last() {
        let ranked = rank(vec![
            sample_candidate("nan", f64::NAN, true),
            sample_candidate("low", 0.1, true),
        ]);
        assert_eq!(names(&ranked), vec!["low", "nan"]);
    }
}
