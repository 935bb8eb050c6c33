//! Renders storage-side filter rules onto a `sqlx::QueryBuilder`.
//!
//! Every value is bound; only column names from the field catalogue are
//! spliced into the SQL text.

use anyhow::anyhow;
use sqlx::{Postgres, QueryBuilder};

use crate::errors::AppError;
use crate::filtering::rule::{Field, FilterRule, Placement, RuleValue};

/// Appends ` AND <predicate>` for each rule. The builder must already be
/// inside a `WHERE` clause.
pub fn push_storage_rules(
    qb: &mut QueryBuilder<'_, Postgres>,
    rules: &[FilterRule],
) -> Result<(), AppError> {
    for rule in rules {
        if rule.placement() != Placement::Storage {
            return Err(AppError::Internal(anyhow!(
                "rule {rule:?} cannot be evaluated by storage"
            )));
        }

        qb.push(" AND ");
        match rule {
            FilterRule::Exact {
                field,
                value: RuleValue::Text(value),
            } => {
                qb.push("lower(")
                    .push(column(*field)?)
                    .push(") = lower(")
                    .push_bind(value.clone())
                    .push(")");
            }
            FilterRule::Exact {
                field,
                value: RuleValue::Bool(value),
            } => {
                qb.push(column(*field)?).push(" = ").push_bind(*value);
            }
            FilterRule::Substring { fields, needle } => {
                let pattern = format!("%{}%", escape_like(needle));
                qb.push("(");
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        qb.push(" OR ");
                    }
                    qb.push(column(*field)?)
                        .push(" ILIKE ")
                        .push_bind(pattern.clone());
                }
                qb.push(")");
            }
            FilterRule::Range { field, from, to } => {
                // Calendar dates are UTC regardless of the session time zone.
                let day = format!("({} AT TIME ZONE 'UTC')::date", column(*field)?);
                qb.push("(TRUE");
                if let Some(from) = from {
                    qb.push(" AND ").push(&day).push(" >= ").push_bind(*from);
                }
                if let Some(to) = to {
                    qb.push(" AND ").push(&day).push(" <= ").push_bind(*to);
                }
                qb.push(")");
            }
        }
    }
    Ok(())
}

fn column(field: Field) -> Result<&'static str, AppError> {
    field
        .column()
        .ok_or_else(|| AppError::Internal(anyhow!("field {field:?} has no storage column")))
}

/// Escapes LIKE metacharacters so user input matches literally.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn render(rules: &[FilterRule]) -> Result<String, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT j.id FROM jobseeker_profiles j WHERE TRUE");
        push_storage_rules(&mut qb, rules)?;
        Ok(qb.sql().to_string())
    }

    #[test]
    fn test_no_rules_leaves_query_untouched() {
        assert_eq!(
            render(&[]).unwrap(),
            "SELECT j.id FROM jobseeker_profiles j WHERE TRUE"
        );
    }

    #[test]
    fn test_exact_text_binds_case_insensitive_comparison() {
        let sql = render(&[FilterRule::exact_text(Field::Experience, "Forklift")]).unwrap();
        assert!(sql.ends_with(" AND lower(j.experience) = lower($1)"), "{sql}");
    }

    #[test]
    fn test_flag_and_substring_bind_in_order() {
        let sql = render(&[
            FilterRule::exact_flag(Field::WeekendAvailability, true),
            FilterRule::substring(vec![Field::City], "tor"),
        ])
        .unwrap();
        assert!(sql.contains("j.weekend_availability = $1"), "{sql}");
        assert!(sql.contains("(j.city ILIKE $2)"), "{sql}");
    }

    #[test]
    fn test_range_renders_present_bounds_only() {
        let sql = render(&[FilterRule::Range {
            field: Field::CreatedAt,
            from: None,
            to: NaiveDate::from_ymd_opt(2024, 12, 31),
        }])
        .unwrap();
        assert!(
            sql.contains("(TRUE AND (j.created_at AT TIME ZONE 'UTC')::date <= $1)"),
            "{sql}"
        );
        assert!(!sql.contains(">="), "{sql}");
    }

    #[test]
    fn test_in_process_rule_is_refused() {
        let err = render(&[FilterRule::exact_flag(Field::IsAvailable, true)]).unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[test]
    fn test_like_metacharacters_are_escaped() {
        assert_eq!(escape_like(r"50%_off\"), r"50\%\_off\\");
    }
}
