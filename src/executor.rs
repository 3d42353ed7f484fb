use tracing::debug;

use crate::models::{DataType, Dimension, FilterDescriptor, QueryResult, StudentRecord};
use crate::scope::{same_value, ScopePredicate};

/// Apply `scope ∧ filter` to the records, preserving dataset order.
pub fn execute(
    records: &[StudentRecord],
    filter: &FilterDescriptor,
    scope: &ScopePredicate,
) -> QueryResult {
    let scope_conflicts = scope_conflicts(filter, scope);

    let rows: Vec<StudentRecord> = if matches!(filter.data_type, Some(DataType::QuizSchedule)) {
        Vec::new()
    } else {
        records
            .iter()
            .filter(|record| scope.matches(record) && matches_filter(record, filter))
            .cloned()
            .collect()
    };

    debug!(
        scanned = records.len(),
        matched = rows.len(),
        conflicts = scope_conflicts.len(),
        "executed query"
    );

    QueryResult {
        rows,
        data_type: filter.data_type,
        submitted: filter.submitted,
        scope_conflicts,
    }
}

pub fn matches_filter(record: &StudentRecord, filter: &FilterDescriptor) -> bool {
    let category = match filter.data_type {
        Some(DataType::Performance) => record.quiz_score.is_some(),
        Some(DataType::QuizSchedule) => false,
        Some(DataType::SubmissionStatus) | Some(DataType::Unknown) | None => true,
    };

    category
        && field_matches(filter.grade.as_deref(), &record.grade)
        && field_matches(filter.class.as_deref(), &record.class)
        && field_matches(filter.region.as_deref(), &record.region)
        && filter.submitted.map_or(true, |sense| record.submitted == sense)
        && filter
            .time_window
            .map_or(true, |window| window.contains(record.date))
}

fn field_matches(wanted: Option<&str>, value: &str) -> bool {
    wanted.map_or(true, |wanted| same_value(wanted, value))
}

/// Dimensions where the question names a value the role does not cover.
fn scope_conflicts(filter: &FilterDescriptor, scope: &ScopePredicate) -> Vec<Dimension> {
    [
        (Dimension::Grade, filter.grade.as_deref()),
        (Dimension::Class, filter.class.as_deref()),
        (Dimension::Region, filter.region.as_deref()),
    ]
    .into_iter()
    .filter_map(|(dimension, wanted)| {
        let wanted = wanted?;
        let allowed = scope.restriction(dimension)?;
        (!same_value(wanted, allowed)).then_some(dimension)
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Role, TimeWindow};
    use crate::scope::scope_predicate;
    use crate::timewindow;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(
        name: &str,
        grade: &str,
        region: &str,
        submitted: bool,
        quiz_score: Option<f64>,
        on: NaiveDate,
    ) -> StudentRecord {
        StudentRecord {
            name: name.to_string(),
            grade: grade.to_string(),
            class: "A".to_string(),
            region: region.to_string(),
            submitted,
            quiz_score,
            date: on,
        }
    }

    fn roster() -> Vec<StudentRecord> {
        vec![
            record("Alice Smith", "8", "North", true, Some(85.0), date(2025, 7, 10)),
            record("Bob Johnson", "8", "North", false, None, date(2025, 7, 10)),
            record("Ethan Clarke", "8", "South", true, Some(78.0), date(2025, 7, 2)),
            record("Charlie Brown", "9", "South", true, Some(90.0), date(2025, 7, 17)),
            record("Diana Wilson", "9", "North", false, None, date(2025, 7, 17)),
        ]
    }

    fn role(grade: Option<&str>, region: Option<&str>) -> Role {
        Role {
            name: "test".to_string(),
            grade: grade.map(str::to_string),
            class: None,
            region: region.map(str::to_string),
        }
    }

    fn names(result: &QueryResult) -> Vec<&str> {
        result.rows.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn unsubmitted_homework_within_grade_scope() {
        let filter = FilterDescriptor {
            data_type: Some(DataType::SubmissionStatus),
            submitted: Some(false),
            ..Default::default()
        };
        let result = execute(&roster(), &filter, &scope_predicate(&role(Some("8"), None)));
        assert_eq!(names(&result), vec!["Bob Johnson"]);
        assert_eq!(result.submitted, Some(false));
        assert!(!result.is_unsupported());
    }

    #[test]
    fn submission_without_sense_returns_all_scoped_rows() {
        let filter = FilterDescriptor {
            data_type: Some(DataType::SubmissionStatus),
            ..Default::default()
        };
        let result = execute(&roster(), &filter, &scope_predicate(&role(Some("8"), None)));
        assert_eq!(names(&result), vec!["Alice Smith", "Bob Johnson", "Ethan Clarke"]);
        assert_eq!(result.submitted, None);
    }

    #[test]
    fn performance_requires_quiz_score() {
        let filter = FilterDescriptor {
            data_type: Some(DataType::Performance),
            ..Default::default()
        };
        let result = execute(&roster(), &filter, &scope_predicate(&Role::default()));
        assert_eq!(names(&result), vec!["Alice Smith", "Ethan Clarke", "Charlie Brown"]);
    }

    #[test]
    fn time_window_limits_by_record_date() {
        let filter = FilterDescriptor {
            data_type: Some(DataType::Performance),
            grade: Some("8".to_string()),
            time_window: Some(timewindow::last_week(date(2025, 7, 16))),
            ..Default::default()
        };
        let result = execute(&roster(), &filter, &scope_predicate(&Role::default()));
        assert_eq!(names(&result), vec!["Alice Smith"]);
    }

    #[test]
    fn empty_window_reports_zero_matches_not_unsupported() {
        let filter = FilterDescriptor {
            data_type: Some(DataType::Performance),
            grade: Some("8".to_string()),
            time_window: Some(TimeWindow {
                start: date(2025, 6, 1),
                end: date(2025, 6, 7),
            }),
            ..Default::default()
        };
        let result = execute(&roster(), &filter, &scope_predicate(&role(None, Some("North"))));
        assert!(result.rows.is_empty());
        assert!(!result.is_unsupported());
        assert!(result.scope_conflicts.is_empty());
    }

    #[test]
    fn quiz_schedule_is_unsupported() {
        let filter = FilterDescriptor {
            data_type: Some(DataType::QuizSchedule),
            ..Default::default()
        };
        let result = execute(&roster(), &filter, &scope_predicate(&Role::default()));
        assert!(result.rows.is_empty());
        assert!(result.is_unsupported());
    }

    #[test]
    fn question_cannot_widen_scope() {
        let filter = FilterDescriptor {
            grade: Some("9".to_string()),
            ..Default::default()
        };
        let result = execute(&roster(), &filter, &scope_predicate(&role(Some("8"), None)));
        assert!(result.rows.is_empty());
        assert_eq!(result.scope_conflicts, vec![Dimension::Grade]);
    }

    #[test]
    fn matching_filter_value_is_not_a_conflict() {
        let filter = FilterDescriptor {
            region: Some("north".to_string()),
            ..Default::default()
        };
        let result = execute(&roster(), &filter, &scope_predicate(&role(None, Some("North"))));
        assert!(result.scope_conflicts.is_empty());
        assert_eq!(names(&result), vec!["Alice Smith", "Bob Johnson", "Diana Wilson"]);
    }

    #[test]
    fn result_is_subset_of_scope() {
        let records = roster();
        let filters = [
            FilterDescriptor::default(),
            FilterDescriptor {
                data_type: Some(DataType::Performance),
                ..Default::default()
            },
            FilterDescriptor {
                region: Some("South".to_string()),
                submitted: Some(true),
                ..Default::default()
            },
            FilterDescriptor {
                data_type: Some(DataType::Unknown),
                grade: Some("9".to_string()),
                ..Default::default()
            },
        ];
        let roles = [
            role(Some("8"), None),
            role(None, Some("North")),
            role(Some("9"), Some("South")),
            Role::default(),
        ];

        for role in roles.iter() {
            let scope = scope_predicate(role);
            let scoped: Vec<&StudentRecord> = records.iter().filter(|r| scope.matches(r)).collect();
            for filter in filters.iter() {
                let result = execute(&records, filter, &scope);
                assert!(result.rows.iter().all(|row| scoped.contains(&row)));
            }
        }
    }

    #[test]
    fn execution_is_idempotent() {
        let records = roster();
        let filter = FilterDescriptor {
            data_type: Some(DataType::SubmissionStatus),
            ..Default::default()
        };
        let scope = scope_predicate(&role(None, Some("North")));
        assert_eq!(execute(&records, &filter, &scope), execute(&records, &filter, &scope));
    }
}
