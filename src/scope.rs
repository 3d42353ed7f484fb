use crate::error::ScopeError;
use crate::models::{Dimension, Role, StudentRecord};

/// Conjoined with every query; the question can never widen it.
#[derive(Debug, Clone)]
pub struct ScopePredicate {
    role: Role,
}

pub fn scope_predicate(role: &Role) -> ScopePredicate {
    ScopePredicate { role: role.clone() }
}

pub(crate) fn same_value(left: &str, right: &str) -> bool {
    left.trim().eq_ignore_ascii_case(right.trim())
}

fn field_allows(restriction: Option<&str>, value: &str) -> bool {
    restriction.map_or(true, |expected| same_value(expected, value))
}

impl ScopePredicate {
    pub fn matches(&self, record: &StudentRecord) -> bool {
        field_allows(self.role.grade.as_deref(), &record.grade)
            && field_allows(self.role.class.as_deref(), &record.class)
            && field_allows(self.role.region.as_deref(), &record.region)
    }

    pub fn restriction(&self, dimension: Dimension) -> Option<&str> {
        match dimension {
            Dimension::Grade => self.role.grade.as_deref(),
            Dimension::Class => self.role.class.as_deref(),
            Dimension::Region => self.role.region.as_deref(),
        }
    }

    pub fn role(&self) -> &Role {
        &self.role
    }
}

pub const PRESET_NAMES: [&str; 2] = ["grade_8_admin", "grade_9_admin"];

pub fn preset(name: &str) -> Result<Role, ScopeError> {
    let (grade, class, region) = match name {
        "grade_8_admin" => ("8", "A", "North"),
        "grade_9_admin" => ("9", "B", "South"),
        other => return Err(ScopeError::UnknownPreset(other.to_string())),
    };

    Ok(Role {
        name: name.to_string(),
        grade: Some(grade.to_string()),
        class: Some(class.to_string()),
        region: Some(region.to_string()),
    })
}

pub fn presets() -> Vec<Role> {
    PRESET_NAMES
        .iter()
        .filter_map(|name| preset(name).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(grade: &str, class: &str, region: &str) -> StudentRecord {
        StudentRecord {
            name: "Avery Lee".to_string(),
            grade: grade.to_string(),
            class: class.to_string(),
            region: region.to_string(),
            submitted: true,
            quiz_score: Some(80.0),
            date: NaiveDate::from_ymd_opt(2025, 7, 10).unwrap(),
        }
    }

    fn role(grade: Option<&str>, class: Option<&str>, region: Option<&str>) -> Role {
        Role {
            name: "custom".to_string(),
            grade: grade.map(str::to_string),
            class: class.map(str::to_string),
            region: region.map(str::to_string),
        }
    }

    #[test]
    fn rejects_records_outside_any_set_field() {
        let scope = scope_predicate(&role(Some("8"), Some("A"), Some("North")));
        assert!(scope.matches(&record("8", "A", "North")));
        assert!(!scope.matches(&record("9", "A", "North")));
        assert!(!scope.matches(&record("8", "B", "North")));
        assert!(!scope.matches(&record("8", "A", "South")));
    }

    #[test]
    fn unset_fields_do_not_restrict() {
        let scope = scope_predicate(&role(None, None, Some("North")));
        assert!(scope.matches(&record("8", "A", "North")));
        assert!(scope.matches(&record("9", "B", "North")));
        assert!(!scope.matches(&record("9", "B", "South")));
    }

    #[test]
    fn comparison_ignores_case() {
        let scope = scope_predicate(&role(None, Some("a"), Some("north")));
        assert!(scope.matches(&record("8", "A", "NORTH")));
    }

    #[test]
    fn unrestricted_role_sees_everything() {
        let unrestricted = role(None, None, None);
        assert!(unrestricted.is_unrestricted());
        let scope = scope_predicate(&unrestricted);
        assert!(scope.matches(&record("12", "Z", "East")));
    }

    #[test]
    fn presets_match_admin_panel_scopes() {
        let grade_8 = preset("grade_8_admin").unwrap();
        assert_eq!(grade_8.grade.as_deref(), Some("8"));
        assert_eq!(grade_8.class.as_deref(), Some("A"));
        assert_eq!(grade_8.region.as_deref(), Some("North"));
        assert_eq!(presets().len(), 2);
        assert!(matches!(
            preset("superuser"),
            Err(ScopeError::UnknownPreset(name)) if name == "superuser"
        ));
    }
}
