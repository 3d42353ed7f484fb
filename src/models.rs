use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct StudentRecord {
    pub name: String,
    pub grade: String,
    pub class: String,
    pub region: String,
    pub submitted: bool,
    pub quiz_score: Option<f64>,
    pub date: NaiveDate,
}

/// An admin's access scope. Unset fields place no restriction on that dimension.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Role {
    pub name: String,
    pub grade: Option<String>,
    pub class: Option<String>,
    pub region: Option<String>,
}

impl Role {
    pub fn is_unrestricted(&self) -> bool {
        self.grade.is_none() && self.class.is_none() && self.region.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    SubmissionStatus,
    Performance,
    QuizSchedule,
    Unknown,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::SubmissionStatus => "submission_status",
            DataType::Performance => "performance",
            DataType::QuizSchedule => "quiz_schedule",
            DataType::Unknown => "unknown",
        }
    }

    /// Parse the closed vocabulary, tolerating case and separator variants.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized: String = raw
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == '-' || c == ' ' { '_' } else { c })
            .collect();

        match normalized.as_str() {
            "submission_status" => Some(DataType::SubmissionStatus),
            "performance" => Some(DataType::Performance),
            "quiz_schedule" => Some(DataType::QuizSchedule),
            "unknown" => Some(DataType::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TimeWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterDescriptor {
    pub data_type: Option<DataType>,
    pub grade: Option<String>,
    pub class: Option<String>,
    pub region: Option<String>,
    /// Polarity of a submission question: `Some(false)` for "haven't submitted".
    pub submitted: Option<bool>,
    pub time_window: Option<TimeWindow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Grade,
    Class,
    Region,
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Dimension::Grade => "grade",
            Dimension::Class => "class",
            Dimension::Region => "region",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub rows: Vec<StudentRecord>,
    pub data_type: Option<DataType>,
    /// Submission sense the rows were filtered by, if any.
    pub submitted: Option<bool>,
    /// Dimensions where the question asked for a value outside the role's scope.
    pub scope_conflicts: Vec<Dimension>,
}

impl QueryResult {
    pub fn is_unsupported(&self) -> bool {
        matches!(self.data_type, Some(DataType::QuizSchedule))
    }
}

#[derive(Debug, Clone)]
pub enum QueryOutcome {
    Rows(usize),
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct QueryLogEntry {
    pub id: Uuid,
    pub role: String,
    pub question: String,
    pub outcome: QueryOutcome,
    pub asked_at: DateTime<Utc>,
}
