use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde_json::json;

use super::TextUnderstanding;
use crate::error::BackendError;

/// Answers with the same JSON a language model would, using regular expressions.
#[derive(Debug, Default)]
pub struct KeywordBackend;

impl KeywordBackend {
    pub fn new() -> Self {
        Self
    }

    /// Build the JSON answer for a question.
    pub fn interpret(&self, question: &str) -> serde_json::Value {
        let mentions_quiz = QUIZ_PATTERN.is_match(question);

        let data_type = if mentions_quiz && SCHEDULE_PATTERN.is_match(question) {
            "quiz_schedule"
        } else if SUBMISSION_PATTERN.is_match(question) {
            "submission_status"
        } else if PERFORMANCE_PATTERN.is_match(question) || mentions_quiz {
            "performance"
        } else {
            "unknown"
        };

        let submitted = if data_type != "submission_status" {
            None
        } else if NEGATION_PATTERN.is_match(question) {
            Some(false)
        } else if POSITIVE_PATTERN.is_match(question) {
            Some(true)
        } else {
            None
        };

        json!({
            "data_type": data_type,
            "grade": capture(&GRADE_PATTERN, question),
            "class": capture(&CLASS_PATTERN, question).map(|c| c.to_uppercase()),
            "region": capture(&REGION_PATTERN, question).map(|r| capitalize(&r)),
            "submitted": submitted,
            "time_window": time_expression(question),
        })
    }
}

#[async_trait]
impl TextUnderstanding for KeywordBackend {
    fn id(&self) -> &str {
        "keyword"
    }

    async fn complete(&self, _instruction: &str, question: &str) -> Result<String, BackendError> {
        Ok(self.interpret(question).to_string())
    }
}

fn capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern.captures(text).and_then(|caps| {
        caps.iter()
            .skip(1)
            .flatten()
            .next()
            .map(|m| m.as_str().to_string())
    })
}

fn capitalize(word: &str) -> String {
    let lower = word.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn time_expression(question: &str) -> Option<String> {
    if let Some(caps) = DAYS_PATTERN.captures(question) {
        return Some(format!("{} {} days", caps[1].to_lowercase(), &caps[2]));
    }

    WEEK_PATTERN
        .captures(question)
        .map(|caps| caps[1].to_lowercase().split_whitespace().collect::<Vec<_>>().join(" "))
}

static QUIZ_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bquiz(zes)?\b").expect("Invalid regex"));
static SCHEDULE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(upcoming|schedul|coming\s+up|planned|calendar)").expect("Invalid regex")
});
static SUBMISSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(homework|assignments?|submit|submission|turned\s+in|handed\s+in)")
        .expect("Invalid regex")
});
static NEGATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)(haven'?t|hasn'?t|have\s+not|has\s+not|didn'?t|did\s+not|\bnot\b",
        r"|missing|outstanding|pending|yet\s+to)"
    ))
    .expect("Invalid regex")
});
static POSITIVE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)(has\s+submitted|have\s+submitted|turned\s+in|handed\s+in",
        r"|completed|done\s+their)"
    ))
    .expect("Invalid regex")
});
static PERFORMANCE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(performance|scores?|results?|marks?|how\s+.*\s+did)").expect("Invalid regex")
});
static GRADE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bgrade\s*(\d{1,2})\b|\b(\d{1,2})(?:st|nd|rd|th)\s+grade")
        .expect("Invalid regex")
});
static CLASS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:class|section)\s+([a-z])\b").expect("Invalid regex")
});
static REGION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(north|south|east|west|central)\b").expect("Invalid regex")
});
static WEEK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b((?:last|past|previous|this|current|next|coming)\s+week|today|yesterday|tomorrow)\b",
    )
    .expect("Invalid regex")
});
static DAYS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(last|past|next)\s+(\d{1,3})\s+days?\b").expect("Invalid regex")
});
