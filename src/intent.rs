use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::backend::TextUnderstanding;
use crate::error::{BackendError, ExtractionFailure};
use crate::models::{DataType, FilterDescriptor, TimeWindow};
use crate::timewindow;

pub const INSTRUCTION: &str = r#"You are the query parser for a school admin panel over student records.
Read the admin's question and answer with a single JSON object with exactly these keys:
  "data_type":   one of "submission_status", "performance", "quiz_schedule", "unknown"
  "grade":       grade mentioned, as a string such as "8", or null
  "class":       class mentioned, such as "A", or null
  "region":      region mentioned, such as "North", or null
  "submitted":   for submission questions, false when asking who has NOT submitted,
                 true when asking who HAS submitted, otherwise null
  "time_window": null, a relative expression ("last week", "this week", "next week",
                 "today", "yesterday", "tomorrow", "last N days", "next N days"),
                 or an object {"start": "YYYY-MM-DD", "end": "YYYY-MM-DD"}
Use "submission_status" for homework or assignment submission, "performance" for quiz
scores or results, "quiz_schedule" for upcoming or scheduled quizzes.
Answer with JSON only."#;

pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

pub struct IntentExtractor {
    backend: Arc<dyn TextUnderstanding>,
    timeout: Duration,
}

impl IntentExtractor {
    pub fn new(backend: Arc<dyn TextUnderstanding>) -> Self {
        Self {
            backend,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn backend_id(&self) -> &str {
        self.backend.id()
    }

    /// One backend call, no retries. A timeout counts as a service error.
    pub async fn extract(
        &self,
        question: &str,
        today: NaiveDate,
    ) -> Result<FilterDescriptor, ExtractionFailure> {
        debug!(backend = self.backend.id(), question, "extracting intent");

        let call = self.backend.complete(INSTRUCTION, question);
        let reply = tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| {
                warn!(backend = self.backend.id(), "text-understanding call timed out");
                BackendError::Timeout(self.timeout)
            })??;

        let filter = parse_reply(&reply, today).inspect_err(|err| {
            warn!(kind = err.kind(), error = %err, "rejected backend reply");
        })?;
        debug!(?filter, "extracted filter");
        Ok(filter)
    }
}

/// Validate a backend reply against the query schema.
pub fn parse_reply(reply: &str, today: NaiveDate) -> Result<FilterDescriptor, ExtractionFailure> {
    let json = locate_object(reply)
        .ok_or_else(|| schema("reply does not contain a JSON object"))?;
    let value: Value =
        serde_json::from_str(json).map_err(|e| schema(format!("invalid JSON: {e}")))?;
    let object = value
        .as_object()
        .ok_or_else(|| schema("reply is not a JSON object"))?;

    let data_type = match object.get("data_type") {
        None | Some(Value::Null) => None,
        Some(Value::String(raw)) => Some(
            DataType::parse(raw).ok_or_else(|| schema(format!("unknown data_type `{raw}`")))?,
        ),
        Some(other) => return Err(schema(format!("data_type must be a string, got {other}"))),
    };

    let submitted = match object.get("submitted") {
        None | Some(Value::Null) => None,
        Some(Value::Bool(flag)) => Some(*flag),
        Some(other) => return Err(schema(format!("submitted must be a boolean, got {other}"))),
    };

    Ok(FilterDescriptor {
        data_type,
        grade: text_field(object, "grade")?,
        class: text_field(object, "class")?,
        region: text_field(object, "region")?,
        submitted,
        time_window: time_window(object.get("time_window"), today)?,
    })
}

fn schema(reason: impl Into<String>) -> ExtractionFailure {
    ExtractionFailure::SchemaViolation(reason.into())
}

/// The outermost `{ ... }` span, so replies wrapped in prose or code fences still parse.
fn locate_object(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    (start < end).then(|| &reply[start..=end])
}

fn text_field(object: &Map<String, Value>, key: &str) -> Result<Option<String>, ExtractionFailure> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => {
            let trimmed = text.trim();
            Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
        }
        Some(Value::Number(number)) if number.is_u64() || number.is_i64() => {
            Ok(Some(number.to_string()))
        }
        Some(other) => Err(schema(format!("{key} must be a string, got {other}"))),
    }
}

fn time_window(
    value: Option<&Value>,
    today: NaiveDate,
) -> Result<Option<TimeWindow>, ExtractionFailure> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(expression)) if expression.trim().is_empty() => Ok(None),
        Some(Value::String(expression)) => timewindow::resolve(expression, today)
            .map(Some)
            .ok_or_else(|| schema(format!("unsupported time_window `{expression}`"))),
        Some(Value::Object(range)) => {
            let start = date_field(range, "start")?;
            let end = date_field(range, "end")?;
            if start > end {
                return Err(schema(format!("time_window starts after it ends ({start} > {end})")));
            }
            Ok(Some(TimeWindow { start, end }))
        }
        Some(other) => Err(schema(format!("time_window has unexpected shape: {other}"))),
    }
}

fn date_field(range: &Map<String, Value>, key: &str) -> Result<NaiveDate, ExtractionFailure> {
    let raw = range
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| schema(format!("time_window.{key} is missing")))?;
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| schema(format!("time_window.{key} `{raw}` is not a YYYY-MM-DD date")))
}
