use std::time::Duration;

use thiserror::Error;

use crate::models::DataType;

/// Failures from a text-understanding backend.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request failed: {0}")]
    RequestFailed(String),

    #[error("rate limited or quota exceeded")]
    RateLimited,

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("could not read backend response: {0}")]
    Parse(String),
}

#[derive(Error, Debug)]
pub enum ExtractionFailure {
    #[error("text-understanding service error: {0}")]
    ServiceError(#[from] BackendError),

    #[error("response did not match the query schema: {0}")]
    SchemaViolation(String),
}

impl ExtractionFailure {
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractionFailure::ServiceError(_) => "service-error",
            ExtractionFailure::SchemaViolation(_) => "schema-violation",
        }
    }
}

/// Errors surfaced to the admin for a single question. None of them end the session.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Please enter a query.")]
    EmptyQuestion,

    #[error("Could not reach the query service: {0}")]
    Service(String),

    #[error("Could not understand the question: {0}")]
    Schema(String),

    #[error("The dataset has no {0} data, so this question cannot be answered.")]
    UnsupportedCategory(DataType),
}

impl QueryError {
    pub fn kind(&self) -> &'static str {
        match self {
            QueryError::EmptyQuestion => "empty-question",
            QueryError::Service(_) => "service-error",
            QueryError::Schema(_) => "schema-violation",
            QueryError::UnsupportedCategory(_) => "unsupported-data-category",
        }
    }
}

impl From<ExtractionFailure> for QueryError {
    fn from(failure: ExtractionFailure) -> Self {
        match failure {
            ExtractionFailure::ServiceError(err) => QueryError::Service(err.to_string()),
            ExtractionFailure::SchemaViolation(reason) => QueryError::Schema(reason),
        }
    }
}

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("failed to read dataset: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row}: field `{field}` is empty")]
    MissingField { row: usize, field: &'static str },
}

#[derive(Error, Debug)]
pub enum ScopeError {
    #[error("unknown role preset `{0}`")]
    UnknownPreset(String),
}
