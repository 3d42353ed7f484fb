use chrono::{NaiveDate, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::dataset::DatasetStore;
use crate::error::QueryError;
use crate::executor;
use crate::intent::IntentExtractor;
use crate::models::{QueryLogEntry, QueryOutcome, QueryResult, Role, StudentRecord};
use crate::scope::{scope_predicate, ScopePredicate};

pub struct Session<S: DatasetStore> {
    store: S,
    extractor: IntentExtractor,
    scope: ScopePredicate,
    log: Vec<QueryLogEntry>,
}

impl<S: DatasetStore> Session<S> {
    pub fn new(store: S, extractor: IntentExtractor, role: Role) -> Self {
        if role.is_unrestricted() {
            warn!(role = %role.name, "role sets no grade, class or region; granting full access");
        }
        info!(
            role = %role.name,
            records = store.all().len(),
            backend = extractor.backend_id(),
            "session started"
        );

        Self {
            store,
            extractor,
            scope: scope_predicate(&role),
            log: Vec::new(),
        }
    }

    pub fn role(&self) -> &Role {
        self.scope.role()
    }

    /// Answer one question. Every outcome is logged and none ends the session.
    pub async fn ask(
        &mut self,
        question: &str,
        today: NaiveDate,
    ) -> Result<QueryResult, QueryError> {
        let outcome = self.run(question, today).await;

        let entry = QueryLogEntry {
            id: Uuid::new_v4(),
            role: self.role().name.clone(),
            question: question.trim().to_string(),
            outcome: match &outcome {
                Ok(result) => QueryOutcome::Rows(result.rows.len()),
                Err(err) => QueryOutcome::Failed(err.kind().to_string()),
            },
            asked_at: Utc::now(),
        };

        match &outcome {
            Ok(result) => info!(id = %entry.id, rows = result.rows.len(), "query answered"),
            Err(err) => warn!(id = %entry.id, kind = err.kind(), error = %err, "query failed"),
        }

        self.log.push(entry);
        outcome
    }

    async fn run(&self, question: &str, today: NaiveDate) -> Result<QueryResult, QueryError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(QueryError::EmptyQuestion);
        }

        let filter = self.extractor.extract(question, today).await?;
        let result = executor::execute(self.store.all(), &filter, &self.scope);

        match result.data_type {
            Some(data_type) if result.is_unsupported() => {
                Err(QueryError::UnsupportedCategory(data_type))
            }
            _ => Ok(result),
        }
    }

    pub fn log(&self) -> &[QueryLogEntry] {
        &self.log
    }

    /// The whole dataset, unscoped, for the read-only preview.
    pub fn preview(&self) -> &[StudentRecord] {
        self.store.all()
    }
}
