use async_trait::async_trait;

use crate::error::BackendError;

pub mod keyword;
pub mod openai;

pub use keyword::KeywordBackend;
pub use openai::OpenAiBackend;

/// Receives a fixed instruction plus the admin's question and answers with a
/// JSON object describing the query.
#[async_trait]
pub trait TextUnderstanding: Send + Sync {
    /// Backend identifier, used in logs.
    fn id(&self) -> &str;

    async fn complete(&self, instruction: &str, question: &str) -> Result<String, BackendError>;
}
