use crate::domain::error::DomainError;
use crate::domain::values::structured_query::StructuredQuery;

/// Optional LLM-backed query understanding. Implementations must never
/// surface malformed collaborator output as an error: `classify` falls back
/// to `StructuredQuery::fallback` internally when the response cannot be
/// parsed.
#[async_trait::async_trait]
pub trait QueryRewriter: Send + Sync {
    /// Clean, search-optimized rendition of the query.
    async fn rewrite(&self, query: &str) -> Result<String, DomainError>;
    /// Structured intent: query type, entities, time horizon.
    async fn classify(&self, query: &str) -> Result<StructuredQuery, DomainError>;
}
