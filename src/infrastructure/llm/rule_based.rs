use crate::domain::error::DomainError;
use crate::domain::ports::query_rewriter::QueryRewriter;
use crate::domain::values::structured_query::StructuredQuery;

/// Rewriter used when no LLM is configured. The rewrite is a whitespace
/// cleanup and the classification is the documented fallback; the gazetteer
/// scan in the query stage does the real entity work.
pub struct RuleBasedRewriter;

#[async_trait::async_trait]
impl QueryRewriter for RuleBasedRewriter {
    async fn rewrite(&self, query: &str) -> Result<String, DomainError> {
        Ok(query.split_whitespace().collect::<Vec<_>>().join(" "))
    }

    async fn classify(&self, query: &str) -> Result<StructuredQuery, DomainError> {
        Ok(StructuredQuery::fallback(query))
    }
}
