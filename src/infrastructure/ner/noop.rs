use crate::domain::error::DomainError;
use crate::domain::ports::entity_extractor::{EntityExtractor, NerMention};

/// Extractor that finds nothing. With it, entity bags are built from the
/// gazetteer scan alone.
pub struct NoopExtractor;

#[async_trait::async_trait]
impl EntityExtractor for NoopExtractor {
    async fn extract(&self, _text: &str) -> Result<Vec<NerMention>, DomainError> {
        Ok(vec![])
    }
}
