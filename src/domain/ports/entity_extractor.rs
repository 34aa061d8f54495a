use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};

/// One mention returned by the NER collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NerMention {
    /// Model label, e.g. ORG, MISC, PER, PERSON, LOC, GPE.
    pub label: String,
    pub text: String,
    pub score: f32,
    pub start: usize,
    pub end: usize,
}

/// Black-box named-entity extraction: text → list of typed mentions.
/// Callers treat one call as a single blocking unit; chunk-level failures
/// are isolated by the extract stage, not here.
#[async_trait::async_trait]
pub trait EntityExtractor: Send + Sync {
    async fn extract(&self, text: &str) -> Result<Vec<NerMention>, DomainError>;
}
