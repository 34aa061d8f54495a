use crate::domain::error::DomainError;

#[derive(Debug, Clone, Copy)]
pub enum InputType {
    Document,
    Query,
}

/// Black-box sentence-embedding collaborator. Consumers unit-normalize the
/// returned vectors before use. An empty vector signals "no embedding
/// available".
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(
        &self,
        texts: &[String],
        input_type: InputType,
    ) -> Result<Vec<Vec<f32>>, DomainError>;
    fn dimension(&self) -> usize;
}
