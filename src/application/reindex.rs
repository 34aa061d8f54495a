use crate::domain::cluster::normalize_unit;
use crate::domain::error::DomainError;
use crate::domain::ports::embedding_port::{EmbeddingProvider, InputType};
use crate::domain::ports::story_repository::StoryRepository;
use crate::domain::ports::vector_store::VectorStore;
use std::sync::Arc;
use tracing::{info, warn};

/// Backfills story vectors that dedup could not write, e.g. when the
/// embedder was down at dedup time.
pub struct ReindexUseCase {
    stories: Arc<dyn StoryRepository>,
    embedder: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
}

impl ReindexUseCase {
    pub fn new(
        stories: Arc<dyn StoryRepository>,
        embedder: Arc<dyn EmbeddingProvider>,
        vector_store: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            stories,
            embedder,
            vector_store,
        }
    }

    /// Embed and index every story missing a vector. Returns the number of
    /// vectors written.
    pub async fn execute(&self) -> Result<usize, DomainError> {
        let missing = self.stories.fetch_missing_vectors()?;
        let mut indexed = 0;

        for story in &missing {
            let vectors = self
                .embedder
                .embed(&[story.embedding_text()], InputType::Document)
                .await?;
            match vectors.into_iter().next() {
                Some(mut v) if !v.is_empty() => {
                    normalize_unit(&mut v);
                    self.vector_store.store(&story.id, &v)?;
                    indexed += 1;
                }
                _ => warn!(story_id = %story.id, "embedder returned no vector"),
            }
        }

        info!(missing = missing.len(), indexed, "reindex complete");
        Ok(indexed)
    }
}
