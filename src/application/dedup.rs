use crate::domain::cluster::{cluster_default, normalize_unit};
use crate::domain::entities::article::Article;
use crate::domain::entities::story::Story;
use crate::domain::error::DomainError;
use crate::domain::ports::article_repository::ArticleRepository;
use crate::domain::ports::embedding_port::{EmbeddingProvider, InputType};
use crate::domain::ports::story_repository::StoryRepository;
use crate::domain::ports::vector_store::VectorStore;
use std::sync::Arc;
use tracing::{info, warn};

pub struct DedupUseCase {
    articles: Arc<dyn ArticleRepository>,
    stories: Arc<dyn StoryRepository>,
    embedder: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
}

impl DedupUseCase {
    pub fn new(
        articles: Arc<dyn ArticleRepository>,
        stories: Arc<dyn StoryRepository>,
        embedder: Arc<dyn EmbeddingProvider>,
        vector_store: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            articles,
            stories,
            embedder,
            vector_store,
        }
    }

    /// Cluster not-yet-clustered articles into unique stories. Returns the
    /// number of stories created.
    pub async fn execute(&self) -> Result<usize, DomainError> {
        let articles = self.articles.fetch_unclustered()?;
        if articles.is_empty() {
            info!("no unclustered articles");
            return Ok(0);
        }

        let texts: Vec<String> = articles.iter().map(|a| a.embedding_text()).collect();
        let mut vectors = self.embedder.embed(&texts, InputType::Document).await?;

        let clusters = if vectors.iter().any(|v| v.is_empty()) {
            // No embedding available: every article becomes its own story.
            warn!("embedder returned empty vectors; skipping similarity clustering");
            (0..articles.len()).map(|i| vec![i]).collect()
        } else {
            // The sim = 1 - d²/2 conversion is only valid for unit vectors.
            for v in &mut vectors {
                normalize_unit(v);
            }
            cluster_default(&vectors)
        };

        let created = clusters.len();
        for members in &clusters {
            let member_articles: Vec<&Article> = members.iter().map(|&i| &articles[i]).collect();
            let story = Story::from_cluster(&member_articles);
            self.stories.add(&story)?;
            self.index_story(&story).await;
        }

        info!(articles = articles.len(), stories = created, "dedup complete");
        Ok(created)
    }

    /// Best-effort story embedding for the semantic channel; a failure here
    /// never fails dedup (reindex can fill the gap later).
    async fn index_story(&self, story: &Story) {
        match self
            .embedder
            .embed(&[story.embedding_text()], InputType::Document)
            .await
        {
            Ok(vectors) => {
                if let Some(v) = vectors.first() {
                    if !v.is_empty() {
                        let mut v = v.clone();
                        normalize_unit(&mut v);
                        if let Err(e) = self.vector_store.store(&story.id, &v) {
                            warn!(story_id = %story.id, error = %e, "failed to store story vector");
                        }
                    }
                }
            }
            Err(e) => warn!(story_id = %story.id, error = %e, "story embedding failed"),
        }
    }
}
