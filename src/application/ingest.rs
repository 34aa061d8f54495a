use crate::domain::entities::article::Article;
use crate::domain::error::DomainError;
use crate::domain::ports::article_repository::ArticleRepository;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A pre-fetched article as delivered by an upstream feed adapter. Feed
/// access itself (RSS etc.) lives outside the core.
#[derive(Debug, Clone, Deserialize)]
pub struct RawArticle {
    pub source: String,
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub published_at: Option<String>,
}

fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub struct IngestUseCase {
    articles: Arc<dyn ArticleRepository>,
}

impl IngestUseCase {
    pub fn new(articles: Arc<dyn ArticleRepository>) -> Self {
        Self { articles }
    }

    /// Standardize and store articles. Url is the identity key: duplicates
    /// are skipped. A failing record is logged and skipped, never aborts
    /// the batch. Returns the number of newly stored articles.
    pub fn execute(&self, raw: Vec<RawArticle>) -> Result<usize, DomainError> {
        let mut saved = 0;
        for r in raw {
            if r.url.trim().is_empty() {
                warn!(source = %r.source, "skipping article without url");
                continue;
            }
            let article = Article::new(
                r.source,
                r.url.trim().to_string(),
                clean_text(&r.title),
                clean_text(&r.content),
                r.published_at,
            );
            match self.articles.add(&article) {
                Ok(true) => saved += 1,
                Ok(false) => debug!(url = %article.url, "duplicate url, skipped"),
                Err(e) => warn!(url = %article.url, error = %e, "failed to insert article"),
            }
        }
        info!(saved, "ingest complete");
        Ok(saved)
    }
}
