use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A raw news article as delivered by an upstream feed. Identity key is the
/// url (UNIQUE in storage); articles are immutable once stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub source: String,
    pub url: String,
    pub title: String,
    pub content: String,
    pub published_at: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Article {
    pub fn new(
        source: String,
        url: String,
        title: String,
        content: String,
        published_at: Option<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            source,
            url,
            title,
            content,
            published_at,
            created_at: Utc::now(),
        }
    }

    /// Text used when embedding an article for dedup clustering.
    pub fn embedding_text(&self) -> String {
        format!("{} {}", self.title, self.content)
    }
}
