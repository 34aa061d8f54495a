use super::article::Article;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A deduplicated cluster of one or more articles treated as a single news
/// event. Immutable after creation: clusters are never merged later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Story {
    pub id: String,
    /// Member article ids, ordered by original article index.
    pub article_ids: Vec<String>,
    /// Title of the first cluster member (smallest original index).
    pub title: String,
    /// Space-joined content of all cluster members.
    pub combined_text: String,
    pub num_articles: usize,
    pub created_at: DateTime<Utc>,
}

impl Story {
    /// Build a story from cluster members. `members` must be non-empty and
    /// ordered by original article index.
    pub fn from_cluster(members: &[&Article]) -> Self {
        let combined_text = members
            .iter()
            .map(|a| a.content.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            article_ids: members.iter().map(|a| a.id.clone()).collect(),
            title: members.first().map(|a| a.title.clone()).unwrap_or_default(),
            combined_text,
            num_articles: members.len(),
            created_at: Utc::now(),
        }
    }

    /// Text used when embedding a story for semantic retrieval.
    pub fn embedding_text(&self) -> String {
        if self.title.is_empty() {
            self.combined_text.clone()
        } else {
            format!("{} {}", self.title, self.combined_text)
        }
    }
}
