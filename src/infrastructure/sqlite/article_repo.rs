use crate::domain::entities::article::Article;
use crate::domain::error::DomainError;
use crate::domain::ports::article_repository::ArticleRepository;
use chrono::DateTime;
use rusqlite::{params, Connection};
use std::sync::Mutex;

const SELECT_COLS: &str = "id, source, url, title, content, published_at, created_at";

pub struct SqliteArticleRepo {
    conn: Mutex<Connection>,
}

impl SqliteArticleRepo {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn row_to_article(row: &rusqlite::Row) -> Result<Article, rusqlite::Error> {
        let created_str: String = row.get(6)?;
        Ok(Article {
            id: row.get(0)?,
            source: row.get(1)?,
            url: row.get(2)?,
            title: row.get(3)?,
            content: row.get(4)?,
            published_at: row.get(5)?,
            created_at: DateTime::parse_from_rfc3339(&created_str)
                .map(|dt| dt.with_timezone(&chrono::Utc))
                .unwrap_or_else(|_| chrono::Utc::now()),
        })
    }
}

impl ArticleRepository for SqliteArticleRepo {
    fn add(&self, article: &Article) -> Result<bool, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO articles (id, source, url, title, content, published_at, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    article.id,
                    article.source,
                    article.url,
                    article.title,
                    article.content,
                    article.published_at,
                    article.created_at.to_rfc3339(),
                ],
            )
            .map_err(|e| DomainError::Database(format!("Failed to add article: {e}")))?;
        Ok(inserted > 0)
    }

    fn fetch_all(&self) -> Result<Vec<Article>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let sql = format!("SELECT {} FROM articles ORDER BY rowid", SELECT_COLS);
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let articles = stmt
            .query_map([], Self::row_to_article)
            .map_err(|e| DomainError::Database(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(articles)
    }

    fn fetch_unclustered(&self) -> Result<Vec<Article>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        // Membership test against the stories' JSON id arrays. Article ids
        // are uuids, so the quoted LIKE pattern cannot false-positive.
        let sql = format!(
            "SELECT {} FROM articles a
             WHERE NOT EXISTS (
                 SELECT 1 FROM stories s WHERE s.article_ids LIKE '%\"' || a.id || '\"%'
             )
             ORDER BY a.rowid",
            SELECT_COLS
        );
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let articles = stmt
            .query_map([], Self::row_to_article)
            .map_err(|e| DomainError::Database(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(articles)
    }

    fn count(&self) -> Result<usize, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        conn.query_row("SELECT COUNT(*) FROM articles", [], |r| r.get(0))
            .map_err(|e| DomainError::Database(e.to_string()))
    }
}
