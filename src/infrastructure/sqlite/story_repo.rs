use crate::domain::entities::story::Story;
use crate::domain::error::DomainError;
use crate::domain::ports::story_repository::StoryRepository;
use chrono::DateTime;
use rusqlite::{params, Connection};
use std::sync::Mutex;

const SELECT_COLS: &str = "id, article_ids, title, combined_text, num_articles, created_at";
/// Same columns qualified for the tag-channel joins.
const SELECT_COLS_ST: &str =
    "st.id, st.article_ids, st.title, st.combined_text, st.num_articles, st.created_at";

pub struct SqliteStoryRepo {
    conn: Mutex<Connection>,
}

impl SqliteStoryRepo {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn row_to_story(row: &rusqlite::Row) -> Result<Story, rusqlite::Error> {
        let ids_str: String = row.get(1)?;
        let num_articles: i64 = row.get(4)?;
        let created_str: String = row.get(5)?;
        Ok(Story {
            id: row.get(0)?,
            article_ids: serde_json::from_str(&ids_str).unwrap_or_default(),
            title: row.get(2)?,
            combined_text: row.get(3)?,
            num_articles: num_articles as usize,
            created_at: DateTime::parse_from_rfc3339(&created_str)
                .map(|dt| dt.with_timezone(&chrono::Utc))
                .unwrap_or_else(|_| chrono::Utc::now()),
        })
    }

    fn escape_like(text: &str) -> String {
        text.replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_")
    }
}

impl StoryRepository for SqliteStoryRepo {
    fn add(&self, story: &Story) -> Result<(), DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        conn.execute(
            "INSERT INTO stories (id, article_ids, title, combined_text, num_articles, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                story.id,
                serde_json::to_string(&story.article_ids).unwrap_or_default(),
                story.title,
                story.combined_text,
                story.num_articles as i64,
                story.created_at.to_rfc3339(),
            ],
        )
        .map_err(|e| DomainError::Database(format!("Failed to add story: {e}")))?;
        Ok(())
    }

    fn fetch_all(&self) -> Result<Vec<Story>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let sql = format!("SELECT {} FROM stories ORDER BY rowid", SELECT_COLS);
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let stories = stmt
            .query_map([], Self::row_to_story)
            .map_err(|e| DomainError::Database(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(stories)
    }

    fn get_by_id(&self, id: &str) -> Result<Option<Story>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let sql = format!("SELECT {} FROM stories WHERE id = ?1", SELECT_COLS);
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut rows = stmt
            .query_map(params![id], Self::row_to_story)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(rows.next().and_then(|r| r.ok()))
    }

    fn fetch_by_ids(&self, ids: &[String]) -> Result<Vec<Story>, DomainError> {
        // One query per id keeps the caller's ordering without dynamic IN
        // list plumbing; id lists here are top-k sized.
        let mut stories = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(story) = self.get_by_id(id)? {
                stories.push(story);
            }
        }
        Ok(stories)
    }

    fn fetch_without_entities(&self) -> Result<Vec<Story>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let sql = format!(
            "SELECT {} FROM stories WHERE id NOT IN (SELECT story_id FROM entities) ORDER BY rowid",
            SELECT_COLS
        );
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let stories = stmt
            .query_map([], Self::row_to_story)
            .map_err(|e| DomainError::Database(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(stories)
    }

    fn fetch_by_sector_tag(&self, sector: &str, limit: usize) -> Result<Vec<Story>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let sql = format!(
            "SELECT {} FROM stories st
             JOIN entities e ON e.story_id = st.id, json_each(e.sectors)
             WHERE LOWER(json_each.value) = LOWER(?1)
             ORDER BY st.rowid LIMIT ?2",
            SELECT_COLS_ST
        );
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let stories = stmt
            .query_map(params![sector, limit as i64], Self::row_to_story)
            .map_err(|e| DomainError::Database(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(stories)
    }

    fn fetch_by_company_tag(
        &self,
        company_like: &str,
        limit: usize,
    ) -> Result<Vec<Story>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let pattern = format!("%{}%", Self::escape_like(&company_like.to_lowercase()));
        let sql = format!(
            "SELECT {} FROM stories st
             JOIN entities e ON e.story_id = st.id, json_each(e.companies)
             WHERE LOWER(json_each.value) LIKE ?1 ESCAPE '\\'
             ORDER BY st.rowid LIMIT ?2",
            SELECT_COLS_ST
        );
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let stories = stmt
            .query_map(params![pattern, limit as i64], Self::row_to_story)
            .map_err(|e| DomainError::Database(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(stories)
    }

    fn fetch_missing_vectors(&self) -> Result<Vec<Story>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let sql = format!(
            "SELECT {} FROM stories WHERE id NOT IN (SELECT id FROM vectors) ORDER BY rowid",
            SELECT_COLS
        );
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let stories = stmt
            .query_map([], Self::row_to_story)
            .map_err(|e| DomainError::Database(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(stories)
    }

    fn count(&self) -> Result<usize, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        conn.query_row("SELECT COUNT(*) FROM stories", [], |r| r.get(0))
            .map_err(|e| DomainError::Database(e.to_string()))
    }
}
