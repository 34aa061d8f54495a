use crate::domain::entities::impact_record::ImpactRecord;
use crate::domain::error::DomainError;
use crate::domain::ports::impact_repository::ImpactRepository;
use crate::domain::values::confidence::Confidence;
use crate::domain::values::impact_reason::ImpactReason;
use rusqlite::{params, Connection};
use std::sync::Mutex;

pub struct SqliteImpactRepo {
    conn: Mutex<Connection>,
}

impl SqliteImpactRepo {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn row_to_record(row: &rusqlite::Row) -> Result<ImpactRecord, rusqlite::Error> {
        let conf_val: f64 = row.get(2)?;
        let reason_str: String = row.get(3)?;
        let flags_str: String = row.get(4)?;
        let flags: Vec<String> = serde_json::from_str(&flags_str).unwrap_or_default();
        Ok(ImpactRecord {
            story_id: row.get(0)?,
            symbol: row.get(1)?,
            confidence: Confidence::new(conf_val).unwrap_or_default(),
            reason: reason_str.parse().unwrap_or(ImpactReason::Semantic),
            flags: flags.iter().filter_map(|f| f.parse().ok()).collect(),
        })
    }
}

impl ImpactRepository for SqliteImpactRepo {
    fn save_all(
        &self,
        story_id: &str,
        records: &[ImpactRecord],
        summary: &str,
    ) -> Result<(), DomainError> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let tx = conn
            .transaction()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        tx.execute("DELETE FROM impacts WHERE story_id = ?1", params![story_id])
            .map_err(|e| DomainError::Database(e.to_string()))?;
        for record in records {
            let flags: Vec<String> = record.flags.iter().map(|f| f.to_string()).collect();
            tx.execute(
                "INSERT OR REPLACE INTO impacts (story_id, symbol, confidence, reason, flags)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    record.story_id,
                    record.symbol,
                    record.confidence.value(),
                    record.reason.to_string(),
                    serde_json::to_string(&flags).unwrap_or_default(),
                ],
            )
            .map_err(|e| DomainError::Database(format!("Failed to save impact: {e}")))?;
        }
        tx.execute(
            "INSERT OR REPLACE INTO impact_summaries (story_id, summary) VALUES (?1, ?2)",
            params![story_id, summary],
        )
        .map_err(|e| DomainError::Database(format!("Failed to save summary: {e}")))?;
        tx.commit()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(())
    }

    fn fetch_by_story(&self, story_id: &str) -> Result<Vec<ImpactRecord>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut stmt = conn
            .prepare(
                "SELECT story_id, symbol, confidence, reason, flags FROM impacts
                 WHERE story_id = ?1 ORDER BY confidence DESC, rowid",
            )
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let records = stmt
            .query_map(params![story_id], Self::row_to_record)
            .map_err(|e| DomainError::Database(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(records)
    }

    fn summary_for_story(&self, story_id: &str) -> Result<Option<String>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut stmt = conn
            .prepare("SELECT summary FROM impact_summaries WHERE story_id = ?1")
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut rows = stmt
            .query_map(params![story_id], |row| row.get::<_, String>(0))
            .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(rows.next().and_then(|r| r.ok()))
    }

    fn count(&self) -> Result<usize, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        conn.query_row("SELECT COUNT(*) FROM impacts", [], |r| r.get(0))
            .map_err(|e| DomainError::Database(e.to_string()))
    }
}
