use crate::domain::error::DomainError;
use crate::domain::ports::vector_store::VectorStore;
use rusqlite::{params, Connection};
use std::sync::Mutex;

/// Brute-force cosine scan over little-endian f32 blobs. Fine at the story
/// counts this system sees; swap for an ANN index if that changes.
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
}

fn to_blob(v: &[f32]) -> Vec<u8> {
    v.iter().flat_map(|f| f.to_le_bytes()).collect()
}

fn from_blob(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

/// Cosine similarity; callers store unit vectors but stored rows from older
/// providers may not be, so both norms are computed.
fn cosine(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| *x as f64 * *y as f64).sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

impl SqliteVectorStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

impl VectorStore for SqliteVectorStore {
    fn store(&self, id: &str, vector: &[f32]) -> Result<(), DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        conn.execute(
            "INSERT OR REPLACE INTO vectors (id, vector) VALUES (?1, ?2)",
            params![id, to_blob(vector)],
        )
        .map_err(|e| DomainError::Database(format!("Failed to store vector: {e}")))?;
        Ok(())
    }

    fn search_similar(
        &self,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<(String, f64)>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut stmt = conn
            .prepare("SELECT id, vector FROM vectors")
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut scored: Vec<(String, f64)> = stmt
            .query_map([], |row| {
                let id: String = row.get(0)?;
                let blob: Vec<u8> = row.get(1)?;
                Ok((id, blob))
            })
            .map_err(|e| DomainError::Database(e.to_string()))?
            .filter_map(|r| r.ok())
            .map(|(id, blob)| {
                let sim = cosine(vector, &from_blob(&blob));
                (id, sim)
            })
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);
        Ok(scored)
    }

    fn has_vector(&self, id: &str) -> Result<bool, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM vectors WHERE id = ?1",
                params![id],
                |r| r.get(0),
            )
            .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(count > 0)
    }
}
