use crate::domain::entities::entity_bag::EntityBag;
use crate::domain::error::DomainError;
use crate::domain::ports::entity_repository::EntityRepository;
use rusqlite::{params, Connection};
use std::sync::Mutex;

const SELECT_COLS: &str = "story_id, companies, sectors, people, indices, regulators, policies, products, locations, kpis, financial_terms";

pub struct SqliteEntityRepo {
    conn: Mutex<Connection>,
}

impl SqliteEntityRepo {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn row_to_bag(row: &rusqlite::Row) -> Result<EntityBag, rusqlite::Error> {
        fn list(row: &rusqlite::Row, idx: usize) -> Result<Vec<String>, rusqlite::Error> {
            let raw: String = row.get(idx)?;
            Ok(serde_json::from_str(&raw).unwrap_or_default())
        }
        Ok(EntityBag {
            story_id: row.get(0)?,
            companies: list(row, 1)?,
            sectors: list(row, 2)?,
            people: list(row, 3)?,
            indices: list(row, 4)?,
            regulators: list(row, 5)?,
            policies: list(row, 6)?,
            products: list(row, 7)?,
            locations: list(row, 8)?,
            kpis: list(row, 9)?,
            financial_terms: list(row, 10)?,
        })
    }
}

impl EntityRepository for SqliteEntityRepo {
    fn save(&self, bag: &EntityBag) -> Result<(), DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let json = |v: &Vec<String>| serde_json::to_string(v).unwrap_or_default();
        conn.execute(
            "INSERT OR REPLACE INTO entities (story_id, companies, sectors, people, indices, regulators, policies, products, locations, kpis, financial_terms)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                bag.story_id,
                json(&bag.companies),
                json(&bag.sectors),
                json(&bag.people),
                json(&bag.indices),
                json(&bag.regulators),
                json(&bag.policies),
                json(&bag.products),
                json(&bag.locations),
                json(&bag.kpis),
                json(&bag.financial_terms),
            ],
        )
        .map_err(|e| DomainError::Database(format!("Failed to save entities: {e}")))?;
        Ok(())
    }

    fn get(&self, story_id: &str) -> Result<Option<EntityBag>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let sql = format!("SELECT {} FROM entities WHERE story_id = ?1", SELECT_COLS);
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut rows = stmt
            .query_map(params![story_id], Self::row_to_bag)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(rows.next().and_then(|r| r.ok()))
    }

    fn fetch_unmapped(&self) -> Result<Vec<EntityBag>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        // Summaries exist for every mapped story, including no-impact ones,
        // so the anti-join runs against impact_summaries, not impacts.
        let sql = format!(
            "SELECT {} FROM entities WHERE story_id NOT IN (SELECT story_id FROM impact_summaries) ORDER BY rowid",
            SELECT_COLS
        );
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let bags = stmt
            .query_map([], Self::row_to_bag)
            .map_err(|e| DomainError::Database(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(bags)
    }

    fn count(&self) -> Result<usize, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        conn.query_row("SELECT COUNT(*) FROM entities", [], |r| r.get(0))
            .map_err(|e| DomainError::Database(e.to_string()))
    }
}
