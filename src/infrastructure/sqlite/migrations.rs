use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<(), String> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS articles (
            id TEXT PRIMARY KEY,
            source TEXT NOT NULL,
            url TEXT NOT NULL UNIQUE,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            published_at TEXT,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS stories (
            id TEXT PRIMARY KEY,
            article_ids TEXT NOT NULL DEFAULT '[]',
            title TEXT NOT NULL,
            combined_text TEXT NOT NULL,
            num_articles INTEGER NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS entities (
            story_id TEXT PRIMARY KEY,
            companies TEXT NOT NULL DEFAULT '[]',
            sectors TEXT NOT NULL DEFAULT '[]',
            people TEXT NOT NULL DEFAULT '[]',
            indices TEXT NOT NULL DEFAULT '[]',
            regulators TEXT NOT NULL DEFAULT '[]',
            policies TEXT NOT NULL DEFAULT '[]',
            products TEXT NOT NULL DEFAULT '[]',
            locations TEXT NOT NULL DEFAULT '[]',
            kpis TEXT NOT NULL DEFAULT '[]',
            financial_terms TEXT NOT NULL DEFAULT '[]'
        );

        CREATE TABLE IF NOT EXISTS impacts (
            story_id TEXT NOT NULL,
            symbol TEXT NOT NULL,
            confidence REAL NOT NULL,
            reason TEXT NOT NULL,
            flags TEXT NOT NULL DEFAULT '[]',
            PRIMARY KEY (story_id, symbol)
        );

        CREATE TABLE IF NOT EXISTS impact_summaries (
            story_id TEXT PRIMARY KEY,
            summary TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS vectors (
            id TEXT PRIMARY KEY,
            vector BLOB NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_articles_created ON articles(created_at);
        CREATE INDEX IF NOT EXISTS idx_stories_created ON stories(created_at);
        CREATE INDEX IF NOT EXISTS idx_impacts_symbol ON impacts(symbol);
        ",
    )
    .map_err(|e| format!("Migration failed: {e}"))
}
