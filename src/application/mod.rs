pub mod dedup;
pub mod extract_entities;
pub mod ingest;
pub mod map_impacts;
pub mod pipeline;
pub mod query;
pub mod reindex;
pub mod retrieve;
