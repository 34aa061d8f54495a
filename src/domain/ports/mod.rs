pub mod article_repository;
pub mod embedding_port;
pub mod entity_extractor;
pub mod entity_repository;
pub mod impact_repository;
pub mod query_rewriter;
pub mod story_repository;
pub mod vector_store;
