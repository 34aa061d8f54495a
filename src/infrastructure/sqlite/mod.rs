pub mod article_repo;
pub mod entity_repo;
pub mod impact_repo;
pub mod migrations;
pub mod story_repo;
pub mod vector_store;
