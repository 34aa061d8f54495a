pub mod article;
pub mod entity_bag;
pub mod impact_record;
pub mod story;
