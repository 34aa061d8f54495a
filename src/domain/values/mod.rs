pub mod confidence;
pub mod impact_reason;
pub mod query_type;
pub mod structured_query;
