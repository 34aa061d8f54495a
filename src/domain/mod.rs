pub mod cluster;
pub mod entities;
pub mod error;
pub mod impact;
pub mod mappings;
pub mod normalize;
pub mod ports;
pub mod resolve;
pub mod values;
