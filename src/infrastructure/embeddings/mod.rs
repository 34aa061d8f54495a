pub mod noop;
pub mod openai;
