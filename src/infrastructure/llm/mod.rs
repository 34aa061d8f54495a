pub mod openai_rewriter;
pub mod rule_based;
