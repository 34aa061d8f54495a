pub mod assets;
pub mod embeddings;
pub mod llm;
pub mod ner;
pub mod sqlite;
