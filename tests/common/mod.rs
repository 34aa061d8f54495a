//! Shared test helpers.

use newsimpact::application::ingest::RawArticle;
use newsimpact::domain::error::DomainError;
use newsimpact::domain::ports::embedding_port::{EmbeddingProvider, InputType};
use newsimpact::domain::ports::entity_extractor::{EntityExtractor, NerMention};
use newsimpact::infrastructure::embeddings::noop::NoopProvider;
use newsimpact::infrastructure::llm::rule_based::RuleBasedRewriter;
use newsimpact::NewsImpact;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

pub fn assets_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("assets")
}

/// Engine over a temp-file database with the repo's sample asset tables.
/// The `TempDir` must outlive the engine.
pub fn setup_with(
    embedder: Arc<dyn EmbeddingProvider>,
    extractor: Arc<dyn EntityExtractor>,
) -> (NewsImpact, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("test.db");
    let engine = NewsImpact::with_providers(
        db.to_str().unwrap(),
        &assets_dir(),
        embedder,
        extractor,
        Arc::new(RuleBasedRewriter),
    )
    .unwrap();
    (engine, dir)
}

pub fn setup() -> (NewsImpact, TempDir) {
    setup_with(Arc::new(NoopProvider), Arc::new(KeywordExtractor))
}

pub fn raw_article(source: &str, url: &str, title: &str, content: &str) -> RawArticle {
    RawArticle {
        source: source.to_string(),
        url: url.to_string(),
        title: title.to_string(),
        content: content.to_string(),
        published_at: None,
    }
}

/// Embedder mapping keyword-bearing texts to fixed unit vectors, so tests
/// control exactly which texts cluster or rank together.
pub struct StubEmbedder {
    rules: Vec<(&'static str, [f32; 4])>,
}

impl StubEmbedder {
    pub fn new(rules: Vec<(&'static str, [f32; 4])>) -> Self {
        Self { rules }
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for StubEmbedder {
    async fn embed(
        &self,
        texts: &[String],
        _input_type: InputType,
    ) -> Result<Vec<Vec<f32>>, DomainError> {
        Ok(texts
            .iter()
            .map(|t| {
                let lower = t.to_lowercase();
                self.rules
                    .iter()
                    .find(|(key, _)| lower.contains(&key.to_lowercase()))
                    .map(|(_, v)| v.to_vec())
                    .unwrap_or_else(|| vec![0.0, 0.0, 0.0, 1.0])
            })
            .collect())
    }

    fn dimension(&self) -> usize {
        4
    }
}

/// Embedder that fails its first `fail_first` calls, then behaves like the
/// noop provider. Exercises stage retries.
pub struct FlakyEmbedder {
    remaining_failures: AtomicU32,
}

impl FlakyEmbedder {
    pub fn failing(fail_first: u32) -> Self {
        Self {
            remaining_failures: AtomicU32::new(fail_first),
        }
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for FlakyEmbedder {
    async fn embed(
        &self,
        texts: &[String],
        _input_type: InputType,
    ) -> Result<Vec<Vec<f32>>, DomainError> {
        let remaining = self.remaining_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.remaining_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(DomainError::Embedding("transient outage".to_string()));
        }
        Ok(texts.iter().map(|_| vec![]).collect())
    }

    fn dimension(&self) -> usize {
        0
    }
}

/// Deterministic NER stand-in: exact-substring scan for a handful of names.
pub struct KeywordExtractor;

const NER_TERMS: &[(&str, &str)] = &[
    ("HDFC Bank", "ORG"),
    ("ICICI Bank", "ORG"),
    ("Infosys", "ORG"),
    ("Tata Motors", "ORG"),
    ("Shaktikanta Das", "PER"),
    ("Mumbai", "LOC"),
];

#[async_trait::async_trait]
impl EntityExtractor for KeywordExtractor {
    async fn extract(&self, text: &str) -> Result<Vec<NerMention>, DomainError> {
        let mut mentions = Vec::new();
        for (term, label) in NER_TERMS {
            if let Some(pos) = text.find(term) {
                mentions.push(NerMention {
                    label: label.to_string(),
                    text: term.to_string(),
                    score: 0.95,
                    start: pos,
                    end: pos + term.len(),
                });
            }
        }
        Ok(mentions)
    }
}
