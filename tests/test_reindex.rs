mod common;

use common::{assets_dir, raw_article, KeywordExtractor, StubEmbedder};
use newsimpact::infrastructure::embeddings::noop::NoopProvider;
use newsimpact::infrastructure::llm::rule_based::RuleBasedRewriter;
use newsimpact::NewsImpact;
use std::sync::Arc;

#[tokio::test]
async fn reindex_backfills_vectors_once_a_provider_is_configured() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("reindex.db");
    let db = db.to_str().unwrap();

    // First run without an embedding provider: stories exist, vectors don't.
    {
        let engine = NewsImpact::with_providers(
            db,
            &assets_dir(),
            Arc::new(NoopProvider),
            Arc::new(KeywordExtractor),
            Arc::new(RuleBasedRewriter),
        )
        .unwrap();
        engine
            .run_pipeline(vec![
                raw_article(
                    "wire",
                    "https://example.com/repo",
                    "Repo rate decision",
                    "The repo rate call will move lenders.",
                ),
                raw_article(
                    "wire",
                    "https://example.com/pharma",
                    "Pharma approvals",
                    "Sun Pharma won a pharma approval.",
                ),
            ])
            .await
            .unwrap();
        // The noop provider cannot produce vectors either.
        assert_eq!(engine.reindex().await.unwrap(), 0);
    }

    // Same database, real (stubbed) provider: the backlog gets embedded.
    let engine = NewsImpact::with_providers(
        db,
        &assets_dir(),
        Arc::new(StubEmbedder::new(vec![
            ("repo rate", [1.0, 0.0, 0.0, 0.0]),
            ("pharma", [0.0, 1.0, 0.0, 0.0]),
        ])),
        Arc::new(KeywordExtractor),
        Arc::new(RuleBasedRewriter),
    )
    .unwrap();

    assert_eq!(engine.reindex().await.unwrap(), 2);
    assert_eq!(engine.reindex().await.unwrap(), 0);

    // The semantic channel works against the backfilled vectors.
    let response = engine.query("repo rate impact", 5).await.unwrap();
    assert!(!response.results.is_empty());
    assert!(response.results[0].combined_text.contains("repo rate"));
    assert!(response.results[0].score.unwrap() > 0.99);
}
