mod common;

use common::{raw_article, setup, setup_with, FlakyEmbedder, KeywordExtractor, StubEmbedder};
use std::sync::Arc;

#[tokio::test]
async fn ingest_skips_duplicate_urls() {
    let (engine, _dir) = setup();
    let article = raw_article("wire", "https://example.com/a", "Title", "Body text");
    assert_eq!(engine.ingest(vec![article.clone()]).unwrap(), 1);
    assert_eq!(engine.ingest(vec![article]).unwrap(), 0);
    assert_eq!(engine.stats().unwrap().articles, 1);
}

#[tokio::test]
async fn ingest_skips_records_without_url_but_keeps_batch() {
    let (engine, _dir) = setup();
    let saved = engine
        .ingest(vec![
            raw_article("wire", "", "No url", "Body"),
            raw_article("wire", "https://example.com/ok", "Good", "Body"),
        ])
        .unwrap();
    assert_eq!(saved, 1);
}

#[tokio::test]
async fn dedup_without_embeddings_yields_singleton_stories() {
    let (engine, _dir) = setup();
    engine
        .ingest(vec![
            raw_article("wire", "https://example.com/1", "One", "First body"),
            raw_article("wire", "https://example.com/2", "Two", "Second body"),
            raw_article("wire", "https://example.com/3", "Three", "Third body"),
        ])
        .unwrap();
    assert_eq!(engine.dedup().await.unwrap(), 3);
    assert_eq!(engine.stats().unwrap().stories, 3);
}

#[tokio::test]
async fn dedup_clusters_similar_articles_into_one_story() {
    let embedder = StubEmbedder::new(vec![
        ("repo rate", [1.0, 0.0, 0.0, 0.0]),
        ("infosys", [0.0, 1.0, 0.0, 0.0]),
    ]);
    let (engine, _dir) = setup_with(Arc::new(embedder), Arc::new(KeywordExtractor));
    engine
        .ingest(vec![
            raw_article("a", "https://example.com/1", "RBI hikes repo rate", "Banks react"),
            raw_article("b", "https://example.com/2", "Repo rate up 25bps", "RBI decision"),
            raw_article("c", "https://example.com/3", "Infosys wins deal", "IT major"),
        ])
        .unwrap();

    assert_eq!(engine.dedup().await.unwrap(), 2);

    let stories = engine.stories().unwrap();
    let sizes: Vec<usize> = stories.iter().map(|s| s.num_articles).collect();
    assert!(sizes.contains(&2));
    assert!(sizes.contains(&1));
    let merged = stories.iter().find(|s| s.num_articles == 2).unwrap();
    // Combined text concatenates member contents; title comes from the
    // first member.
    assert!(merged.combined_text.contains("Banks react"));
    assert!(merged.combined_text.contains("RBI decision"));
    assert_eq!(merged.article_ids.len(), 2);
}

#[tokio::test]
async fn dedup_is_incremental_across_runs() {
    let (engine, _dir) = setup();
    engine
        .ingest(vec![raw_article("w", "https://example.com/1", "One", "Body")])
        .unwrap();
    assert_eq!(engine.dedup().await.unwrap(), 1);
    // Nothing unclustered left.
    assert_eq!(engine.dedup().await.unwrap(), 0);

    engine
        .ingest(vec![raw_article("w", "https://example.com/2", "Two", "Body")])
        .unwrap();
    assert_eq!(engine.dedup().await.unwrap(), 1);
    assert_eq!(engine.stats().unwrap().stories, 2);
}

#[tokio::test]
async fn full_pipeline_reports_stage_counts() {
    let (engine, _dir) = setup();
    let batch = vec![
        raw_article(
            "wire",
            "https://example.com/rbi",
            "Banking stocks eye RBI repo rate decision",
            "HDFC Bank in focus as the banking sector awaits the RBI repo rate call.",
        ),
        raw_article(
            "wire",
            "https://example.com/it",
            "Infosys posts results",
            "Infosys reported net profit growth.",
        ),
    ];
    let report = engine.run_pipeline(batch.clone()).await.unwrap();
    assert_eq!(report.ingested, 2);
    assert_eq!(report.stories, 2);
    assert_eq!(report.extracted, 2);
    assert_eq!(report.mapped, 2);

    // A re-run of the same batch is a no-op end to end.
    let again = engine.run_pipeline(batch).await.unwrap();
    assert_eq!(again.ingested, 0);
    assert_eq!(again.stories, 0);
    assert_eq!(again.extracted, 0);
    assert_eq!(again.mapped, 0);
}

#[tokio::test]
async fn pipeline_retries_transient_stage_failures() {
    let (engine, _dir) = setup_with(
        Arc::new(FlakyEmbedder::failing(1)),
        Arc::new(KeywordExtractor),
    );
    let report = engine
        .run_pipeline(vec![raw_article(
            "w",
            "https://example.com/1",
            "One",
            "Body",
        )])
        .await
        .unwrap();
    assert_eq!(report.ingested, 1);
    assert_eq!(report.stories, 1);
}

#[tokio::test]
async fn pipeline_gives_up_after_exhausting_retries() {
    let (engine, _dir) = setup_with(
        Arc::new(FlakyEmbedder::failing(u32::MAX)),
        Arc::new(KeywordExtractor),
    );
    let err = engine
        .run_pipeline(vec![raw_article(
            "w",
            "https://example.com/1",
            "One",
            "Body",
        )])
        .await
        .unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("dedup"));
    assert!(msg.contains("3 attempts"));
    // Ingest committed before the failing stage.
    assert_eq!(engine.stats().unwrap().articles, 1);
    assert_eq!(engine.stats().unwrap().stories, 0);
}
