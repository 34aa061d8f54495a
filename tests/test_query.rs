mod common;

use common::{raw_article, setup};
use newsimpact::domain::values::query_type::{QueryType, TimeHorizon};

async fn seed_banking_story(engine: &newsimpact::NewsImpact) {
    engine
        .run_pipeline(vec![raw_article(
            "wire",
            "https://example.com/rbi-repo",
            "Banking stocks eye RBI repo rate decision",
            "HDFC Bank in focus as the banking sector awaits the RBI repo rate call.",
        )])
        .await
        .unwrap();
}

#[tokio::test]
async fn company_query_resolves_symbol_and_finds_tagged_story() {
    let (engine, _dir) = setup();
    seed_banking_story(&engine).await;

    let response = engine
        .query("What is the impact of RBI repo rate on HDFC Bank?", 10)
        .await
        .unwrap();

    assert_eq!(response.structured.query_type, QueryType::Company);
    assert!(response
        .structured
        .entities
        .companies
        .iter()
        .any(|c| c.eq_ignore_ascii_case("hdfc bank")));
    assert!(response.assets.symbols.contains(&"HDFCBANK".to_string()));
    assert!(response.assets.sectors.contains(&"banking".to_string()));

    assert_eq!(response.results.len(), 1);
    // No embedding provider: tag-channel hit, no semantic score.
    assert_eq!(response.results[0].score, None);
}

#[tokio::test]
async fn regulator_query_expands_rule_sectors() {
    let (engine, _dir) = setup();
    seed_banking_story(&engine).await;

    let response = engine
        .query("How will the RBI decision affect markets?", 10)
        .await
        .unwrap();

    assert_eq!(response.structured.query_type, QueryType::Regulator);
    assert!(response.assets.sectors.contains(&"banking".to_string()));
    assert!(response.assets.sectors.contains(&"nbfc".to_string()));
    assert!(response.assets.symbols.contains(&"HDFCBANK".to_string()));
    assert!(response.assets.symbols.contains(&"BAJFINANCE".to_string()));
    assert_eq!(response.results.len(), 1);
}

#[tokio::test]
async fn sector_query_sets_long_horizon_from_keywords() {
    let (engine, _dir) = setup();
    let response = engine
        .query("long term outlook for banking", 10)
        .await
        .unwrap();
    assert_eq!(response.structured.query_type, QueryType::Sector);
    assert_eq!(response.structured.time_horizon, TimeHorizon::Long);
    let banking = ["HDFCBANK", "ICICIBANK", "SBIN", "AXISBANK"];
    for sym in banking {
        assert!(response.assets.symbols.contains(&sym.to_string()));
    }
}

#[tokio::test]
async fn query_without_known_entities_returns_empty() {
    let (engine, _dir) = setup();
    seed_banking_story(&engine).await;

    let response = engine.query("zebra migration patterns", 10).await.unwrap();
    assert_eq!(response.structured.query_type, QueryType::Unknown);
    assert!(response.assets.symbols.is_empty());
    assert!(response.results.is_empty());
}

#[tokio::test]
async fn repeated_mentions_dedupe_in_mapped_assets() {
    let (engine, _dir) = setup();
    let response = engine
        .query("HDFC Bank versus HDFC Bank peers", 10)
        .await
        .unwrap();
    let hdfc_count = response
        .assets
        .symbols
        .iter()
        .filter(|s| s.as_str() == "HDFCBANK")
        .count();
    assert_eq!(hdfc_count, 1);
}
