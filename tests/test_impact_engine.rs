mod common;

use common::{raw_article, setup};
use newsimpact::domain::values::impact_reason::ImpactReason;

#[tokio::test]
async fn banking_story_flags_direct_sector_and_policy_tiers() {
    let (engine, _dir) = setup();
    engine
        .run_pipeline(vec![raw_article(
            "wire",
            "https://example.com/rbi-repo",
            "Banking stocks eye RBI repo rate decision",
            "HDFC Bank in focus as the banking sector awaits the RBI repo rate call.",
        )])
        .await
        .unwrap();

    let story = engine.stories().unwrap().into_iter().next().unwrap();
    let bag = engine.story_entities(&story.id).unwrap().unwrap();
    assert_eq!(bag.companies, vec!["HDFC Bank".to_string()]);
    assert_eq!(bag.regulators, vec!["RBI".to_string()]);
    assert_eq!(bag.policies, vec!["repo rate".to_string()]);
    assert!(bag.sectors.iter().any(|s| s.eq_ignore_ascii_case("banking")));

    let (records, summary) = engine.story_impacts(&story.id).unwrap();

    // "HDFC Bank" is an approximate match for "HDFC Bank Limited", so the
    // gazetteer tier applies, not the direct one.
    let hdfc = records.iter().find(|r| r.symbol == "HDFCBANK").unwrap();
    assert_eq!(hdfc.reason, ImpactReason::Gazetteer);
    assert_eq!(hdfc.confidence.value(), 0.95);
    assert!(hdfc.flags.contains(&ImpactReason::Sector));
    assert!(hdfc.flags.contains(&ImpactReason::Regulatory));
    assert!(hdfc.flags.contains(&ImpactReason::Policy));

    // Peer banks ride the sector tier.
    let icici = records.iter().find(|r| r.symbol == "ICICIBANK").unwrap();
    assert_eq!(icici.reason, ImpactReason::Sector);
    assert_eq!(icici.confidence.value(), 0.70);

    // "repo rate" also reaches autos, which have no other flag.
    let maruti = records.iter().find(|r| r.symbol == "MARUTI").unwrap();
    assert_eq!(maruti.reason, ImpactReason::Policy);
    assert_eq!(maruti.confidence.value(), 0.60);

    // Descending confidence, HDFC first.
    assert_eq!(records[0].symbol, "HDFCBANK");
    let confidences: Vec<f64> = records.iter().map(|r| r.confidence.value()).collect();
    assert!(confidences.windows(2).all(|w| w[0] >= w[1]));

    assert!(summary.contains("HDFCBANK"));
    assert_ne!(summary, "No significant impact detected.");
}

#[tokio::test]
async fn story_without_financial_entities_gets_sentinel_summary() {
    let (engine, _dir) = setup();
    engine
        .run_pipeline(vec![raw_article(
            "wire",
            "https://example.com/weather",
            "Pleasant weekend ahead",
            "Clear skies expected across the region on Saturday.",
        )])
        .await
        .unwrap();

    let story = engine.stories().unwrap().into_iter().next().unwrap();
    let (records, summary) = engine.story_impacts(&story.id).unwrap();
    assert!(records.is_empty());
    assert_eq!(summary, "No significant impact detected.");
}

#[tokio::test]
async fn remapping_replaces_previous_records() {
    let (engine, _dir) = setup();
    engine
        .run_pipeline(vec![raw_article(
            "wire",
            "https://example.com/icici",
            "ICICI Bank quarterly update",
            "ICICI Bank reported numbers for the quarter.",
        )])
        .await
        .unwrap();

    let story = engine.stories().unwrap().into_iter().next().unwrap();
    let (before, _) = engine.story_impacts(&story.id).unwrap();
    assert!(!before.is_empty());

    // Re-running mapping is a no-op for already-mapped stories.
    assert_eq!(engine.map_impacts().unwrap(), 0);
    let (after, _) = engine.story_impacts(&story.id).unwrap();
    assert_eq!(before.len(), after.len());
}
