//! Entity normalization: merges rule/gazetteer matches and external NER
//! output into one canonical `EntityBag` per story.
//!
//! Pure function of (text, NER mentions, gazetteer). The notable rules:
//!
//! - Subword fragments from wordpiece tokenizers (`##`-continuations) are
//!   glued back onto the preceding mention before any matching.
//! - Gazetteer matching is longest-match-first with an occupied-position
//!   mask, so each character position feeds at most one match per category.
//! - Regulator / KPI / financial-term vocabulary beats company tagging: a
//!   company candidate colliding with those terms is rejected.
//! - Company candidates that are substrings of an accepted longer candidate
//!   collapse into the longer one ("HDFC" folds into "HDFC Bank").
//! - Every category list is deduplicated case-insensitively, preserving
//!   first-seen casing and order.

use crate::domain::entities::entity_bag::EntityBag;
use crate::domain::mappings::Gazetteer;
use crate::domain::ports::entity_extractor::NerMention;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static MONEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(₹\s?\d[\d,]*(?:\.\d+)?|\b\d+(?:\.\d+)?\s?(?:crore|lakh|million|billion)\b)")
        .expect("money regex")
});

static PERCENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d+(?:\.\d+)?\s?%").expect("percent regex"));

static KPI_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:Q[1-4]\s?(?:results|earnings)|EBITDA|PAT|EPS|Revenue|Profit)\b")
        .expect("kpi regex")
});

/// Collapse internal whitespace runs and trim.
fn clean(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Case-insensitive dedup preserving first-seen casing and order. Entries
/// are whitespace-cleaned; empties are dropped.
pub fn dedupe_preserving(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for item in items {
        let cleaned = clean(&item);
        if cleaned.is_empty() {
            continue;
        }
        if seen.insert(cleaned.to_lowercase()) {
            out.push(cleaned);
        }
    }
    out
}

/// Reconstruct wordpiece-fragmented mentions: a mention starting with `##`
/// is glued (no space) onto the preceding mention; stray `##` markers are
/// stripped.
pub fn repair_subword_tokens(mentions: Vec<NerMention>) -> Vec<NerMention> {
    let mut out: Vec<NerMention> = Vec::with_capacity(mentions.len());
    for m in mentions {
        if let Some(fragment) = m.text.strip_prefix("##") {
            if let Some(prev) = out.last_mut() {
                prev.text.push_str(&fragment.replace("##", ""));
                prev.end = m.end;
                continue;
            }
        }
        let mut m = m;
        m.text = m.text.replace("##", "");
        out.push(m);
    }
    out
}

/// Longest-match-first, case-insensitive gazetteer scan. Character positions
/// of a match are marked occupied so shorter overlapping terms are
/// suppressed in the same category pass. Returns matched terms in their
/// gazetteer casing, longest first.
pub fn gazetteer_scan(text: &str, terms: &[String]) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut occupied = vec![false; lowered.len()];

    let mut sorted: Vec<&String> = terms.iter().filter(|t| !t.trim().is_empty()).collect();
    sorted.sort_by_key(|t| std::cmp::Reverse(t.chars().count()));

    let mut found = Vec::new();
    for term in sorted {
        let needle = term.to_lowercase();
        let mut matched = false;
        for (pos, _) in lowered.match_indices(&needle) {
            let span = pos..pos + needle.len();
            if occupied[span.clone()].iter().any(|&b| b) {
                continue;
            }
            for b in &mut occupied[span] {
                *b = true;
            }
            matched = true;
        }
        if matched {
            found.push(term.clone());
        }
    }
    found
}

/// NER label buckets the core consumes. Anything else is ignored.
enum LabelClass {
    Org,
    Person,
    Location,
    Other,
}

fn classify_label(label: &str) -> LabelClass {
    let l = label
        .trim_start_matches("B-")
        .trim_start_matches("I-")
        .to_uppercase();
    match l.as_str() {
        "ORG" | "MISC" => LabelClass::Org,
        "PER" | "PERSON" => LabelClass::Person,
        "LOC" | "GPE" => LabelClass::Location,
        _ => LabelClass::Other,
    }
}

/// Keep only the longest of mutually containing candidates. Case-insensitive
/// containment; the longer string replaces a shorter accepted one in place.
fn collapse_substrings(items: Vec<String>) -> Vec<String> {
    let mut kept: Vec<String> = Vec::new();
    'outer: for cand in items {
        let cl = cand.to_lowercase();
        for k in kept.iter_mut() {
            let kl = k.to_lowercase();
            if kl.contains(&cl) {
                continue 'outer;
            }
            if cl.contains(&kl) {
                *k = cand.clone();
                continue 'outer;
            }
        }
        kept.push(cand);
    }
    kept
}

/// Merge rule matches against `text` with external NER mentions into one
/// canonical bag for the story.
pub fn merge_entities(
    story_id: &str,
    text: &str,
    ner_mentions: Vec<NerMention>,
    gazetteer: &Gazetteer,
) -> EntityBag {
    let repaired = repair_subword_tokens(ner_mentions);

    let mut company_candidates = gazetteer_scan(text, &gazetteer.companies_custom);
    let mut people = Vec::new();
    let mut locations = Vec::new();
    for m in &repaired {
        match classify_label(&m.label) {
            LabelClass::Org => company_candidates.push(m.text.clone()),
            LabelClass::Person => people.push(m.text.clone()),
            LabelClass::Location => locations.push(m.text.clone()),
            LabelClass::Other => {}
        }
    }

    let mut kpis = gazetteer_scan(text, &gazetteer.kpi_terms);
    for m in KPI_RE.find_iter(text) {
        kpis.push(m.as_str().to_string());
    }

    let mut financial_terms = gazetteer_scan(text, &gazetteer.financial_terms);
    for m in MONEY_RE.find_iter(text) {
        financial_terms.push(m.as_str().to_string());
    }
    for m in PERCENT_RE.find_iter(text) {
        financial_terms.push(m.as_str().to_string());
    }

    // Regulators, KPIs and financial terms outrank company tagging: reject
    // company candidates colliding with that vocabulary.
    let conflict_vocab: HashSet<String> = gazetteer
        .regulators
        .iter()
        .chain(gazetteer.kpi_terms.iter())
        .chain(gazetteer.financial_terms.iter())
        .map(|t| t.to_lowercase())
        .collect();
    company_candidates.retain(|c| !conflict_vocab.contains(&clean(c).to_lowercase()));

    let companies = collapse_substrings(dedupe_preserving(company_candidates));

    let mut bag = EntityBag::new(story_id.to_string());
    bag.companies = dedupe_preserving(companies);
    bag.sectors = dedupe_preserving(gazetteer_scan(text, &gazetteer.sectors));
    bag.people = dedupe_preserving(people);
    bag.indices = dedupe_preserving(gazetteer_scan(text, &gazetteer.indices));
    bag.regulators = dedupe_preserving(gazetteer_scan(text, &gazetteer.regulators));
    bag.policies = dedupe_preserving(gazetteer_scan(text, &gazetteer.policies));
    bag.products = dedupe_preserving(gazetteer_scan(text, &gazetteer.products));
    bag.locations = dedupe_preserving(locations);
    bag.kpis = dedupe_preserving(kpis);
    bag.financial_terms = dedupe_preserving(financial_terms);
    bag
}

/// Split text into word chunks for independent NER calls. A failed chunk is
/// skipped by the extract stage, not retried here.
pub fn chunk_words(text: &str, words_per_chunk: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return Vec::new();
    }
    words
        .chunks(words_per_chunk.max(1))
        .map(|c| c.join(" "))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mention(label: &str, text: &str) -> NerMention {
        NerMention {
            label: label.to_string(),
            text: text.to_string(),
            score: 0.9,
            start: 0,
            end: text.len(),
        }
    }

    fn gazetteer() -> Gazetteer {
        Gazetteer {
            regulators: vec!["RBI".into(), "Reserve Bank of India".into(), "SEBI".into()],
            indices: vec!["Nifty 50".into(), "Sensex".into()],
            sectors: vec!["Banking".into(), "Pharma".into()],
            policies: vec!["repo rate".into(), "CRR".into()],
            financial_terms: vec!["dividend".into(), "buyback".into()],
            kpi_terms: vec!["net profit".into()],
            products: vec!["UPI".into()],
            companies_custom: vec!["HDFC Bank".into(), "Reliance".into()],
        }
    }

    #[test]
    fn longest_gazetteer_match_suppresses_shorter_overlap() {
        // Both "Reserve Bank of India" and "RBI" are regulator terms, but
        // "Reserve Bank" would also be caught by a shorter term list; the
        // occupied mask keeps only the longest span.
        let terms = vec!["Reserve Bank".to_string(), "Reserve Bank of India".to_string()];
        let found = gazetteer_scan("The Reserve Bank of India held rates.", &terms);
        assert_eq!(found, vec!["Reserve Bank of India".to_string()]);
    }

    #[test]
    fn shorter_term_still_matches_elsewhere() {
        let terms = vec!["Reserve Bank".to_string(), "Reserve Bank of India".to_string()];
        let found = gazetteer_scan(
            "Reserve Bank of India statement; a reserve bank elsewhere too.",
            &terms,
        );
        assert!(found.contains(&"Reserve Bank of India".to_string()));
        assert!(found.contains(&"Reserve Bank".to_string()));
    }

    #[test]
    fn subword_fragments_are_glued() {
        let repaired = repair_subword_tokens(vec![
            mention("ORG", "Info"),
            mention("ORG", "##sys"),
            mention("ORG", "TCS"),
        ]);
        let texts: Vec<&str> = repaired.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["Infosys", "TCS"]);
    }

    #[test]
    fn company_conflicting_with_regulator_vocab_is_rejected() {
        let bag = merge_entities(
            "s1",
            "RBI tightened rules for HDFC Bank.",
            vec![mention("ORG", "RBI"), mention("ORG", "HDFC Bank")],
            &gazetteer(),
        );
        assert_eq!(bag.companies, vec!["HDFC Bank".to_string()]);
        assert_eq!(bag.regulators, vec!["RBI".to_string()]);
    }

    #[test]
    fn company_substring_collapses_to_longer() {
        let bag = merge_entities(
            "s1",
            "HDFC posted results; HDFC Bank rallied.",
            vec![mention("ORG", "HDFC"), mention("ORG", "HDFC Bank")],
            &gazetteer(),
        );
        assert_eq!(bag.companies, vec!["HDFC Bank".to_string()]);
    }

    #[test]
    fn dedupe_is_case_insensitive_and_order_preserving() {
        let out = dedupe_preserving(vec![
            "Nifty 50".into(),
            "nifty  50".into(),
            "Sensex".into(),
            "NIFTY 50".into(),
        ]);
        assert_eq!(out, vec!["Nifty 50".to_string(), "Sensex".to_string()]);
    }

    #[test]
    fn regex_rules_feed_kpis_and_financial_terms() {
        let bag = merge_entities(
            "s1",
            "Q2 results: net profit up 12%, dividend of ₹ 500 crore announced.",
            vec![],
            &gazetteer(),
        );
        assert!(bag.kpis.iter().any(|k| k.eq_ignore_ascii_case("net profit")));
        assert!(bag.kpis.iter().any(|k| k.starts_with("Q2")));
        assert!(bag.financial_terms.iter().any(|t| t.contains('%')));
        assert!(bag.financial_terms.iter().any(|t| t.contains('₹')));
        assert!(bag
            .financial_terms
            .iter()
            .any(|t| t.eq_ignore_ascii_case("dividend")));
    }

    #[test]
    fn person_and_location_labels_are_bucketed() {
        let bag = merge_entities(
            "s1",
            "Shaktikanta Das spoke in Mumbai.",
            vec![mention("PER", "Shaktikanta Das"), mention("LOC", "Mumbai")],
            &gazetteer(),
        );
        assert_eq!(bag.people, vec!["Shaktikanta Das".to_string()]);
        assert_eq!(bag.locations, vec!["Mumbai".to_string()]);
    }

    #[test]
    fn empty_text_yields_empty_bag() {
        let bag = merge_entities("s1", "", vec![], &gazetteer());
        assert!(bag.is_empty());
        assert_eq!(bag.story_id, "s1");
    }

    #[test]
    fn chunking_splits_on_word_count() {
        let text = (0..10).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
        let chunks = chunk_words(&text, 4);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0], "w0 w1 w2 w3");
        assert_eq!(chunks[2], "w8 w9");
        assert!(chunk_words("", 4).is_empty());
    }
}
