//! Fuzzy company-name resolution.
//!
//! Maps a free-text company mention to a canonical symbol using a fixed
//! cascade: exact key → whitespace/case-normalized exact → case-insensitive
//! scan → approximate match (threshold 0.80) → substring containment. A miss
//! returns `None` and means "unmapped", never an error.
//!
//! The approximate scorer is a WRatio-style maximum of normalized
//! Levenshtein, Jaro-Winkler, and a token-set ratio, so short mentions like
//! "HDFC" still clear the bar against "HDFC Bank Limited".

use std::collections::BTreeMap;
use std::collections::BTreeSet;

/// Minimum approximate-match score (0..1 scale) for a resolution.
pub const APPROX_THRESHOLD: f64 = 0.80;

/// Collapse runs of whitespace and lowercase.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// How a mention was matched to a symbol. Exact-class methods justify a
/// `Direct` impact flag; approximate-class methods only `Gazetteer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMethod {
    Exact,
    NormalizedExact,
    CaseInsensitive,
    Approximate,
    Substring,
}

impl MatchMethod {
    pub fn is_exact(&self) -> bool {
        matches!(
            self,
            MatchMethod::Exact | MatchMethod::NormalizedExact | MatchMethod::CaseInsensitive
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub symbol: String,
    pub method: MatchMethod,
}

/// Resolve a mention against the company→symbol table. First match in the
/// documented cascade wins.
pub fn resolve(mention: &str, company_to_symbol: &BTreeMap<String, String>) -> Option<Resolution> {
    if mention.trim().is_empty() {
        return None;
    }

    if let Some(sym) = company_to_symbol.get(mention) {
        return Some(Resolution {
            symbol: sym.clone(),
            method: MatchMethod::Exact,
        });
    }

    let norm = normalize_name(mention);
    if let Some(sym) = company_to_symbol.get(&norm) {
        return Some(Resolution {
            symbol: sym.clone(),
            method: MatchMethod::NormalizedExact,
        });
    }

    for (name, sym) in company_to_symbol {
        if name.to_lowercase() == norm {
            return Some(Resolution {
                symbol: sym.clone(),
                method: MatchMethod::CaseInsensitive,
            });
        }
    }

    let mut best: Option<(f64, &String)> = None;
    for (name, sym) in company_to_symbol {
        let score = weighted_similarity(&norm, &name.to_lowercase());
        if best.map_or(true, |(b, _)| score > b) {
            best = Some((score, sym));
        }
    }
    if let Some((score, sym)) = best {
        if score >= APPROX_THRESHOLD {
            return Some(Resolution {
                symbol: sym.clone(),
                method: MatchMethod::Approximate,
            });
        }
    }

    // Last resort: plain containment in either direction.
    for (name, sym) in company_to_symbol {
        let key = name.to_lowercase();
        if key.contains(&norm) || norm.contains(&key) {
            return Some(Resolution {
                symbol: sym.clone(),
                method: MatchMethod::Substring,
            });
        }
    }

    None
}

/// Token-set-aware weighted similarity on a 0..1 scale.
pub fn weighted_similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let lev = strsim::normalized_levenshtein(a, b);
    let jw = strsim::jaro_winkler(a, b);
    let ts = token_set_ratio(a, b);
    lev.max(jw).max(ts)
}

/// Compare the shared-token core of both strings against each full token
/// set, rapidfuzz `token_set_ratio` style. Identical after tokenization
/// scores 1.0 regardless of word order.
fn token_set_ratio(a: &str, b: &str) -> f64 {
    let ta: BTreeSet<&str> = a.split_whitespace().collect();
    let tb: BTreeSet<&str> = b.split_whitespace().collect();
    if ta.is_empty() || tb.is_empty() {
        return 0.0;
    }

    let inter: Vec<&str> = ta.intersection(&tb).copied().collect();
    if inter.is_empty() {
        return strsim::normalized_levenshtein(a, b);
    }

    let joined = |set: &BTreeSet<&str>| set.iter().copied().collect::<Vec<_>>().join(" ");
    let core = inter.join(" ");
    let full_a = joined(&ta);
    let full_b = joined(&tb);

    let s1 = strsim::normalized_levenshtein(&core, &full_a);
    let s2 = strsim::normalized_levenshtein(&core, &full_b);
    let s3 = strsim::normalized_levenshtein(&full_a, &full_b);
    s1.max(s2).max(s3)
}
