//! Entity→asset impact scoring.
//!
//! Given one story's entity bag, produces a set of (symbol, confidence,
//! primary reason, contributing flags) records plus a human-readable
//! summary. Each entity category contributes one boolean reason flag per
//! symbol; the highest-priority flag (see `ImpactReason::PRIORITY`) becomes
//! the primary reason, and confidence is a fixed table lookup on it.
//!
//! The per-symbol flag table preserves insertion order, so output order is
//! deterministic: descending confidence, insertion order on ties.

use crate::domain::entities::entity_bag::EntityBag;
use crate::domain::entities::impact_record::ImpactRecord;
use crate::domain::mappings::{AssetMappings, ImpactRule};
use crate::domain::resolve::{self, normalize_name};
use crate::domain::values::impact_reason::ImpactReason;
use std::collections::HashMap;

/// Insertion-order-preserving symbol → flag-set table.
#[derive(Default)]
struct FlagTable {
    order: Vec<String>,
    positions: HashMap<String, usize>,
    flags: Vec<Vec<ImpactReason>>,
}

impl FlagTable {
    fn flag(&mut self, symbol: &str, reason: ImpactReason) {
        let idx = match self.positions.get(symbol) {
            Some(&i) => i,
            None => {
                let i = self.order.len();
                self.order.push(symbol.to_string());
                self.positions.insert(symbol.to_string(), i);
                self.flags.push(Vec::new());
                i
            }
        };
        if !self.flags[idx].contains(&reason) {
            self.flags[idx].push(reason);
        }
    }

    fn into_records(self, story_id: &str) -> Vec<ImpactRecord> {
        self.order
            .into_iter()
            .zip(self.flags)
            .map(|(symbol, flags)| ImpactRecord::from_flags(story_id.to_string(), symbol, flags))
            .collect()
    }
}

fn lookup_rule<'a>(
    rules: &'a std::collections::BTreeMap<String, ImpactRule>,
    key: &str,
) -> Option<&'a ImpactRule> {
    let norm = normalize_name(key);
    rules
        .get(key)
        .or_else(|| rules.get(&norm))
        .or_else(|| rules.get(&norm.to_uppercase()))
}

/// Compute impact records and a summary for one story's entities.
///
/// Returns an empty list and the literal summary
/// `"No significant impact detected."` when nothing matches.
pub fn compute_impacts(
    entities: &EntityBag,
    mappings: &AssetMappings,
) -> (Vec<ImpactRecord>, String) {
    let mut table = FlagTable::default();
    let mut clauses: Vec<String> = Vec::new();

    // 1) Company mentions via the fuzzy resolver. Exact-class hits justify
    //    Direct; approximate-class hits only Gazetteer.
    for comp in &entities.companies {
        if let Some(res) = resolve::resolve(comp, &mappings.company_to_symbol) {
            if res.method.is_exact() {
                table.flag(&res.symbol, ImpactReason::Direct);
                table.flag(&res.symbol, ImpactReason::Gazetteer);
                clauses.push(format!("company '{comp}' matched {} directly", res.symbol));
            } else {
                table.flag(&res.symbol, ImpactReason::Gazetteer);
                clauses.push(format!("company '{comp}' matched {} via gazetteer", res.symbol));
            }
        }
    }

    // 2) Sector mentions expand to member symbols.
    for sector in &entities.sectors {
        let syms = mappings.symbols_for_sector(&normalize_name(sector));
        if !syms.is_empty() {
            for s in syms {
                table.flag(s, ImpactReason::Sector);
            }
            clauses.push(format!("sector '{sector}' impacts {} symbols", syms.len()));
        }
    }

    // 3) Regulator mentions: rule sectors expand to symbols.
    for reg in &entities.regulators {
        if let Some(rule) = lookup_rule(&mappings.regulator_rules, reg) {
            let mut hit = false;
            for sec in &rule.sectors {
                for s in mappings.symbols_for_sector(sec) {
                    table.flag(s, ImpactReason::Regulatory);
                    hit = true;
                }
            }
            if hit {
                clauses.push(format!(
                    "regulator '{reg}' affects sectors: {}",
                    rule.sectors.join(", ")
                ));
            }
        }
    }

    // 4) Policy mentions: like regulators, except the sector literal "All"
    //    means system-wide impact (every symbol known to symbol_to_sector).
    for policy in &entities.policies {
        if let Some(rule) = lookup_rule(&mappings.policy_rules, policy) {
            let mut hit = false;
            for sec in &rule.sectors {
                if sec == "All" {
                    for s in mappings.symbol_to_sector.keys() {
                        table.flag(s, ImpactReason::Policy);
                        hit = true;
                    }
                } else {
                    for s in mappings.symbols_for_sector(sec) {
                        table.flag(s, ImpactReason::Policy);
                        hit = true;
                    }
                }
            }
            if hit {
                clauses.push(format!("policy '{policy}' impacts mapped sectors"));
            }
        }
    }

    // 5) Index mentions. Index tables key by upper-case display name.
    for idx in &entities.indices {
        let norm = normalize_name(idx);
        let syms = mappings
            .index_to_symbols
            .get(idx.as_str())
            .or_else(|| mappings.index_to_symbols.get(&norm))
            .or_else(|| mappings.index_to_symbols.get(&norm.to_uppercase()));
        if let Some(syms) = syms {
            if !syms.is_empty() {
                for s in syms {
                    table.flag(s, ImpactReason::Index);
                }
                clauses.push(format!("index '{idx}' impacts {} constituents", syms.len()));
            }
        }
    }

    let mut records = table.into_records(&entities.story_id);
    // Stable sort: ties keep insertion order.
    records.sort_by(|a, b| {
        b.confidence
            .value()
            .partial_cmp(&a.confidence.value())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let summary = if records.is_empty() {
        "No significant impact detected.".to_string()
    } else {
        clauses.join("; ")
    };
    (records, summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::mappings::SectorInfo;
    use std::collections::BTreeMap;

    fn mappings() -> AssetMappings {
        let mut m = AssetMappings::default();
        m.company_to_symbol
            .insert("HDFC Bank".to_string(), "HDFCBANK".to_string());
        m.company_to_symbol
            .insert("ICICI Bank".to_string(), "ICICIBANK".to_string());
        m.company_to_symbol
            .insert("Sun Pharma".to_string(), "SUNPHARMA".to_string());
        for (sym, sector, name) in [
            ("HDFCBANK", "Banking", "HDFC Bank Limited"),
            ("ICICIBANK", "Banking", "ICICI Bank Limited"),
            ("SUNPHARMA", "Pharma", "Sun Pharmaceutical Industries"),
        ] {
            m.symbol_to_sector.insert(
                sym.to_string(),
                SectorInfo {
                    sector: sector.to_string(),
                    company: name.to_string(),
                },
            );
        }
        m.sector_to_symbols.insert(
            "banking".to_string(),
            vec!["HDFCBANK".to_string(), "ICICIBANK".to_string()],
        );
        m.sector_to_symbols
            .insert("pharma".to_string(), vec!["SUNPHARMA".to_string()]);
        m.regulator_rules.insert(
            "RBI".to_string(),
            ImpactRule {
                sectors: vec!["Banking".to_string()],
                confidence: 0.6,
            },
        );
        m.policy_rules.insert(
            "repo rate".to_string(),
            ImpactRule {
                sectors: vec!["All".to_string()],
                confidence: 0.6,
            },
        );
        m.policy_rules.insert(
            "drug pricing".to_string(),
            ImpactRule {
                sectors: vec!["Pharma".to_string()],
                confidence: 0.6,
            },
        );
        m.index_to_symbols.insert(
            "nifty bank".to_string(),
            vec!["HDFCBANK".to_string(), "ICICIBANK".to_string()],
        );
        m
    }

    fn bag(
        companies: &[&str],
        sectors: &[&str],
        regulators: &[&str],
        policies: &[&str],
        indices: &[&str],
    ) -> EntityBag {
        let mut b = EntityBag::new("story-1".to_string());
        b.companies = companies.iter().map(|s| s.to_string()).collect();
        b.sectors = sectors.iter().map(|s| s.to_string()).collect();
        b.regulators = regulators.iter().map(|s| s.to_string()).collect();
        b.policies = policies.iter().map(|s| s.to_string()).collect();
        b.indices = indices.iter().map(|s| s.to_string()).collect();
        b
    }

    #[test]
    fn confidence_always_matches_primary_reason_score() {
        let b = bag(
            &["HDFC Bank"],
            &["Banking"],
            &["RBI"],
            &["repo rate"],
            &["Nifty Bank"],
        );
        let (records, _) = compute_impacts(&b, &mappings());
        assert!(!records.is_empty());
        for r in &records {
            assert_eq!(r.confidence.value(), r.reason.score());
            // Primary reason is the highest-priority flag present.
            let best = ImpactReason::PRIORITY
                .iter()
                .copied()
                .find(|p| r.flags.contains(p))
                .unwrap();
            assert_eq!(r.reason, best);
            assert!(r.flags.contains(&r.reason));
        }
    }

    #[test]
    fn hdfc_banking_rbi_scenario() {
        let b = bag(&["HDFC Bank"], &["Banking"], &["RBI"], &["repo rate"], &[]);
        let (records, summary) = compute_impacts(&b, &mappings());

        let hdfc = records.iter().find(|r| r.symbol == "HDFCBANK").unwrap();
        assert_eq!(hdfc.reason, ImpactReason::Direct);
        assert_eq!(hdfc.confidence.value(), 1.00);
        assert!(hdfc.flags.contains(&ImpactReason::Sector));
        assert!(hdfc.flags.contains(&ImpactReason::Regulatory));

        let icici = records.iter().find(|r| r.symbol == "ICICIBANK").unwrap();
        assert_eq!(icici.reason, ImpactReason::Sector);
        assert_eq!(icici.confidence.value(), 0.70);
        assert!(icici.flags.contains(&ImpactReason::Sector));

        assert!(summary.contains("HDFCBANK"));
        assert!(summary.contains("Banking"));
    }

    #[test]
    fn all_sector_policy_is_market_wide() {
        let b = bag(&[], &[], &[], &["repo rate"], &[]);
        let (records, _) = compute_impacts(&b, &mappings());
        let symbols: Vec<&str> = records.iter().map(|r| r.symbol.as_str()).collect();
        // Every symbol known to symbol_to_sector, pharma included.
        assert_eq!(records.len(), 3);
        assert!(symbols.contains(&"SUNPHARMA"));
        for r in &records {
            assert_eq!(r.reason, ImpactReason::Policy);
            assert_eq!(r.confidence.value(), 0.60);
        }
    }

    #[test]
    fn results_sorted_descending_with_stable_ties() {
        let b = bag(&[], &["Pharma", "Banking"], &[], &[], &[]);
        let (records, _) = compute_impacts(&b, &mappings());
        // All Sector (0.70): insertion order preserved.
        let symbols: Vec<&str> = records.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["SUNPHARMA", "HDFCBANK", "ICICIBANK"]);
    }

    #[test]
    fn regulator_lookup_tolerates_casing() {
        let b = bag(&[], &[], &["rbi"], &[], &[]);
        let (records, _) = compute_impacts(&b, &mappings());
        assert_eq!(records.len(), 2);
        for r in &records {
            assert_eq!(r.reason, ImpactReason::Regulatory);
        }
    }

    #[test]
    fn index_mentions_flag_constituents() {
        let b = bag(&[], &[], &[], &[], &["Nifty Bank"]);
        let (records, _) = compute_impacts(&b, &mappings());
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.reason == ImpactReason::Index));
        assert!(records.iter().all(|r| r.confidence.value() == 0.50));
    }

    #[test]
    fn no_match_yields_sentinel_summary() {
        let b = bag(&["Unknown Corp Zzz"], &["Aerospace"], &[], &[], &[]);
        // "Unknown Corp Zzz" resolves to nothing in this tiny table only if
        // similarity stays below threshold and no containment holds.
        let mut m = mappings();
        m.company_to_symbol.clear();
        let (records, summary) = compute_impacts(&b, &m);
        assert!(records.is_empty());
        assert_eq!(summary, "No significant impact detected.");
    }

    #[test]
    fn unmapped_categories_are_skipped_not_errors() {
        let b = bag(&[], &["Banking"], &["Unknown Regulator"], &["no such policy"], &["no index"]);
        let (records, _) = compute_impacts(&b, &mappings());
        // Only the sector channel fires.
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.reason == ImpactReason::Sector));
    }
}
