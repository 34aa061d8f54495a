//! Reference tables mapping entities to tradable assets.
//!
//! All tables are loaded once from static configuration and are read-only at
//! runtime. The store performs no key normalization; consumers compare keys
//! case-insensitively (a documented contract, see the loader and the impact
//! engine). `BTreeMap` keeps full-table scans deterministic.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sector assignment for one symbol, plus the company display name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectorInfo {
    pub sector: String,
    /// Full registered company name, e.g. "HDFC Bank Limited".
    #[serde(default)]
    pub company: String,
}

/// Rule attaching a regulator or policy term to the sectors it moves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactRule {
    #[serde(default)]
    pub sectors: Vec<String>,
    #[serde(default = "default_rule_confidence")]
    pub confidence: f64,
}

fn default_rule_confidence() -> f64 {
    0.6
}

/// The full set of entity→asset reference tables.
#[derive(Debug, Clone, Default)]
pub struct AssetMappings {
    /// Company name → symbol (many-to-one).
    pub company_to_symbol: BTreeMap<String, String>,
    /// Symbol → its sector and display name.
    pub symbol_to_sector: BTreeMap<String, SectorInfo>,
    /// Sector (lowercase keys by convention) → member symbols. Maintained
    /// independently of `symbol_to_sector` so a symbol may appear under
    /// several sectors.
    pub sector_to_symbols: BTreeMap<String, Vec<String>>,
    pub regulator_rules: BTreeMap<String, ImpactRule>,
    pub policy_rules: BTreeMap<String, ImpactRule>,
    pub index_to_symbols: BTreeMap<String, Vec<String>>,
}

impl AssetMappings {
    /// Display company name for a symbol, falling back to an inverse scan of
    /// `company_to_symbol` when the sector table has no display name.
    pub fn company_for_symbol(&self, symbol: &str) -> Option<String> {
        if let Some(info) = self.symbol_to_sector.get(symbol) {
            if !info.company.is_empty() {
                return Some(info.company.clone());
            }
        }
        self.company_to_symbol
            .iter()
            .find(|(_, sym)| sym.as_str() == symbol)
            .map(|(name, _)| name.clone())
    }

    /// Symbols for a sector, tried against the lowercase key convention.
    pub fn symbols_for_sector(&self, sector: &str) -> &[String] {
        self.sector_to_symbols
            .get(&sector.to_lowercase())
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }
}

/// Static term lists used for rule-based entity matching.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Gazetteer {
    #[serde(default)]
    pub regulators: Vec<String>,
    #[serde(default)]
    pub indices: Vec<String>,
    #[serde(default)]
    pub sectors: Vec<String>,
    #[serde(default)]
    pub policies: Vec<String>,
    #[serde(default)]
    pub financial_terms: Vec<String>,
    #[serde(default)]
    pub kpi_terms: Vec<String>,
    #[serde(default)]
    pub products: Vec<String>,
    #[serde(default)]
    pub companies_custom: Vec<String>,
}
