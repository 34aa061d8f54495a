//! Loads the entity→asset reference tables from a directory of JSON files.
//! A missing or malformed file degrades to an empty table with a warning;
//! the engine then simply produces fewer impact flags.

use crate::domain::mappings::{AssetMappings, Gazetteer, ImpactRule, SectorInfo};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;

fn load_safe<T: DeserializeOwned + Default>(dir: &Path, file: &str) -> T {
    let path = dir.join(file);
    let raw = match std::fs::read_to_string(&path) {
        Ok(s) => s,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "asset file unreadable, using empty table");
            return T::default();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(v) => v,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "asset file malformed, using empty table");
            T::default()
        }
    }
}

pub fn load_mappings(dir: &Path) -> AssetMappings {
    AssetMappings {
        company_to_symbol: load_safe::<BTreeMap<String, String>>(dir, "company_to_symbol.json"),
        symbol_to_sector: load_safe::<BTreeMap<String, SectorInfo>>(dir, "symbol_to_sector.json"),
        sector_to_symbols: load_safe::<BTreeMap<String, Vec<String>>>(
            dir,
            "sector_to_symbols.json",
        ),
        regulator_rules: load_safe::<BTreeMap<String, ImpactRule>>(
            dir,
            "regulator_impact_rules.json",
        ),
        policy_rules: load_safe::<BTreeMap<String, ImpactRule>>(dir, "policy_impact_rules.json"),
        index_to_symbols: load_safe::<BTreeMap<String, Vec<String>>>(dir, "index_to_symbols.json"),
    }
}

pub fn load_gazetteer(dir: &Path) -> Gazetteer {
    load_safe::<Gazetteer>(dir, "fin_gazetteers.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_dir_yields_empty_tables() {
        let mappings = load_mappings(Path::new("/nonexistent/assets"));
        assert!(mappings.company_to_symbol.is_empty());
        assert!(mappings.regulator_rules.is_empty());
        let gazetteer = load_gazetteer(Path::new("/nonexistent/assets"));
        assert!(gazetteer.regulators.is_empty());
    }

    #[test]
    fn malformed_file_yields_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("company_to_symbol.json"), "{not json").unwrap();
        let mappings = load_mappings(dir.path());
        assert!(mappings.company_to_symbol.is_empty());
    }

    #[test]
    fn valid_file_loads() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("company_to_symbol.json"),
            r#"{"hdfc bank limited": "HDFCBANK"}"#,
        )
        .unwrap();
        let mappings = load_mappings(dir.path());
        assert_eq!(
            mappings.company_to_symbol.get("hdfc bank limited").unwrap(),
            "HDFCBANK"
        );
    }
}
