use serde::{Deserialize, Serialize};

/// Canonical entity extraction result for one story. Every category is an
/// ordered, case-insensitively deduplicated list; an empty category is an
/// empty list, never absent. Overwritten only by re-running extraction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityBag {
    pub story_id: String,
    #[serde(default)]
    pub companies: Vec<String>,
    #[serde(default)]
    pub sectors: Vec<String>,
    #[serde(default)]
    pub people: Vec<String>,
    #[serde(default)]
    pub indices: Vec<String>,
    #[serde(default)]
    pub regulators: Vec<String>,
    #[serde(default)]
    pub policies: Vec<String>,
    #[serde(default)]
    pub products: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub kpis: Vec<String>,
    #[serde(default)]
    pub financial_terms: Vec<String>,
}

impl EntityBag {
    pub fn new(story_id: String) -> Self {
        Self {
            story_id,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
            && self.sectors.is_empty()
            && self.people.is_empty()
            && self.indices.is_empty()
            && self.regulators.is_empty()
            && self.policies.is_empty()
            && self.products.is_empty()
            && self.locations.is_empty()
            && self.kpis.is_empty()
            && self.financial_terms.is_empty()
    }
}
