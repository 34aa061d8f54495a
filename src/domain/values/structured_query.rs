use super::query_type::{QueryType, TimeHorizon};
use serde::{Deserialize, Serialize};

/// Entities extracted from a user query. A slimmer cousin of the per-story
/// `EntityBag`: only the categories that map to assets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryEntities {
    #[serde(default)]
    pub companies: Vec<String>,
    #[serde(default)]
    pub sectors: Vec<String>,
    #[serde(default)]
    pub regulators: Vec<String>,
    #[serde(default)]
    pub policies: Vec<String>,
    #[serde(default)]
    pub indices: Vec<String>,
}

impl QueryEntities {
    /// All entity strings across categories, in category order.
    pub fn flattened(&self) -> Vec<String> {
        let mut out = Vec::new();
        for list in [
            &self.companies,
            &self.sectors,
            &self.regulators,
            &self.policies,
            &self.indices,
        ] {
            out.extend(list.iter().cloned());
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
            && self.sectors.is_empty()
            && self.regulators.is_empty()
            && self.policies.is_empty()
            && self.indices.is_empty()
    }
}

/// Ephemeral per-request query context. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredQuery {
    pub raw: String,
    pub rewritten: String,
    pub query_type: QueryType,
    pub entities: QueryEntities,
    pub time_horizon: TimeHorizon,
}

impl StructuredQuery {
    /// The documented fallback when the rewrite collaborator is unavailable
    /// or returns malformed output: unknown type, empty entities, short
    /// horizon, rewritten = raw.
    pub fn fallback(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            rewritten: raw.to_string(),
            query_type: QueryType::Unknown,
            entities: QueryEntities::default(),
            time_horizon: TimeHorizon::Short,
        }
    }
}
