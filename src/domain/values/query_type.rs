use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declared intent class of a user query. Drives which retrieval channels
/// and asset-mapping branch are used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    Company,
    Sector,
    Regulator,
    Policy,
    Index,
    Unknown,
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            QueryType::Company => "company",
            QueryType::Sector => "sector",
            QueryType::Regulator => "regulator",
            QueryType::Policy => "policy",
            QueryType::Index => "index",
            QueryType::Unknown => "unknown",
        };
        write!(f, "{s}")
    }
}

impl FromStr for QueryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "company" => Ok(QueryType::Company),
            "sector" => Ok(QueryType::Sector),
            "regulator" => Ok(QueryType::Regulator),
            "policy" => Ok(QueryType::Policy),
            "index" => Ok(QueryType::Index),
            "unknown" | "macro" => Ok(QueryType::Unknown),
            _ => Err(format!("Unknown query type: {s}")),
        }
    }
}

impl Default for QueryType {
    fn default() -> Self {
        QueryType::Unknown
    }
}

/// Rough time scope of a query, rule-extracted from keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeHorizon {
    Short,
    Medium,
    Long,
}

impl Default for TimeHorizon {
    fn default() -> Self {
        TimeHorizon::Short
    }
}

impl TimeHorizon {
    /// Keyword scan over the (rewritten) query text. Defaults to short.
    pub fn from_query(query: &str) -> Self {
        let q = query.to_lowercase();
        if ["today", "now", "immediately", "short term"]
            .iter()
            .any(|w| q.contains(w))
        {
            return TimeHorizon::Short;
        }
        if ["quarter", "this year", "medium term"]
            .iter()
            .any(|w| q.contains(w))
        {
            return TimeHorizon::Medium;
        }
        if ["long term", "future outlook", "next 5 years"]
            .iter()
            .any(|w| q.contains(w))
        {
            return TimeHorizon::Long;
        }
        TimeHorizon::Short
    }
}
