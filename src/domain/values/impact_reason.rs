use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Why a symbol was flagged as impacted by a story.
///
/// The variant order IS the business rule: when a symbol carries several
/// flags, the highest-priority one becomes the record's primary reason and
/// alone determines the confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactReason {
    /// Exact company-name hit against the mapping table.
    Direct,
    /// Approximate (fuzzy/substring) company-name hit.
    Gazetteer,
    /// Symbol belongs to a mentioned sector.
    Sector,
    /// Symbol's sector falls under a mentioned regulator's rule.
    Regulatory,
    /// Symbol's sector falls under a mentioned policy's rule.
    Policy,
    /// Symbol is a constituent of a mentioned index.
    Index,
    /// Default tier for purely embedding-derived relevance.
    Semantic,
}

impl ImpactReason {
    /// Descending priority order. First flag found here wins.
    pub const PRIORITY: [ImpactReason; 7] = [
        ImpactReason::Direct,
        ImpactReason::Gazetteer,
        ImpactReason::Sector,
        ImpactReason::Regulatory,
        ImpactReason::Policy,
        ImpactReason::Index,
        ImpactReason::Semantic,
    ];

    /// Fixed confidence per primary reason.
    pub fn score(&self) -> f64 {
        match self {
            ImpactReason::Direct => 1.00,
            ImpactReason::Gazetteer => 0.95,
            ImpactReason::Sector => 0.70,
            ImpactReason::Regulatory => 0.60,
            ImpactReason::Policy => 0.60,
            ImpactReason::Index => 0.50,
            ImpactReason::Semantic => 0.40,
        }
    }
}

impl fmt::Display for ImpactReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ImpactReason::Direct => "direct",
            ImpactReason::Gazetteer => "gazetteer",
            ImpactReason::Sector => "sector",
            ImpactReason::Regulatory => "regulatory",
            ImpactReason::Policy => "policy",
            ImpactReason::Index => "index",
            ImpactReason::Semantic => "semantic",
        };
        write!(f, "{s}")
    }
}

impl FromStr for ImpactReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "direct" => Ok(ImpactReason::Direct),
            "gazetteer" => Ok(ImpactReason::Gazetteer),
            "sector" => Ok(ImpactReason::Sector),
            "regulatory" => Ok(ImpactReason::Regulatory),
            "policy" => Ok(ImpactReason::Policy),
            "index" => Ok(ImpactReason::Index),
            "semantic" => Ok(ImpactReason::Semantic),
            _ => Err(format!("Unknown impact reason: {s}")),
        }
    }
}
