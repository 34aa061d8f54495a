use crate::domain::values::confidence::Confidence;
use crate::domain::values::impact_reason::ImpactReason;
use serde::{Deserialize, Serialize};

/// One (story, symbol) impact assessment.
///
/// Invariants: `confidence == reason.score()`, `reason` is the
/// highest-priority member of `flags`, and `flags` always contains `reason`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactRecord {
    pub story_id: String,
    pub symbol: String,
    pub confidence: Confidence,
    pub reason: ImpactReason,
    /// Every reason that applied; only `reason` drives the score.
    pub flags: Vec<ImpactReason>,
}

impl ImpactRecord {
    /// Build a record from the full flag set. The primary reason is the
    /// highest-priority flag present; `Semantic` if the set is empty.
    pub fn from_flags(story_id: String, symbol: String, flags: Vec<ImpactReason>) -> Self {
        let reason = ImpactReason::PRIORITY
            .iter()
            .copied()
            .find(|r| flags.contains(r))
            .unwrap_or(ImpactReason::Semantic);
        let confidence =
            Confidence::new(reason.score()).unwrap_or_default();
        let mut flags = flags;
        if !flags.contains(&reason) {
            flags.push(reason);
        }
        Self {
            story_id,
            symbol,
            confidence,
            reason,
            flags,
        }
    }
}
