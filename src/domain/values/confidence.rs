use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Impact confidence, constrained to `[0.0, 1.0]`.
///
/// In practice every value comes from the fixed per-reason score table, so
/// a construction failure indicates a programming error, not bad input.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Confidence(f64);

impl Confidence {
    pub fn new(value: f64) -> Result<Self, DomainError> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(DomainError::InvalidInput(format!(
                "confidence {value} outside [0.0, 1.0]"
            )))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for Confidence {
    fn default() -> Self {
        Self(0.5)
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range() {
        assert!(Confidence::new(-0.01).is_err());
        assert!(Confidence::new(1.01).is_err());
        assert_eq!(Confidence::new(0.95).unwrap().value(), 0.95);
    }

    #[test]
    fn displays_two_decimals() {
        assert_eq!(Confidence::new(0.7).unwrap().to_string(), "0.70");
    }
}
