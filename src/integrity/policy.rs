//! Minimum-length policy for secret values.

use serde::Serialize;
use std::fmt;

use super::snapshot::SecretSnapshot;

/// Values at or below this many characters are reported
pub const DEFAULT_MIN_LENGTH: usize = 20;

/// Flags secrets whose value is too short to be a credible secret
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LengthPolicy {
    pub min_length: usize,
}

impl Default for LengthPolicy {
    fn default() -> Self {
        Self { min_length: DEFAULT_MIN_LENGTH }
    }
}

/// A secret that failed the length policy. Carries the length, never the value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyViolation {
    pub name: String,
    pub length: usize,
}

impl fmt::Display for PolicyViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret {} is too short: {} characters", self.name, self.length)
    }
}

impl LengthPolicy {
    pub fn new(min_length: usize) -> Self {
        Self { min_length }
    }

    /// Violations in ascending name order
    pub fn evaluate(&self, snapshot: &SecretSnapshot) -> Vec<PolicyViolation> {
        snapshot
            .iter()
            .filter_map(|(name, entry)| {
                let length = entry.value.char_count();
                (length <= self.min_length)
                    .then(|| PolicyViolation { name: name.to_string(), length })
            })
            .collect()
    }
}
