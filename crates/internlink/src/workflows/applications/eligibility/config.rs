use serde::{Deserialize, Serialize};

pub const DEFAULT_STRONG_MIN: u8 = 80;
pub const DEFAULT_PARTIAL_MIN: u8 = 50;

/// Score bands separating the strong, partial and weak tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityBands {
    strong_min: u8,
    partial_min: u8,
}

impl EligibilityBands {
    /// Returns `None` unless `partial_min <= strong_min <= 100`.
    pub fn new(strong_min: u8, partial_min: u8) -> Option<Self> {
        if strong_min > 100 || partial_min > strong_min {
            return None;
        }
        Some(Self {
            strong_min,
            partial_min,
        })
    }

    pub fn strong_min(&self) -> u8 {
        self.strong_min
    }

    pub fn partial_min(&self) -> u8 {
        self.partial_min
    }
}

impl Default for EligibilityBands {
    fn default() -> Self {
        Self {
            strong_min: DEFAULT_STRONG_MIN,
            partial_min: DEFAULT_PARTIAL_MIN,
        }
    }
}
