mod config;
mod matcher;
mod report;

pub use config::{EligibilityBands, DEFAULT_PARTIAL_MIN, DEFAULT_STRONG_MIN};
pub use matcher::{score, SkillMatch, SkillMatcher};
pub use report::{EligibilityReport, EligibilityReportBuilder, EligibilityTier};
