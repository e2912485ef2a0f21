use serde::{Deserialize, Serialize};

use super::config::EligibilityBands;
use super::matcher::{SkillMatch, SkillMatcher};
use crate::workflows::applications::domain::{Candidate, CandidateId, Opportunity, OpportunityId};

/// Qualitative band for an eligibility score. Advisory only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EligibilityTier {
    Strong,
    Partial,
    Weak,
}

impl EligibilityTier {
    pub fn classify(score: u8, bands: &EligibilityBands) -> Self {
        if score >= bands.strong_min() {
            EligibilityTier::Strong
        } else if score >= bands.partial_min() {
            EligibilityTier::Partial
        } else {
            EligibilityTier::Weak
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            EligibilityTier::Strong => "strong",
            EligibilityTier::Partial => "partial",
            EligibilityTier::Weak => "weak",
        }
    }

    pub const fn is_eligible(self) -> bool {
        !matches!(self, EligibilityTier::Weak)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityReport {
    pub candidate_id: CandidateId,
    pub opportunity_id: OpportunityId,
    pub score: u8,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub tier: EligibilityTier,
    pub eligible: bool,
}

impl EligibilityReport {
    pub fn summary(&self) -> String {
        if self.missing_skills.is_empty() {
            format!("{}% match ({})", self.score, self.tier.label())
        } else {
            format!(
                "{}% match ({}), missing: {}",
                self.score,
                self.tier.label(),
                self.missing_skills.join(", ")
            )
        }
    }
}

/// Packages skill-matcher output into a report with a tier recommendation.
#[derive(Debug, Clone, Default)]
pub struct EligibilityReportBuilder {
    matcher: SkillMatcher,
    bands: EligibilityBands,
}

impl EligibilityReportBuilder {
    pub fn new(bands: EligibilityBands) -> Self {
        Self {
            matcher: SkillMatcher,
            bands,
        }
    }

    pub fn bands(&self) -> &EligibilityBands {
        &self.bands
    }

    pub fn build(&self, candidate: &Candidate, opportunity: &Opportunity) -> EligibilityReport {
        let SkillMatch {
            percentage,
            matched,
            missing,
        } = self
            .matcher
            .score(&candidate.skills, &opportunity.required_skills);
        let tier = EligibilityTier::classify(percentage, &self.bands);

        EligibilityReport {
            candidate_id: candidate.id.clone(),
            opportunity_id: opportunity.id.clone(),
            score: percentage,
            matched_skills: matched,
            missing_skills: missing,
            tier,
            eligible: tier.is_eligible(),
        }
    }
}
