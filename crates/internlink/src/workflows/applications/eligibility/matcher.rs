use serde::{Deserialize, Serialize};

/// Result of comparing a candidate's skills with a posting's requirements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillMatch {
    pub percentage: u8,
    pub matched: Vec<String>,
    pub missing: Vec<String>,
}

/// Stateless matcher applying the bidirectional-substring rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkillMatcher;

impl SkillMatcher {
    pub fn score<C, R>(&self, candidate_skills: &[C], required_skills: &[R]) -> SkillMatch
    where
        C: AsRef<str>,
        R: AsRef<str>,
    {
        score(candidate_skills, required_skills)
    }
}

/// Percentage of `required_skills` covered by `candidate_skills`, plus the
/// uncovered requirements in the order they were supplied.
///
/// Two skills are equivalent when either contains the other after trimming
/// and lowercasing, so "React" and "React Native" match in both directions.
/// Blank entries are ignored and requirements that normalize to the same text
/// are counted once.
pub fn score<C, R>(candidate_skills: &[C], required_skills: &[R]) -> SkillMatch
where
    C: AsRef<str>,
    R: AsRef<str>,
{
    let candidate: Vec<String> = candidate_skills
        .iter()
        .filter_map(|skill| normalize(skill.as_ref()))
        .collect();

    let mut seen = Vec::new();
    let mut matched = Vec::new();
    let mut missing = Vec::new();

    for required in required_skills {
        let raw = required.as_ref();
        let Some(normalized) = normalize(raw) else {
            continue;
        };
        if seen.contains(&normalized) {
            continue;
        }

        let covered = candidate
            .iter()
            .any(|skill| equivalent(skill, &normalized));
        if covered {
            matched.push(raw.trim().to_string());
        } else {
            missing.push(raw.trim().to_string());
        }
        seen.push(normalized);
    }

    SkillMatch {
        percentage: rounded_percentage(matched.len(), seen.len()),
        matched,
        missing,
    }
}

fn normalize(skill: &str) -> Option<String> {
    let trimmed = skill.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

fn equivalent(left: &str, right: &str) -> bool {
    left.contains(right) || right.contains(left)
}

// round(100 * matched / total), halves away from zero, in integer arithmetic.
fn rounded_percentage(matched: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let scaled = (200 * matched + total) / (2 * total);
    scaled.min(100) as u8
}
