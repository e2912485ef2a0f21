use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::domain::{CandidateId, Opportunity};
use super::error::ApplicationError;
use super::repository::ApplicationRepository;

/// Preconditions checked before an application is created.
///
/// The duplicate check reads the repository and the create that follows is a
/// separate write, so two concurrent applies for the same pair can both pass
/// here. [`ApplicationRepository::insert`] is required to reject the second
/// one; this guard only turns the common case into a clean error before any
/// write is attempted.
pub struct ApplicationGuard<R> {
    repository: Arc<R>,
}

impl<R> ApplicationGuard<R>
where
    R: ApplicationRepository,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub fn assert_can_apply(
        &self,
        candidate_id: &CandidateId,
        opportunity: &Opportunity,
        now: DateTime<Utc>,
    ) -> Result<(), ApplicationError> {
        let existing = self
            .repository
            .find_for_pair(candidate_id, &opportunity.id)
            .map_err(ApplicationError::repository)?;

        if existing.iter().any(|record| record.is_active()) {
            return Err(ApplicationError::DuplicateApplication {
                candidate_id: candidate_id.clone(),
                opportunity_id: opportunity.id.clone(),
            });
        }

        if let Some(reason) = opportunity.closed_reason(now) {
            return Err(ApplicationError::OpportunityClosed {
                opportunity_id: opportunity.id.clone(),
                reason,
            });
        }

        Ok(())
    }
}
