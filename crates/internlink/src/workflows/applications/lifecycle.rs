use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::domain::{
    ApplicationId, ApplicationRecord, ApplicationStatus, CandidateId, Opportunity, OrganizationId,
};
use super::error::ApplicationError;
use super::guard::ApplicationGuard;
use super::repository::{ApplicationRepository, RepositoryError};

/// Permitted targets for each status. Every mutation is checked against this
/// table; terminal statuses map to an empty slice.
pub const fn allowed_targets(from: ApplicationStatus) -> &'static [ApplicationStatus] {
    use ApplicationStatus::*;

    match from {
        Pending => &[
            UnderReview,
            Shortlisted,
            Interview,
            Accepted,
            Rejected,
            Withdrawn,
        ],
        UnderReview => &[Shortlisted, Interview, Accepted, Rejected, Withdrawn],
        Shortlisted => &[Interview, Accepted, Rejected, Withdrawn],
        Interview => &[Accepted, Rejected, Withdrawn],
        Accepted | Rejected | Withdrawn => &[],
    }
}

impl ApplicationStatus {
    pub fn can_transition_to(self, target: ApplicationStatus) -> bool {
        allowed_targets(self).contains(&target)
    }

    pub fn is_terminal(self) -> bool {
        allowed_targets(self).is_empty()
    }
}

/// A committed status change together with the status it replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub record: ApplicationRecord,
    pub previous: ApplicationStatus,
}

// Bounds the retries after an id clash on insert or a lost conditional update.
const MAX_WRITE_ATTEMPTS: usize = 3;

fn next_application_id() -> ApplicationId {
    ApplicationId(format!("app-{}", Uuid::new_v4().simple()))
}

/// Owns the status graph. Each attempt is one read followed by at most one
/// conditional write carrying the complete new state. A write that loses to a
/// concurrent change is retried from a fresh read, so the table is always
/// checked against the status actually stored.
pub struct ApplicationStateMachine<R> {
    guard: ApplicationGuard<R>,
    repository: Arc<R>,
}

impl<R> ApplicationStateMachine<R>
where
    R: ApplicationRepository,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            guard: ApplicationGuard::new(repository.clone()),
            repository,
        }
    }

    pub fn create(
        &self,
        candidate_id: &CandidateId,
        opportunity: &Opportunity,
        organization_id: OrganizationId,
        cover_letter: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<ApplicationRecord, ApplicationError> {
        self.guard.assert_can_apply(candidate_id, opportunity, now)?;

        for _ in 0..MAX_WRITE_ATTEMPTS {
            let record = ApplicationRecord {
                id: next_application_id(),
                candidate_id: candidate_id.clone(),
                opportunity_id: opportunity.id.clone(),
                organization_id: organization_id.clone(),
                opportunity_title: opportunity.title.clone(),
                status: ApplicationStatus::Pending,
                applied_at: now,
                updated_at: now,
                cover_letter: non_blank(cover_letter.clone()),
                feedback: None,
            };

            match self.repository.insert(record) {
                Ok(stored) => return Ok(stored),
                Err(RepositoryError::IdTaken) => continue,
                Err(RepositoryError::Conflict) => {
                    return Err(ApplicationError::DuplicateApplication {
                        candidate_id: candidate_id.clone(),
                        opportunity_id: opportunity.id.clone(),
                    })
                }
                Err(other) => return Err(ApplicationError::repository(other)),
            }
        }

        Err(ApplicationError::repository(RepositoryError::IdTaken))
    }

    pub fn transition(
        &self,
        application_id: &ApplicationId,
        target: ApplicationStatus,
        feedback: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Transition, ApplicationError> {
        self.move_to(application_id, target, feedback, now, |_| Ok(()))
    }

    /// Withdraw on behalf of `requesting_candidate`, who must own the application.
    pub fn withdraw(
        &self,
        application_id: &ApplicationId,
        requesting_candidate: &CandidateId,
        now: DateTime<Utc>,
    ) -> Result<Transition, ApplicationError> {
        self.move_to(
            application_id,
            ApplicationStatus::Withdrawn,
            None,
            now,
            |current| {
                if &current.candidate_id == requesting_candidate {
                    Ok(())
                } else {
                    Err(ApplicationError::Unauthorized {
                        application_id: application_id.clone(),
                        candidate_id: requesting_candidate.clone(),
                    })
                }
            },
        )
    }

    fn move_to(
        &self,
        application_id: &ApplicationId,
        target: ApplicationStatus,
        feedback: Option<String>,
        now: DateTime<Utc>,
        authorize: impl Fn(&ApplicationRecord) -> Result<(), ApplicationError>,
    ) -> Result<Transition, ApplicationError> {
        let mut last_seen = None;
        for _ in 0..MAX_WRITE_ATTEMPTS {
            let current = self.load(application_id)?;
            authorize(&current)?;
            match self.commit(current, target, feedback.clone(), now)? {
                Ok(transition) => return Ok(transition),
                Err(current) => last_seen = Some(current),
            }
        }

        let detail = match last_seen {
            Some(current) => RepositoryError::StatusChanged { current },
            None => RepositoryError::NotFound,
        };
        Err(ApplicationError::repository(detail))
    }

    fn load(&self, application_id: &ApplicationId) -> Result<ApplicationRecord, ApplicationError> {
        self.repository
            .fetch(application_id)
            .map_err(ApplicationError::repository)?
            .ok_or_else(|| ApplicationError::ApplicationNotFound(application_id.clone()))
    }

    // The inner `Err` carries the stored status when the conditional update lost.
    fn commit(
        &self,
        current: ApplicationRecord,
        target: ApplicationStatus,
        feedback: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Result<Transition, ApplicationStatus>, ApplicationError> {
        let previous = current.status;
        if !previous.can_transition_to(target) {
            return Err(ApplicationError::InvalidTransition {
                from: previous,
                to: target,
            });
        }

        let application_id = current.id.clone();
        let mut next = current;
        next.status = target;
        next.updated_at = now;
        if let Some(note) = non_blank(feedback) {
            next.feedback = Some(note);
        }

        match self.repository.update(next, previous) {
            Ok(record) => Ok(Ok(Transition { record, previous })),
            Err(RepositoryError::StatusChanged { current }) => Ok(Err(current)),
            Err(RepositoryError::NotFound) => {
                Err(ApplicationError::ApplicationNotFound(application_id))
            }
            Err(other) => Err(ApplicationError::repository(other)),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}
