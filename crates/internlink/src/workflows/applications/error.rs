use super::domain::{
    ApplicationId, ApplicationStatus, CandidateId, ClosedReason, OpportunityId,
};
use super::repository::{DirectoryError, RepositoryError};

/// Failures reported synchronously by the lifecycle.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationError {
    #[error("candidate {candidate_id} already has an active application for opportunity {opportunity_id}")]
    DuplicateApplication {
        candidate_id: CandidateId,
        opportunity_id: OpportunityId,
    },
    #[error("opportunity {opportunity_id} is closed: {}", reason.summary())]
    OpportunityClosed {
        opportunity_id: OpportunityId,
        reason: ClosedReason,
    },
    #[error("application {0} not found")]
    ApplicationNotFound(ApplicationId),
    #[error("cannot move application from {} to {}", from.label(), to.label())]
    InvalidTransition {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },
    #[error("candidate {candidate_id} does not own application {application_id}")]
    Unauthorized {
        application_id: ApplicationId,
        candidate_id: CandidateId,
    },
    #[error("candidate {0} not found")]
    CandidateNotFound(CandidateId),
    #[error("opportunity {0} not found")]
    OpportunityNotFound(OpportunityId),
    #[error("{collaborator} unavailable: {detail}")]
    CollaboratorUnavailable {
        collaborator: &'static str,
        detail: String,
    },
}

impl ApplicationError {
    pub(crate) fn repository(err: RepositoryError) -> Self {
        let detail = match err {
            RepositoryError::Unavailable(detail) => detail,
            other => other.to_string(),
        };
        Self::CollaboratorUnavailable {
            collaborator: "application repository",
            detail,
        }
    }
}

impl From<DirectoryError> for ApplicationError {
    fn from(err: DirectoryError) -> Self {
        let DirectoryError::Unavailable(detail) = err;
        Self::CollaboratorUnavailable {
            collaborator: "profile directory",
            detail,
        }
    }
}
