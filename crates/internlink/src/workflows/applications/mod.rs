//! Internship application lifecycle: eligibility scoring, the status state
//! machine with its apply guard, and best-effort notification dispatch.

pub mod domain;
pub mod eligibility;
mod error;
mod guard;
pub mod lifecycle;
pub mod notifications;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicationId, ApplicationRecord, ApplicationStatus, ApplicationStatusView,
    ApplicationSubmission, Candidate, CandidateId, ClosedReason, Opportunity, OpportunityId,
    OrganizationId,
};
pub use eligibility::{
    EligibilityBands, EligibilityReport, EligibilityReportBuilder, EligibilityTier, SkillMatch,
    SkillMatcher,
};
pub use error::ApplicationError;
pub use guard::ApplicationGuard;
pub use lifecycle::{allowed_targets, ApplicationStateMachine, Transition};
pub use notifications::{
    NotificationDispatcher, NotificationKind, NotificationPayload, NotificationRequest, Notifier,
    NotifierError, Recipient,
};
pub use repository::{
    ApplicationRepository, DirectoryError, ProfileDirectory, RepositoryError,
};
pub use router::application_router;
pub use service::{Clock, InternshipApplicationService};
