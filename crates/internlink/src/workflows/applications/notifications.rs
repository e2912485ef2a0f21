use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::domain::{
    ApplicationId, ApplicationRecord, ApplicationStatus, CandidateId, OrganizationId,
};
use super::eligibility::EligibilityReport;

/// Outbound delivery hook (push, e-mail, in-app inbox adapters).
pub trait Notifier: Send + Sync {
    fn send(&self, request: NotificationRequest) -> Result<(), NotifierError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NotifierError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
    #[error("notification rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Recipient {
    Candidate(CandidateId),
    Organization(OrganizationId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    ApplicationReceived,
    StatusChanged,
    EligibilityComputed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_id: Option<ApplicationId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate_id: Option<CandidateId>,
    pub opportunity_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eligible: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub recipient: Recipient,
    pub kind: NotificationKind,
    pub payload: NotificationPayload,
}

/// Decides which notification, if any, follows a lifecycle event and hands it
/// to the notifier. Delivery is best-effort: failures are logged here and
/// never reach the caller.
pub struct NotificationDispatcher<N> {
    notifier: Arc<N>,
}

impl<N> NotificationDispatcher<N>
where
    N: Notifier,
{
    pub fn new(notifier: Arc<N>) -> Self {
        Self { notifier }
    }

    /// The organization learns about new applications; the candidate gets no
    /// status notification for the initial `Pending`.
    pub fn on_application_created(&self, application: &ApplicationRecord) -> NotificationRequest {
        NotificationRequest {
            recipient: Recipient::Organization(application.organization_id.clone()),
            kind: NotificationKind::ApplicationReceived,
            payload: NotificationPayload {
                application_id: Some(application.id.clone()),
                candidate_id: Some(application.candidate_id.clone()),
                opportunity_title: application.opportunity_title.clone(),
                status: Some(application.status.label().to_string()),
                ..NotificationPayload::default()
            },
        }
    }

    pub fn on_transition(
        &self,
        application: &ApplicationRecord,
        previous: ApplicationStatus,
    ) -> Option<NotificationRequest> {
        if application.status == previous {
            return None;
        }

        Some(NotificationRequest {
            recipient: Recipient::Candidate(application.candidate_id.clone()),
            kind: NotificationKind::StatusChanged,
            payload: NotificationPayload {
                application_id: Some(application.id.clone()),
                opportunity_title: application.opportunity_title.clone(),
                status: Some(application.status.label().to_string()),
                feedback: application.feedback.clone(),
                ..NotificationPayload::default()
            },
        })
    }

    pub fn on_eligibility_computed(
        &self,
        report: &EligibilityReport,
        opportunity_title: &str,
    ) -> NotificationRequest {
        NotificationRequest {
            recipient: Recipient::Candidate(report.candidate_id.clone()),
            kind: NotificationKind::EligibilityComputed,
            payload: NotificationPayload {
                opportunity_title: opportunity_title.to_string(),
                score: Some(report.score),
                eligible: Some(report.eligible),
                ..NotificationPayload::default()
            },
        }
    }

    /// Send `request`, returning whether the notifier accepted it.
    pub fn dispatch(&self, request: NotificationRequest) -> bool {
        let kind = request.kind;
        match self.notifier.send(request) {
            Ok(()) => true,
            Err(err) => {
                warn!(?kind, error = %err, "notification dispatch failed");
                false
            }
        }
    }

    pub fn dispatch_transition(&self, application: &ApplicationRecord, previous: ApplicationStatus) {
        if let Some(request) = self.on_transition(application, previous) {
            self.dispatch(request);
        }
    }
}
