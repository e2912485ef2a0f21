use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::domain::{
    ApplicationId, ApplicationRecord, ApplicationStatus, ApplicationSubmission, Candidate,
    CandidateId, Opportunity, OpportunityId,
};
use super::eligibility::{EligibilityBands, EligibilityReport, EligibilityReportBuilder};
use super::error::ApplicationError;
use super::lifecycle::{ApplicationStateMachine, Transition};
use super::notifications::{NotificationDispatcher, Notifier};
use super::repository::{ApplicationRepository, ProfileDirectory};

/// Source of "now" for deadline checks and timestamps.
pub type Clock = fn() -> DateTime<Utc>;

/// Facade composing eligibility scoring, the lifecycle state machine, and
/// notification dispatch behind the public operations.
pub struct InternshipApplicationService<R, D, N> {
    repository: Arc<R>,
    directory: Arc<D>,
    lifecycle: ApplicationStateMachine<R>,
    reports: EligibilityReportBuilder,
    dispatcher: NotificationDispatcher<N>,
    clock: Clock,
}

impl<R, D, N> InternshipApplicationService<R, D, N>
where
    R: ApplicationRepository + 'static,
    D: ProfileDirectory + 'static,
    N: Notifier + 'static,
{
    pub fn new(
        repository: Arc<R>,
        directory: Arc<D>,
        notifier: Arc<N>,
        bands: EligibilityBands,
    ) -> Self {
        Self {
            lifecycle: ApplicationStateMachine::new(repository.clone()),
            repository,
            directory,
            reports: EligibilityReportBuilder::new(bands),
            dispatcher: NotificationDispatcher::new(notifier),
            clock: Utc::now,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Score the candidate against the posting and tell the candidate the result.
    pub fn compute_eligibility(
        &self,
        candidate_id: &CandidateId,
        opportunity_id: &OpportunityId,
    ) -> Result<EligibilityReport, ApplicationError> {
        let candidate = self.candidate(candidate_id)?;
        let opportunity = self.opportunity(opportunity_id)?;

        let report = self.reports.build(&candidate, &opportunity);
        debug!(
            candidate = %candidate_id,
            opportunity = %opportunity_id,
            score = report.score,
            tier = report.tier.label(),
            "eligibility computed"
        );

        let request = self
            .dispatcher
            .on_eligibility_computed(&report, &opportunity.title);
        self.dispatcher.dispatch(request);

        Ok(report)
    }

    /// Create a `Pending` application. Eligibility is advisory and never checked here.
    pub fn apply(
        &self,
        submission: ApplicationSubmission,
    ) -> Result<ApplicationRecord, ApplicationError> {
        let ApplicationSubmission {
            candidate_id,
            opportunity_id,
            organization_id,
            cover_letter,
        } = submission;

        let opportunity = self.opportunity(&opportunity_id)?;
        let record = self.lifecycle.create(
            &candidate_id,
            &opportunity,
            organization_id,
            cover_letter,
            (self.clock)(),
        )?;

        info!(
            application = %record.id,
            candidate = %record.candidate_id,
            opportunity = %record.opportunity_id,
            "application created"
        );

        let request = self.dispatcher.on_application_created(&record);
        self.dispatcher.dispatch(request);

        Ok(record)
    }

    pub fn transition_application(
        &self,
        application_id: &ApplicationId,
        target: ApplicationStatus,
        feedback: Option<String>,
    ) -> Result<ApplicationRecord, ApplicationError> {
        let transition =
            self.lifecycle
                .transition(application_id, target, feedback, (self.clock)())?;
        Ok(self.after_commit(transition))
    }

    pub fn withdraw(
        &self,
        application_id: &ApplicationId,
        requesting_candidate: &CandidateId,
    ) -> Result<ApplicationRecord, ApplicationError> {
        let transition =
            self.lifecycle
                .withdraw(application_id, requesting_candidate, (self.clock)())?;
        Ok(self.after_commit(transition))
    }

    pub fn get(&self, application_id: &ApplicationId) -> Result<ApplicationRecord, ApplicationError> {
        self.repository
            .fetch(application_id)
            .map_err(ApplicationError::repository)?
            .ok_or_else(|| ApplicationError::ApplicationNotFound(application_id.clone()))
    }

    pub fn applications_for_candidate(
        &self,
        candidate_id: &CandidateId,
    ) -> Result<Vec<ApplicationRecord>, ApplicationError> {
        let mut records = self
            .repository
            .list_for_candidate(candidate_id)
            .map_err(ApplicationError::repository)?;
        records.sort_by(|left, right| right.applied_at.cmp(&left.applied_at));
        Ok(records)
    }

    pub fn applications_for_opportunity(
        &self,
        opportunity_id: &OpportunityId,
    ) -> Result<Vec<ApplicationRecord>, ApplicationError> {
        let mut records = self
            .repository
            .list_for_opportunity(opportunity_id)
            .map_err(ApplicationError::repository)?;
        records.sort_by(|left, right| left.applied_at.cmp(&right.applied_at));
        Ok(records)
    }

    fn after_commit(&self, transition: Transition) -> ApplicationRecord {
        let Transition { record, previous } = transition;
        info!(
            application = %record.id,
            from = previous.label(),
            to = record.status.label(),
            "application status changed"
        );
        self.dispatcher.dispatch_transition(&record, previous);
        record
    }

    fn candidate(&self, candidate_id: &CandidateId) -> Result<Candidate, ApplicationError> {
        self.directory
            .candidate(candidate_id)?
            .ok_or_else(|| ApplicationError::CandidateNotFound(candidate_id.clone()))
    }

    fn opportunity(&self, opportunity_id: &OpportunityId) -> Result<Opportunity, ApplicationError> {
        self.directory
            .opportunity(opportunity_id)?
            .ok_or_else(|| ApplicationError::OpportunityNotFound(opportunity_id.clone()))
    }
}
