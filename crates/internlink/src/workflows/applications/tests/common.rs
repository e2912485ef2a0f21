use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::applications::domain::{
    ApplicationId, ApplicationRecord, ApplicationStatus, ApplicationSubmission, Candidate,
    CandidateId, Opportunity, OpportunityId, OrganizationId,
};
use crate::workflows::applications::notifications::{
    NotificationRequest, Notifier, NotifierError,
};
use crate::workflows::applications::repository::{
    ApplicationRepository, DirectoryError, ProfileDirectory, RepositoryError,
};
use crate::workflows::applications::{
    application_router, EligibilityBands, InternshipApplicationService,
};

pub(super) fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0)
        .single()
        .expect("valid instant")
}

pub(super) fn data_internship() -> Opportunity {
    Opportunity {
        id: OpportunityId("opp-data".to_string()),
        title: "Data Analyst Intern".to_string(),
        required_skills: vec!["Python".to_string(), "SQL".to_string(), "Docker".to_string()],
        application_deadline: Utc
            .with_ymd_and_hms(2025, 3, 31, 23, 59, 0)
            .single()
            .expect("valid instant"),
        active: true,
    }
}

pub(super) fn closed_internship() -> Opportunity {
    Opportunity {
        id: OpportunityId("opp-closed".to_string()),
        title: "Marketing Intern".to_string(),
        required_skills: vec!["Copywriting".to_string()],
        application_deadline: Utc
            .with_ymd_and_hms(2025, 2, 1, 0, 0, 0)
            .single()
            .expect("valid instant"),
        active: true,
    }
}

pub(super) fn inactive_internship() -> Opportunity {
    let mut opportunity = data_internship();
    opportunity.id = OpportunityId("opp-inactive".to_string());
    opportunity.title = "Archived Intern Role".to_string();
    opportunity.active = false;
    opportunity
}

pub(super) fn open_internship_without_requirements() -> Opportunity {
    let mut opportunity = data_internship();
    opportunity.id = OpportunityId("opp-open".to_string());
    opportunity.title = "Community Volunteer Intern".to_string();
    opportunity.required_skills = Vec::new();
    opportunity
}

pub(super) fn amara() -> Candidate {
    Candidate {
        id: CandidateId("cand-amara".to_string()),
        display_name: "Amara".to_string(),
        skills: vec!["python".to_string(), "communication".to_string()],
    }
}

pub(super) fn kofi() -> Candidate {
    Candidate {
        id: CandidateId("cand-kofi".to_string()),
        display_name: "Kofi".to_string(),
        skills: vec![
            "Python 3".to_string(),
            "PostgreSQL".to_string(),
            "Docker Compose".to_string(),
        ],
    }
}

pub(super) fn organization() -> OrganizationId {
    OrganizationId("org-brightpath".to_string())
}

pub(super) fn submission(candidate: &Candidate, opportunity: &Opportunity) -> ApplicationSubmission {
    ApplicationSubmission {
        candidate_id: candidate.id.clone(),
        opportunity_id: opportunity.id.clone(),
        organization_id: organization(),
        cover_letter: Some("I would love to learn from your analytics team.".to_string()),
    }
}

pub(super) type TestService =
    InternshipApplicationService<MemoryRepository, MemoryDirectory, MemoryNotifier>;

pub(super) fn build_service() -> (TestService, Arc<MemoryRepository>, Arc<MemoryNotifier>) {
    let repository = Arc::new(MemoryRepository::default());
    let notifier = Arc::new(MemoryNotifier::default());
    let service = InternshipApplicationService::new(
        repository.clone(),
        Arc::new(MemoryDirectory::seeded()),
        notifier.clone(),
        EligibilityBands::default(),
    )
    .with_clock(fixed_now);
    (service, repository, notifier)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<ApplicationId, ApplicationRecord>>>,
}

impl MemoryRepository {
    pub(super) fn len(&self) -> usize {
        self.records.lock().expect("repository mutex poisoned").len()
    }

    /// Store a record as-is, bypassing the insert checks.
    pub(super) fn seed(&self, record: ApplicationRecord) {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .insert(record.id.clone(), record);
    }

    pub(super) fn fetch_for_test(&self, id: &ApplicationId) -> Option<ApplicationRecord> {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .get(id)
            .cloned()
    }
}

impl ApplicationRepository for MemoryRepository {
    fn find_for_pair(
        &self,
        candidate_id: &CandidateId,
        opportunity_id: &OpportunityId,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| {
                &record.candidate_id == candidate_id && &record.opportunity_id == opportunity_id
            })
            .cloned()
            .collect())
    }

    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let duplicate = guard.values().any(|existing| {
            existing.is_active()
                && existing.candidate_id == record.candidate_id
                && existing.opportunity_id == record.opportunity_id
        });
        if duplicate {
            return Err(RepositoryError::Conflict);
        }
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::IdTaken);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update(
        &self,
        record: ApplicationRecord,
        expected: ApplicationStatus,
    ) -> Result<ApplicationRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let current = guard
            .get(&record.id)
            .map(|stored| stored.status)
            .ok_or(RepositoryError::NotFound)?;
        if current != expected {
            return Err(RepositoryError::StatusChanged { current });
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list_for_candidate(
        &self,
        candidate_id: &CandidateId,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| &record.candidate_id == candidate_id)
            .cloned()
            .collect())
    }

    fn list_for_opportunity(
        &self,
        opportunity_id: &OpportunityId,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| &record.opportunity_id == opportunity_id)
            .cloned()
            .collect())
    }
}

/// Repository whose pair lookup never sees existing rows, simulating the
/// window where two applies race past the guard.
#[derive(Default, Clone)]
pub(super) struct BlindRepository {
    pub(super) inner: MemoryRepository,
}

impl ApplicationRepository for BlindRepository {
    fn find_for_pair(
        &self,
        _candidate_id: &CandidateId,
        _opportunity_id: &OpportunityId,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        Ok(Vec::new())
    }

    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        self.inner.insert(record)
    }

    fn update(
        &self,
        record: ApplicationRecord,
        expected: ApplicationStatus,
    ) -> Result<ApplicationRecord, RepositoryError> {
        self.inner.update(record, expected)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn list_for_candidate(
        &self,
        candidate_id: &CandidateId,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        self.inner.list_for_candidate(candidate_id)
    }

    fn list_for_opportunity(
        &self,
        opportunity_id: &OpportunityId,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        self.inner.list_for_opportunity(opportunity_id)
    }
}

/// Repository that reports an id clash for the first `collisions` inserts,
/// as a persistent store would after the id generator repeats.
#[derive(Default, Clone)]
pub(super) struct CollidingRepository {
    pub(super) inner: MemoryRepository,
    pub(super) collisions: Arc<Mutex<usize>>,
}

impl CollidingRepository {
    pub(super) fn colliding(times: usize) -> Self {
        Self {
            inner: MemoryRepository::default(),
            collisions: Arc::new(Mutex::new(times)),
        }
    }
}

impl ApplicationRepository for CollidingRepository {
    fn find_for_pair(
        &self,
        candidate_id: &CandidateId,
        opportunity_id: &OpportunityId,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        self.inner.find_for_pair(candidate_id, opportunity_id)
    }

    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        let mut remaining = self.collisions.lock().expect("collision mutex poisoned");
        if *remaining > 0 {
            *remaining -= 1;
            return Err(RepositoryError::IdTaken);
        }
        drop(remaining);
        self.inner.insert(record)
    }

    fn update(
        &self,
        record: ApplicationRecord,
        expected: ApplicationStatus,
    ) -> Result<ApplicationRecord, RepositoryError> {
        self.inner.update(record, expected)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn list_for_candidate(
        &self,
        candidate_id: &CandidateId,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        self.inner.list_for_candidate(candidate_id)
    }

    fn list_for_opportunity(
        &self,
        opportunity_id: &OpportunityId,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        self.inner.list_for_opportunity(opportunity_id)
    }
}

/// Repository whose next `fetch` returns a snapshot taken before another
/// writer moved the application on.
#[derive(Default, Clone)]
pub(super) struct StaleReadRepository {
    pub(super) inner: MemoryRepository,
    pub(super) stale: Arc<Mutex<Option<ApplicationRecord>>>,
}

impl StaleReadRepository {
    pub(super) fn serve_stale_once(&self, snapshot: ApplicationRecord) {
        *self.stale.lock().expect("stale mutex poisoned") = Some(snapshot);
    }
}

impl ApplicationRepository for StaleReadRepository {
    fn find_for_pair(
        &self,
        candidate_id: &CandidateId,
        opportunity_id: &OpportunityId,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        self.inner.find_for_pair(candidate_id, opportunity_id)
    }

    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        self.inner.insert(record)
    }

    fn update(
        &self,
        record: ApplicationRecord,
        expected: ApplicationStatus,
    ) -> Result<ApplicationRecord, RepositoryError> {
        self.inner.update(record, expected)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        if let Some(snapshot) = self.stale.lock().expect("stale mutex poisoned").take() {
            return Ok(Some(snapshot));
        }
        self.inner.fetch(id)
    }

    fn list_for_candidate(
        &self,
        candidate_id: &CandidateId,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        self.inner.list_for_candidate(candidate_id)
    }

    fn list_for_opportunity(
        &self,
        opportunity_id: &OpportunityId,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        self.inner.list_for_opportunity(opportunity_id)
    }
}

pub(super) struct UnavailableRepository;

impl ApplicationRepository for UnavailableRepository {
    fn find_for_pair(
        &self,
        _candidate_id: &CandidateId,
        _opportunity_id: &OpportunityId,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert(&self, _record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(
        &self,
        _record: ApplicationRecord,
        _expected: ApplicationStatus,
    ) -> Result<ApplicationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list_for_candidate(
        &self,
        _candidate_id: &CandidateId,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list_for_opportunity(
        &self,
        _opportunity_id: &OpportunityId,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryDirectory {
    candidates: HashMap<CandidateId, Candidate>,
    opportunities: HashMap<OpportunityId, Opportunity>,
}

impl MemoryDirectory {
    pub(super) fn seeded() -> Self {
        let mut directory = Self::default();
        for candidate in [amara(), kofi()] {
            directory.candidates.insert(candidate.id.clone(), candidate);
        }
        for opportunity in [
            data_internship(),
            closed_internship(),
            inactive_internship(),
            open_internship_without_requirements(),
        ] {
            directory
                .opportunities
                .insert(opportunity.id.clone(), opportunity);
        }
        directory
    }
}

impl ProfileDirectory for MemoryDirectory {
    fn candidate(&self, id: &CandidateId) -> Result<Option<Candidate>, DirectoryError> {
        Ok(self.candidates.get(id).cloned())
    }

    fn opportunity(&self, id: &OpportunityId) -> Result<Option<Opportunity>, DirectoryError> {
        Ok(self.opportunities.get(id).cloned())
    }
}

pub(super) struct UnavailableDirectory;

impl ProfileDirectory for UnavailableDirectory {
    fn candidate(&self, _id: &CandidateId) -> Result<Option<Candidate>, DirectoryError> {
        Err(DirectoryError::Unavailable("profile store offline".to_string()))
    }

    fn opportunity(&self, _id: &OpportunityId) -> Result<Option<Opportunity>, DirectoryError> {
        Err(DirectoryError::Unavailable("profile store offline".to_string()))
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotifier {
    events: Arc<Mutex<Vec<NotificationRequest>>>,
}

impl MemoryNotifier {
    pub(super) fn events(&self) -> Vec<NotificationRequest> {
        self.events.lock().expect("notifier mutex poisoned").clone()
    }
}

impl Notifier for MemoryNotifier {
    fn send(&self, request: NotificationRequest) -> Result<(), NotifierError> {
        self.events
            .lock()
            .expect("notifier mutex poisoned")
            .push(request);
        Ok(())
    }
}

pub(super) struct FailingNotifier;

impl Notifier for FailingNotifier {
    fn send(&self, _request: NotificationRequest) -> Result<(), NotifierError> {
        Err(NotifierError::Transport("push gateway timeout".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn assert_status(response: &Response, expected: StatusCode) {
    assert_eq!(response.status(), expected);
}

pub(super) fn router_with_service(service: TestService) -> axum::Router {
    application_router(Arc::new(service))
}
