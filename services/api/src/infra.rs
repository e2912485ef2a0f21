use chrono::{Duration, Utc};
use internlink::workflows::applications::{
    ApplicationId, ApplicationRecord, ApplicationRepository, ApplicationStatus, Candidate,
    CandidateId, DirectoryError, NotificationRequest, Notifier, NotifierError, Opportunity,
    OpportunityId, ProfileDirectory, RepositoryError,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

type RecordMap = HashMap<ApplicationId, ApplicationRecord>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryApplicationRepository {
    records: Arc<Mutex<RecordMap>>,
}

impl InMemoryApplicationRepository {
    fn lock(&self) -> Result<MutexGuard<'_, RecordMap>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
    }

    fn matching(
        &self,
        predicate: impl Fn(&ApplicationRecord) -> bool,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard
            .values()
            .filter(|record| predicate(record))
            .cloned()
            .collect())
    }
}

impl ApplicationRepository for InMemoryApplicationRepository {
    fn find_for_pair(
        &self,
        candidate_id: &CandidateId,
        opportunity_id: &OpportunityId,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        self.matching(|record| {
            &record.candidate_id == candidate_id && &record.opportunity_id == opportunity_id
        })
    }

    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        let mut guard = self.lock()?;
        let active_pair = guard.values().any(|existing| {
            existing.is_active()
                && existing.candidate_id == record.candidate_id
                && existing.opportunity_id == record.opportunity_id
        });
        if active_pair {
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
        let mut guard = self.lock()?;
        match guard.get(&record.id).map(|stored| stored.status) {
            None => Err(RepositoryError::NotFound),
            Some(current) if current != expected => {
                Err(RepositoryError::StatusChanged { current })
            }
            Some(_) => {
                guard.insert(record.id.clone(), record.clone());
                Ok(record)
            }
        }
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard.get(id).cloned())
    }

    fn list_for_candidate(
        &self,
        candidate_id: &CandidateId,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        self.matching(|record| &record.candidate_id == candidate_id)
    }

    fn list_for_opportunity(
        &self,
        opportunity_id: &OpportunityId,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        self.matching(|record| &record.opportunity_id == opportunity_id)
    }
}

/// Profile store seeded with a handful of candidates and postings so the
/// service is usable without an upstream profile system.
#[derive(Default, Clone)]
pub(crate) struct InMemoryProfileDirectory {
    candidates: HashMap<CandidateId, Candidate>,
    opportunities: HashMap<OpportunityId, Opportunity>,
}

impl InMemoryProfileDirectory {
    pub(crate) fn seeded() -> Self {
        let mut directory = Self::default();
        for candidate in seed_candidates() {
            directory.candidates.insert(candidate.id.clone(), candidate);
        }
        for opportunity in seed_opportunities() {
            directory
                .opportunities
                .insert(opportunity.id.clone(), opportunity);
        }
        directory
    }
}

impl ProfileDirectory for InMemoryProfileDirectory {
    fn candidate(&self, id: &CandidateId) -> Result<Option<Candidate>, DirectoryError> {
        Ok(self.candidates.get(id).cloned())
    }

    fn opportunity(&self, id: &OpportunityId) -> Result<Option<Opportunity>, DirectoryError> {
        Ok(self.opportunities.get(id).cloned())
    }
}

fn seed_candidates() -> Vec<Candidate> {
    vec![
        Candidate {
            id: CandidateId("cand-amara".to_string()),
            display_name: "Amara Okafor".to_string(),
            skills: vec!["Python".to_string(), "Communication".to_string()],
        },
        Candidate {
            id: CandidateId("cand-kofi".to_string()),
            display_name: "Kofi Mensah".to_string(),
            skills: vec![
                "Python 3".to_string(),
                "PostgreSQL".to_string(),
                "Docker Compose".to_string(),
            ],
        },
    ]
}

// Deadlines are relative to process start so the seeded postings stay open.
fn seed_opportunities() -> Vec<Opportunity> {
    let now = Utc::now();
    vec![
        Opportunity {
            id: OpportunityId("opp-data".to_string()),
            title: "Data Analyst Intern".to_string(),
            required_skills: vec!["Python".to_string(), "SQL".to_string(), "Docker".to_string()],
            application_deadline: now + Duration::days(30),
            active: true,
        },
        Opportunity {
            id: OpportunityId("opp-frontend".to_string()),
            title: "Frontend Developer Intern".to_string(),
            required_skills: vec![
                "JavaScript".to_string(),
                "React".to_string(),
                "CSS".to_string(),
                "Git".to_string(),
            ],
            application_deadline: now + Duration::days(14),
            active: true,
        },
        Opportunity {
            id: OpportunityId("opp-archived".to_string()),
            title: "Marketing Intern".to_string(),
            required_skills: vec!["Copywriting".to_string()],
            application_deadline: now - Duration::days(7),
            active: false,
        },
    ]
}

/// Notifier that records deliveries in the service log.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct LoggingNotifier;

impl Notifier for LoggingNotifier {
    fn send(&self, request: NotificationRequest) -> Result<(), NotifierError> {
        let payload = serde_json::to_string(&request.payload)
            .map_err(|err| NotifierError::Rejected(err.to_string()))?;
        info!(
            recipient = ?request.recipient,
            kind = ?request.kind,
            %payload,
            "notification delivered"
        );
        Ok(())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryNotifier {
    events: Arc<Mutex<Vec<NotificationRequest>>>,
}

impl Notifier for InMemoryNotifier {
    fn send(&self, request: NotificationRequest) -> Result<(), NotifierError> {
        let mut guard = self
            .events
            .lock()
            .map_err(|_| NotifierError::Transport("notifier mutex poisoned".to_string()))?;
        guard.push(request);
        Ok(())
    }
}

impl InMemoryNotifier {
    pub(crate) fn events(&self) -> Vec<NotificationRequest> {
        self.events
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}
