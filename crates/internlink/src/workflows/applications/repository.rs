use super::domain::{
    ApplicationId, ApplicationRecord, ApplicationStatus, Candidate, CandidateId, Opportunity,
    OpportunityId,
};

/// Storage abstraction so the lifecycle can be exercised without a live backend.
///
/// `insert` doubles as the uniqueness backstop for the apply race: an
/// implementation must reject a record with [`RepositoryError::Conflict`] when
/// a non-withdrawn application already exists for the same candidate and
/// opportunity, and must make that check atomic with the write. A record
/// whose id is already stored is rejected with [`RepositoryError::IdTaken`]
/// instead, so an id clash is never reported as a duplicate application.
///
/// `update` is a conditional write: it must replace the stored record only
/// while its status still equals `expected`, and otherwise return
/// [`RepositoryError::StatusChanged`] with the stored status. Two
/// transitions that read the same status can then never both commit.
pub trait ApplicationRepository: Send + Sync {
    fn find_for_pair(
        &self,
        candidate_id: &CandidateId,
        opportunity_id: &OpportunityId,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError>;
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError>;
    fn update(
        &self,
        record: ApplicationRecord,
        expected: ApplicationStatus,
    ) -> Result<ApplicationRecord, RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError>;
    fn list_for_candidate(
        &self,
        candidate_id: &CandidateId,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError>;
    fn list_for_opportunity(
        &self,
        opportunity_id: &OpportunityId,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("active application already exists")]
    Conflict,
    #[error("application id already in use")]
    IdTaken,
    #[error("application status changed concurrently (now {})", current.label())]
    StatusChanged { current: ApplicationStatus },
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Read-only lookups for candidate profiles and postings, both owned by
/// workflows outside this crate.
pub trait ProfileDirectory: Send + Sync {
    fn candidate(&self, id: &CandidateId) -> Result<Option<Candidate>, DirectoryError>;
    fn opportunity(&self, id: &OpportunityId) -> Result<Option<Opportunity>, DirectoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("profile directory unavailable: {0}")]
    Unavailable(String),
}
