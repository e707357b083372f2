use serde::{Deserialize, Serialize};

use super::domain::{
    Applicant, ApplicantId, Classification, Criterion, CriterionAward, CriterionId, Event,
    EventId, InvalidEvent, Registration, RegistrationId, RegistrationStatus,
};

/// Read-only applicant lookup.
pub trait ApplicantRepository: Send + Sync {
    fn applicant(&self, id: &ApplicantId) -> Result<Option<Applicant>, RepositoryError>;
}

/// Read-only event, criterion catalog and enrollment lookups.
pub trait EventRepository: Send + Sync {
    fn event(&self, id: &EventId) -> Result<Option<Event>, RepositoryError>;
    fn criterion(&self, id: &CriterionId) -> Result<Option<Criterion>, RepositoryError>;
    /// Confirmed enrollments across every section of the event.
    fn confirmed_enrollments(&self, id: &EventId) -> Result<u32, RepositoryError>;
}

pub trait RegistrationStore: Send + Sync {
    fn registrations(&self, event: &EventId) -> Result<Vec<Registration>, RepositoryError>;
    fn registration(&self, id: &RegistrationId) -> Result<Option<Registration>, RepositoryError>;
}

/// Awards keyed by (registration, criterion).
pub trait AwardStore: Send + Sync {
    fn awards(&self, registration: &RegistrationId) -> Result<Vec<CriterionAward>, RepositoryError>;
    fn upsert_award(&self, award: CriterionAward) -> Result<(), RepositoryError>;
}

/// Classifications keyed by registration.
pub trait ClassificationStore: Send + Sync {
    fn classification(
        &self,
        registration: &RegistrationId,
    ) -> Result<Option<Classification>, RepositoryError>;
}

/// Store able to apply a whole ranking run at once.
///
/// Implementations must apply every write in the batch or none of them.
pub trait RankingStore: RegistrationStore + AwardStore + ClassificationStore {
    fn commit_ranking(&self, batch: RankingBatch) -> Result<(), RepositoryError>;
}

/// All writes produced by ranking one event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankingBatch {
    pub event_id: EventId,
    pub awards: Vec<CriterionAward>,
    pub classifications: Vec<Classification>,
    pub statuses: Vec<(RegistrationId, RegistrationStatus)>,
}

impl RankingBatch {
    pub fn len(&self) -> usize {
        self.awards.len() + self.classifications.len() + self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    InvalidEvent(#[from] InvalidEvent),
}
