use std::collections::{BTreeMap, HashSet};
use std::io::{Read, Write};
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use super::domain::{
    Applicant, ApplicantId, Classification, Criterion, CriterionAward, CriterionId, Event,
    EventId, Registration, RegistrationId, Section,
};
use super::repository::{
    ApplicantRepository, AwardStore, ClassificationStore, EventRepository, RankingBatch,
    RankingStore, RegistrationStore, RepositoryError,
};

/// Serializable snapshot of everything the in-memory store holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub applicants: Vec<Applicant>,
    #[serde(default)]
    pub criteria: Vec<Criterion>,
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub registrations: Vec<Registration>,
    #[serde(default)]
    pub awards: Vec<CriterionAward>,
    #[serde(default)]
    pub classifications: Vec<Classification>,
}

impl Dataset {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, serde_json::Error> {
        serde_json::from_reader(reader)
    }

    pub fn to_writer<W: Write>(&self, writer: W) -> Result<(), serde_json::Error> {
        serde_json::to_writer_pretty(writer, self)
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    applicants: BTreeMap<ApplicantId, Applicant>,
    criteria: BTreeMap<CriterionId, Criterion>,
    events: BTreeMap<EventId, Event>,
    sections: Vec<Section>,
    registrations: BTreeMap<RegistrationId, Registration>,
    awards: BTreeMap<(RegistrationId, CriterionId), CriterionAward>,
    classifications: BTreeMap<RegistrationId, Classification>,
}

/// Mutex-guarded store implementing every repository trait.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<MemoryState>,
}

impl InMemoryStore {
    /// Load a dataset, enforcing one registration per (event, applicant).
    pub fn from_dataset(dataset: Dataset) -> Result<Self, RepositoryError> {
        let store = Self::default();
        {
            let mut state = store.state()?;
            state.applicants = dataset
                .applicants
                .into_iter()
                .map(|applicant| (applicant.id.clone(), applicant))
                .collect();
            state.criteria = dataset
                .criteria
                .into_iter()
                .map(|criterion| (criterion.id, criterion))
                .collect();
            state.events = dataset
                .events
                .into_iter()
                .map(|event| event.validate().map(|()| (event.id, event)))
                .collect::<Result<_, _>>()?;
            state.sections = dataset.sections;
            state.awards = dataset
                .awards
                .into_iter()
                .map(|award| ((award.registration_id, award.criterion_id), award))
                .collect();
            state.classifications = dataset
                .classifications
                .into_iter()
                .map(|classification| (classification.registration_id, classification))
                .collect();
        }

        for registration in dataset.registrations {
            store.register(registration)?;
        }

        Ok(store)
    }

    pub fn snapshot(&self) -> Result<Dataset, RepositoryError> {
        let state = self.state()?;
        Ok(Dataset {
            applicants: state.applicants.values().cloned().collect(),
            criteria: state.criteria.values().cloned().collect(),
            events: state.events.values().cloned().collect(),
            sections: state.sections.clone(),
            registrations: state.registrations.values().cloned().collect(),
            awards: state.awards.values().cloned().collect(),
            classifications: state.classifications.values().cloned().collect(),
        })
    }

    pub fn insert_applicant(&self, applicant: Applicant) -> Result<(), RepositoryError> {
        let mut state = self.state()?;
        state.applicants.insert(applicant.id.clone(), applicant);
        Ok(())
    }

    pub fn insert_criterion(&self, criterion: Criterion) -> Result<(), RepositoryError> {
        let mut state = self.state()?;
        state.criteria.insert(criterion.id, criterion);
        Ok(())
    }

    /// Store an event after checking its configured limits.
    pub fn insert_event(&self, event: Event) -> Result<(), RepositoryError> {
        event.validate()?;
        let mut state = self.state()?;
        state.events.insert(event.id, event);
        Ok(())
    }

    pub fn insert_section(&self, section: Section) -> Result<(), RepositoryError> {
        let mut state = self.state()?;
        state.sections.push(section);
        Ok(())
    }

    /// Add a registration; a second one for the same (event, applicant) is a conflict.
    pub fn register(&self, registration: Registration) -> Result<(), RepositoryError> {
        let mut state = self.state()?;
        let duplicate = state.registrations.values().any(|existing| {
            existing.id == registration.id
                || (existing.event_id == registration.event_id
                    && existing.applicant_id == registration.applicant_id)
        });
        if duplicate {
            return Err(RepositoryError::Conflict);
        }

        state.registrations.insert(registration.id, registration);
        Ok(())
    }

    fn state(&self) -> Result<MutexGuard<'_, MemoryState>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store mutex poisoned".to_string()))
    }
}

impl ApplicantRepository for InMemoryStore {
    fn applicant(&self, id: &ApplicantId) -> Result<Option<Applicant>, RepositoryError> {
        Ok(self.state()?.applicants.get(id).cloned())
    }
}

impl EventRepository for InMemoryStore {
    fn event(&self, id: &EventId) -> Result<Option<Event>, RepositoryError> {
        Ok(self.state()?.events.get(id).cloned())
    }

    fn criterion(&self, id: &CriterionId) -> Result<Option<Criterion>, RepositoryError> {
        Ok(self.state()?.criteria.get(id).cloned())
    }

    fn confirmed_enrollments(&self, id: &EventId) -> Result<u32, RepositoryError> {
        Ok(self
            .state()?
            .sections
            .iter()
            .filter(|section| section.event_id == *id)
            .map(Section::confirmed_enrollments)
            .sum())
    }
}

impl RegistrationStore for InMemoryStore {
    fn registrations(&self, event: &EventId) -> Result<Vec<Registration>, RepositoryError> {
        Ok(self
            .state()?
            .registrations
            .values()
            .filter(|registration| registration.event_id == *event)
            .cloned()
            .collect())
    }

    fn registration(&self, id: &RegistrationId) -> Result<Option<Registration>, RepositoryError> {
        Ok(self.state()?.registrations.get(id).cloned())
    }
}

impl AwardStore for InMemoryStore {
    fn awards(&self, registration: &RegistrationId) -> Result<Vec<CriterionAward>, RepositoryError> {
        Ok(self
            .state()?
            .awards
            .values()
            .filter(|award| award.registration_id == *registration)
            .cloned()
            .collect())
    }

    fn upsert_award(&self, award: CriterionAward) -> Result<(), RepositoryError> {
        let mut state = self.state()?;
        if !state.registrations.contains_key(&award.registration_id) {
            return Err(RepositoryError::NotFound);
        }
        state
            .awards
            .insert((award.registration_id, award.criterion_id), award);
        Ok(())
    }
}

impl ClassificationStore for InMemoryStore {
    fn classification(
        &self,
        registration: &RegistrationId,
    ) -> Result<Option<Classification>, RepositoryError> {
        Ok(self.state()?.classifications.get(registration).cloned())
    }
}

impl RankingStore for InMemoryStore {
    fn commit_ranking(&self, batch: RankingBatch) -> Result<(), RepositoryError> {
        let mut state = self.state()?;

        // Validate the whole batch before the first write.
        let touched: HashSet<RegistrationId> = batch
            .awards
            .iter()
            .map(|award| award.registration_id)
            .chain(batch.classifications.iter().map(|c| c.registration_id))
            .chain(batch.statuses.iter().map(|(id, _)| *id))
            .collect();
        let all_known = touched.iter().all(|id| {
            state
                .registrations
                .get(id)
                .is_some_and(|registration| registration.event_id == batch.event_id)
        });
        if !all_known {
            return Err(RepositoryError::NotFound);
        }

        for award in batch.awards {
            state
                .awards
                .insert((award.registration_id, award.criterion_id), award);
        }
        for classification in batch.classifications {
            state
                .classifications
                .insert(classification.registration_id, classification);
        }
        for (id, status) in batch.statuses {
            if let Some(registration) = state.registrations.get_mut(&id) {
                registration.status = status;
            }
        }

        Ok(())
    }
}
