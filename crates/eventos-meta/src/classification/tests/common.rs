use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::classification::aggregate::ResolvedCriterion;
use crate::classification::domain::{
    Applicant, ApplicantId, AwardValidation, Classification, Criterion, CriterionAward,
    CriterionId, CriterionKind, DisabilityProfile, Event, EventCriterion, EventId, Modality,
    Registration, RegistrationId, RegistrationStatus, RegistrationWindow, Reservation,
    SocialProgram, Weight,
};
use crate::classification::memory::InMemoryStore;
use crate::classification::repository::{
    ApplicantRepository, AwardStore, ClassificationStore, EventRepository, RankingBatch,
    RankingStore, RegistrationStore, RepositoryError,
};
use crate::classification::{ClassificationService, FixedClock};
use crate::config::ClassificationConfig;

pub(super) const EVENT: EventId = EventId(1);
pub(super) const CUSTOM: CriterionId = CriterionId(90);

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 10, 29).expect("valid date")
}

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 29, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

/// Registration timestamp on October `day`, 2025.
pub(super) fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, day, hour, minute, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn born_years_ago(years: i32) -> NaiveDate {
    let today = today();
    NaiveDate::from_ymd_opt(today.year() - years, today.month(), today.day()).expect("valid date")
}

pub(super) fn points(value: i64) -> Decimal {
    Decimal::from(value)
}

pub(super) fn cents(value: i64) -> Decimal {
    Decimal::new(value, 2)
}

pub(super) fn applicant(cpf: &str, name: &str, birth_date: Option<NaiveDate>) -> Applicant {
    Applicant {
        id: ApplicantId(cpf.to_string()),
        name: name.to_string(),
        birth_date,
        social_program: SocialProgram::default(),
        disability: DisabilityProfile::default(),
        phenotype: None,
    }
}

pub(super) fn criterion(id: u64, kind: CriterionKind) -> Criterion {
    Criterion {
        id: CriterionId(id),
        description: format!("{} #{id}", kind.label()),
        kind,
        active: true,
    }
}

pub(super) fn config(id: u64, weight: u8) -> EventCriterion {
    EventCriterion {
        criterion_id: CriterionId(id),
        weight: Weight::new(weight).expect("weight within range"),
        order: 1,
        min_age: None,
        max_age: None,
        reservation: Reservation::None,
        prioritized_phenotypes: Vec::new(),
    }
}

pub(super) fn resolved(kind: CriterionKind, weight: u8) -> ResolvedCriterion {
    ResolvedCriterion {
        criterion: criterion(1, kind),
        config: config(1, weight),
    }
}

pub(super) fn event(capacity: u32, criteria: Vec<EventCriterion>) -> Event {
    Event {
        id: EVENT,
        name: "Oficina de Reciclagem de Computadores".to_string(),
        status: "Inscrições Abertas".to_string(),
        modality: Modality::InPerson,
        capacity,
        minimum_enrollment: 1,
        registration_window: RegistrationWindow {
            opens: NaiveDate::from_ymd_opt(2025, 10, 1),
            closes: NaiveDate::from_ymd_opt(2025, 10, 31),
        },
        criteria,
    }
}

pub(super) fn registration(id: u64, cpf: &str, registered_at: DateTime<Utc>) -> Registration {
    Registration {
        id: RegistrationId(id),
        event_id: EVENT,
        applicant_id: ApplicantId(cpf.to_string()),
        registered_at,
        status: RegistrationStatus::Registered,
    }
}

pub(super) fn validated(registration: u64, criterion: CriterionId, granted: i64) -> CriterionAward {
    CriterionAward {
        registration_id: RegistrationId(registration),
        criterion_id: criterion,
        points: Decimal::ZERO,
        validation: AwardValidation::Validated {
            granted: points(granted),
            validator: "coordenacao".to_string(),
            validated_at: now(),
        },
    }
}

/// Capacity-2 event ranked purely on a custom criterion with weight 10, so each
/// composite score equals the operator grant: 80 @ Oct 1, 95 @ Oct 2, 80 @ Oct 3.
pub(super) fn scenario_store() -> InMemoryStore {
    let store = InMemoryStore::default();
    store
        .insert_criterion(criterion(CUSTOM.0, CriterionKind::Custom))
        .expect("criterion inserted");
    store
        .insert_event(event(2, vec![config(CUSTOM.0, 10)]))
        .expect("event inserted");

    let entrants = [
        (1, "11111111111", "Ana Souza", at(1, 9, 30), 80),
        (2, "22222222222", "Bruno Lima", at(2, 10, 0), 95),
        (3, "33333333333", "Carla Dias", at(3, 8, 15), 80),
    ];
    for (id, cpf, name, registered_at, granted) in entrants {
        store
            .insert_applicant(applicant(cpf, name, Some(born_years_ago(20))))
            .expect("applicant inserted");
        store
            .register(registration(id, cpf, registered_at))
            .expect("registration inserted");
        store
            .upsert_award(validated(id, CUSTOM, granted))
            .expect("award inserted");
    }

    store
}

pub(super) fn service_with(
    store: Arc<InMemoryStore>,
) -> ClassificationService<InMemoryStore, InMemoryStore> {
    ClassificationService::with_clock(
        store.clone(),
        store,
        ClassificationConfig::default(),
        Arc::new(FixedClock(now())),
    )
}

pub(super) fn classifications(store: &InMemoryStore) -> HashMap<RegistrationId, Classification> {
    store
        .snapshot()
        .expect("snapshot")
        .classifications
        .into_iter()
        .map(|classification| (classification.registration_id, classification))
        .collect()
}

/// Delegates reads to an in-memory store but refuses every ranking commit.
pub(super) struct RejectingCommitStore {
    pub(super) inner: InMemoryStore,
}

impl RegistrationStore for RejectingCommitStore {
    fn registrations(&self, event: &EventId) -> Result<Vec<Registration>, RepositoryError> {
        self.inner.registrations(event)
    }

    fn registration(&self, id: &RegistrationId) -> Result<Option<Registration>, RepositoryError> {
        self.inner.registration(id)
    }
}

impl AwardStore for RejectingCommitStore {
    fn awards(&self, registration: &RegistrationId) -> Result<Vec<CriterionAward>, RepositoryError> {
        self.inner.awards(registration)
    }

    fn upsert_award(&self, award: CriterionAward) -> Result<(), RepositoryError> {
        self.inner.upsert_award(award)
    }
}

impl ClassificationStore for RejectingCommitStore {
    fn classification(
        &self,
        registration: &RegistrationId,
    ) -> Result<Option<Classification>, RepositoryError> {
        self.inner.classification(registration)
    }
}

impl RankingStore for RejectingCommitStore {
    fn commit_ranking(&self, _batch: RankingBatch) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("transaction aborted".to_string()))
    }
}

pub(super) struct UnavailableStore;

impl ApplicantRepository for UnavailableStore {
    fn applicant(&self, _id: &ApplicantId) -> Result<Option<Applicant>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

impl EventRepository for UnavailableStore {
    fn event(&self, _id: &EventId) -> Result<Option<Event>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn criterion(&self, _id: &CriterionId) -> Result<Option<Criterion>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn confirmed_enrollments(&self, _id: &EventId) -> Result<u32, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}
