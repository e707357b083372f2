use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::config::ClassificationConfig;

use super::aggregate::resolve_criteria;
use super::clock::{Clock, SystemClock};
use super::domain::{
    Applicant, ApplicantId, AwardValidation, Criterion, CriterionAward, CriterionId, Event,
    EventId, RegistrationId,
};
use super::ranker::{self, RankingInput, RankingOutcome};
use super::report::views::{ClassificationReport, CsvRow};
use super::report::{self, ReportContext};
use super::repository::{ApplicantRepository, EventRepository, RankingStore, RepositoryError};
use super::scoring::round_points;

/// Facade composing the catalog, the ranking store and the scoring engine.
pub struct ClassificationService<C, S> {
    catalog: Arc<C>,
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    config: ClassificationConfig,
    locks: EventLocks,
}

impl<C, S> ClassificationService<C, S>
where
    C: ApplicantRepository + EventRepository + 'static,
    S: RankingStore + 'static,
{
    pub fn new(catalog: Arc<C>, store: Arc<S>, config: ClassificationConfig) -> Self {
        Self::with_clock(catalog, store, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        catalog: Arc<C>,
        store: Arc<S>,
        config: ClassificationConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            catalog,
            store,
            clock,
            config,
            locks: EventLocks::default(),
        }
    }

    /// Recompute scores, positions and statuses for every registration of the event.
    ///
    /// The run reads everything first and then commits one batch, so a failure leaves the
    /// previously stored ranking untouched. Runs for the same event are serialized.
    pub fn rank(&self, event_id: &EventId) -> Result<RankingOutcome, ClassificationError> {
        let lock = self.locks.handle(*event_id)?;
        let _guard = lock
            .lock()
            .map_err(|_| ClassificationError::LockPoisoned(*event_id))?;

        let (event, catalog) = self.load_event(event_id)?;
        self.rank_locked(&event, &catalog)
    }

    /// Rank the event, then project the outcome into a structured summary.
    pub fn build_report(
        &self,
        event_id: &EventId,
    ) -> Result<ClassificationReport, ClassificationError> {
        let lock = self.locks.handle(*event_id)?;
        let _guard = lock
            .lock()
            .map_err(|_| ClassificationError::LockPoisoned(*event_id))?;

        let (event, catalog) = self.load_event(event_id)?;
        let outcome = self.rank_locked(&event, &catalog)?;
        let confirmed_enrollments = self.catalog.confirmed_enrollments(event_id)?;

        Ok(report::build_report(
            &outcome,
            ReportContext {
                event: &event,
                catalog: &catalog,
                confirmed_enrollments,
                today: self.today(),
            },
        ))
    }

    /// Flattened report rows for spreadsheet export.
    pub fn export_csv(&self, event_id: &EventId) -> Result<Vec<CsvRow>, ClassificationError> {
        let report = self.build_report(event_id)?;
        Ok(report::csv_rows(&report))
    }

    /// Record an operator's grant of `granted` base points (0-100) for a custom criterion.
    ///
    /// The stored weighted points reflect the grant immediately; the composite score and
    /// positions change on the next ranking run.
    pub fn validate_custom_award(
        &self,
        registration_id: &RegistrationId,
        criterion_id: &CriterionId,
        granted: Decimal,
        validator: &str,
    ) -> Result<CriterionAward, ClassificationError> {
        if granted.is_sign_negative() || granted > Decimal::ONE_HUNDRED {
            return Err(ClassificationError::InvalidPoints(granted));
        }

        let registration = self
            .store
            .registration(registration_id)?
            .ok_or(ClassificationError::RegistrationNotFound(*registration_id))?;

        let lock = self.locks.handle(registration.event_id)?;
        let _guard = lock
            .lock()
            .map_err(|_| ClassificationError::LockPoisoned(registration.event_id))?;

        let criterion = self
            .catalog
            .criterion(criterion_id)?
            .ok_or(ClassificationError::CriterionNotFound(*criterion_id))?;
        if !criterion.kind.requires_manual_validation() {
            return Err(ClassificationError::NotCustomCriterion(*criterion_id));
        }
        if !criterion.active {
            return Err(ClassificationError::CriterionInactive(*criterion_id));
        }

        let event = self
            .catalog
            .event(&registration.event_id)?
            .ok_or(ClassificationError::EventNotFound(registration.event_id))?;
        let config = event.criterion_config(*criterion_id).ok_or(
            ClassificationError::CriterionNotConfigured {
                event: event.id,
                criterion: *criterion_id,
            },
        )?;

        let granted = round_points(granted);
        let award = CriterionAward {
            registration_id: registration.id,
            criterion_id: *criterion_id,
            points: round_points(granted * config.weight.as_decimal() / Decimal::TEN),
            validation: AwardValidation::Validated {
                granted,
                validator: validator.to_string(),
                validated_at: self.clock.now(),
            },
        };

        self.store.upsert_award(award.clone())?;
        info!(
            registration_id = registration.id.0,
            criterion_id = criterion_id.0,
            granted = %granted,
            validator,
            "custom criterion validated"
        );

        Ok(award)
    }

    fn today(&self) -> chrono::NaiveDate {
        self.config
            .reference_date
            .unwrap_or_else(|| self.clock.today())
    }

    fn load_event(
        &self,
        event_id: &EventId,
    ) -> Result<(Event, HashMap<CriterionId, Criterion>), ClassificationError> {
        let event = self
            .catalog
            .event(event_id)?
            .ok_or(ClassificationError::EventNotFound(*event_id))?;

        let mut catalog = HashMap::new();
        for config in &event.criteria {
            if let Some(criterion) = self.catalog.criterion(&config.criterion_id)? {
                catalog.insert(criterion.id, criterion);
            }
        }

        Ok((event, catalog))
    }

    fn rank_locked(
        &self,
        event: &Event,
        catalog: &HashMap<CriterionId, Criterion>,
    ) -> Result<RankingOutcome, ClassificationError> {
        info!(event_id = event.id.0, capacity = event.capacity, "ranking event");

        let criteria = resolve_criteria(event, catalog);
        let registrations = self.store.registrations(&event.id)?;

        let mut applicants: HashMap<ApplicantId, Applicant> = HashMap::new();
        let mut awards = HashMap::with_capacity(registrations.len());
        for registration in &registrations {
            if !applicants.contains_key(&registration.applicant_id) {
                let applicant = self
                    .catalog
                    .applicant(&registration.applicant_id)?
                    .ok_or_else(|| ClassificationError::ApplicantNotFound {
                        registration: registration.id,
                        applicant: registration.applicant_id.clone(),
                    })?;
                applicants.insert(applicant.id.clone(), applicant);
            }

            let stored: HashMap<CriterionId, CriterionAward> = self
                .store
                .awards(&registration.id)?
                .into_iter()
                .map(|award| (award.criterion_id, award))
                .collect();
            awards.insert(registration.id, stored);
        }

        let outcome = ranker::rank(RankingInput {
            event,
            criteria: &criteria,
            registrations: &registrations,
            applicants: &applicants,
            awards: &awards,
            today: self.today(),
            now: self.clock.now(),
        })?;

        let batch = outcome.batch();
        debug!(event_id = event.id.0, writes = batch.len(), "committing ranking batch");
        self.store.commit_ranking(batch)?;

        info!(
            event_id = event.id.0,
            ranked = outcome.ranked.len(),
            approved = outcome.approved(),
            waitlisted = outcome.waitlisted(),
            "event ranked"
        );

        Ok(outcome)
    }
}

/// One mutex per event so concurrent runs on the same event never interleave.
#[derive(Default)]
struct EventLocks {
    inner: Mutex<HashMap<EventId, Arc<Mutex<()>>>>,
}

impl EventLocks {
    fn handle(&self, event_id: EventId) -> Result<Arc<Mutex<()>>, ClassificationError> {
        let mut locks = self
            .inner
            .lock()
            .map_err(|_| ClassificationError::LockPoisoned(event_id))?;
        Ok(locks.entry(event_id).or_default().clone())
    }
}

/// Error raised by the classification engine.
#[derive(Debug, thiserror::Error)]
pub enum ClassificationError {
    #[error("{0} not found")]
    EventNotFound(EventId),
    #[error("{0} not found")]
    RegistrationNotFound(RegistrationId),
    #[error("{0} not found")]
    CriterionNotFound(CriterionId),
    #[error("{registration} references unknown applicant {applicant}")]
    ApplicantNotFound {
        registration: RegistrationId,
        applicant: ApplicantId,
    },
    #[error("{0} is not a custom criterion and cannot be validated manually")]
    NotCustomCriterion(CriterionId),
    #[error("{0} is inactive and no longer scored")]
    CriterionInactive(CriterionId),
    #[error("{criterion} is not configured for {event}")]
    CriterionNotConfigured {
        event: EventId,
        criterion: CriterionId,
    },
    #[error("granted points {0} must lie between 0 and 100")]
    InvalidPoints(Decimal),
    #[error("ranking lock for {0} was poisoned")]
    LockPoisoned(EventId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}
