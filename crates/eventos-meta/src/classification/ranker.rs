use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::debug;

use super::aggregate::{aggregate, AggregateContext, Contribution, ResolvedCriterion};
use super::domain::{
    Applicant, ApplicantId, Classification, CriterionAward, CriterionId, Event, EventId,
    Registration, RegistrationId, RegistrationStatus,
};
use super::repository::RankingBatch;
use super::scoring::RegistrationStanding;
use super::service::ClassificationError;

/// Everything the ranker reads, gathered up front so ranking itself does no I/O.
pub struct RankingInput<'a> {
    pub event: &'a Event,
    pub criteria: &'a [ResolvedCriterion],
    pub registrations: &'a [Registration],
    pub applicants: &'a HashMap<ApplicantId, Applicant>,
    pub awards: &'a HashMap<RegistrationId, HashMap<CriterionId, CriterionAward>>,
    pub today: NaiveDate,
    pub now: DateTime<Utc>,
}

/// One registration after ranking, with its new status and classification.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedRegistration {
    pub registration: Registration,
    pub applicant: Applicant,
    pub classification: Classification,
    /// Same order as `awards`, one entry per scored criterion.
    pub contributions: Vec<Contribution>,
    pub awards: Vec<CriterionAward>,
}

impl RankedRegistration {
    pub fn position(&self) -> u32 {
        self.classification.position.unwrap_or_default()
    }

    pub fn score(&self) -> Decimal {
        self.classification.score
    }
}

/// Ranked list for one event, best first.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingOutcome {
    pub event_id: EventId,
    pub capacity: u32,
    pub ranked: Vec<RankedRegistration>,
}

impl RankingOutcome {
    pub fn approved(&self) -> usize {
        self.count_with(RegistrationStatus::Approved)
    }

    pub fn waitlisted(&self) -> usize {
        self.count_with(RegistrationStatus::Waitlisted)
    }

    fn count_with(&self, status: RegistrationStatus) -> usize {
        self.ranked
            .iter()
            .filter(|entry| entry.registration.status == status)
            .count()
    }

    /// Every write the run produced, to be committed as one unit.
    pub fn batch(&self) -> RankingBatch {
        let mut batch = RankingBatch {
            event_id: self.event_id,
            ..RankingBatch::default()
        };

        for entry in &self.ranked {
            batch.awards.extend(entry.awards.iter().cloned());
            batch.classifications.push(entry.classification.clone());
            batch
                .statuses
                .push((entry.registration.id, entry.registration.status));
        }

        batch
    }
}

/// Scores every registration, orders them and assigns positions and statuses.
///
/// Order: composite score descending, then registration timestamp ascending, then
/// registration id ascending, so positions are always `1..=N` without ties.
pub fn rank(input: RankingInput<'_>) -> Result<RankingOutcome, ClassificationError> {
    let total = input.registrations.len();
    let mut timeline: Vec<DateTime<Utc>> = input
        .registrations
        .iter()
        .map(|registration| registration.registered_at)
        .collect();
    timeline.sort_unstable();

    let no_awards = HashMap::new();
    let mut ranked = Vec::with_capacity(total);

    for registration in input.registrations {
        let applicant = input
            .applicants
            .get(&registration.applicant_id)
            .ok_or_else(|| ClassificationError::ApplicantNotFound {
                registration: registration.id,
                applicant: registration.applicant_id.clone(),
            })?;

        let standing = RegistrationStanding {
            earlier: timeline.partition_point(|at| *at < registration.registered_at),
            total,
        };
        let existing = input.awards.get(&registration.id).unwrap_or(&no_awards);

        let score = aggregate(
            registration,
            applicant,
            input.criteria,
            existing,
            AggregateContext {
                today: input.today,
                standing,
            },
        );

        debug!(
            event_id = input.event.id.0,
            registration_id = registration.id.0,
            score = %score.composite,
            "registration scored"
        );

        ranked.push(RankedRegistration {
            registration: registration.clone(),
            applicant: applicant.clone(),
            classification: Classification {
                registration_id: registration.id,
                score: score.composite,
                position: None,
                computed_at: input.now,
            },
            contributions: score.contributions,
            awards: score.awards,
        });
    }

    ranked.sort_by(|a, b| {
        b.classification
            .score
            .cmp(&a.classification.score)
            .then_with(|| a.registration.registered_at.cmp(&b.registration.registered_at))
            .then_with(|| a.registration.id.cmp(&b.registration.id))
    });

    let capacity = input.event.capacity;
    for (index, entry) in ranked.iter_mut().enumerate() {
        let position = index as u32 + 1;
        entry.classification.position = Some(position);
        entry.registration.status = if position <= capacity {
            RegistrationStatus::Approved
        } else {
            RegistrationStatus::Waitlisted
        };
    }

    Ok(RankingOutcome {
        event_id: input.event.id,
        capacity,
        ranked,
    })
}
