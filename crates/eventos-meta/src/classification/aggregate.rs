use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

use super::domain::{
    Applicant, AwardValidation, Criterion, CriterionAward, CriterionId, CriterionKind, Event,
    EventCriterion, Registration, RegistrationId,
};
use super::scoring::{base_score, round_points, RegistrationStanding, ScoringContext};

/// An event-criterion configuration joined with its active catalog entry.
#[derive(Debug, Clone)]
pub struct ResolvedCriterion {
    pub criterion: Criterion,
    pub config: EventCriterion,
}

/// Joins the event's criteria with the catalog in processing order. Configurations whose
/// catalog entry is missing or inactive are skipped.
pub fn resolve_criteria(
    event: &Event,
    catalog: &HashMap<CriterionId, Criterion>,
) -> Vec<ResolvedCriterion> {
    event
        .ordered_criteria()
        .into_iter()
        .filter_map(|config| match catalog.get(&config.criterion_id) {
            Some(criterion) if criterion.active => Some(ResolvedCriterion {
                criterion: criterion.clone(),
                config: config.clone(),
            }),
            Some(_) => {
                warn!(
                    event_id = event.id.0,
                    criterion_id = config.criterion_id.0,
                    "skipping inactive criterion"
                );
                None
            }
            None => {
                warn!(
                    event_id = event.id.0,
                    criterion_id = config.criterion_id.0,
                    "skipping criterion missing from the catalog"
                );
                None
            }
        })
        .collect()
}

/// Points one criterion contributed to a registration's composite score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contribution {
    pub criterion_id: CriterionId,
    pub kind: CriterionKind,
    pub base: Decimal,
    pub weighted: Decimal,
}

/// Composite score of one registration plus the awards to upsert for it.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateScore {
    pub registration_id: RegistrationId,
    pub composite: Decimal,
    pub contributions: Vec<Contribution>,
    pub awards: Vec<CriterionAward>,
}

/// Weights every resolved criterion as `base * weight / 10` and sums the results.
///
/// `existing_awards` holds the awards currently stored for this registration; custom
/// criteria read their operator grant from it and keep its validation state.
pub fn aggregate(
    registration: &Registration,
    applicant: &Applicant,
    criteria: &[ResolvedCriterion],
    existing_awards: &HashMap<CriterionId, CriterionAward>,
    context: AggregateContext,
) -> AggregateScore {
    let mut total = Decimal::ZERO;
    let mut contributions = Vec::with_capacity(criteria.len());
    let mut awards = Vec::with_capacity(criteria.len());

    for resolved in criteria {
        let criterion_id = resolved.criterion.id;
        let kind = resolved.criterion.kind;
        let existing = existing_awards.get(&criterion_id);

        let scoring = ScoringContext {
            today: context.today,
            standing: context.standing,
            existing_award: existing,
        };
        let base = base_score(kind, applicant, &resolved.config, &scoring);
        let weighted = base * resolved.config.weight.as_decimal() / Decimal::TEN;
        total += weighted;

        awards.push(CriterionAward {
            registration_id: registration.id,
            criterion_id,
            points: round_points(weighted),
            validation: carried_validation(kind, existing),
        });
        contributions.push(Contribution {
            criterion_id,
            kind,
            base,
            weighted,
        });
    }

    AggregateScore {
        registration_id: registration.id,
        composite: round_points(total),
        contributions,
        awards,
    }
}

/// Per-registration inputs shared by every criterion.
#[derive(Debug, Clone, Copy)]
pub struct AggregateContext {
    pub today: chrono::NaiveDate,
    pub standing: RegistrationStanding,
}

fn carried_validation(kind: CriterionKind, existing: Option<&CriterionAward>) -> AwardValidation {
    if !kind.requires_manual_validation() {
        return AwardValidation::Automatic;
    }

    match existing.map(|award| &award.validation) {
        Some(validated @ AwardValidation::Validated { .. }) => validated.clone(),
        _ => AwardValidation::Pending,
    }
}
