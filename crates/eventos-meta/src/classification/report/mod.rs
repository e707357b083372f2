//! Report builder: read-side projection of a ranking outcome.

pub mod views;

use std::collections::HashMap;
use std::io::Write;

use chrono::NaiveDate;

use super::domain::{Criterion, CriterionId, Event};
use super::ranker::{RankedRegistration, RankingOutcome};
use super::service::ClassificationError;
use views::{
    AwardView, CapacityView, ClassificationReport, CriterionConfigView, CsvRow,
    EventSummaryView, RankedEntryView, RegistrationCountsView,
};

const REGISTERED_AT_FORMAT: &str = "%d/%m/%Y %H:%M";
const SITUATION_APPROVED: &str = "APROVADO";
const SITUATION_WAITLISTED: &str = "FILA DE ESPERA";

/// Event-side data the report echoes next to the ranked list.
pub struct ReportContext<'a> {
    pub event: &'a Event,
    pub catalog: &'a HashMap<CriterionId, Criterion>,
    pub confirmed_enrollments: u32,
    pub today: NaiveDate,
}

pub fn build_report(outcome: &RankingOutcome, context: ReportContext<'_>) -> ClassificationReport {
    let event = context.event;

    let criteria = event
        .ordered_criteria()
        .into_iter()
        .filter_map(|config| {
            let criterion = context.catalog.get(&config.criterion_id)?;
            Some(CriterionConfigView {
                criterion_id: criterion.id,
                name: criterion.description.clone(),
                kind: criterion.kind,
                kind_label: criterion.kind.label(),
                weight: config.weight.get(),
                order: config.order,
                active: criterion.active,
                reservation_label: config.reservation.label(),
                reserved: config.reservation.amount(),
            })
        })
        .collect();

    let ranked = outcome
        .ranked
        .iter()
        .map(|entry| ranked_entry(entry, outcome.capacity, context.catalog))
        .collect();

    ClassificationReport {
        event: EventSummaryView {
            id: event.id,
            name: event.name.clone(),
            status: event.status.clone(),
            modality: event.modality.label(),
            registration_open: event.registration_window.is_open_on(context.today),
        },
        capacity: CapacityView {
            total: event.capacity,
            minimum: event.minimum_enrollment,
            available: i64::from(event.capacity) - i64::from(context.confirmed_enrollments),
        },
        registrations: RegistrationCountsView {
            total: outcome.ranked.len(),
            approved: outcome.approved(),
            waitlisted: outcome.waitlisted(),
        },
        criteria,
        ranked,
    }
}

fn ranked_entry(
    entry: &RankedRegistration,
    capacity: u32,
    catalog: &HashMap<CriterionId, Criterion>,
) -> RankedEntryView {
    let position = entry.position();
    let awards = entry
        .awards
        .iter()
        .zip(&entry.contributions)
        .map(|(award, contribution)| AwardView {
            criterion: catalog
                .get(&award.criterion_id)
                .map(|criterion| criterion.description.clone())
                .unwrap_or_else(|| award.criterion_id.to_string()),
            base: contribution.base,
            points: award.points,
            validated: award.validation.is_validated(),
        })
        .collect();

    RankedEntryView {
        position,
        name: entry.applicant.name.clone(),
        national_id: entry.applicant.id.0.clone(),
        score: entry.score(),
        registered_at: entry
            .registration
            .registered_at
            .format(REGISTERED_AT_FORMAT)
            .to_string(),
        status: entry.registration.status,
        situation: if position <= capacity {
            SITUATION_APPROVED
        } else {
            SITUATION_WAITLISTED
        },
        awards,
    }
}

/// Flatten the ranked list to (position, name, CPF, score, date, situation).
pub fn csv_rows(report: &ClassificationReport) -> Vec<CsvRow> {
    report
        .ranked
        .iter()
        .map(|entry| CsvRow {
            position: entry.position,
            name: entry.name.clone(),
            national_id: entry.national_id.clone(),
            score: entry.score,
            registered_at: entry.registered_at.clone(),
            situation: entry.situation.to_string(),
        })
        .collect()
}

pub fn write_csv<W: Write>(rows: &[CsvRow], writer: W) -> Result<(), ClassificationError> {
    let mut writer = csv::Writer::from_writer(writer);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}
