use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::super::domain::{CriterionId, CriterionKind, EventId, RegistrationStatus};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventSummaryView {
    pub id: EventId,
    pub name: String,
    pub status: String,
    pub modality: &'static str,
    pub registration_open: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapacityView {
    pub total: u32,
    pub minimum: u32,
    /// Capacity minus confirmed enrollments; negative when sections are over-enrolled.
    pub available: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistrationCountsView {
    pub total: usize,
    pub approved: usize,
    pub waitlisted: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriterionConfigView {
    pub criterion_id: CriterionId,
    pub name: String,
    pub kind: CriterionKind,
    pub kind_label: &'static str,
    pub weight: u8,
    pub order: u32,
    pub active: bool,
    pub reservation_label: &'static str,
    pub reserved: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AwardView {
    pub criterion: String,
    /// Unweighted 0-100 score before the criterion weight is applied.
    pub base: Decimal,
    pub points: Decimal,
    pub validated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntryView {
    pub position: u32,
    pub name: String,
    pub national_id: String,
    pub score: Decimal,
    pub registered_at: String,
    pub status: RegistrationStatus,
    pub situation: &'static str,
    pub awards: Vec<AwardView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationReport {
    pub event: EventSummaryView,
    pub capacity: CapacityView,
    pub registrations: RegistrationCountsView,
    pub criteria: Vec<CriterionConfigView>,
    pub ranked: Vec<RankedEntryView>,
}

/// One spreadsheet row of the classification export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvRow {
    #[serde(rename = "Posição")]
    pub position: u32,
    #[serde(rename = "Nome")]
    pub name: String,
    #[serde(rename = "CPF")]
    pub national_id: String,
    #[serde(rename = "Score")]
    pub score: Decimal,
    #[serde(rename = "Data Inscrição")]
    pub registered_at: String,
    #[serde(rename = "Situação")]
    pub situation: String,
}
