use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// National identity (CPF) of an applicant, digits only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicantId(pub String);

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct EventId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CriterionId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegistrationId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SectionId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PhenotypeId(pub u64);

impl fmt::Display for ApplicantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "event #{}", self.0)
    }
}

impl fmt::Display for CriterionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "criterion #{}", self.0)
    }
}

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "registration #{}", self.0)
    }
}

/// A person registered in the program who may apply to events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Applicant {
    pub id: ApplicantId,
    pub name: String,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub social_program: SocialProgram,
    #[serde(default)]
    pub disability: DisabilityProfile,
    #[serde(default)]
    pub phenotype: Option<PhenotypeId>,
}

/// Participation in a federal social program, identified by the NIS number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialProgram {
    pub enrolled: bool,
    #[serde(default)]
    pub nis: String,
}

impl SocialProgram {
    pub fn qualifies(&self) -> bool {
        self.enrolled && !self.nis.is_empty()
    }
}

/// Declared disability plus the specific categories that back the declaration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisabilityProfile {
    pub declared: bool,
    pub physical: bool,
    pub visual: bool,
    pub hearing: bool,
    pub intellectual: bool,
    pub psychosocial: bool,
    pub multiple: bool,
}

impl DisabilityProfile {
    /// A bare declaration without any category does not qualify.
    pub fn qualifies(&self) -> bool {
        self.declared
            && [
                self.physical,
                self.visual,
                self.hearing,
                self.intellectual,
                self.psychosocial,
                self.multiple,
            ]
            .into_iter()
            .any(|flag| flag)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    #[default]
    InPerson,
    Online,
    Hybrid,
}

impl Modality {
    pub const fn label(self) -> &'static str {
        match self {
            Modality::InPerson => "Presencial",
            Modality::Online => "Online",
            Modality::Hybrid => "Híbrido",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationWindow {
    pub opens: Option<NaiveDate>,
    pub closes: Option<NaiveDate>,
}

impl RegistrationWindow {
    pub fn is_open_on(&self, date: NaiveDate) -> bool {
        self.opens.map_or(true, |opens| opens <= date)
            && self.closes.map_or(true, |closes| date <= closes)
    }
}

/// A course or offering with limited capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub modality: Modality,
    pub capacity: u32,
    #[serde(default = "default_minimum_enrollment")]
    pub minimum_enrollment: u32,
    #[serde(default)]
    pub registration_window: RegistrationWindow,
    #[serde(default)]
    pub criteria: Vec<EventCriterion>,
}

fn default_minimum_enrollment() -> u32 {
    1
}

impl Event {
    /// Criterion configurations in processing sequence.
    pub fn ordered_criteria(&self) -> Vec<&EventCriterion> {
        let mut criteria: Vec<&EventCriterion> = self.criteria.iter().collect();
        criteria.sort_by_key(|config| (config.order, config.criterion_id));
        criteria
    }

    pub fn criterion_config(&self, id: CriterionId) -> Option<&EventCriterion> {
        self.criteria.iter().find(|config| config.criterion_id == id)
    }

    /// Checks the limits organisers may configure; `Weight` is already checked on parse.
    pub fn validate(&self) -> Result<(), InvalidEvent> {
        if self.capacity == 0 {
            return Err(InvalidEvent::ZeroCapacity { event: self.id });
        }
        if self.minimum_enrollment == 0 {
            return Err(InvalidEvent::ZeroMinimumEnrollment { event: self.id });
        }
        self.criteria
            .iter()
            .try_for_each(|config| config.validate(self.id))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InvalidEvent {
    #[error("{event} must offer at least one seat")]
    ZeroCapacity { event: EventId },
    #[error("{event} must require at least one enrollment")]
    ZeroMinimumEnrollment { event: EventId },
    #[error("{criterion} on {event} must have an order of at least 1")]
    ZeroOrder { event: EventId, criterion: CriterionId },
    #[error("{criterion} on {event} has age bound {age} above 120")]
    AgeOutOfRange {
        event: EventId,
        criterion: CriterionId,
        age: u32,
    },
    #[error("{criterion} on {event} has minimum age {min} above maximum age {max}")]
    InvertedAgeRange {
        event: EventId,
        criterion: CriterionId,
        min: u32,
        max: u32,
    },
    #[error("{criterion} on {event} reserves {percentage}% of the seats")]
    PercentageOutOfRange {
        event: EventId,
        criterion: CriterionId,
        percentage: u8,
    },
}

/// Scoring rule families available to event organisers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionKind {
    RegistrationOrder,
    AgeAscending,
    AgeDescending,
    AgeRange,
    SocialProgram,
    Disability,
    PhenotypeQuota,
    Custom,
}

impl CriterionKind {
    pub const fn label(self) -> &'static str {
        match self {
            CriterionKind::RegistrationOrder => "Ordem de Inscrição",
            CriterionKind::AgeAscending => "Idade Crescente (Mais Jovem Primeiro)",
            CriterionKind::AgeDescending => "Idade Decrescente (Mais Velho Primeiro)",
            CriterionKind::AgeRange => "Faixa Etária Específica",
            CriterionKind::SocialProgram => "Programa Social (NIS)",
            CriterionKind::Disability => "Necessidades Especiais (PCD)",
            CriterionKind::PhenotypeQuota => "Fototipo/Cor (Cotas Raciais)",
            CriterionKind::Custom => "Critério Customizado",
        }
    }

    /// Custom criteria only contribute once an operator validates them.
    pub const fn requires_manual_validation(self) -> bool {
        matches!(self, CriterionKind::Custom)
    }
}

/// Reusable catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criterion {
    pub id: CriterionId,
    pub description: String,
    pub kind: CriterionKind,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Importance of a criterion within an event, from 0 (irrelevant) to 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Weight(u8);

impl Weight {
    pub const MAX: u8 = 10;

    pub fn new(value: u8) -> Option<Self> {
        (value <= Self::MAX).then_some(Self(value))
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    pub fn as_decimal(self) -> Decimal {
        Decimal::from(self.0)
    }
}

impl Default for Weight {
    fn default() -> Self {
        Self(5)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("weight {0} is outside the accepted range 0..=10")]
pub struct InvalidWeight(pub u8);

impl TryFrom<u8> for Weight {
    type Error = InvalidWeight;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Weight::new(value).ok_or(InvalidWeight(value))
    }
}

impl From<Weight> for u8 {
    fn from(value: Weight) -> Self {
        value.0
    }
}

/// Seat reservation attached to a criterion. Configured and reported only; the ranker
/// does not carve reserved seats out of the capacity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "amount", rename_all = "snake_case")]
pub enum Reservation {
    #[default]
    None,
    Percentage(u8),
    Fixed(u32),
}

impl Reservation {
    pub const fn label(self) -> &'static str {
        match self {
            Reservation::None => "Sem Reserva (Apenas Pontuação)",
            Reservation::Percentage(_) => "Percentual (%)",
            Reservation::Fixed(_) => "Número Fixo de Vagas",
        }
    }

    pub const fn amount(self) -> u32 {
        match self {
            Reservation::None => 0,
            Reservation::Percentage(pct) => pct as u32,
            Reservation::Fixed(seats) => seats,
        }
    }
}

/// Binds a catalog criterion to an event with its weight and parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCriterion {
    pub criterion_id: CriterionId,
    #[serde(default)]
    pub weight: Weight,
    #[serde(default = "default_order")]
    pub order: u32,
    #[serde(default)]
    pub min_age: Option<u32>,
    #[serde(default)]
    pub max_age: Option<u32>,
    #[serde(default)]
    pub reservation: Reservation,
    #[serde(default)]
    pub prioritized_phenotypes: Vec<PhenotypeId>,
}

fn default_order() -> u32 {
    1
}

impl EventCriterion {
    pub const MAX_AGE: u32 = 120;

    fn validate(&self, event: EventId) -> Result<(), InvalidEvent> {
        let criterion = self.criterion_id;
        if self.order == 0 {
            return Err(InvalidEvent::ZeroOrder { event, criterion });
        }
        for age in [self.min_age, self.max_age].into_iter().flatten() {
            if age > Self::MAX_AGE {
                return Err(InvalidEvent::AgeOutOfRange {
                    event,
                    criterion,
                    age,
                });
            }
        }
        if let (Some(min), Some(max)) = (self.min_age, self.max_age) {
            if min > max {
                return Err(InvalidEvent::InvertedAgeRange {
                    event,
                    criterion,
                    min,
                    max,
                });
            }
        }
        if let Reservation::Percentage(percentage) = self.reservation {
            if percentage > 100 {
                return Err(InvalidEvent::PercentageOutOfRange {
                    event,
                    criterion,
                    percentage,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    #[default]
    Registered,
    AwaitingClassification,
    Classified,
    Approved,
    Waitlisted,
    Enrolled,
    Withdrawn,
    NoShow,
}

impl RegistrationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            RegistrationStatus::Registered => "registered",
            RegistrationStatus::AwaitingClassification => "awaiting_classification",
            RegistrationStatus::Classified => "classified",
            RegistrationStatus::Approved => "approved",
            RegistrationStatus::Waitlisted => "waitlisted",
            RegistrationStatus::Enrolled => "enrolled",
            RegistrationStatus::Withdrawn => "withdrawn",
            RegistrationStatus::NoShow => "no_show",
        }
    }
}

/// One applicant's application to one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub id: RegistrationId,
    pub event_id: EventId,
    pub applicant_id: ApplicantId,
    pub registered_at: DateTime<Utc>,
    #[serde(default)]
    pub status: RegistrationStatus,
}

/// Validation state of an award.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AwardValidation {
    /// Computed kinds never need an operator.
    Automatic,
    /// Custom award waiting for an operator; contributes nothing.
    Pending,
    /// Custom award an operator granted `granted` base points (0-100).
    Validated {
        granted: Decimal,
        validator: String,
        validated_at: DateTime<Utc>,
    },
}

impl AwardValidation {
    pub fn is_validated(&self) -> bool {
        !matches!(self, AwardValidation::Pending)
    }

    pub fn granted_points(&self) -> Option<Decimal> {
        match self {
            AwardValidation::Validated { granted, .. } => Some(*granted),
            _ => None,
        }
    }
}

/// Weighted points a registration earned for one criterion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriterionAward {
    pub registration_id: RegistrationId,
    pub criterion_id: CriterionId,
    pub points: Decimal,
    pub validation: AwardValidation,
}

/// Result of a ranking run for one registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub registration_id: RegistrationId,
    pub score: Decimal,
    #[serde(default)]
    pub position: Option<u32>,
    pub computed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
    Suspended,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    pub applicant_id: ApplicantId,
    #[serde(default)]
    pub status: EnrollmentStatus,
}

/// Class section (turma) formed for an event after enrollment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: SectionId,
    pub event_id: EventId,
    pub description: String,
    #[serde(default)]
    pub enrollments: Vec<Enrollment>,
}

impl Section {
    pub fn confirmed_enrollments(&self) -> u32 {
        self.enrollments
            .iter()
            .filter(|enrollment| enrollment.status == EnrollmentStatus::Confirmed)
            .count() as u32
    }
}
