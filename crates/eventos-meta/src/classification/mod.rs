//! Applicant classification for courses and events.
//!
//! Each event's criteria score every registration between 0 and 100, the weighted sum
//! becomes the composite score, and the ranked list decides who is approved and who is
//! waitlisted against the event's capacity.

pub mod aggregate;
pub mod clock;
pub mod domain;
pub mod memory;
pub mod ranker;
pub mod report;
pub mod repository;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use aggregate::{AggregateScore, Contribution, ResolvedCriterion};
pub use clock::{Clock, FixedClock, SystemClock};
pub use domain::{
    Applicant, ApplicantId, AwardValidation, Classification, Criterion, CriterionAward,
    CriterionId, CriterionKind, DisabilityProfile, Enrollment, EnrollmentStatus, Event,
    EventCriterion, EventId, InvalidEvent, InvalidWeight, Modality, PhenotypeId, Registration,
    RegistrationId, RegistrationStatus, RegistrationWindow, Reservation, Section, SectionId,
    SocialProgram, Weight,
};
pub use memory::{Dataset, InMemoryStore};
pub use ranker::{RankedRegistration, RankingOutcome};
pub use report::views::{ClassificationReport, CsvRow};
pub use report::write_csv;
pub use repository::{
    ApplicantRepository, AwardStore, ClassificationStore, EventRepository, RankingBatch,
    RankingStore, RegistrationStore, RepositoryError,
};
pub use service::{ClassificationError, ClassificationService};
