//! Criterion scorer: maps an applicant and one event-criterion configuration to a base
//! score between 0 and 100.

mod age;
mod rules;

pub use age::age_in_years;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::domain::{Applicant, CriterionAward, CriterionKind, EventCriterion};

/// Where a registration sits in the event's registration timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrationStanding {
    /// Registrations with a strictly earlier timestamp.
    pub earlier: usize,
    pub total: usize,
}

/// Inputs besides the applicant that some criterion kinds consult.
#[derive(Debug, Clone, Copy)]
pub struct ScoringContext<'a> {
    pub today: NaiveDate,
    pub standing: RegistrationStanding,
    /// Award stored by a previous run or an operator, if any.
    pub existing_award: Option<&'a CriterionAward>,
}

/// Base score for one criterion, rounded to two decimal places.
pub fn base_score(
    kind: CriterionKind,
    applicant: &Applicant,
    config: &EventCriterion,
    context: &ScoringContext<'_>,
) -> Decimal {
    let age = || age_in_years(applicant.birth_date, context.today);

    let points = match kind {
        CriterionKind::RegistrationOrder => rules::registration_order(context.standing),
        CriterionKind::AgeAscending => rules::age_ascending(age()),
        CriterionKind::AgeDescending => rules::age_descending(age()),
        CriterionKind::AgeRange => rules::age_range(age(), config.min_age, config.max_age),
        CriterionKind::SocialProgram => rules::social_program(applicant),
        CriterionKind::Disability => rules::disability(applicant),
        CriterionKind::PhenotypeQuota => {
            rules::phenotype_quota(applicant, &config.prioritized_phenotypes)
        }
        CriterionKind::Custom => rules::custom(context.existing_award),
    };

    round_points(points)
}

/// Two decimal places, half-to-even, always carrying a scale of two.
pub fn round_points(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp(2);
    rounded.rescale(2);
    rounded
}
