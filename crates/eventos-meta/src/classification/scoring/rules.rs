use rust_decimal::Decimal;

use super::super::domain::{Applicant, CriterionAward, PhenotypeId};
use super::RegistrationStanding;

const AGE_RANGE_PENALTY_PER_YEAR: u32 = 5;
const DEFAULT_MAX_AGE: u32 = 999;
const NEUTRAL_PHENOTYPE_POINTS: i64 = 50;

fn full() -> Decimal {
    Decimal::ONE_HUNDRED
}

/// Linear scale from 100 for the first registrant down to 0 for the last.
pub(crate) fn registration_order(standing: RegistrationStanding) -> Decimal {
    if standing.total <= 1 {
        return full();
    }

    let earlier = Decimal::from(standing.earlier as u64);
    let span = Decimal::from((standing.total - 1) as u64);
    full() - earlier / span * full()
}

pub(crate) fn age_ascending(age: u32) -> Decimal {
    (full() - Decimal::from(age)).max(Decimal::ZERO)
}

pub(crate) fn age_descending(age: u32) -> Decimal {
    Decimal::from(age).min(full())
}

/// Full points inside `[min, max]`, minus five per year of distance to the nearer bound.
pub(crate) fn age_range(age: u32, min_age: Option<u32>, max_age: Option<u32>) -> Decimal {
    let min_age = min_age.unwrap_or(0);
    let max_age = max_age.unwrap_or(DEFAULT_MAX_AGE);

    if (min_age..=max_age).contains(&age) {
        return full();
    }

    let distance = age.abs_diff(min_age).min(age.abs_diff(max_age));
    let penalty = Decimal::from(distance) * Decimal::from(AGE_RANGE_PENALTY_PER_YEAR);
    (full() - penalty).max(Decimal::ZERO)
}

pub(crate) fn social_program(applicant: &Applicant) -> Decimal {
    if applicant.social_program.qualifies() {
        full()
    } else {
        Decimal::ZERO
    }
}

pub(crate) fn disability(applicant: &Applicant) -> Decimal {
    if applicant.disability.qualifies() {
        full()
    } else {
        Decimal::ZERO
    }
}

/// Without a configured priority list every applicant with a declared phenotype gets the
/// neutral 50.
pub(crate) fn phenotype_quota(applicant: &Applicant, prioritized: &[PhenotypeId]) -> Decimal {
    let Some(phenotype) = applicant.phenotype else {
        return Decimal::ZERO;
    };

    if prioritized.is_empty() {
        return Decimal::from(NEUTRAL_PHENOTYPE_POINTS);
    }

    if prioritized.contains(&phenotype) {
        full()
    } else {
        Decimal::ZERO
    }
}

/// Looks up the operator's grant; nothing is computed for custom criteria.
pub(crate) fn custom(existing: Option<&CriterionAward>) -> Decimal {
    existing
        .and_then(|award| award.validation.granted_points())
        .map_or(Decimal::ZERO, |granted| granted.clamp(Decimal::ZERO, full()))
}
