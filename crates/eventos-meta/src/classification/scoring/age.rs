use chrono::{Datelike, NaiveDate};

/// Whole completed years between `birth_date` and `today`.
///
/// A missing birth date counts as age zero, and so does a birth date in the future.
pub fn age_in_years(birth_date: Option<NaiveDate>, today: NaiveDate) -> u32 {
    let Some(birth_date) = birth_date else {
        return 0;
    };

    let mut years = today.year() - birth_date.year();
    if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
        years -= 1;
    }

    u32::try_from(years).unwrap_or(0)
}
