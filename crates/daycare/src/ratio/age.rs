use chrono::{Datelike, NaiveDate};

/// Whole months between `date_of_birth` and `as_of`.
///
/// A month only counts once its day-of-month has been reached, so a child born
/// on the 20th is still one month short on the 19th. Returns `None` when the
/// birth date is unknown and `Some(0)` for birth dates on or after `as_of`.
pub fn calculate_age_in_months(date_of_birth: Option<NaiveDate>, as_of: NaiveDate) -> Option<u32> {
    let born = date_of_birth?;
    if born >= as_of {
        return Some(0);
    }

    let mut months = (as_of.year() - born.year()) * 12 + as_of.month() as i32 - born.month() as i32;
    if as_of.day() < born.day() {
        months -= 1;
    }

    Some(months.max(0) as u32)
}
