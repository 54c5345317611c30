use chrono::{Datelike, NaiveDate};

/// Parses a DD/MM/YYYY record date.
pub fn parse_record_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%d/%m/%Y").ok()
}

/// Whole years between `from` and `to`.
pub fn full_years_between(from: NaiveDate, to: NaiveDate) -> i32 {
    let mut years = to.year() - from.year();
    if (to.month(), to.day()) < (from.month(), from.day()) {
        years -= 1;
    }
    years
}
