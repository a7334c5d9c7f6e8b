//! Date Dimension Deriver.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use sd_core::{InvalidDateError, Period};

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];
const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%z", "%Y-%m-%dT%H:%M:%S%.f%z"];

/// Parse an invoice date in any accepted layout. Time of day is discarded.
/// Timestamps with a `Z` or `±hh:mm` offset keep the date as written, without
/// shifting to UTC.
pub fn parse_invoice_date(text: &str) -> Option<NaiveDate> {
    let s = text.trim();
    if s.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(s)
                .ok()
                .or_else(|| OFFSET_FORMATS.iter().find_map(|f| DateTime::parse_from_str(s, f).ok()))
                .map(|dt| dt.date_naive())
        })
}

/// Year, quarter and year-month of the invoice date on source row `row`.
pub fn derive_period(row: usize, text: Option<&str>) -> Result<Period, InvalidDateError> {
    let invalid = || InvalidDateError { row, raw: text.unwrap_or_default().to_string() };
    let date = text.and_then(parse_invoice_date).ok_or_else(invalid)?;
    Period::from_year_month(date.year(), date.month()).map_err(|_| invalid())
}
