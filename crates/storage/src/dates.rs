//! Date Parsing and Window Arithmetic

use crate::StorageError;
use chrono::{Days, NaiveDate};

/// Calendar date format used by the store and in request paths
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Days subtracted from an anchor date to open a trailing window
pub const TRAILING_WINDOW_DAYS: u64 = 365;

/// Parse an ISO-8601 calendar date (`YYYY-MM-DD`).
///
/// The year must start with a digit; chrono's `%Y` alone also takes a sign.
pub fn parse_iso_date(value: &str) -> Result<NaiveDate, StorageError> {
    let invalid = || StorageError::DateParse {
        value: value.to_string(),
    };

    if !value.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(invalid());
    }

    NaiveDate::parse_from_str(value, ISO_DATE_FORMAT).map_err(|_| invalid())
}

/// Format a date the way the store keeps it, so text comparison is chronological
pub fn format_iso_date(date: NaiveDate) -> String {
    date.format(ISO_DATE_FORMAT).to_string()
}

/// Closed date range `start..=end`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// The year of data ending at `anchor`: `anchor - 365 days ..= anchor`
    pub fn trailing_year(anchor: NaiveDate) -> Self {
        let start = anchor
            .checked_sub_days(Days::new(TRAILING_WINDOW_DAYS))
            .unwrap_or(NaiveDate::MIN);
        Self { start, end: anchor }
    }

    /// Whether `date` falls inside the window (both bounds inclusive)
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of calendar days covered, counting both ends
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn start_key(&self) -> String {
        format_iso_date(self.start)
    }

    pub fn end_key(&self) -> String {
        format_iso_date(self.end)
    }
}
