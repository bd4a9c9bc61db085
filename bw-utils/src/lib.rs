//! Shared utility functions for bloomwatch crates.

/// Date utility functions
pub mod dates {
    use chrono::{Datelike, NaiveDate};

    /// Date layouts accepted in the `Date` column of a raw series.
    pub const SERIES_DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d", "%m/%d/%Y"];

    const MONTH_NAMES: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];

    /// Format a NaiveDate as "YYYY-MM-DD"
    pub fn format_date(date: &NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }

    /// Parse a date cell from a raw series.
    ///
    /// Anything after the first whitespace or `T` (a time of day) is ignored,
    /// then each of [`SERIES_DATE_FORMATS`] is tried in order.
    pub fn parse_series_date(s: &str) -> Option<NaiveDate> {
        let day = s
            .trim()
            .split(|c: char| c.is_whitespace() || c == 'T')
            .next()
            .unwrap_or("");
        if day.is_empty() {
            return None;
        }
        SERIES_DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(day, fmt).ok())
    }

    /// Short chart axis label, e.g. "Mar-7".
    pub fn axis_label(date: &NaiveDate) -> String {
        let month = MONTH_NAMES[date.month0() as usize];
        format!("{}-{}", month, date.day())
    }

}
