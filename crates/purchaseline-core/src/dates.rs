//! Source date normalization shared by every sink

use chrono::NaiveDate;

/// Date formats tried, in order, when normalizing source dates.
pub const DEFAULT_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// [`DEFAULT_DATE_FORMATS`] as owned strings, the shape configs carry them in.
pub fn default_date_formats() -> Vec<String> {
    DEFAULT_DATE_FORMATS.iter().map(|s| s.to_string()).collect()
}

/// Parse `raw` with the first matching chrono format.
pub fn normalize_date(raw: &str, formats: &[String]) -> Option<NaiveDate> {
    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}
