//! Target-date resolution for exports.
//!
//! Insights for "today" are incomplete until the day rolls over in the
//! account's own timezone, so scheduled exports always target the prior,
//! complete day, evaluated in that timezone to avoid off-by-one-day errors
//! for accounts outside the server's zone.

use chrono::{DateTime, Days, Utc};

use super::timezone;

/// The resolved report date in both formats the pipeline needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDate {
    /// `YYYY-MM-DD`, for the insights date-range query.
    pub api_date: String,
    /// `DD/MM/YYYY`, for the date column in the spreadsheet.
    pub display_date: String,
}

/// Yesterday relative to `now`, evaluated in `timezone` when given and
/// resolvable, otherwise in server-local time.
pub fn yesterday(now: DateTime<Utc>, timezone: Option<&str>) -> ReportDate {
    let (wall, _) = timezone::resolve_wall_clock(now, timezone);
    let date = wall
        .date()
        .checked_sub_days(Days::new(1))
        .unwrap_or_else(|| wall.date());

    ReportDate {
        api_date: date.format("%Y-%m-%d").to_string(),
        display_date: date.format("%d/%m/%Y").to_string(),
    }
}
