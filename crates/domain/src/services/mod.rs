//! Domain services for the Ads Exporter backend.
//!
//! Services contain business logic that operates on domain models.

pub mod column_map;
pub mod merge;
pub mod recurrence;
pub mod report_date;
pub mod timezone;

pub use column_map::{header_row, map_to_row, trim_trailing_empty, MIN_ROW_WIDTH};
pub use merge::{merge_insights, Keyed, Merged};
pub use recurrence::{is_due, DAILY_DEBOUNCE_HOURS, DEFAULT_INTERVAL_HOURS, DUE_WINDOW_MINUTES};
pub use report_date::{yesterday, ReportDate};
pub use timezone::{resolve_wall_clock, TimezoneError};
