//! Due-ness evaluation for export configurations.
//!
//! The scheduler ticks every 15 minutes; the evaluator decides which enabled
//! configs should run on this tick.

use chrono::{DateTime, Duration, Timelike, Utc};
use tracing::debug;

use crate::models::{ExportConfig, ExportFrequency};

use super::timezone;

/// Width of the daily time-of-day match window, in minutes.
///
/// With a 15-minute tick, a strict `< 14` window guarantees exactly one tick
/// lands inside it per day.
pub const DUE_WINDOW_MINUTES: i64 = 14;

/// Cool-down after a daily run. Suppresses duplicate runs when ticks land
/// close together around the target minute. Sized for the 15-minute tick;
/// it does not scale automatically if the tick interval changes.
pub const DAILY_DEBOUNCE_HOURS: i64 = 12;

/// Interval applied to hourly configs that never set one.
pub const DEFAULT_INTERVAL_HOURS: i64 = 6;

/// Whether `config` should run at instant `now`.
pub fn is_due(config: &ExportConfig, now: DateTime<Utc>) -> bool {
    if !config.enabled {
        return false;
    }

    match config.frequency {
        ExportFrequency::Daily => daily_due(config, now),
        ExportFrequency::Hourly => hourly_due(config, now),
    }
}

fn daily_due(config: &ExportConfig, now: DateTime<Utc>) -> bool {
    if let Some(last_run) = config.last_run_at {
        if now - last_run < Duration::hours(DAILY_DEBOUNCE_HOURS) {
            return false;
        }
    }

    let preferred_zone = config
        .use_account_timezone
        .then_some(config.account_timezone.as_deref())
        .flatten();
    let (wall, used_zone) = timezone::resolve_wall_clock(now, preferred_zone);

    let hour = wall.hour();
    let minute = wall.minute() as i64;
    let matched =
        hour == config.export_hour && (minute - config.export_minute as i64).abs() < DUE_WINDOW_MINUTES;

    if matched {
        debug!(
            config_id = %config.id,
            hour,
            minute,
            account_timezone = used_zone,
            "Daily export window matched"
        );
    }

    matched
}

fn hourly_due(config: &ExportConfig, now: DateTime<Utc>) -> bool {
    let interval = match config.export_interval_hours {
        Some(hours) if hours > 0 => hours,
        _ => DEFAULT_INTERVAL_HOURS,
    };

    match config.last_run_at {
        Some(last_run) => now - last_run >= Duration::hours(interval),
        // Never run before: due immediately.
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ColumnMapping, ExportDataType, RunStatus};
    use chrono::{Local, TimeZone, Timelike};
    use std::collections::HashMap;
    use uuid::Uuid;

    fn daily_config(hour: u32, minute: u32) -> ExportConfig {
        ExportConfig {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "test".to_string(),
            data_type: ExportDataType::Campaigns,
            spreadsheet_id: "s".to_string(),
            spreadsheet_name: "s".to_string(),
            sheet_name: "Sheet1".to_string(),
            column_mapping: ColumnMapping(HashMap::from([(
                "name".to_string(),
                "A".to_string(),
            )])),
            include_date: false,
            append_mode: true,
            account_ids: vec!["123".to_string()],
            enabled: true,
            frequency: ExportFrequency::Daily,
            export_hour: hour,
            export_minute: minute,
            export_interval_hours: None,
            use_account_timezone: false,
            account_timezone: None,
            last_run_at: None,
            last_run_status: None,
            last_run_rows: None,
            last_run_error: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// A UTC instant whose server-local wall clock reads `hour:minute`.
    fn utc_at_local(hour: u32, minute: u32) -> DateTime<Utc> {
        let local = Local::now()
            .with_hour(hour)
            .unwrap()
            .with_minute(minute)
            .unwrap()
            .with_second(0)
            .unwrap();
        local.with_timezone(&Utc)
    }

    #[test]
    fn test_daily_window_inclusive_start() {
        let config = daily_config(9, 0);
        assert!(is_due(&config, utc_at_local(9, 0)));
        assert!(is_due(&config, utc_at_local(9, 5)));
        assert!(is_due(&config, utc_at_local(9, 13)));
    }

    #[test]
    fn test_daily_window_exclusive_end() {
        let config = daily_config(9, 0);
        assert!(!is_due(&config, utc_at_local(9, 14)));
        assert!(!is_due(&config, utc_at_local(8, 59)));
        assert!(!is_due(&config, utc_at_local(10, 0)));
    }

    #[test]
    fn test_daily_debounce_suppresses_recent_run() {
        let now = utc_at_local(9, 0);
        let mut config = daily_config(9, 0);
        config.last_run_at = Some(now - Duration::hours(1));
        config.last_run_status = Some(RunStatus::Success);
        assert!(!is_due(&config, now));

        config.last_run_at = Some(now - Duration::hours(13));
        assert!(is_due(&config, now));
    }

    #[test]
    fn test_daily_invalid_timezone_falls_back_to_server_time() {
        let mut config = daily_config(9, 0);
        config.use_account_timezone = true;
        config.account_timezone = Some("Not/A_Zone".to_string());
        // Must not panic, and must evaluate against server-local time.
        assert!(is_due(&config, utc_at_local(9, 5)));
        assert!(!is_due(&config, utc_at_local(12, 0)));
    }

    #[test]
    fn test_daily_account_timezone_shifts_window() {
        let mut config = daily_config(9, 0);
        config.use_account_timezone = true;
        config.account_timezone = Some("America/New_York".to_string());
        // 13:05 UTC on a summer date is 09:05 in New York.
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 13, 5, 0).unwrap();
        assert!(is_due(&config, now));
    }

    #[test]
    fn test_hourly_interval_boundary() {
        let now = Utc::now();
        let mut config = daily_config(0, 0);
        config.frequency = ExportFrequency::Hourly;
        config.export_interval_hours = Some(6);

        config.last_run_at = Some(now - Duration::hours(5) - Duration::minutes(59));
        assert!(!is_due(&config, now));

        config.last_run_at = Some(now - Duration::hours(6));
        assert!(is_due(&config, now));
    }

    #[test]
    fn test_hourly_defaults_and_first_run() {
        let now = Utc::now();
        let mut config = daily_config(0, 0);
        config.frequency = ExportFrequency::Hourly;

        // Never run: due immediately.
        assert!(is_due(&config, now));

        // Unset interval defaults to six hours.
        config.last_run_at = Some(now - Duration::hours(5));
        assert!(!is_due(&config, now));
        config.last_run_at = Some(now - Duration::hours(7));
        assert!(is_due(&config, now));

        // Non-positive interval also takes the default.
        config.export_interval_hours = Some(0);
        config.last_run_at = Some(now - Duration::hours(5));
        assert!(!is_due(&config, now));
    }

    #[test]
    fn test_disabled_config_never_due() {
        let mut config = daily_config(9, 0);
        config.enabled = false;
        assert!(!is_due(&config, utc_at_local(9, 0)));
    }
}
