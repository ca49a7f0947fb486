//! Timezone resolution with an explicit fallback path.
//!
//! Ad accounts carry an IANA timezone name (`America/New_York`). Resolution
//! failures must never fail an export; callers match on the `Result`, log the
//! degraded path and continue with server-local time.

use chrono::{DateTime, Local, NaiveDateTime, Utc};
use chrono_tz::Tz;
use thiserror::Error;

/// Error resolving a named timezone.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimezoneError {
    #[error("Unrecognized timezone {0:?}")]
    Unrecognized(String),
}

/// The instant `now` as wall-clock time in the named zone.
pub fn local_datetime(now: DateTime<Utc>, timezone: &str) -> Result<NaiveDateTime, TimezoneError> {
    let zone: Tz = timezone
        .parse()
        .map_err(|_| TimezoneError::Unrecognized(timezone.to_string()))?;
    Ok(now.with_timezone(&zone).naive_local())
}

/// The instant `now` as wall-clock time in the server's local zone.
pub fn server_local_datetime(now: DateTime<Utc>) -> NaiveDateTime {
    now.with_timezone(&Local).naive_local()
}

/// Resolves `now` in the preferred zone when one is given, degrading to
/// server-local time on absence or resolution failure. Returns the wall-clock
/// time and whether the preferred zone was actually used.
pub fn resolve_wall_clock(now: DateTime<Utc>, timezone: Option<&str>) -> (NaiveDateTime, bool) {
    match timezone {
        Some(tz) => match local_datetime(now, tz) {
            Ok(local) => (local, true),
            Err(err) => {
                tracing::warn!(timezone = tz, error = %err, "Falling back to server time");
                (server_local_datetime(now), false)
            }
        },
        None => (server_local_datetime(now), false),
    }
}
