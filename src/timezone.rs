//! Resolves the configured canonical timezone.

use time::{OffsetDateTime, UtcOffset};
use time_tz::{Offset, OffsetDateTimeExt, TimeZone, Tz};

use crate::Error;

/// The current UTC offset of `canonical_timezone`, e.g. "Pacific/Auckland".
///
/// Returns `None` if the name is not a canonical timezone.
pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

/// Look up `canonical_timezone` in the timezone database.
///
/// # Errors
/// Returns an [Error::InvalidTimezoneError] if the name is not a canonical timezone.
pub fn get_timezone(canonical_timezone: &str) -> Result<&'static Tz, Error> {
    time_tz::timezones::get_by_name(canonical_timezone).ok_or_else(|| {
        tracing::error!("invalid timezone {canonical_timezone}");
        Error::InvalidTimezoneError(canonical_timezone.to_owned())
    })
}

/// The current time in `timezone`.
pub fn local_now(timezone: &Tz) -> OffsetDateTime {
    OffsetDateTime::now_utc().to_timezone(timezone)
}
