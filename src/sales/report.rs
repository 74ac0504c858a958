//! Builds the per-day report for a course, platform and timeframe selection.

use std::{collections::HashSet, sync::Mutex};

use rusqlite::Connection;
use time::OffsetDateTime;
use time_tz::Tz;

use super::{
    bucket::{BucketTree, DayBucket, Measure},
    dedupe::dedupe,
    flatten::flatten,
    record::{RawRecord, get_teachable_records, get_udemy_records},
    timeframe::Timeframe,
};
use crate::{
    Error,
    course::{CourseId, get_course, get_courses},
    platform::Platform,
};

/// The selection a report is built for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportFilter {
    /// The course to report on, or `None` for every course.
    pub course_id: Option<CourseId>,
    pub platform: Platform,
    pub timeframe: Timeframe,
}

/// Fetch the raw records of the selected course(s) and platform(s).
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if the selected course does not exist,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn fetch_records(
    filter: &ReportFilter,
    connection: &Connection,
) -> Result<Vec<RawRecord>, Error> {
    let courses = match filter.course_id {
        Some(course_id) => vec![get_course(course_id, connection)?],
        None => get_courses(connection)?,
    };

    let mut records = Vec::new();

    for course in &courses {
        if filter.platform.includes_teachable() {
            records.extend(get_teachable_records(course, connection)?);
        }

        if filter.platform.includes_udemy() {
            records.extend(get_udemy_records(course, connection)?);
        }
    }

    Ok(records)
}

/// Dedupe, bucket and flatten `records` into the days of `timeframe`.
///
/// Records are placed on their calendar day in `timezone`, and `now` is
/// expected to be the current time in that same timezone.
pub fn aggregate<M: Measure>(
    records: &[RawRecord],
    timeframe: Timeframe,
    timezone: &'static Tz,
    now: OffsetDateTime,
) -> Vec<DayBucket> {
    let mut seen = HashSet::new();
    let mut tree = BucketTree::<M>::new(timezone);

    for record in records.iter().filter(|record| dedupe(record, &mut seen)) {
        tree.fold(record);
    }

    tracing::debug!(
        "folded {} of {} records into {} days",
        seen.len(),
        records.len(),
        tree.len()
    );

    flatten(&tree, timeframe, now)
}

/// Fetch and aggregate the records selected by `filter`.
///
/// The database lock is only held while fetching.
///
/// # Errors
/// Returns [Error::DatabaseLockError] if the lock is poisoned, otherwise the
/// errors of [fetch_records].
pub fn build_report<M: Measure>(
    filter: &ReportFilter,
    timezone: &'static Tz,
    now: OffsetDateTime,
    db_connection: &Mutex<Connection>,
) -> Result<Vec<DayBucket>, Error> {
    let records = {
        let connection = db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        fetch_records(filter, &connection)?
    };

    Ok(aggregate::<M>(&records, filter.timeframe, timezone, now))
}
