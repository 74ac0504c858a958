//! Folds records into per-day, per-course aggregates.

use std::{collections::BTreeMap, marker::PhantomData};

use serde::Serialize;
use time::Date;
use time_tz::{OffsetDateTimeExt, Tz};

use super::record::RawRecord;

/// Decides how much a single record adds to its course's running total.
pub trait Measure {
    fn amount(record: &RawRecord) -> f64;
}

/// Totals are the summed sale amounts.
#[derive(Debug, Clone, Copy)]
pub struct Revenue;

impl Measure for Revenue {
    fn amount(record: &RawRecord) -> f64 {
        record.amount
    }
}

/// Totals count each record once, ignoring its amount.
#[derive(Debug, Clone, Copy)]
pub struct Occurrences;

impl Measure for Occurrences {
    fn amount(_: &RawRecord) -> f64 {
        1.0
    }
}

/// The occurrences and summed total for one course on one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseAggregate {
    pub course_name: String,
    pub count: u64,
    pub total: f64,
}

/// All course aggregates for a single calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayBucket {
    #[serde(with = "super::iso_date")]
    pub date: Date,
    /// One entry per course name, in the order the courses were first seen.
    pub course_aggregates: Vec<CourseAggregate>,
}

impl DayBucket {
    fn new(date: Date) -> Self {
        Self {
            date,
            course_aggregates: Vec::new(),
        }
    }

    /// The number of records folded into this day across all courses.
    pub fn count(&self) -> u64 {
        self.course_aggregates.iter().map(|a| a.count).sum()
    }

    /// The summed total across all courses.
    pub fn total(&self) -> f64 {
        self.course_aggregates.iter().map(|a| a.total).sum()
    }

    fn aggregate_for(&mut self, course_name: &str) -> &mut CourseAggregate {
        let position = self
            .course_aggregates
            .iter()
            .position(|aggregate| aggregate.course_name == course_name);

        let index = match position {
            Some(index) => index,
            None => {
                self.course_aggregates.push(CourseAggregate {
                    course_name: course_name.to_owned(),
                    count: 0,
                    total: 0.0,
                });
                self.course_aggregates.len() - 1
            }
        };

        &mut self.course_aggregates[index]
    }
}

/// The key of a day bucket. Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DayKey {
    year: i32,
    month: u8,
    day: u8,
}

impl From<Date> for DayKey {
    fn from(date: Date) -> Self {
        Self {
            year: date.year(),
            month: u8::from(date.month()),
            day: date.day(),
        }
    }
}

/// Day buckets for a single request, keyed by local calendar day.
///
/// Folding is not idempotent: callers must [dedupe](super::dedupe::dedupe)
/// records before folding them.
#[derive(Debug)]
pub struct BucketTree<M> {
    buckets: BTreeMap<DayKey, DayBucket>,
    timezone: &'static Tz,
    measure: PhantomData<M>,
}

impl<M: Measure> BucketTree<M> {
    /// Create an empty tree that places records on days in `timezone`.
    ///
    /// Each record is converted with the offset in effect at its own instant,
    /// so records on either side of a daylight saving change land on the
    /// right local day.
    pub fn new(timezone: &'static Tz) -> Self {
        Self {
            buckets: BTreeMap::new(),
            timezone,
            measure: PhantomData,
        }
    }

    /// Add `record` to the aggregate for its course on its local calendar day.
    ///
    /// Records without a date are ignored.
    pub fn fold(&mut self, record: &RawRecord) {
        let Some(date) = record.date else {
            return;
        };

        let date = date.to_timezone(self.timezone).date();
        let aggregate = self
            .buckets
            .entry(DayKey::from(date))
            .or_insert_with(|| DayBucket::new(date))
            .aggregate_for(&record.course_name);

        aggregate.count += 1;
        aggregate.total += M::amount(record);
    }

    /// The day buckets in chronological order.
    pub fn days(&self) -> impl Iterator<Item = &DayBucket> {
        self.buckets.values()
    }

    pub(super) fn len(&self) -> usize {
        self.buckets.len()
    }
}
