//! Turns a bucket tree into a chronological list of days within a timeframe.

use time::OffsetDateTime;

use super::{
    bucket::{BucketTree, DayBucket, Measure},
    timeframe::Timeframe,
};

/// The days of `tree` that fall inside `timeframe`, oldest first.
///
/// A day is tested at its local midnight. Days without data are never
/// invented here, see [regroup](super::frequency::regroup) for gap filling.
pub fn flatten<M: Measure>(
    tree: &BucketTree<M>,
    timeframe: Timeframe,
    now: OffsetDateTime,
) -> Vec<DayBucket> {
    tree.days()
        .filter(|day| timeframe.contains(day.date.midnight(), now))
        .cloned()
        .collect()
}
