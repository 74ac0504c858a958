//! The enrollment, sales and average-sales series drawn on the dashboard chart.

use serde::Serialize;
use time::OffsetDateTime;

use super::{
    bucket::DayBucket,
    frequency::{Frequency, SeriesPoint, average_series, generated_slot_count, regroup},
    timeframe::Timeframe,
};

/// Chart-ready series for one report, regrouped by a frequency.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    pub enrollments: Vec<SeriesPoint>,
    pub sales: Vec<SeriesPoint>,
    /// Total sales spread evenly over every slot of `sales`.
    pub average_sales: Vec<SeriesPoint>,
    pub total_enrollments: u64,
    pub total_sales: f64,
}

/// Build the chart series from per-day revenue buckets.
///
/// Each day's record count becomes an enrollment point and its total a
/// sales point, then both series are regrouped over `timeframe`.
pub fn build_chart_series(
    days: &[DayBucket],
    timeframe: Timeframe,
    frequency: Frequency,
    now: OffsetDateTime,
) -> ChartSeries {
    let daily_enrollments: Vec<_> = days
        .iter()
        .map(|day| SeriesPoint::new(day.date, day.count() as f64))
        .collect();
    let daily_sales: Vec<_> = days
        .iter()
        .map(|day| SeriesPoint::new(day.date, day.total()))
        .collect();

    let total_enrollments: u64 = days.iter().map(DayBucket::count).sum();
    let total_sales: f64 = days.iter().map(DayBucket::total).sum();

    let sales = regroup(&daily_sales, timeframe, frequency, now);
    let generated_slots = generated_slot_count(&daily_sales, timeframe, frequency, now);

    ChartSeries {
        enrollments: regroup(&daily_enrollments, timeframe, frequency, now),
        average_sales: average_series(total_sales, &sales, generated_slots),
        sales,
        total_enrollments,
        total_sales,
    }
}
