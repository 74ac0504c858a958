//! Sales reporting: turns raw platform sales into per-day aggregates and
//! chart series for a course, platform and timeframe selection.
//!
//! A report is built per request in four steps:
//! 1. [record] fetches the raw sales of the selected courses and platforms,
//! 2. [dedupe] drops sales that were returned more than once,
//! 3. [bucket] folds the rest into per-day, per-course aggregates,
//! 4. [flatten] keeps the days inside the selected [Timeframe].
//!
//! [frequency] then regroups per-day series into chart slots.

mod api;
mod bucket;
mod calendar;
mod dedupe;
mod export;
mod flatten;
mod frequency;
mod record;
mod report;
mod series;
mod timeframe;

pub use api::{
    ReportParams, get_chart_series, get_courses_json, get_enrollments, get_enrollments_csv,
    get_frequencies, get_platforms, get_sales_csv, get_timeframes, get_transactions,
};
pub use bucket::Revenue;
pub use frequency::{Frequency, SeriesPoint};
pub use record::{
    NewTeachableSale, NewUdemySale, create_sales_tables, create_teachable_sale, create_udemy_sale,
};
pub use report::{ReportFilter, build_report};
pub use series::{ChartSeries, build_chart_series};
pub use timeframe::Timeframe;

time::serde::format_description!(pub(crate) iso_date, Date, "[year]-[month]-[day]");
