//! Regroups a per-day series into gap-free day/week/month/quarter/year slots.

use std::collections::BTreeMap;

use serde::Serialize;
use time::{Date, Duration, OffsetDateTime};

use super::{
    calendar::{
        month_abbrev, quarter_of, shift_months, start_of_month, start_of_quarter, start_of_week,
        start_of_year,
    },
    timeframe::Timeframe,
};

/// The size of the slots a series is regrouped into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Frequency {
    #[default]
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl Frequency {
    /// The selectable frequencies in display order.
    pub const ALL: [Frequency; 5] = [
        Frequency::Day,
        Frequency::Week,
        Frequency::Month,
        Frequency::Quarter,
        Frequency::Year,
    ];

    /// Parse a frequency key, defaulting to [Frequency::Day] for unknown keys.
    pub fn from_key(key: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|frequency| frequency.key() == key)
            .unwrap_or_default()
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Quarter => "quarter",
            Self::Year => "year",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Day => "Daily",
            Self::Week => "Weekly",
            Self::Month => "Monthly",
            Self::Quarter => "Quarterly",
            Self::Year => "Yearly",
        }
    }

    /// The first day of the slot containing `date`.
    pub fn truncate(self, date: Date) -> Date {
        match self {
            Self::Day => date,
            Self::Week => start_of_week(date),
            Self::Month => start_of_month(date),
            Self::Quarter => start_of_quarter(date),
            Self::Year => start_of_year(date),
        }
    }

    /// The first day of the slot after the one starting on `slot_start`.
    fn next_slot(self, slot_start: Date) -> Date {
        match self {
            Self::Day => slot_start + Duration::days(1),
            Self::Week => slot_start + Duration::weeks(1),
            Self::Month => shift_months(slot_start, 1),
            Self::Quarter => shift_months(slot_start, 3),
            Self::Year => shift_months(slot_start, 12),
        }
    }

    /// The key of the slot containing `date`.
    ///
    /// Weeks are ISO-8601 weeks (Monday to Sunday) keyed by the ISO week-year
    /// and week number of their Monday, so the last days of December can
    /// belong to week 1 of the next year and vice versa.
    pub fn slot_key(self, date: Date) -> SlotKey {
        let start = self.truncate(date);

        match self {
            Self::Day => SlotKey::Day(start),
            Self::Week => {
                let (year, week, _) = start.to_iso_week_date();
                SlotKey::Week { year, week }
            }
            Self::Month => SlotKey::Month {
                year: start.year(),
                month: u8::from(start.month()),
            },
            Self::Quarter => SlotKey::Quarter {
                year: start.year(),
                quarter: quarter_of(start),
            },
            Self::Year => SlotKey::Year(start.year()),
        }
    }

    /// A short chart label for the slot starting on `slot_start`.
    pub fn slot_label(self, slot_start: Date) -> String {
        let month = month_abbrev(slot_start.month());
        let year = slot_start.year();

        match self {
            Self::Day => format!(
                "{:02}/{:02}/{year}",
                u8::from(slot_start.month()),
                slot_start.day()
            ),
            Self::Week => format!("{month} {}, {year}", slot_start.day()),
            Self::Month => format!("{month} {year}"),
            Self::Quarter => format!("Q{} {year}", quarter_of(slot_start)),
            Self::Year => year.to_string(),
        }
    }
}

/// Identifies a slot. Two dates share a key iff they fall in the same slot.
///
/// Keys of the same variant order chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SlotKey {
    Day(Date),
    Week { year: i32, week: u8 },
    Month { year: i32, month: u8 },
    Quarter { year: i32, quarter: u8 },
    Year(i32),
}

/// One point of a chart series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    #[serde(rename = "t", with = "super::iso_date")]
    pub date: Date,
    #[serde(rename = "y")]
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(date: Date, value: f64) -> Self {
        Self { date, value }
    }
}

/// Regroup `series` into `frequency` slots spanning `timeframe`.
///
/// Windows without a lower bound start at the oldest point in `series`, so
/// an empty series over such a window produces no slots.
pub fn regroup(
    series: &[SeriesPoint],
    timeframe: Timeframe,
    frequency: Frequency,
    now: OffsetDateTime,
) -> Vec<SeriesPoint> {
    match span(series, timeframe, now) {
        Some((earliest, latest)) => regroup_between(series, earliest, latest, frequency),
        None => Vec::new(),
    }
}

/// The number of slots [regroup] generates for `timeframe` before any point
/// is added, i.e. not counting slots created for points outside the span.
pub fn generated_slot_count(
    series: &[SeriesPoint],
    timeframe: Timeframe,
    frequency: Frequency,
    now: OffsetDateTime,
) -> usize {
    span(series, timeframe, now)
        .map(|(earliest, latest)| empty_slots(earliest, latest, frequency).len())
        .unwrap_or(0)
}

/// Regroup `series` into `frequency` slots from `earliest` up to `latest`.
///
/// Every slot whose start lies in `[truncate(earliest), latest)` is present
/// exactly once, with zero for slots that received no points. A point whose
/// slot lies outside that span gets a slot of its own.
pub fn regroup_between(
    series: &[SeriesPoint],
    earliest: OffsetDateTime,
    latest: OffsetDateTime,
    frequency: Frequency,
) -> Vec<SeriesPoint> {
    let mut slots = empty_slots(earliest, latest, frequency);

    for point in series {
        let key = frequency.slot_key(point.date);
        let slot = slots.entry(key).or_insert_with(|| {
            tracing::debug!(
                "no {} slot generated for {}, creating one",
                frequency.key(),
                point.date
            );
            SeriesPoint::new(frequency.truncate(point.date), 0.0)
        });
        slot.value += point.value;
    }

    slots.into_values().collect()
}

/// A series with `total` spread evenly over the slots of `slots`.
///
/// The average is taken over the `generated_slots` of the span, see
/// [generated_slot_count], so a slot created for an out-of-span point does
/// not lower it. Falls back to the number of `slots` when no slot was generated.
pub fn average_series(
    total: f64,
    slots: &[SeriesPoint],
    generated_slots: usize,
) -> Vec<SeriesPoint> {
    if slots.is_empty() {
        return Vec::new();
    }

    let divisor = if generated_slots == 0 {
        slots.len()
    } else {
        generated_slots
    };
    let average = total / divisor as f64;

    slots
        .iter()
        .map(|slot| SeriesPoint::new(slot.date, average))
        .collect()
}

fn span(
    series: &[SeriesPoint],
    timeframe: Timeframe,
    now: OffsetDateTime,
) -> Option<(OffsetDateTime, OffsetDateTime)> {
    let earliest = match timeframe.earliest(now) {
        Some(earliest) => earliest,
        None => {
            let oldest = series.iter().map(|point| point.date).min()?;
            oldest.midnight().assume_offset(now.offset())
        }
    };

    Some((earliest, timeframe.latest(now)))
}

fn empty_slots(
    earliest: OffsetDateTime,
    latest: OffsetDateTime,
    frequency: Frequency,
) -> BTreeMap<SlotKey, SeriesPoint> {
    let local_offset = latest.offset();
    let mut slots = BTreeMap::new();
    let mut slot_start = frequency.truncate(earliest.to_offset(local_offset).date());

    while slot_start.midnight().assume_offset(local_offset) < latest {
        slots.insert(
            frequency.slot_key(slot_start),
            SeriesPoint::new(slot_start, 0.0),
        );
        slot_start = frequency.next_slot(slot_start);
    }

    slots
}
