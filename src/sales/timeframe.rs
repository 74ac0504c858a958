//! Named, "now"-relative windows used to filter and bound report data.

use time::{Duration, OffsetDateTime, PrimitiveDateTime, Time};

use super::calendar::{shift_months, start_of_month, start_of_year};

/// A named relative window of time.
///
/// A timeframe is not a fixed range: its bounds are resolved against the
/// instant passed in as `now`, which callers take from the wall clock (in the
/// dashboard's local timezone) once per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeframe {
    Past30Days,
    ThisMonth,
    LastMonth,
    Last3Months,
    Last6Months,
    Last12Months,
    ThisYear,
    BeginningOfTime,
    /// A name that did not match any window. Filters nothing.
    Unrecognized,
}

impl Timeframe {
    /// The selectable timeframes in display order.
    pub const ALL: [Timeframe; 8] = [
        Timeframe::Past30Days,
        Timeframe::ThisMonth,
        Timeframe::LastMonth,
        Timeframe::Last3Months,
        Timeframe::Last6Months,
        Timeframe::Last12Months,
        Timeframe::ThisYear,
        Timeframe::BeginningOfTime,
    ];

    /// Parse a display name, falling back to [Timeframe::Unrecognized].
    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|timeframe| timeframe.name() == name)
            .unwrap_or(Self::Unrecognized)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Past30Days => "Past 30 Days",
            Self::ThisMonth => "This Month",
            Self::LastMonth => "Last Month",
            Self::Last3Months => "Last 3 Months",
            Self::Last6Months => "Last 6 Months",
            Self::Last12Months => "Last 12 Months",
            Self::ThisYear => "This Year",
            Self::BeginningOfTime => "Beginning Of Time",
            Self::Unrecognized => "Unrecognized",
        }
    }

    /// The first instant of the window, or `None` if the window has no lower bound.
    pub fn earliest(self, now: OffsetDateTime) -> Option<OffsetDateTime> {
        let earliest = match self {
            Self::Past30Days => midnight(now - Duration::days(30)),
            Self::ThisMonth => midnight(now.replace_date(start_of_month(now.date()))),
            Self::LastMonth => midnight(
                now.replace_date(shift_months(start_of_month(now.date()), -1)),
            ),
            Self::Last3Months => months_ago(now, 3),
            Self::Last6Months => months_ago(now, 6),
            Self::Last12Months => months_ago(now, 12),
            Self::ThisYear => midnight(now.replace_date(start_of_year(now.date()))),
            Self::BeginningOfTime | Self::Unrecognized => return None,
        };

        Some(earliest)
    }

    /// The last instant of the window.
    ///
    /// Every window ends at `now` except [Timeframe::LastMonth], which ends
    /// at the last instant of the previous calendar month.
    pub fn latest(self, now: OffsetDateTime) -> OffsetDateTime {
        match self {
            Self::LastMonth => {
                midnight(now.replace_date(start_of_month(now.date()))) - Duration::nanoseconds(1)
            }
            _ => now,
        }
    }

    /// Whether the local wall-clock time `date` falls inside the window as
    /// seen from `now`.
    ///
    /// `date` is compared against the wall-clock reading of `now` and its
    /// bounds, so a local day is not shifted by a daylight saving change
    /// between it and `now`.
    pub fn contains(self, date: PrimitiveDateTime, now: OffsetDateTime) -> bool {
        match self {
            Self::ThisMonth => date.year() == now.year() && date.month() == now.month(),
            Self::LastMonth => {
                let last_month = shift_months(now.date(), -1);
                date.year() == last_month.year() && date.month() == last_month.month()
            }
            Self::ThisYear => date.year() == now.year(),
            Self::BeginningOfTime | Self::Unrecognized => true,
            Self::Past30Days | Self::Last3Months | Self::Last6Months | Self::Last12Months => self
                .earliest(now)
                .is_none_or(|earliest| date > wall_clock(earliest)),
        }
    }
}

fn wall_clock(date_time: OffsetDateTime) -> PrimitiveDateTime {
    PrimitiveDateTime::new(date_time.date(), date_time.time())
}

fn midnight(date_time: OffsetDateTime) -> OffsetDateTime {
    date_time.replace_time(Time::MIDNIGHT)
}

fn months_ago(now: OffsetDateTime, months: i32) -> OffsetDateTime {
    midnight(now.replace_date(shift_months(now.date(), -months)))
}
