//! Calendar arithmetic shared by the timeframe and frequency code.

use time::{Date, Duration, Month};

/// The first day of the month containing `date`.
pub(super) fn start_of_month(date: Date) -> Date {
    date - Duration::days(i64::from(date.day()) - 1)
}

/// The Monday of the ISO week containing `date`.
pub(super) fn start_of_week(date: Date) -> Date {
    let weekday_number = date.weekday().number_from_monday() as i64;
    date - Duration::days(weekday_number - 1)
}

/// The first day of the calendar quarter containing `date`.
pub(super) fn start_of_quarter(date: Date) -> Date {
    let months_into_quarter = (i32::from(u8::from(date.month())) - 1) % 3;

    shift_months(start_of_month(date), -months_into_quarter)
}

/// January 1st of the year containing `date`.
pub(super) fn start_of_year(date: Date) -> Date {
    date - Duration::days(i64::from(date.ordinal()) - 1)
}

/// The quarter of the year (1-4) that `date` falls in.
pub(super) fn quarter_of(date: Date) -> u8 {
    (u8::from(date.month()) - 1) / 3 + 1
}

/// Move `date` by `months` calendar months.
///
/// When the target month is shorter than the day of `date`, the day is
/// clamped to the last day of the target month, e.g. 31 March minus one
/// month is 28 (or 29) February. Saturates at the range of [Date].
pub(super) fn shift_months(date: Date, months: i32) -> Date {
    let month_index = date.year() * 12 + (u8::from(date.month()) as i32 - 1) + months;
    let year = month_index.div_euclid(12);
    let month = month_from_number((month_index.rem_euclid(12) + 1) as u8);
    let day = date.day().min(last_day_of_month(year, month));

    Date::from_calendar_date(year, month, day).unwrap_or(if months < 0 {
        Date::MIN
    } else {
        Date::MAX
    })
}

pub(super) fn last_day_of_month(year: i32, month: Month) -> u8 {
    match month {
        Month::January
        | Month::March
        | Month::May
        | Month::July
        | Month::August
        | Month::October
        | Month::December => 31,
        Month::April | Month::June | Month::September | Month::November => 30,
        Month::February => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

/// The month numbered `month`, counting January as 1. Wraps past December.
fn month_from_number(month: u8) -> Month {
    Month::January.nth_next(month.saturating_sub(1))
}

pub(super) fn month_abbrev(month: Month) -> &'static str {
    match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}

#[cfg(test)]
mod tests {
    use time::{Month, macros::date};

    use super::{
        last_day_of_month, quarter_of, shift_months, start_of_month, start_of_quarter,
        start_of_week, start_of_year,
    };

    #[test]
    fn start_of_week_is_monday() {
        // 2023-03-15 is a Wednesday.
        assert_eq!(start_of_week(date!(2023 - 03 - 15)), date!(2023 - 03 - 13));
        assert_eq!(start_of_week(date!(2023 - 03 - 13)), date!(2023 - 03 - 13));
        // Sunday belongs to the week that started the previous Monday.
        assert_eq!(start_of_week(date!(2023 - 03 - 19)), date!(2023 - 03 - 13));
    }

    #[test]
    fn start_of_week_crosses_year_boundary() {
        // 2021-01-01 is a Friday, its week starts in 2020.
        assert_eq!(start_of_week(date!(2021 - 01 - 01)), date!(2020 - 12 - 28));
    }

    #[test]
    fn truncates_to_month_quarter_and_year() {
        let date = date!(2023 - 08 - 17);

        assert_eq!(start_of_month(date), date!(2023 - 08 - 01));
        assert_eq!(start_of_quarter(date), date!(2023 - 07 - 01));
        assert_eq!(start_of_year(date), date!(2023 - 01 - 01));
        assert_eq!(quarter_of(date), 3);
    }

    #[test]
    fn shift_months_clamps_to_end_of_month() {
        assert_eq!(shift_months(date!(2023 - 03 - 31), -1), date!(2023 - 02 - 28));
        assert_eq!(shift_months(date!(2024 - 03 - 31), -1), date!(2024 - 02 - 29));
        assert_eq!(shift_months(date!(2023 - 05 - 31), -3), date!(2023 - 02 - 28));
    }

    #[test]
    fn shift_months_crosses_years() {
        assert_eq!(shift_months(date!(2023 - 01 - 15), -1), date!(2022 - 12 - 15));
        assert_eq!(shift_months(date!(2023 - 02 - 10), -12), date!(2022 - 02 - 10));
        assert_eq!(shift_months(date!(2023 - 11 - 01), 3), date!(2024 - 02 - 01));
    }

    #[test]
    fn february_length_follows_leap_years() {
        assert_eq!(last_day_of_month(2023, Month::February), 28);
        assert_eq!(last_day_of_month(2024, Month::February), 29);
        assert_eq!(last_day_of_month(1900, Month::February), 28);
        assert_eq!(last_day_of_month(2000, Month::February), 29);
    }
}
