//! US government bond and NYSE calendars.

use super::{is_good_friday, is_last_weekday, is_nth_weekday, ymd, Calendar};
use chrono::{Datelike, NaiveDate, Weekday};

/// Holidays shared by the bond market and the stock exchange, with
/// Saturday holidays observed on Friday and Sunday holidays on Monday.
fn is_common_holiday(date: NaiveDate) -> bool {
    let (year, month, day) = ymd(date);
    let weekday = date.weekday();
    let observed = |m: u32, d: u32| {
        month == m
            && (day == d
                || (day == d + 1 && weekday == Weekday::Mon)
                || (day + 1 == d && weekday == Weekday::Fri))
    };

    // New Year's Day is not moved back into December
    (month == 1 && (day == 1 || (day == 2 && weekday == Weekday::Mon)))
        || (month == 2 && is_nth_weekday(date, Weekday::Mon, 3))
        || (month == 5 && is_last_weekday(date, Weekday::Mon))
        || (year >= 2022 && observed(6, 19))
        || observed(7, 4)
        || (month == 9 && is_nth_weekday(date, Weekday::Mon, 1))
        || (month == 11 && is_nth_weekday(date, Weekday::Thu, 4))
        || observed(12, 25)
}

/// US Treasury market (SIFMA recommended closes).
#[derive(Debug, Clone, Copy, Default)]
pub struct UsGovernmentBond;

impl UsGovernmentBond {
    const SPECIAL_CLOSES: [(i32, u32, u32); 4] = [
        // Reagan funeral
        (2004, 6, 11),
        // Hurricane Sandy
        (2012, 10, 30),
        // Bush funeral
        (2018, 12, 5),
        // Carter funeral
        (2025, 1, 9),
    ];
}

impl Calendar for UsGovernmentBond {
    fn name(&self) -> &'static str {
        "US government bond market"
    }

    fn is_holiday(&self, date: NaiveDate) -> bool {
        let (year, month, day) = ymd(date);
        let weekday = date.weekday();

        if is_common_holiday(date) || Self::SPECIAL_CLOSES.contains(&(year, month, day)) {
            return true;
        }

        // Good Friday trades as an early close in some years
        (is_good_friday(date) && !matches!(year, 2015 | 2021 | 2023))
            || (year >= 1983 && month == 1 && is_nth_weekday(date, Weekday::Mon, 3))
            || (month == 10 && is_nth_weekday(date, Weekday::Mon, 2))
            || (month == 11 && (day == 11 || (day == 12 && weekday == Weekday::Mon)))
    }
}

/// New York Stock Exchange.
#[derive(Debug, Clone, Copy, Default)]
pub struct Nyse;

impl Nyse {
    const SPECIAL_CLOSES: [(i32, u32, u32); 10] = [
        (2001, 9, 11),
        (2001, 9, 12),
        (2001, 9, 13),
        (2001, 9, 14),
        (2004, 6, 11),
        (2007, 1, 2),
        (2012, 10, 29),
        (2012, 10, 30),
        (2018, 12, 5),
        (2025, 1, 9),
    ];
}

impl Calendar for Nyse {
    fn name(&self) -> &'static str {
        "New York Stock Exchange"
    }

    fn is_holiday(&self, date: NaiveDate) -> bool {
        let year = date.year();
        is_common_holiday(date)
            || is_good_friday(date)
            || (year >= 1998 && date.month() == 1 && is_nth_weekday(date, Weekday::Mon, 3))
            || Self::SPECIAL_CLOSES.contains(&ymd(date))
    }
}
