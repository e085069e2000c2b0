use super::{is_easter_monday, is_good_friday, is_last_weekday, is_nth_weekday, ymd, Calendar};
use chrono::{Datelike, NaiveDate, Weekday};

/// UK settlement calendar (England and Wales bank holidays).
#[derive(Debug, Clone, Copy, Default)]
pub struct UkSettlement;

impl UkSettlement {
    const SPECIAL_CLOSES: [(i32, u32, u32); 7] = [
        (1999, 12, 31),
        // Golden Jubilee
        (2002, 6, 3),
        // Royal wedding
        (2011, 4, 29),
        // Diamond Jubilee
        (2012, 6, 5),
        // Platinum Jubilee
        (2022, 6, 3),
        // State funeral
        (2022, 9, 19),
        // Coronation
        (2023, 5, 8),
    ];
}

fn is_early_may_bank_holiday(date: NaiveDate) -> bool {
    let (year, month, day) = ymd(date);
    if matches!(year, 1995 | 2020) {
        return month == 5 && day == 8;
    }
    month == 5 && is_nth_weekday(date, Weekday::Mon, 1)
}

fn is_spring_bank_holiday(date: NaiveDate) -> bool {
    let (year, month, day) = ymd(date);
    match year {
        2002 | 2012 => month == 6 && day == 4,
        2022 => month == 6 && day == 2,
        _ => month == 5 && is_last_weekday(date, Weekday::Mon),
    }
}

impl Calendar for UkSettlement {
    fn name(&self) -> &'static str {
        "UK settlement"
    }

    fn is_holiday(&self, date: NaiveDate) -> bool {
        let (_, month, day) = ymd(date);
        let weekday = date.weekday();
        let moved_from_weekend = matches!(weekday, Weekday::Mon | Weekday::Tue);

        (month == 1 && (day == 1 || ((day == 2 || day == 3) && weekday == Weekday::Mon)))
            || is_good_friday(date)
            || is_easter_monday(date)
            || is_early_may_bank_holiday(date)
            || is_spring_bank_holiday(date)
            || (month == 8 && is_last_weekday(date, Weekday::Mon))
            || (month == 12 && (day == 25 || (day == 27 && moved_from_weekend)))
            || (month == 12 && (day == 26 || (day == 28 && moved_from_weekend)))
            || Self::SPECIAL_CLOSES.contains(&ymd(date))
    }
}
