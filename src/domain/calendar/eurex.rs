use super::{is_easter_monday, is_good_friday, ymd, Calendar};
use chrono::NaiveDate;

/// Eurex derivatives exchange.
#[derive(Debug, Clone, Copy, Default)]
pub struct Eurex;

impl Calendar for Eurex {
    fn name(&self) -> &'static str {
        "Eurex"
    }

    fn is_holiday(&self, date: NaiveDate) -> bool {
        let (_, month, day) = ymd(date);
        matches!((month, day), (1, 1) | (5, 1) | (12, 24) | (12, 25) | (12, 26) | (12, 31))
            || is_good_friday(date)
            || is_easter_monday(date)
    }
}
