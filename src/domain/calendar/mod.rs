//! Business day calendars for the markets auction trades settle in.
//!
//! Every calendar treats Saturday and Sunday as non-business days and adds
//! its own holidays on top. Date arithmetic returns `None` when it would
//! leave chrono's representable range.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::fmt;
use tracing::warn;

mod eurex;
mod uk;
mod us;

pub use eurex::Eurex;
pub use uk::UkSettlement;
pub use us::{Nyse, UsGovernmentBond};

/// Longest run of consecutive non-business days any calendar produces.
const MAX_HOLIDAY_RUN: u32 = 31;

/// How a date that is not a business day is moved onto one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BusinessDayConvention {
    Unadjusted,
    #[default]
    Following,
    /// Following, unless that crosses into the next month.
    ModifiedFollowing,
    Preceding,
    /// Preceding, unless that crosses into the previous month.
    ModifiedPreceding,
}

impl BusinessDayConvention {
    pub fn parse(value: &str) -> Option<Self> {
        let normalized: String = value
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "unadjusted" | "none" => Some(Self::Unadjusted),
            "following" | "f" => Some(Self::Following),
            "modifiedfollowing" | "mf" => Some(Self::ModifiedFollowing),
            "preceding" | "p" => Some(Self::Preceding),
            "modifiedpreceding" | "mp" => Some(Self::ModifiedPreceding),
            _ => None,
        }
    }
}

impl fmt::Display for BusinessDayConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unadjusted => "Unadjusted",
            Self::Following => "Following",
            Self::ModifiedFollowing => "Modified Following",
            Self::Preceding => "Preceding",
            Self::ModifiedPreceding => "Modified Preceding",
        };
        write!(f, "{name}")
    }
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// A market holiday calendar.
pub trait Calendar: Send + Sync {
    fn name(&self) -> &'static str;

    /// True for weekday holidays; weekends are handled separately.
    fn is_holiday(&self, date: NaiveDate) -> bool;

    fn is_business_day(&self, date: NaiveDate) -> bool {
        !is_weekend(date) && !self.is_holiday(date)
    }

    /// First business day on or after `date`.
    fn next_business_day(&self, date: NaiveDate) -> Option<NaiveDate> {
        step_to_business_day(self, date, 1)
    }

    /// Last business day on or before `date`.
    fn previous_business_day(&self, date: NaiveDate) -> Option<NaiveDate> {
        step_to_business_day(self, date, -1)
    }

    fn adjust(&self, date: NaiveDate, convention: BusinessDayConvention) -> Option<NaiveDate> {
        if convention == BusinessDayConvention::Unadjusted || self.is_business_day(date) {
            return Some(date);
        }
        match convention {
            BusinessDayConvention::Unadjusted => Some(date),
            BusinessDayConvention::Following => self.next_business_day(date),
            BusinessDayConvention::Preceding => self.previous_business_day(date),
            BusinessDayConvention::ModifiedFollowing => {
                let next = self.next_business_day(date)?;
                if next.month() == date.month() {
                    Some(next)
                } else {
                    self.previous_business_day(date)
                }
            }
            BusinessDayConvention::ModifiedPreceding => {
                let prev = self.previous_business_day(date)?;
                if prev.month() == date.month() {
                    Some(prev)
                } else {
                    self.next_business_day(date)
                }
            }
        }
    }

    /// Moves `days` business days from `date`. A zero step rolls `date`
    /// forward onto a business day.
    fn advance(&self, date: NaiveDate, days: i64) -> Option<NaiveDate> {
        if days == 0 {
            return self.adjust(date, BusinessDayConvention::Following);
        }
        let step = Duration::days(days.signum());
        let mut remaining = days.unsigned_abs();
        let mut current = date;
        while remaining > 0 {
            current = current.checked_add_signed(step)?;
            if self.is_business_day(current) {
                remaining -= 1;
            }
        }
        Some(current)
    }

    /// Business days from `from` to `to`. The endpoints count only when the
    /// matching `include_*` flag is set; the result is negative when `from`
    /// is after `to`.
    fn business_days_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        include_first: bool,
        include_last: bool,
    ) -> i64 {
        if from == to {
            return i64::from(include_first && include_last && self.is_business_day(from));
        }
        let (start, end, sign) = if from < to {
            (from, to, 1)
        } else {
            (to, from, -1)
        };
        let interior = start
            .iter_days()
            .skip(1)
            .take_while(|d| *d < end)
            .filter(|d| self.is_business_day(*d))
            .count() as i64;
        let first = i64::from(include_first && self.is_business_day(from));
        let last = i64::from(include_last && self.is_business_day(to));
        sign * (interior + first + last)
    }

    /// True when `date` is the last business day of its month.
    fn is_end_of_month(&self, date: NaiveDate) -> bool {
        date.succ_opt()
            .and_then(|next| self.next_business_day(next))
            .is_some_and(|next| next.month() != date.month())
    }

    /// Last business day of `date`'s month.
    fn end_of_month(&self, date: NaiveDate) -> Option<NaiveDate> {
        let last = last_day_of_month(date.year(), date.month())?;
        self.previous_business_day(last)
    }
}

fn step_to_business_day<C: Calendar + ?Sized>(
    calendar: &C,
    date: NaiveDate,
    direction: i64,
) -> Option<NaiveDate> {
    let step = Duration::days(direction);
    let mut current = date;
    for _ in 0..=MAX_HOLIDAY_RUN {
        if calendar.is_business_day(current) {
            return Some(current);
        }
        current = current.checked_add_signed(step)?;
    }
    None
}

/// Settlement markets with a holiday calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Market {
    /// US government bond market.
    #[default]
    Ust,
    /// New York Stock Exchange.
    Use,
    /// Eurex.
    Eur,
    /// UK settlement.
    Gbp,
}

static UST: UsGovernmentBond = UsGovernmentBond;
static NYSE: Nyse = Nyse;
static EUREX: Eurex = Eurex;
static UK: UkSettlement = UkSettlement;

impl Market {
    pub const ALL: [Market; 4] = [Market::Ust, Market::Use, Market::Eur, Market::Gbp];

    pub fn code(self) -> &'static str {
        match self {
            Market::Ust => "UST",
            Market::Use => "USE",
            Market::Eur => "EUR",
            Market::Gbp => "GBP",
        }
    }

    /// Exact, case-insensitive code lookup.
    pub fn parse(code: &str) -> Option<Market> {
        let code = code.trim();
        Market::ALL
            .into_iter()
            .find(|m| m.code().eq_ignore_ascii_case(code))
    }

    /// Like [`parse`](Self::parse), falling back to [`Market::Ust`] for
    /// unknown codes.
    pub fn from_code(code: &str) -> Market {
        Market::parse(code).unwrap_or_else(|| {
            warn!(code, "unknown market code, using UST calendar");
            Market::Ust
        })
    }

    pub fn calendar(self) -> &'static dyn Calendar {
        match self {
            Market::Ust => &UST,
            Market::Use => &NYSE,
            Market::Eur => &EUREX,
            Market::Gbp => &UK,
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

pub fn is_business_day(date: NaiveDate, market: Market) -> bool {
    market.calendar().is_business_day(date)
}

/// `date` if it is a business day, otherwise the next one.
pub fn adjust_to_business_day(date: NaiveDate, market: Market) -> Option<NaiveDate> {
    market.calendar().adjust(date, BusinessDayConvention::Following)
}

pub fn is_end_of_month(date: NaiveDate, market: Market) -> bool {
    market.calendar().is_end_of_month(date)
}

pub fn end_of_month(date: NaiveDate, market: Market) -> Option<NaiveDate> {
    market.calendar().end_of_month(date)
}

pub fn add_business_days(date: NaiveDate, days: i64, market: Market) -> Option<NaiveDate> {
    market.calendar().advance(date, days)
}

/// Business days in `[from, to)`.
pub fn business_days_between(from: NaiveDate, to: NaiveDate, market: Market) -> i64 {
    market.calendar().business_days_between(from, to, true, false)
}

pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year.checked_add(1)?, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

/// Easter Sunday (Gregorian), by the anonymous computus.
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year.rem_euclid(19);
    let b = year.div_euclid(100);
    let c = year.rem_euclid(100);
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15).rem_euclid(30);
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k).rem_euclid(7);
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}

pub(crate) fn is_good_friday(date: NaiveDate) -> bool {
    easter_sunday(date.year())
        .and_then(|e| e.checked_sub_signed(Duration::days(2)))
        .is_some_and(|gf| gf == date)
}

pub(crate) fn is_easter_monday(date: NaiveDate) -> bool {
    easter_sunday(date.year())
        .and_then(|e| e.succ_opt())
        .is_some_and(|em| em == date)
}

/// True if `date` is the `n`th `weekday` of its month (1-based).
pub(crate) fn is_nth_weekday(date: NaiveDate, weekday: Weekday, n: u32) -> bool {
    date.weekday() == weekday && (date.day() - 1) / 7 + 1 == n
}

pub(crate) fn is_last_weekday(date: NaiveDate, weekday: Weekday) -> bool {
    date.weekday() == weekday
        && date
            .checked_add_signed(Duration::days(7))
            .is_none_or(|d| d.month() != date.month())
}

pub(crate) fn ymd(date: NaiveDate) -> (i32, u32, u32) {
    (date.year(), date.month(), date.day())
}
