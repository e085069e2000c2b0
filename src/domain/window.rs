//! Pre/post auction window selection.
//!
//! Treasury auctions close at 13:00 New York time, so the series is split at
//! 12:59:59 on the auction date: the pre-auction window runs from
//! `days_before` days ahead of the auction up to the cutoff, the post-auction
//! window from the cutoff to `days_after` days after the auction.

use crate::domain::error::AuctionPnlError;
use crate::domain::spread::{SpreadPoint, SpreadSeries};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

const MICROS_PER_DAY: f64 = 86_400_000_000.0;

/// Upper bound on a window length, in days.
pub const MAX_WINDOW_DAYS: f64 = 3650.0;

/// Last second before the auction result is published.
pub fn auction_cutoff(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::from_hms_opt(12, 59, 59).unwrap_or(NaiveTime::MIN))
}

/// Timestamp at `hour:minute` on `date`. Out-of-range components fall back to
/// midnight.
pub fn timestamp_at(date: NaiveDate, hour: u32, minute: u32) -> NaiveDateTime {
    date.and_time(NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN))
}

/// How many (possibly fractional) calendar days to hold each leg.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowSpec {
    pub days_before: f64,
    pub days_after: f64,
}

impl WindowSpec {
    pub fn new(days_before: f64, days_after: f64) -> Result<Self, AuctionPnlError> {
        validate_days("days_before", days_before)?;
        validate_days("days_after", days_after)?;
        Ok(Self {
            days_before,
            days_after,
        })
    }

    pub fn symmetric(days: f64) -> Result<Self, AuctionPnlError> {
        Self::new(days, days)
    }

    /// `n_prev` and `n_post` default to `n`.
    pub fn resolve(
        n: Option<f64>,
        n_prev: Option<f64>,
        n_post: Option<f64>,
    ) -> Result<Self, AuctionPnlError> {
        let before = n_prev.or(n).ok_or_else(|| AuctionPnlError::InvalidWindow {
            reason: "days before the auction not given".into(),
        })?;
        let after = n_post.or(n).ok_or_else(|| AuctionPnlError::InvalidWindow {
            reason: "days after the auction not given".into(),
        })?;
        Self::new(before, after)
    }
}

fn validate_days(label: &str, days: f64) -> Result<(), AuctionPnlError> {
    if !days.is_finite() || days < 0.0 {
        return Err(AuctionPnlError::InvalidWindow {
            reason: format!("{label} must be a non-negative number, got {days}"),
        });
    }
    if days > MAX_WINDOW_DAYS {
        return Err(AuctionPnlError::InvalidWindow {
            reason: format!("{label} must not exceed {MAX_WINDOW_DAYS} days, got {days}"),
        });
    }
    Ok(())
}

fn days_to_duration(days: f64) -> Duration {
    Duration::microseconds((days * MICROS_PER_DAY).round() as i64)
}

/// The two legs of one auction trade.
#[derive(Debug, Clone, Copy)]
pub struct AuctionWindow<'a> {
    pub auction: NaiveDateTime,
    pub before: &'a [SpreadPoint],
    pub after: &'a [SpreadPoint],
}

/// Splits `series` around `auction`. A point stamped exactly at the cutoff
/// belongs to both legs.
pub fn split_around(
    series: &SpreadSeries,
    auction: NaiveDateTime,
    spec: WindowSpec,
) -> AuctionWindow<'_> {
    let cutoff = auction_cutoff(auction.date());
    let start = auction - days_to_duration(spec.days_before);
    let end = auction + days_to_duration(spec.days_after);

    AuctionWindow {
        auction,
        before: series.slice(start, cutoff),
        after: series.slice(cutoff, end),
    }
}

/// Lazily splits the series around each auction in order.
pub fn windows<'a, I>(
    series: &'a SpreadSeries,
    auctions: I,
    spec: WindowSpec,
) -> impl Iterator<Item = AuctionWindow<'a>> + 'a
where
    I: IntoIterator<Item = NaiveDateTime>,
    I::IntoIter: 'a,
{
    auctions
        .into_iter()
        .map(move |auction| split_around(series, auction, spec))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 2, d).unwrap()
    }

    fn hourly_series() -> SpreadSeries {
        // Feb 1 00:00 through Feb 15 23:00, value = hours since start.
        let start = timestamp_at(date(1), 0, 0);
        let points = (0..15 * 24)
            .map(|h| SpreadPoint {
                timestamp: start + Duration::hours(h),
                value: h as f64,
            })
            .collect();
        SpreadSeries::new("hourly", points)
    }

    #[test]
    fn cutoff_is_one_second_before_one_pm() {
        assert_eq!(
            auction_cutoff(date(8)),
            date(8).and_hms_opt(12, 59, 59).unwrap()
        );
    }

    #[test]
    fn resolve_defaults_to_n() {
        let spec = WindowSpec::resolve(Some(5.0), None, None).unwrap();
        assert_eq!(spec, WindowSpec::new(5.0, 5.0).unwrap());

        let spec = WindowSpec::resolve(Some(5.0), Some(2.0), None).unwrap();
        assert_eq!(spec.days_before, 2.0);
        assert_eq!(spec.days_after, 5.0);

        let spec = WindowSpec::resolve(None, Some(3.0), Some(4.0)).unwrap();
        assert_eq!(spec.days_before, 3.0);
        assert_eq!(spec.days_after, 4.0);
    }

    #[test]
    fn resolve_without_any_days_fails() {
        let err = WindowSpec::resolve(None, None, Some(3.0)).unwrap_err();
        assert!(matches!(err, AuctionPnlError::InvalidWindow { .. }));
    }

    #[test]
    fn negative_or_nan_days_rejected() {
        assert!(WindowSpec::symmetric(-1.0).is_err());
        assert!(WindowSpec::symmetric(f64::NAN).is_err());
        assert!(WindowSpec::symmetric(f64::INFINITY).is_err());
        assert!(WindowSpec::symmetric(MAX_WINDOW_DAYS + 1.0).is_err());
    }

    #[test]
    fn split_around_whole_days() {
        let series = hourly_series();
        let auction = timestamp_at(date(8), 0, 0);
        let w = split_around(&series, auction, WindowSpec::symmetric(2.0).unwrap());

        assert_eq!(w.before.first().unwrap().timestamp, timestamp_at(date(6), 0, 0));
        assert_eq!(w.before.last().unwrap().timestamp, timestamp_at(date(8), 12, 0));
        assert_eq!(w.after.first().unwrap().timestamp, timestamp_at(date(8), 13, 0));
        assert_eq!(w.after.last().unwrap().timestamp, timestamp_at(date(10), 0, 0));
    }

    #[test]
    fn split_around_fractional_days() {
        let series = hourly_series();
        let auction = timestamp_at(date(8), 0, 0);
        let w = split_around(&series, auction, WindowSpec::new(0.5, 1.25).unwrap());

        assert_eq!(w.before.first().unwrap().timestamp, timestamp_at(date(7), 12, 0));
        assert_eq!(w.after.last().unwrap().timestamp, timestamp_at(date(9), 6, 0));
    }

    #[test]
    fn point_at_cutoff_is_shared() {
        let at_cutoff = auction_cutoff(date(8));
        let series = SpreadSeries::new(
            "s",
            vec![
                SpreadPoint { timestamp: timestamp_at(date(7), 9, 0), value: 1.0 },
                SpreadPoint { timestamp: at_cutoff, value: 2.0 },
                SpreadPoint { timestamp: timestamp_at(date(9), 9, 0), value: 3.0 },
            ],
        );
        let w = split_around(&series, timestamp_at(date(8), 0, 0), WindowSpec::symmetric(2.0).unwrap());
        assert_eq!(w.before.last().unwrap().value, 2.0);
        assert_eq!(w.after.first().unwrap().value, 2.0);
    }

    #[test]
    fn auction_outside_series_yields_empty_windows() {
        let series = hourly_series();
        let auction = timestamp_at(NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(), 0, 0);
        let w = split_around(&series, auction, WindowSpec::symmetric(3.0).unwrap());
        assert!(w.before.is_empty());
        assert!(w.after.is_empty());
    }

    #[test]
    fn windows_follow_auction_order() {
        let series = hourly_series();
        let auctions = vec![timestamp_at(date(5), 0, 0), timestamp_at(date(10), 0, 0)];
        let spec = WindowSpec::symmetric(1.0).unwrap();
        let result: Vec<_> = windows(&series, auctions.clone(), spec).collect();
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].auction, auctions[0]);
        assert_eq!(result[1].auction, auctions[1]);
    }

    proptest! {
        #[test]
        fn window_bounds_are_monotonic(
            day in 2u32..14,
            before in 0.0f64..5.0,
            after in 0.0f64..5.0,
        ) {
            let series = hourly_series();
            let auction = timestamp_at(date(day), 0, 0);
            let spec = WindowSpec::new(before, after).unwrap();
            let w = split_around(&series, auction, spec);
            let cutoff = auction_cutoff(date(day));

            prop_assert!(w.before.windows(2).all(|p| p[0].timestamp <= p[1].timestamp));
            prop_assert!(w.after.windows(2).all(|p| p[0].timestamp <= p[1].timestamp));
            prop_assert!(w.before.iter().all(|p| p.timestamp <= cutoff));
            prop_assert!(w.after.iter().all(|p| p.timestamp >= cutoff));
        }
    }
}
