//! Auction trade PnL.
//!
//! The strategy is long the spread from `days_before` days ahead of the
//! auction until just before the result, then short the spread (a bet on
//! flattening) until `days_after` days after the auction. PnL is the spread
//! move scaled by a multiplier: with the spread quoted in percent and the
//! default multiplier of 10 000, one basis point is worth one unit.

use crate::domain::error::{AuctionPnlError, WindowSide};
use crate::domain::spread::{SpreadPoint, SpreadSeries};
use crate::domain::window::{split_around, windows, AuctionWindow, WindowSpec};
use chrono::NaiveDateTime;
use tracing::{debug, warn};

pub const DEFAULT_MULTIPLIER: f64 = 10_000.0;

/// PnL of both legs of a single auction trade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradePnl {
    pub pre_auction: f64,
    pub post_auction: f64,
}

impl TradePnl {
    pub fn total(&self) -> f64 {
        self.pre_auction + self.post_auction
    }
}

/// First and last quote of each leg.
#[derive(Debug, Clone, Copy)]
struct LegEnds<'a> {
    enter_pre: &'a SpreadPoint,
    exit_pre: &'a SpreadPoint,
    enter_post: &'a SpreadPoint,
    exit_post: &'a SpreadPoint,
}

impl<'a> LegEnds<'a> {
    fn of(before: &'a [SpreadPoint], after: &'a [SpreadPoint]) -> Option<Self> {
        Some(Self {
            enter_pre: before.first()?,
            exit_pre: before.last()?,
            enter_post: after.first()?,
            exit_post: after.last()?,
        })
    }

    fn pnl(&self, multiplier: f64) -> TradePnl {
        TradePnl {
            pre_auction: (self.exit_pre.value - self.enter_pre.value) * multiplier,
            post_auction: (self.enter_post.value - self.exit_post.value) * multiplier,
        }
    }
}

/// Long over `before`, short over `after`.
pub fn single_trade(
    before: &[SpreadPoint],
    after: &[SpreadPoint],
    multiplier: f64,
) -> Option<TradePnl> {
    LegEnds::of(before, after).map(|ends| ends.pnl(multiplier))
}

fn empty_leg(window: &AuctionWindow<'_>) -> AuctionPnlError {
    let side = if window.before.is_empty() {
        WindowSide::Before
    } else {
        WindowSide::After
    };
    AuctionPnlError::EmptyWindow {
        auction: window.auction,
        side,
    }
}

fn window_ends<'a>(window: &AuctionWindow<'a>) -> Result<LegEnds<'a>, AuctionPnlError> {
    LegEnds::of(window.before, window.after).ok_or_else(|| empty_leg(window))
}

/// PnL of the trade around one auction.
pub fn slope_curve(
    series: &SpreadSeries,
    auction: NaiveDateTime,
    spec: WindowSpec,
    multiplier: f64,
) -> Result<TradePnl, AuctionPnlError> {
    Ok(window_ends(&split_around(series, auction, spec))?.pnl(multiplier))
}

/// Entry/exit times and PnL of one auction trade.
///
/// Records are keyed by auction date but carry ex-post PnL: reading them as of
/// the auction date introduces lookahead bias.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    pub auction: NaiveDateTime,
    pub enter_pre: NaiveDateTime,
    pub exit_pre: NaiveDateTime,
    pub pre_auction_pnl: f64,
    pub enter_post: NaiveDateTime,
    pub exit_post: NaiveDateTime,
    pub post_auction_pnl: f64,
}

impl TradeRecord {
    fn from_window(window: &AuctionWindow<'_>, multiplier: f64) -> Result<Self, AuctionPnlError> {
        let ends = window_ends(window)?;
        let pnl = ends.pnl(multiplier);
        Ok(Self {
            auction: window.auction,
            enter_pre: ends.enter_pre.timestamp,
            exit_pre: ends.exit_pre.timestamp,
            pre_auction_pnl: pnl.pre_auction,
            enter_post: ends.enter_post.timestamp,
            exit_post: ends.exit_post.timestamp,
            post_auction_pnl: pnl.post_auction,
        })
    }

    pub fn total_pnl(&self) -> f64 {
        self.pre_auction_pnl + self.post_auction_pnl
    }
}

/// An auction left out of a trade book and why.
#[derive(Debug, Clone)]
pub struct SkippedAuction {
    pub auction: NaiveDateTime,
    pub reason: String,
}

/// Every auction trade over a series.
#[derive(Debug, Clone, Default)]
pub struct TradeBook {
    pub records: Vec<TradeRecord>,
    pub skipped: Vec<SkippedAuction>,
}

impl TradeBook {
    pub fn total_pre(&self) -> f64 {
        self.records.iter().map(|r| r.pre_auction_pnl).sum()
    }

    pub fn total_post(&self) -> f64 {
        self.records.iter().map(|r| r.post_auction_pnl).sum()
    }

    pub fn total(&self) -> f64 {
        self.total_pre() + self.total_post()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Fraction of trades whose combined PnL is positive.
    pub fn hit_rate(&self) -> f64 {
        if self.records.is_empty() {
            return 0.0;
        }
        let winners = self.records.iter().filter(|r| r.total_pnl() > 0.0).count();
        winners as f64 / self.records.len() as f64
    }
}

/// Trades every auction in `auctions`. Auctions without data on either side
/// are skipped rather than failing the batch.
pub fn all_trades(
    series: &SpreadSeries,
    auctions: &[NaiveDateTime],
    spec: WindowSpec,
    multiplier: f64,
) -> TradeBook {
    let mut book = TradeBook::default();

    for window in windows(series, auctions.iter().copied(), spec) {
        match TradeRecord::from_window(&window, multiplier) {
            Ok(record) => book.records.push(record),
            Err(e) => {
                warn!(auction = %window.auction, "skipping auction: {e}");
                book.skipped.push(SkippedAuction {
                    auction: window.auction,
                    reason: e.to_string(),
                });
            }
        }
    }

    debug!(
        trades = book.records.len(),
        skipped = book.skipped.len(),
        days_before = spec.days_before,
        days_after = spec.days_after,
        "computed auction trades"
    );
    book
}
