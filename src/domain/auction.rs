//! Treasury auction results keyed by auction date.
//!
//! One [`AuctionDay`] per date carries a result block for every tenor; the
//! tenors that actually auctioned that day (`bond_series`) are those with a
//! positive bid-to-cover ratio. Vendor files fill non-auction cells with 0.

use crate::domain::tenor::{column_label, Metric, Tenor};
use crate::domain::window::timestamp_at;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;
use tracing::debug;

/// Which vendor file layout a table was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuctionLayout {
    /// Tail and bid-to-cover per tenor.
    Summary,
    /// Every [`Metric`] per tenor.
    Full,
}

impl AuctionLayout {
    pub fn metrics(self) -> &'static [Metric] {
        match self {
            AuctionLayout::Summary => &[Metric::Tail, Metric::BidToCover],
            AuctionLayout::Full => &Metric::ALL,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "summary" | "tail" => Some(AuctionLayout::Summary),
            "full" | "all" => Some(AuctionLayout::Full),
            _ => None,
        }
    }
}

/// Metric values of one tenor on one date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuctionResult {
    values: BTreeMap<Metric, f64>,
}

impl AuctionResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, metric: Metric, value: f64) -> Self {
        self.values.insert(metric, value);
        self
    }

    pub fn set(&mut self, metric: Metric, value: f64) {
        self.values.insert(metric, value);
    }

    pub fn get(&self, metric: Metric) -> Option<f64> {
        self.values.get(&metric).copied()
    }

    pub fn tail(&self) -> f64 {
        self.get(Metric::Tail).unwrap_or(0.0)
    }

    pub fn bid_to_cover(&self) -> f64 {
        self.get(Metric::BidToCover).unwrap_or(0.0)
    }

    pub fn metrics(&self) -> impl Iterator<Item = (Metric, f64)> + '_ {
        self.values.iter().map(|(m, v)| (*m, *v))
    }

    /// Keeps only `metrics`.
    pub fn restrict(&self, metrics: &[Metric]) -> Self {
        Self {
            values: self
                .values
                .iter()
                .filter(|(m, _)| metrics.contains(m))
                .map(|(m, v)| (*m, *v))
                .collect(),
        }
    }

    fn zero(&mut self) {
        for v in self.values.values_mut() {
            *v = 0.0;
        }
    }
}

/// Every tenor's results on one auction date.
#[derive(Debug, Clone, PartialEq)]
pub struct AuctionDay {
    pub date: NaiveDate,
    pub bond_series: Vec<Tenor>,
    pub results: BTreeMap<Tenor, AuctionResult>,
}

impl AuctionDay {
    /// Builds a day, deriving `bond_series` from the bid-to-cover ratios.
    pub fn new(date: NaiveDate, results: BTreeMap<Tenor, AuctionResult>) -> Self {
        let bond_series = derive_bond_series(&results);
        Self {
            date,
            bond_series,
            results,
        }
    }

    pub fn num_auctions(&self) -> usize {
        self.bond_series.len()
    }

    pub fn auctioned(&self, tenor: Tenor) -> bool {
        self.bond_series.contains(&tenor)
    }

    pub fn result(&self, tenor: Tenor) -> Option<&AuctionResult> {
        self.results.get(&tenor)
    }

    pub fn value(&self, tenor: Tenor, metric: Metric) -> Option<f64> {
        self.results.get(&tenor).and_then(|r| r.get(metric))
    }
}

/// Tenors with a positive bid-to-cover ratio, in maturity order.
pub fn derive_bond_series(results: &BTreeMap<Tenor, AuctionResult>) -> Vec<Tenor> {
    results
        .iter()
        .filter(|(_, r)| r.bid_to_cover() > 0.0)
        .map(|(t, _)| *t)
        .collect()
}

/// One tenor's row out of an [`AuctionTable`].
#[derive(Debug, Clone, PartialEq)]
pub struct TenorAuction {
    pub date: NaiveDate,
    pub bond_series: Vec<Tenor>,
    pub num_auctions: usize,
    pub tenor: Tenor,
    pub result: AuctionResult,
}

/// The vendor file merged the 2022-07-27 7Y auction into 2022-07-25.
pub const COMBINED_AUCTION_DATE: (i32, u32, u32) = (2022, 7, 25);
pub const SPLIT_AUCTION_DATE: (i32, u32, u32) = (2022, 7, 27);

#[derive(Debug, Clone)]
pub struct AuctionTable {
    layout: AuctionLayout,
    days: BTreeMap<NaiveDate, AuctionDay>,
}

impl AuctionTable {
    pub fn new(layout: AuctionLayout) -> Self {
        Self {
            layout,
            days: BTreeMap::new(),
        }
    }

    pub fn from_days(layout: AuctionLayout, days: Vec<AuctionDay>) -> Self {
        let mut table = Self::new(layout);
        for day in days {
            table.insert(day);
        }
        table
    }

    /// Inserts or replaces the day for `day.date`. Returns the previous day.
    pub fn insert(&mut self, day: AuctionDay) -> Option<AuctionDay> {
        self.days.insert(day.date, day)
    }

    pub fn layout(&self) -> AuctionLayout {
        self.layout
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn get(&self, date: NaiveDate) -> Option<&AuctionDay> {
        self.days.get(&date)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.days.contains_key(&date)
    }

    /// Days in date order.
    pub fn iter(&self) -> impl Iterator<Item = &AuctionDay> {
        self.days.values()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.days.keys().copied().collect()
    }

    fn rows_for(&self, tenor: Tenor, metrics: &[Metric]) -> Vec<TenorAuction> {
        self.days
            .values()
            .filter(|d| d.auctioned(tenor))
            .map(|d| TenorAuction {
                date: d.date,
                bond_series: d.bond_series.clone(),
                num_auctions: d.num_auctions(),
                tenor,
                result: d
                    .result(tenor)
                    .map(|r| r.restrict(metrics))
                    .unwrap_or_default(),
            })
            .collect()
    }

    /// Tail and bid-to-cover of each `tenor` auction.
    pub fn single_tenor(&self, tenor: Tenor) -> Vec<TenorAuction> {
        self.rows_for(tenor, &[Metric::Tail, Metric::BidToCover])
    }

    /// Every metric the layout carries for each `tenor` auction.
    pub fn tenor_results(&self, tenor: Tenor) -> Vec<TenorAuction> {
        self.rows_for(tenor, self.layout.metrics())
    }

    /// Dates with more than one auction.
    pub fn multi_auction_days(&self) -> Vec<&AuctionDay> {
        self.days.values().filter(|d| d.num_auctions() > 1).collect()
    }

    /// Midnight timestamps of every `tenor` auction, in date order.
    pub fn auction_timestamps(&self, tenor: Tenor) -> Vec<NaiveDateTime> {
        self.days
            .values()
            .filter(|d| d.auctioned(tenor))
            .map(|d| timestamp_at(d.date, 0, 0))
            .collect()
    }

    /// Separates auctions the vendor recorded under one date.
    ///
    /// When `target` is absent and `source` present, `target` becomes a copy of
    /// `source` holding only the `moved` tenors, and the `moved` tenors' metrics
    /// on `source` are zeroed. Returns whether the table changed.
    pub fn split_auction_day(
        &mut self,
        source: NaiveDate,
        target: NaiveDate,
        moved: &[Tenor],
    ) -> bool {
        if self.days.contains_key(&target) {
            return false;
        }
        let Some(source_day) = self.days.get_mut(&source) else {
            debug!(%source, "no combined auction day to split");
            return false;
        };

        let mut moved_day = source_day.clone();
        moved_day.date = target;

        for (tenor, result) in source_day.results.iter_mut() {
            if moved.contains(tenor) {
                result.zero();
            }
        }
        source_day.bond_series.retain(|t| !moved.contains(t));

        for (tenor, result) in moved_day.results.iter_mut() {
            if !moved.contains(tenor) {
                result.zero();
            }
        }
        moved_day.bond_series.retain(|t| moved.contains(t));

        debug!(%source, %target, ?moved, "split combined auction day");
        self.days.insert(target, moved_day);
        true
    }

    /// Applies the fixes the vendor data is known to need.
    pub fn apply_known_corrections(&mut self) -> bool {
        let (Some(source), Some(target)) = (
            NaiveDate::from_ymd_opt(
                COMBINED_AUCTION_DATE.0,
                COMBINED_AUCTION_DATE.1,
                COMBINED_AUCTION_DATE.2,
            ),
            NaiveDate::from_ymd_opt(
                SPLIT_AUCTION_DATE.0,
                SPLIT_AUCTION_DATE.1,
                SPLIT_AUCTION_DATE.2,
            ),
        ) else {
            return false;
        };
        self.split_auction_day(source, target, &[Tenor::Y7])
    }

    /// Column labels in table order: `bond_series`, `num_auctions`, then the
    /// layout's metrics grouped by tenor.
    pub fn column_names(&self) -> Vec<String> {
        let mut names = vec!["bond_series".to_string(), "num_auctions".to_string()];
        for tenor in Tenor::ALL {
            for metric in self.layout.metrics() {
                names.push(column_label(tenor, *metric));
            }
        }
        names
    }

    /// Positions of `names` in [`column_names`](Self::column_names); `None`
    /// if any is not a column.
    pub fn column_positions(&self, names: &[&str]) -> Option<Vec<usize>> {
        let columns = self.column_names();
        names
            .iter()
            .map(|n| columns.iter().position(|c| c == n))
            .collect()
    }
}
