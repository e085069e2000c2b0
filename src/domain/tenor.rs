//! Treasury tenors and the per-auction metrics reported for them.

use crate::domain::error::AuctionPnlError;
use std::fmt;
use std::str::FromStr;

/// Nominal coupon tenors auctioned by the Treasury.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tenor {
    Y2,
    Y3,
    Y5,
    Y7,
    Y10,
    Y20,
    Y30,
}

impl Tenor {
    pub const ALL: [Tenor; 7] = [
        Tenor::Y2,
        Tenor::Y3,
        Tenor::Y5,
        Tenor::Y7,
        Tenor::Y10,
        Tenor::Y20,
        Tenor::Y30,
    ];

    pub fn years(self) -> u32 {
        match self {
            Tenor::Y2 => 2,
            Tenor::Y3 => 3,
            Tenor::Y5 => 5,
            Tenor::Y7 => 7,
            Tenor::Y10 => 10,
            Tenor::Y20 => 20,
            Tenor::Y30 => 30,
        }
    }

    pub fn from_years(years: u32) -> Option<Tenor> {
        Tenor::ALL.into_iter().find(|t| t.years() == years)
    }
}

impl fmt::Display for Tenor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Y", self.years())
    }
}

impl FromStr for Tenor {
    type Err = AuctionPnlError;

    /// Accepts "10", "10Y" and "10y".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_suffix('Y')
            .or_else(|| trimmed.strip_suffix('y'))
            .unwrap_or(trimmed);
        digits
            .parse::<u32>()
            .ok()
            .and_then(Tenor::from_years)
            .ok_or_else(|| AuctionPnlError::UnknownTenor(s.to_string()))
    }
}

/// Auction statistics, in the order the vendor lays them out per tenor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Metric {
    Tail,
    BidToCover,
    Indirect,
    Direct,
    Reopening,
    Soma,
    DepInsts,
    Individuals,
    Dealers,
    Pensions,
    Investments,
    Foreigns,
    AuctionSize,
    AuctionYield,
}

impl Metric {
    pub const ALL: [Metric; 14] = [
        Metric::Tail,
        Metric::BidToCover,
        Metric::Indirect,
        Metric::Direct,
        Metric::Reopening,
        Metric::Soma,
        Metric::DepInsts,
        Metric::Individuals,
        Metric::Dealers,
        Metric::Pensions,
        Metric::Investments,
        Metric::Foreigns,
        Metric::AuctionSize,
        Metric::AuctionYield,
    ];

    /// Short column suffix, e.g. "BC" in "10Y BC".
    pub fn label(self) -> &'static str {
        match self {
            Metric::Tail => "Tail",
            Metric::BidToCover => "BC",
            Metric::Indirect => "Indirect",
            Metric::Direct => "Direct",
            Metric::Reopening => "Reopening",
            Metric::Soma => "SOMA",
            Metric::DepInsts => "DepInsts",
            Metric::Individuals => "Individuals",
            Metric::Dealers => "Dealers",
            Metric::Pensions => "Pensions",
            Metric::Investments => "Investments",
            Metric::Foreigns => "Foreigns",
            Metric::AuctionSize => "AuctionSize",
            Metric::AuctionYield => "AuctionYield",
        }
    }

    /// Phrase used in the vendor's full-layout column headers.
    pub fn vendor_phrase(self) -> &'static str {
        match self {
            Metric::Tail => "Auction tail",
            Metric::BidToCover => "Bid-to-cover ratio",
            Metric::Indirect => "Indirect Bidders (%)",
            Metric::Direct => "Direct Bidders (%)",
            Metric::Reopening => "Auction type (0=reopening)",
            Metric::Soma => "SOMA %age at auction",
            Metric::DepInsts => "Dep. Institutions %age at auction",
            Metric::Individuals => "Individuals %age at auction",
            Metric::Dealers => "Dealers %age at auction",
            Metric::Pensions => "Pension funds %age at auction",
            Metric::Investments => "Investment funds %age at auction",
            Metric::Foreigns => "Foreign %age at auction",
            Metric::AuctionSize => "Auction size ($bn)",
            Metric::AuctionYield => "Auction yield (%)",
        }
    }
}

/// Table column label: "10Y Tail".
pub fn column_label(tenor: Tenor, metric: Metric) -> String {
    format!("{} {}", tenor, metric.label())
}

/// Vendor header: "Treasuries 10y Auction tail".
pub fn vendor_header(tenor: Tenor, metric: Metric) -> String {
    format!("Treasuries {}y {}", tenor.years(), metric.vendor_phrase())
}

/// Inverse of [`vendor_header`].
pub fn parse_vendor_header(header: &str) -> Option<(Tenor, Metric)> {
    let rest = header.trim().strip_prefix("Treasuries ")?;
    let (tenor_part, phrase) = rest.split_once(' ')?;
    let years = tenor_part.strip_suffix('y')?.parse::<u32>().ok()?;
    let tenor = Tenor::from_years(years)?;
    let metric = Metric::ALL
        .into_iter()
        .find(|m| m.vendor_phrase() == phrase.trim())?;
    Some((tenor, metric))
}
