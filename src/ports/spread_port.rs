//! Spread data access port trait.

use crate::domain::error::AuctionPnlError;
use crate::domain::spread::SpreadSeries;

pub trait SpreadPort {
    /// Loads the series held in `column`, or the first value column when
    /// `None`.
    fn load_spread(&self, column: Option<&str>) -> Result<SpreadSeries, AuctionPnlError>;
}
