//! Report generation port trait.

use crate::domain::auction::AuctionTable;
use crate::domain::error::AuctionPnlError;
use crate::domain::pnl::TradeBook;

/// Port for writing trade and auction reports.
pub trait ReportPort {
    fn write_trades(&self, book: &TradeBook, output_path: &str) -> Result<(), AuctionPnlError>;

    fn write_auctions(
        &self,
        table: &AuctionTable,
        output_path: &str,
    ) -> Result<(), AuctionPnlError>;
}
