//! Auction results access port trait.

use crate::domain::auction::{AuctionLayout, AuctionTable};
use crate::domain::error::AuctionPnlError;

pub trait AuctionPort {
    fn load_auctions(&self, layout: AuctionLayout) -> Result<AuctionTable, AuctionPnlError>;
}
