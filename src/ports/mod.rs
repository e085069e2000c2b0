//! Port traits the domain is driven through.

pub mod auction_port;
pub mod config_port;
pub mod report_port;
pub mod spread_port;
