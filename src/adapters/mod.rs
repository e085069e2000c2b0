//! Concrete adapter implementations for ports.

pub mod auction_csv_adapter;
pub mod chart_svg;
pub mod csv_report_adapter;
pub mod csv_spread_adapter;
pub mod file_config_adapter;
