//! Core domain types and logic.

pub mod auction;
pub mod calendar;
pub mod config_validation;
pub mod error;
pub mod optimize;
pub mod pnl;
pub mod spread;
pub mod tenor;
pub mod window;
