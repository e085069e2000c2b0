//! Domain error types.

use chrono::NaiveDateTime;
use std::fmt;

/// Which leg of an auction trade a window belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowSide {
    Before,
    After,
}

impl fmt::Display for WindowSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowSide::Before => write!(f, "pre-auction"),
            WindowSide::After => write!(f, "post-auction"),
        }
    }
}

/// Top-level error type for auction_pnl.
#[derive(Debug, thiserror::Error)]
pub enum AuctionPnlError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("failed to read {path}: {reason}")]
    DataFile { path: String, reason: String },

    #[error("CSV format error at line {line}: {reason}")]
    CsvFormat { line: u64, reason: String },

    #[error("missing column: {column}")]
    MissingColumn { column: String },

    #[error("invalid date '{value}'")]
    InvalidDate { value: String },

    #[error("unknown tenor '{0}'")]
    UnknownTenor(String),

    #[error("{side} window for auction at {auction} contains no data")]
    EmptyWindow {
        auction: NaiveDateTime,
        side: WindowSide,
    },

    #[error("invalid window: {reason}")]
    InvalidWindow { reason: String },

    #[error("no auctions to trade")]
    NoAuctions,

    #[error("optimisation failed: {reason}")]
    Optimization { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&AuctionPnlError> for std::process::ExitCode {
    fn from(err: &AuctionPnlError) -> Self {
        let code: u8 = match err {
            AuctionPnlError::Io(_) => 1,
            AuctionPnlError::ConfigParse { .. }
            | AuctionPnlError::ConfigMissing { .. }
            | AuctionPnlError::ConfigInvalid { .. } => 2,
            AuctionPnlError::DataFile { .. }
            | AuctionPnlError::CsvFormat { .. }
            | AuctionPnlError::MissingColumn { .. }
            | AuctionPnlError::InvalidDate { .. }
            | AuctionPnlError::UnknownTenor(_) => 3,
            AuctionPnlError::EmptyWindow { .. }
            | AuctionPnlError::InvalidWindow { .. }
            | AuctionPnlError::Optimization { .. } => 4,
            AuctionPnlError::NoAuctions => 5,
        };
        std::process::ExitCode::from(code)
    }
}
