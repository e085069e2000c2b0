//! CSV spread data adapter.
//!
//! Expects a header row whose first column holds timestamps and whose other
//! columns hold spread values, e.g. `Date,2s10s,5s30s`.

use crate::domain::error::AuctionPnlError;
use crate::domain::spread::{SpreadPoint, SpreadSeries};
use crate::ports::spread_port::SpreadPort;
use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

const TIMESTAMP_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

/// Values treated as missing.
pub(crate) fn is_missing(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "" | "na" | "n/a" | "nan" | "null" | "#n/a"
    )
}

pub(crate) fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(value, f).ok())
}

/// Parses with `custom` when given, otherwise tries the common timestamp
/// layouts and finally bare dates (taken as midnight).
pub(crate) fn parse_timestamp(value: &str, custom: Option<&str>) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Some(format) = custom {
        return NaiveDateTime::parse_from_str(value, format)
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(value, format)
                    .ok()
                    .map(|d| d.and_time(chrono::NaiveTime::MIN))
            });
    }
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(value, f).ok())
        .or_else(|| parse_date(value).map(|d| d.and_time(chrono::NaiveTime::MIN)))
}

pub struct CsvSpreadAdapter {
    path: PathBuf,
    timestamp_format: Option<String>,
}

impl CsvSpreadAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            timestamp_format: None,
        }
    }

    pub fn with_timestamp_format(mut self, format: impl Into<String>) -> Self {
        self.timestamp_format = Some(format.into());
        self
    }

    fn read(&self) -> Result<String, AuctionPnlError> {
        fs::read_to_string(&self.path).map_err(|e| AuctionPnlError::DataFile {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })
    }
}

impl SpreadPort for CsvSpreadAdapter {
    fn load_spread(&self, column: Option<&str>) -> Result<SpreadSeries, AuctionPnlError> {
        let content = self.read()?;
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let headers = rdr
            .headers()
            .map_err(|e| AuctionPnlError::CsvFormat {
                line: 1,
                reason: e.to_string(),
            })?
            .clone();

        if headers.len() < 2 {
            return Err(AuctionPnlError::MissingColumn {
                column: column.unwrap_or("spread value").to_string(),
            });
        }

        let index = match column {
            Some(name) => headers
                .iter()
                .skip(1)
                .position(|h| h.eq_ignore_ascii_case(name))
                .map(|i| i + 1)
                .ok_or_else(|| AuctionPnlError::MissingColumn {
                    column: name.to_string(),
                })?,
            None => 1,
        };
        let name = headers.get(index).unwrap_or_default().to_string();

        let mut points = Vec::new();
        let mut missing = 0usize;

        for result in rdr.records() {
            let record = result.map_err(|e| AuctionPnlError::CsvFormat {
                line: e.position().map(|p| p.line()).unwrap_or(0),
                reason: e.to_string(),
            })?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            let raw_ts = record.get(0).unwrap_or_default();
            let timestamp = parse_timestamp(raw_ts, self.timestamp_format.as_deref())
                .ok_or_else(|| AuctionPnlError::InvalidDate {
                    value: raw_ts.to_string(),
                })?;

            let raw = record.get(index).unwrap_or_default();
            if is_missing(raw) {
                missing += 1;
                continue;
            }
            let value: f64 = raw.parse().map_err(|e| AuctionPnlError::CsvFormat {
                line,
                reason: format!("invalid {name} value '{raw}': {e}"),
            })?;

            points.push(SpreadPoint { timestamp, value });
        }

        debug!(
            path = %self.path.display(),
            column = %name,
            points = points.len(),
            missing,
            "loaded spread series"
        );
        Ok(SpreadSeries::new(name, points))
    }
}
