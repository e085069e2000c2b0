//! Vendor auction results CSV adapter.
//!
//! Summary files carry a `Date` column followed by Tail and bid-to-cover for
//! each tenor, taken by position. Full files name every column
//! (`Treasuries 10y Auction tail`, ...) and are matched by header.

use crate::adapters::csv_spread_adapter::{is_missing, parse_date};
use crate::domain::auction::{AuctionDay, AuctionLayout, AuctionResult, AuctionTable};
use crate::domain::error::AuctionPnlError;
use crate::domain::tenor::{column_label, parse_vendor_header, Metric, Tenor};
use crate::ports::auction_port::AuctionPort;
use csv::StringRecord;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

pub struct AuctionCsvAdapter {
    path: PathBuf,
    apply_corrections: bool,
}

/// Where each (tenor, metric) lives in a record.
type ColumnMap = Vec<(usize, Tenor, Metric)>;

impl AuctionCsvAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            apply_corrections: true,
        }
    }

    pub fn with_corrections(mut self, apply: bool) -> Self {
        self.apply_corrections = apply;
        self
    }

    fn date_index(headers: &StringRecord) -> Result<usize, AuctionPnlError> {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case("date"))
            .ok_or_else(|| AuctionPnlError::MissingColumn {
                column: "Date".to_string(),
            })
    }

    fn summary_columns(headers: &StringRecord, date_idx: usize) -> Result<ColumnMap, AuctionPnlError> {
        let value_columns: Vec<usize> = (0..headers.len()).filter(|i| *i != date_idx).collect();
        let expected: Vec<(Tenor, Metric)> = Tenor::ALL
            .into_iter()
            .flat_map(|t| [(t, Metric::Tail), (t, Metric::BidToCover)])
            .collect();

        if value_columns.len() < expected.len() {
            let (tenor, metric) = expected[value_columns.len()];
            return Err(AuctionPnlError::MissingColumn {
                column: column_label(tenor, metric),
            });
        }
        Ok(value_columns
            .into_iter()
            .zip(expected)
            .map(|(i, (t, m))| (i, t, m))
            .collect())
    }

    fn full_columns(headers: &StringRecord) -> Result<ColumnMap, AuctionPnlError> {
        let mut columns = ColumnMap::new();
        for (i, header) in headers.iter().enumerate() {
            match parse_vendor_header(header).or_else(|| parse_column_label(header)) {
                Some((tenor, metric)) => columns.push((i, tenor, metric)),
                None if header.trim().eq_ignore_ascii_case("date") => {}
                None => debug!(header, "ignoring unrecognised auction column"),
            }
        }
        for tenor in Tenor::ALL {
            if !columns
                .iter()
                .any(|(_, t, m)| *t == tenor && *m == Metric::BidToCover)
            {
                return Err(AuctionPnlError::MissingColumn {
                    column: column_label(tenor, Metric::BidToCover),
                });
            }
        }
        Ok(columns)
    }

    fn parse_row(
        record: &StringRecord,
        date_idx: usize,
        columns: &ColumnMap,
    ) -> Result<Option<AuctionDay>, AuctionPnlError> {
        // blank filler rows carry no date either
        if columns
            .iter()
            .all(|(i, _, _)| is_missing(record.get(*i).unwrap_or_default()))
        {
            return Ok(None);
        }

        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let raw_date = record.get(date_idx).unwrap_or_default();
        let date = parse_date(raw_date).ok_or_else(|| AuctionPnlError::InvalidDate {
            value: raw_date.to_string(),
        })?;

        let mut results: BTreeMap<Tenor, AuctionResult> = BTreeMap::new();
        for (i, tenor, metric) in columns {
            let raw = record.get(*i).unwrap_or_default();
            let value = if is_missing(raw) {
                0.0
            } else {
                raw.trim()
                    .parse::<f64>()
                    .map_err(|e| AuctionPnlError::CsvFormat {
                        line,
                        reason: format!("invalid {} value '{raw}': {e}", column_label(*tenor, *metric)),
                    })?
            };
            results.entry(*tenor).or_default().set(*metric, value);
        }
        Ok(Some(AuctionDay::new(date, results)))
    }
}

/// Accepts this crate's own labels ("10Y Tail") so written tables read back.
fn parse_column_label(header: &str) -> Option<(Tenor, Metric)> {
    let (tenor, metric) = header.trim().split_once(' ')?;
    let tenor = tenor.parse::<Tenor>().ok()?;
    let metric = Metric::ALL.into_iter().find(|m| m.label() == metric.trim())?;
    Some((tenor, metric))
}

impl AuctionPort for AuctionCsvAdapter {
    fn load_auctions(&self, layout: AuctionLayout) -> Result<AuctionTable, AuctionPnlError> {
        let content = fs::read_to_string(&self.path).map_err(|e| AuctionPnlError::DataFile {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| AuctionPnlError::CsvFormat {
                line: 1,
                reason: e.to_string(),
            })?
            .clone();

        let date_idx = Self::date_index(&headers)?;
        let columns = match layout {
            AuctionLayout::Summary => Self::summary_columns(&headers, date_idx)?,
            AuctionLayout::Full => Self::full_columns(&headers)?,
        };

        let mut table = AuctionTable::new(layout);
        let mut dropped = 0usize;
        for result in rdr.records() {
            let record = result.map_err(|e| AuctionPnlError::CsvFormat {
                line: e.position().map(|p| p.line()).unwrap_or(0),
                reason: e.to_string(),
            })?;
            match Self::parse_row(&record, date_idx, &columns)? {
                Some(day) => {
                    let date = day.date;
                    if table.insert(day).is_some() {
                        warn!(%date, "duplicate auction date, keeping the later row");
                    }
                }
                None => dropped += 1,
            }
        }

        if self.apply_corrections && table.apply_known_corrections() {
            debug!("applied known vendor corrections");
        }

        debug!(
            path = %self.path.display(),
            ?layout,
            days = table.len(),
            dropped,
            "loaded auction results"
        );
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    const SUMMARY_HEADER: &str = "Date,2Y Tail,2Y BC,3Y Tail,3Y BC,5Y Tail,5Y BC,7Y Tail,7Y BC,\
                                  10Y Tail,10Y BC,20Y Tail,20Y BC,30Y Tail,30Y BC";

    fn write(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("auctions.csv");
        fs::write(&path, content).unwrap();
        path
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn summary_layout_by_position() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            &format!(
                "{SUMMARY_HEADER}\n\
                 2023-01-10,,,0.5,2.6,,,,,,,,,,\n\
                 01/11/2023,,,,,,,,,-0.3,2.4,,,0.1,2.3\n"
            ),
        );
        let table = AuctionCsvAdapter::new(path)
            .load_auctions(AuctionLayout::Summary)
            .unwrap();

        assert_eq!(table.len(), 2);
        let first = table.get(date(2023, 1, 10)).unwrap();
        assert_eq!(first.bond_series, vec![Tenor::Y3]);
        assert_eq!(first.value(Tenor::Y3, Metric::Tail), Some(0.5));
        assert_eq!(first.value(Tenor::Y2, Metric::Tail), Some(0.0));

        let second = table.get(date(2023, 1, 11)).unwrap();
        assert_eq!(second.bond_series, vec![Tenor::Y10, Tenor::Y30]);
        assert_eq!(second.value(Tenor::Y10, Metric::Tail), Some(-0.3));
    }

    #[test]
    fn blank_rows_are_dropped() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            &format!("{SUMMARY_HEADER}\n2023-01-09,,,,,,,,,,,,,,\n2023-01-10,NA,NA,,,,,,,,,,,,\n"),
        );
        let table = AuctionCsvAdapter::new(path)
            .load_auctions(AuctionLayout::Summary)
            .unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn trailing_filler_row_without_date_is_dropped() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            &format!("{SUMMARY_HEADER}\n2023-01-10,,,0.5,2.6,,,,,,,,,,\n,,,,,,,,,,,,,,\n"),
        );
        let table = AuctionCsvAdapter::new(path)
            .load_auctions(AuctionLayout::Summary)
            .unwrap();
        assert_eq!(table.dates(), vec![date(2023, 1, 10)]);
    }

    #[test]
    fn bad_date_on_populated_row_still_fails() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            &format!("{SUMMARY_HEADER}\n,,,0.5,2.6,,,,,,,,,,\n"),
        );
        let err = AuctionCsvAdapter::new(path)
            .load_auctions(AuctionLayout::Summary)
            .unwrap_err();
        assert!(matches!(err, AuctionPnlError::InvalidDate { value } if value.is_empty()));
    }

    #[test]
    fn date_column_is_required() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "When,2Y Tail\n2023-01-10,0.1\n");
        let err = AuctionCsvAdapter::new(path)
            .load_auctions(AuctionLayout::Summary)
            .unwrap_err();
        assert!(matches!(err, AuctionPnlError::MissingColumn { column } if column == "Date"));
    }

    #[test]
    fn short_summary_header_names_first_missing_column() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "Date,2Y Tail,2Y BC,3Y Tail\n");
        let err = AuctionCsvAdapter::new(path)
            .load_auctions(AuctionLayout::Summary)
            .unwrap_err();
        assert!(matches!(err, AuctionPnlError::MissingColumn { column } if column == "3Y BC"));
    }

    #[test]
    fn non_numeric_cell_is_csv_error() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            &format!("{SUMMARY_HEADER}\n2023-01-10,,,x,2.6,,,,,,,,,,\n"),
        );
        let err = AuctionCsvAdapter::new(path)
            .load_auctions(AuctionLayout::Summary)
            .unwrap_err();
        assert!(matches!(err, AuctionPnlError::CsvFormat { line: 2, .. }));
    }

    #[test]
    fn duplicate_dates_keep_last_row() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            &format!(
                "{SUMMARY_HEADER}\n\
                 2023-01-10,,,0.5,2.6,,,,,,,,,,\n\
                 2023-01-10,,,0.7,2.5,,,,,,,,,,\n"
            ),
        );
        let table = AuctionCsvAdapter::new(path)
            .load_auctions(AuctionLayout::Summary)
            .unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.get(date(2023, 1, 10)).unwrap().value(Tenor::Y3, Metric::Tail),
            Some(0.7)
        );
    }

    #[test]
    fn corrections_can_be_disabled() {
        let dir = TempDir::new().unwrap();
        let row = "2022-07-25,0.1,2.5,,,0.2,2.3,0.3,2.6,,,,,,";
        let path = write(&dir, &format!("{SUMMARY_HEADER}\n{row}\n"));

        let corrected = AuctionCsvAdapter::new(path.clone())
            .load_auctions(AuctionLayout::Summary)
            .unwrap();
        assert_eq!(corrected.len(), 2);
        assert_eq!(
            corrected.get(date(2022, 7, 27)).unwrap().bond_series,
            vec![Tenor::Y7]
        );

        let raw = AuctionCsvAdapter::new(path)
            .with_corrections(false)
            .load_auctions(AuctionLayout::Summary)
            .unwrap();
        assert_eq!(raw.len(), 1);
        assert_eq!(raw.get(date(2022, 7, 25)).unwrap().num_auctions(), 3);
    }

    fn full_header() -> String {
        let mut header = vec!["Date".to_string()];
        for tenor in Tenor::ALL {
            for metric in Metric::ALL {
                header.push(crate::domain::tenor::vendor_header(tenor, metric));
            }
        }
        header.push("Comment".to_string());
        header.join(",")
    }

    #[test]
    fn full_layout_by_header() {
        let dir = TempDir::new().unwrap();
        let mut cells = vec![String::new(); 7 * 14 + 1];
        // 10Y block starts at 4 * 14
        cells[4 * 14] = "-0.2".into();
        cells[4 * 14 + 1] = "2.45".into();
        cells[4 * 14 + 13] = "3.61".into();
        cells[7 * 14] = "note".into();
        let path = write(
            &dir,
            &format!("{}\n2023-02-08,{}\n", full_header(), cells.join(",")),
        );

        let table = AuctionCsvAdapter::new(path)
            .load_auctions(AuctionLayout::Full)
            .unwrap();
        let rows = table.tenor_results(Tenor::Y10);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].result.get(Metric::AuctionYield), Some(3.61));
        assert_eq!(rows[0].result.get(Metric::Soma), Some(0.0));
        assert_eq!(rows[0].num_auctions, 1);
    }

    #[test]
    fn full_layout_requires_bid_to_cover() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "Date,Treasuries 10y Auction tail\n2023-02-08,0.1\n");
        let err = AuctionCsvAdapter::new(path)
            .load_auctions(AuctionLayout::Full)
            .unwrap_err();
        assert!(matches!(err, AuctionPnlError::MissingColumn { column } if column == "2Y BC"));
    }

    #[test]
    fn own_column_labels_are_recognised() {
        assert_eq!(parse_column_label("20Y SOMA"), Some((Tenor::Y20, Metric::Soma)));
        assert_eq!(parse_column_label("bond_series"), None);
    }
}
