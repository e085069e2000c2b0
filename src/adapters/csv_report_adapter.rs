//! CSV report writer for trade books and auction tables.
//!
//! An output path of `-` writes to stdout.

use crate::domain::auction::{AuctionTable, TenorAuction};
use crate::domain::error::AuctionPnlError;
use crate::domain::pnl::{TradeBook, TradeRecord};
use crate::domain::tenor::{column_label, Metric, Tenor};
use crate::ports::report_port::ReportPort;
use serde::Serialize;
use std::fs::File;
use std::io::{self, Write};
use tracing::debug;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Serialize)]
struct TradeRow {
    #[serde(rename = "Auction Date")]
    auction_date: String,
    #[serde(rename = "Enter at Pre-Auction Time")]
    enter_pre: String,
    #[serde(rename = "Exit at Pre-Auction Time")]
    exit_pre: String,
    #[serde(rename = "Pre-Auction PnL")]
    pre_auction_pnl: f64,
    #[serde(rename = "Enter at Post-Auction Time")]
    enter_post: String,
    #[serde(rename = "Exit at Post-Auction Time")]
    exit_post: String,
    #[serde(rename = "Post-Auction PnL")]
    post_auction_pnl: f64,
}

impl From<&TradeRecord> for TradeRow {
    fn from(r: &TradeRecord) -> Self {
        Self {
            auction_date: r.auction.date().to_string(),
            enter_pre: r.enter_pre.format(TIMESTAMP_FORMAT).to_string(),
            exit_pre: r.exit_pre.format(TIMESTAMP_FORMAT).to_string(),
            pre_auction_pnl: r.pre_auction_pnl,
            enter_post: r.enter_post.format(TIMESTAMP_FORMAT).to_string(),
            exit_post: r.exit_post.format(TIMESTAMP_FORMAT).to_string(),
            post_auction_pnl: r.post_auction_pnl,
        }
    }
}

fn bond_series_cell(series: &[Tenor]) -> String {
    series
        .iter()
        .map(Tenor::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Default)]
pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }

    fn open(output_path: &str) -> Result<Box<dyn Write>, AuctionPnlError> {
        if output_path == "-" {
            return Ok(Box::new(io::stdout().lock()));
        }
        let file = File::create(output_path).map_err(|e| AuctionPnlError::DataFile {
            path: output_path.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Box::new(file))
    }

    fn csv_error(output_path: &str, e: csv::Error) -> AuctionPnlError {
        AuctionPnlError::DataFile {
            path: output_path.to_string(),
            reason: e.to_string(),
        }
    }

    /// One tenor's auctions with the metrics each row carries.
    pub fn write_tenor_auctions(
        &self,
        rows: &[TenorAuction],
        output_path: &str,
    ) -> Result<(), AuctionPnlError> {
        let mut wtr = csv::Writer::from_writer(Self::open(output_path)?);
        let metrics: Vec<Metric> = rows
            .first()
            .map(|r| r.result.metrics().map(|(m, _)| m).collect())
            .unwrap_or_default();

        let mut header = vec![
            "Date".to_string(),
            "bond_series".to_string(),
            "num_auctions".to_string(),
        ];
        if let Some(first) = rows.first() {
            header.extend(
                metrics
                    .iter()
                    .map(|m| column_label(first.tenor, *m)),
            );
        }
        wtr.write_record(&header)
            .map_err(|e| Self::csv_error(output_path, e))?;

        for row in rows {
            let mut record = vec![
                row.date.to_string(),
                bond_series_cell(&row.bond_series),
                row.num_auctions.to_string(),
            ];
            record.extend(
                metrics
                    .iter()
                    .map(|m| row.result.get(*m).unwrap_or(0.0).to_string()),
            );
            wtr.write_record(&record)
                .map_err(|e| Self::csv_error(output_path, e))?;
        }
        wtr.flush()?;
        debug!(output_path, rows = rows.len(), "wrote tenor auctions");
        Ok(())
    }
}

impl ReportPort for CsvReportAdapter {
    fn write_trades(&self, book: &TradeBook, output_path: &str) -> Result<(), AuctionPnlError> {
        let mut wtr = csv::Writer::from_writer(Self::open(output_path)?);
        if book.is_empty() {
            // serde only emits headers alongside the first row
            wtr.write_record([
                "Auction Date",
                "Enter at Pre-Auction Time",
                "Exit at Pre-Auction Time",
                "Pre-Auction PnL",
                "Enter at Post-Auction Time",
                "Exit at Post-Auction Time",
                "Post-Auction PnL",
            ])
            .map_err(|e| Self::csv_error(output_path, e))?;
        }
        for record in &book.records {
            wtr.serialize(TradeRow::from(record))
                .map_err(|e| Self::csv_error(output_path, e))?;
        }
        wtr.flush()?;
        debug!(output_path, trades = book.len(), "wrote trade book");
        Ok(())
    }

    fn write_auctions(
        &self,
        table: &AuctionTable,
        output_path: &str,
    ) -> Result<(), AuctionPnlError> {
        let mut wtr = csv::Writer::from_writer(Self::open(output_path)?);

        let mut header = vec!["Date".to_string()];
        header.extend(table.column_names());
        wtr.write_record(&header)
            .map_err(|e| Self::csv_error(output_path, e))?;

        let metrics = table.layout().metrics();
        for day in table.iter() {
            let mut record = vec![
                day.date.to_string(),
                bond_series_cell(&day.bond_series),
                day.num_auctions().to_string(),
            ];
            for tenor in Tenor::ALL {
                for metric in metrics {
                    record.push(day.value(tenor, *metric).unwrap_or(0.0).to_string());
                }
            }
            wtr.write_record(&record)
                .map_err(|e| Self::csv_error(output_path, e))?;
        }
        wtr.flush()?;
        debug!(output_path, days = table.len(), "wrote auction table");
        Ok(())
    }
}
