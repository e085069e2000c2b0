#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Hourly-ish 2s10s quotes around the 8 Feb and 15 Feb 2023 10Y auctions.
///
/// With a two day window and the default multiplier the 8 Feb trade makes
/// 500 before and 300 after the auction; the 15 Feb trade loses 200 on each
/// leg.
pub const SPREAD_CSV: &str = "\
Date,2s10s,5s30s
2023-02-06 10:00:00,-0.80,0.30
2023-02-07 10:00:00,-0.78,0.31
2023-02-08 10:00:00,-0.75,0.32
2023-02-08 14:00:00,-0.76,0.33
2023-02-09 10:00:00,-0.79,0.32
2023-02-13 10:00:00,-0.70,0.30
2023-02-14 10:00:00,NA,0.29
2023-02-15 10:00:00,-0.72,0.28
2023-02-15 14:00:00,-0.71,0.27
2023-02-16 10:00:00,-0.69,0.26
";

/// Summary layout: Date then Tail and BC for 2Y, 3Y, 5Y, 7Y, 10Y, 20Y, 30Y.
pub const AUCTIONS_CSV: &str = "\
Date,2Y Tail,2Y BC,3Y Tail,3Y BC,5Y Tail,5Y BC,7Y Tail,7Y BC,10Y Tail,10Y BC,20Y Tail,20Y BC,30Y Tail,30Y BC
2023-02-08,,,,,,,,,0.5,2.4,,,,
2023-02-15,,,-0.3,2.6,,,,,1.1,2.2,,,,
2023-02-28,0.2,2.7,,,,,,,,,,,,
2023-03-01,,,,,,,,,,,,,,
";

pub const AUCTION_DATES_10Y: [&str; 2] = ["2023-02-08", "2023-02-15"];

pub fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

/// Spread and auction files plus a config pointing at them.
pub struct Fixture {
    pub dir: TempDir,
    pub spread: PathBuf,
    pub auctions: PathBuf,
    pub config: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_pnl("days = 2\nmultiplier = 10000\n")
    }

    /// `pnl_section` replaces the body of the `[pnl]` section.
    pub fn with_pnl(pnl_section: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let spread = write_file(&dir, "spread.csv", SPREAD_CSV);
        let auctions = write_file(&dir, "auctions.csv", AUCTIONS_CSV);
        let config = write_file(&dir, "config.ini", &config_ini(&spread, &auctions, pnl_section));
        Self {
            dir,
            spread,
            auctions,
            config,
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn rewrite_config(&self, content: &str) {
        fs::write(&self.config, content).unwrap();
    }
}

pub fn config_ini(spread: &Path, auctions: &Path, pnl_section: &str) -> String {
    format!(
        "[spread]\n\
         file = {}\n\
         column = 2s10s\n\
         \n\
         [auctions]\n\
         file = {}\n\
         layout = summary\n\
         tenor = 10Y\n\
         \n\
         [pnl]\n\
         {pnl_section}\n\
         [optimizer]\n\
         lower = 1\n\
         upper = 5\n\
         tolerance = 0.001\n\
         max_iterations = 200\n\
         \n\
         [calendar]\n\
         market = UST\n",
        spread.display(),
        auctions.display(),
    )
}
