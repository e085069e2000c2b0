//! INI file configuration adapter.

use crate::domain::error::AuctionPnlError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;
use tracing::debug;

#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AuctionPnlError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config
            .load(path)
            .map_err(|reason| AuctionPnlError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        debug!(path = %path.display(), sections = ?config.sections(), "loaded config");
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, AuctionPnlError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| AuctionPnlError::ConfigParse {
                file: "<string>".to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    /// Sets `[section] key = value`, overriding the file.
    pub fn set(&mut self, section: &str, key: &str, value: impl Into<String>) {
        self.config.set(section, key, Some(value.into()));
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.trim().to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.config
            .get(section, key)
            .as_deref()
            .and_then(Self::parse_bool)
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn reads_every_section() {
        let content = r#"
[spread]
file = data/spread.csv
column = 2s10s

[auctions]
file = data/auctions.csv
apply_corrections = no

[pnl]
multiplier = 10000
days = 2.5

[optimizer]
max_iterations = 250

[calendar]
market = GBP
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(
            adapter.get_string("spread", "file"),
            Some("data/spread.csv".to_string())
        );
        assert!(!adapter.get_bool("auctions", "apply_corrections", true));
        assert_eq!(adapter.get_double("pnl", "days", 0.0), 2.5);
        assert_eq!(adapter.get_double("pnl", "multiplier", 1.0), 10000.0);
        assert_eq!(adapter.get_int("optimizer", "max_iterations", 500), 250);
        assert_eq!(adapter.get_string("calendar", "market"), Some("GBP".to_string()));
    }

    #[test]
    fn missing_keys_fall_back() {
        let adapter = FileConfigAdapter::from_string("[pnl]\ndays = 5\n").unwrap();
        assert_eq!(adapter.get_string("pnl", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
        assert_eq!(adapter.get_int("optimizer", "max_iterations", 500), 500);
        assert_eq!(adapter.get_double("pnl", "multiplier", 10_000.0), 10_000.0);
        assert!(adapter.get_bool("auctions", "apply_corrections", true));
    }

    #[test]
    fn non_numeric_values_fall_back() {
        let adapter =
            FileConfigAdapter::from_string("[pnl]\nmultiplier = lots\ndays = abc\n").unwrap();
        assert_eq!(adapter.get_double("pnl", "multiplier", 1.0), 1.0);
        assert_eq!(adapter.get_int("pnl", "days", 7), 7);
    }

    #[test]
    fn bool_spellings() {
        let adapter = FileConfigAdapter::from_string(
            "[report]\na = true\nb = Yes\nc = on\nd = 0\ne = off\nf = maybe\n",
        )
        .unwrap();
        assert!(adapter.get_bool("report", "a", false));
        assert!(adapter.get_bool("report", "b", false));
        assert!(adapter.get_bool("report", "c", false));
        assert!(!adapter.get_bool("report", "d", true));
        assert!(!adapter.get_bool("report", "e", true));
        assert!(adapter.get_bool("report", "f", true));
    }

    #[test]
    fn optional_string_ignores_blank_values() {
        let adapter = FileConfigAdapter::from_string("[spread]\ncolumn = 2s10s\n").unwrap();
        assert_eq!(
            adapter.get_optional_string("spread", "column"),
            Some("2s10s".to_string())
        );
        assert_eq!(adapter.get_optional_string("spread", "timestamp_format"), None);
    }

    #[test]
    fn set_overrides_file_value() {
        let mut adapter = FileConfigAdapter::from_string("[pnl]\ndays = 5\n").unwrap();
        adapter.set("pnl", "days", "3");
        adapter.set("calendar", "market", "EUR");
        assert_eq!(adapter.get_double("pnl", "days", 0.0), 3.0);
        assert_eq!(adapter.get_string("calendar", "market"), Some("EUR".to_string()));
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[report]\noutput = trades.csv\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("report", "output"),
            Some("trades.csv".to_string())
        );
    }

    #[test]
    fn from_file_missing_is_config_parse_error() {
        let err = FileConfigAdapter::from_file("/nonexistent/path/config.ini").unwrap_err();
        assert!(matches!(err, AuctionPnlError::ConfigParse { .. }));
    }
}
