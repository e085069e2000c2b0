//! Configuration validation.
//!
//! Validates config fields before a command runs.

use crate::domain::auction::AuctionLayout;
use crate::domain::error::AuctionPnlError;
use crate::domain::tenor::Tenor;
use crate::domain::window::MAX_WINDOW_DAYS;
use crate::ports::config_port::ConfigPort;

pub fn validate_spread_config(config: &dyn ConfigPort) -> Result<(), AuctionPnlError> {
    require(config, "spread", "file")?;
    if let Some(format) = config.get_optional_string("spread", "timestamp_format") {
        if !format.contains('%') {
            return Err(invalid(
                "spread",
                "timestamp_format",
                "timestamp_format must be a strftime pattern",
            ));
        }
    }
    Ok(())
}

pub fn validate_auctions_config(config: &dyn ConfigPort) -> Result<(), AuctionPnlError> {
    require(config, "auctions", "file")?;
    if let Some(layout) = config.get_optional_string("auctions", "layout") {
        if AuctionLayout::parse(&layout).is_none() {
            return Err(invalid(
                "auctions",
                "layout",
                "layout must be 'summary' or 'full'",
            ));
        }
    }
    if let Some(tenor) = config.get_optional_string("auctions", "tenor") {
        if tenor.parse::<Tenor>().is_err() {
            return Err(invalid(
                "auctions",
                "tenor",
                "tenor must be one of 2, 3, 5, 7, 10, 20, 30",
            ));
        }
    }
    Ok(())
}

/// Checks the multiplier and the window lengths. Windows are required: either
/// `days` or both `days_before` and `days_after`.
pub fn validate_pnl_config(config: &dyn ConfigPort) -> Result<(), AuctionPnlError> {
    validate_multiplier(config)?;

    let days = window_days(config, "days")?;
    let before = window_days(config, "days_before")?;
    let after = window_days(config, "days_after")?;

    if before.or(days).is_none() {
        return Err(AuctionPnlError::ConfigMissing {
            section: "pnl".to_string(),
            key: "days".to_string(),
        });
    }
    if after.or(days).is_none() {
        return Err(AuctionPnlError::ConfigMissing {
            section: "pnl".to_string(),
            key: "days_after".to_string(),
        });
    }
    Ok(())
}

pub fn validate_optimizer_config(config: &dyn ConfigPort) -> Result<(), AuctionPnlError> {
    validate_multiplier(config)?;

    let lower = number(config, "optimizer", "lower")?;
    let upper = number(config, "optimizer", "upper")?;
    if let Some(lower) = lower {
        if lower < 0.0 {
            return Err(invalid("optimizer", "lower", "lower must be non-negative"));
        }
    }
    if let (Some(lower), Some(upper)) = (lower, upper) {
        if lower >= upper {
            return Err(invalid("optimizer", "lower", "lower must be below upper"));
        }
    }
    if let Some(upper) = upper {
        if upper > MAX_WINDOW_DAYS {
            return Err(invalid(
                "optimizer",
                "upper",
                &format!("upper must not exceed {MAX_WINDOW_DAYS}"),
            ));
        }
    }

    if let Some(tolerance) = number(config, "optimizer", "tolerance")? {
        if tolerance <= 0.0 {
            return Err(invalid("optimizer", "tolerance", "tolerance must be positive"));
        }
    }
    if config.get_optional_string("optimizer", "max_iterations").is_some()
        && config.get_int("optimizer", "max_iterations", 0) < 1
    {
        return Err(invalid(
            "optimizer",
            "max_iterations",
            "max_iterations must be at least 1",
        ));
    }
    Ok(())
}

fn validate_multiplier(config: &dyn ConfigPort) -> Result<(), AuctionPnlError> {
    if let Some(multiplier) = number(config, "pnl", "multiplier")? {
        if multiplier <= 0.0 {
            return Err(invalid("pnl", "multiplier", "multiplier must be positive"));
        }
    }
    Ok(())
}

fn window_days(config: &dyn ConfigPort, key: &str) -> Result<Option<f64>, AuctionPnlError> {
    let value = number(config, "pnl", key)?;
    if let Some(days) = value {
        if days < 0.0 || days > MAX_WINDOW_DAYS {
            return Err(invalid(
                "pnl",
                key,
                &format!("{key} must be between 0 and {MAX_WINDOW_DAYS}"),
            ));
        }
    }
    Ok(value)
}

/// Strict numeric read: present but unparsable or non-finite values are errors.
fn number(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<f64>, AuctionPnlError> {
    match config.get_optional_string(section, key) {
        None => Ok(None),
        Some(raw) => match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(Some(v)),
            _ => Err(invalid(section, key, &format!("'{raw}' is not a number"))),
        },
    }
}

fn require(config: &dyn ConfigPort, section: &str, key: &str) -> Result<String, AuctionPnlError> {
    config
        .get_optional_string(section, key)
        .ok_or_else(|| AuctionPnlError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        })
}

fn invalid(section: &str, key: &str, reason: &str) -> AuctionPnlError {
    AuctionPnlError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
