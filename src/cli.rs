//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::adapters::auction_csv_adapter::AuctionCsvAdapter;
use crate::adapters::chart_svg::{write_trade_chart, TradeChart};
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::csv_spread_adapter::{parse_date, CsvSpreadAdapter};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::auction::{AuctionLayout, AuctionTable};
use crate::domain::calendar::{BusinessDayConvention, Market};
use crate::domain::config_validation::{
    validate_auctions_config, validate_optimizer_config, validate_pnl_config,
    validate_spread_config,
};
use crate::domain::error::AuctionPnlError;
use crate::domain::optimize::{optimize_entry_time, EntryTiming, MinimizeConfig, ENTRY_DAY_BOUNDS};
use crate::domain::pnl::{all_trades, slope_curve, DEFAULT_MULTIPLIER};
use crate::domain::spread::SpreadSeries;
use crate::domain::tenor::Tenor;
use crate::domain::window::{split_around, timestamp_at, WindowSpec};
use crate::ports::auction_port::AuctionPort;
use crate::ports::config_port::ConfigPort;
use crate::ports::report_port::ReportPort;
use crate::ports::spread_port::SpreadPort;

#[derive(Parser, Debug)]
#[command(
    name = "auction-pnl",
    version,
    about = "Treasury auction spread trade analytics"
)]
pub struct Cli {
    /// Raise log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Window length overrides shared by the trade commands.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct WindowArgs {
    /// Days held on both sides of the auction
    #[arg(short = 'n', long)]
    pub days: Option<f64>,
    /// Days held before the auction (overrides --days)
    #[arg(long)]
    pub days_before: Option<f64>,
    /// Days held after the auction (overrides --days)
    #[arg(long)]
    pub days_after: Option<f64>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute PnL for every auction of a tenor
    Trades {
        #[arg(short, long)]
        config: PathBuf,
        #[command(flatten)]
        window: WindowArgs,
        #[arg(short, long)]
        tenor: Option<String>,
        /// Trade book CSV ("-" for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Search for the most profitable holding period
    Optimize {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        tenor: Option<String>,
        /// Optimise the pre- and post-auction legs separately
        #[arg(long)]
        asymmetric: bool,
        #[arg(long, allow_hyphen_values = true)]
        lower: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        upper: Option<f64>,
    },
    /// Chart the trade around one auction as SVG
    Plot {
        #[arg(short, long)]
        config: PathBuf,
        /// Auction date
        #[arg(short, long)]
        auction: String,
        #[command(flatten)]
        window: WindowArgs,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the parsed auction results table
    Auctions {
        #[arg(short, long)]
        config: PathBuf,
        /// Only this tenor's auctions, with every metric
        #[arg(short, long, conflicts_with = "multi")]
        tenor: Option<String>,
        /// With --tenor, keep only Tail and BC
        #[arg(long, requires = "tenor")]
        summary: bool,
        /// Only dates with more than one auction
        #[arg(long)]
        multi: bool,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Business day arithmetic
    Calendar {
        /// UST, USE, EUR or GBP
        #[arg(short, long, global = true)]
        market: Option<String>,
        /// Read [calendar] market from this file
        #[arg(short, long, global = true)]
        config: Option<PathBuf>,
        #[command(subcommand)]
        op: CalendarCommand,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum CalendarCommand {
    /// Is DATE a business day
    IsBusinessDay { date: String },
    /// DATE moved by DAYS business days
    Add {
        date: String,
        #[arg(allow_hyphen_values = true)]
        days: i64,
    },
    /// Business days in [FROM, TO)
    Between { from: String, to: String },
    /// Last business day of DATE's month
    EndOfMonth {
        date: String,
        /// Print whether DATE itself is the last business day instead
        #[arg(long)]
        check: bool,
    },
    /// DATE rolled onto a business day
    Adjust {
        date: String,
        #[arg(long, value_enum, default_value_t = ConventionArg::Following)]
        convention: ConventionArg,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConventionArg {
    Unadjusted,
    Following,
    ModifiedFollowing,
    Preceding,
    ModifiedPreceding,
}

impl From<ConventionArg> for BusinessDayConvention {
    fn from(arg: ConventionArg) -> Self {
        match arg {
            ConventionArg::Unadjusted => BusinessDayConvention::Unadjusted,
            ConventionArg::Following => BusinessDayConvention::Following,
            ConventionArg::ModifiedFollowing => BusinessDayConvention::ModifiedFollowing,
            ConventionArg::Preceding => BusinessDayConvention::Preceding,
            ConventionArg::ModifiedPreceding => BusinessDayConvention::ModifiedPreceding,
        }
    }
}

/// Installs the stderr log subscriber. `RUST_LOG` wins over `verbose`.
pub fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Trades {
            config,
            window,
            tenor,
            output,
        } => run_trades(&config, &window, tenor.as_deref(), output.as_deref()),
        Command::Optimize {
            config,
            tenor,
            asymmetric,
            lower,
            upper,
        } => run_optimize(&config, tenor.as_deref(), asymmetric, lower, upper),
        Command::Plot {
            config,
            auction,
            window,
            output,
        } => run_plot(&config, &auction, &window, output.as_deref()),
        Command::Auctions {
            config,
            tenor,
            summary,
            multi,
            output,
        } => run_auctions(&config, tenor.as_deref(), summary, multi, output.as_deref()),
        Command::Calendar { market, config, op } => {
            run_calendar(market.as_deref(), config.as_deref(), op)
        }
        Command::Validate { config } => run_validate(&config),
    };
    finish(result)
}

fn finish(result: Result<(), AuctionPnlError>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, AuctionPnlError> {
    eprintln!("Loading config from {}", path.display());
    FileConfigAdapter::from_file(path)
}

/// Writes command-line window lengths over the `[pnl]` section.
pub fn apply_window_overrides(config: &mut FileConfigAdapter, window: &WindowArgs) {
    if let Some(days) = window.days {
        config.set("pnl", "days", days.to_string());
    }
    if let Some(days) = window.days_before {
        config.set("pnl", "days_before", days.to_string());
    }
    if let Some(days) = window.days_after {
        config.set("pnl", "days_after", days.to_string());
    }
}

fn config_number(config: &dyn ConfigPort, section: &str, key: &str) -> Option<f64> {
    config
        .get_optional_string(section, key)
        .and_then(|s| s.parse().ok())
}

/// `days_before` / `days_after` fall back to `days`.
pub fn build_window_spec(config: &dyn ConfigPort) -> Result<WindowSpec, AuctionPnlError> {
    WindowSpec::resolve(
        config_number(config, "pnl", "days"),
        config_number(config, "pnl", "days_before"),
        config_number(config, "pnl", "days_after"),
    )
}

pub fn resolve_multiplier(config: &dyn ConfigPort) -> f64 {
    config.get_double("pnl", "multiplier", DEFAULT_MULTIPLIER)
}

pub fn build_minimize_config(config: &dyn ConfigPort) -> MinimizeConfig {
    let defaults = MinimizeConfig::default();
    MinimizeConfig {
        x_tolerance: config.get_double("optimizer", "tolerance", defaults.x_tolerance),
        max_evaluations: u32::try_from(config.get_int(
            "optimizer",
            "max_iterations",
            i64::from(defaults.max_evaluations),
        ))
        .unwrap_or(defaults.max_evaluations),
    }
}

/// Writes command-line search bounds over the `[optimizer]` section.
pub fn apply_bound_overrides(
    config: &mut FileConfigAdapter,
    lower: Option<f64>,
    upper: Option<f64>,
) {
    if let Some(lower) = lower {
        config.set("optimizer", "lower", lower.to_string());
    }
    if let Some(upper) = upper {
        config.set("optimizer", "upper", upper.to_string());
    }
}

pub fn resolve_bounds(config: &dyn ConfigPort) -> (f64, f64) {
    (
        config.get_double("optimizer", "lower", ENTRY_DAY_BOUNDS.0),
        config.get_double("optimizer", "upper", ENTRY_DAY_BOUNDS.1),
    )
}

/// Command line first, then `[auctions] tenor`, then 10Y.
pub fn resolve_tenor(
    tenor_override: Option<&str>,
    config: &dyn ConfigPort,
) -> Result<Tenor, AuctionPnlError> {
    match tenor_override.map(str::to_string).or_else(|| config.get_optional_string("auctions", "tenor")) {
        Some(t) => t.parse(),
        None => Ok(Tenor::Y10),
    }
}

pub fn resolve_layout(config: &dyn ConfigPort) -> AuctionLayout {
    config
        .get_optional_string("auctions", "layout")
        .and_then(|l| AuctionLayout::parse(&l))
        .unwrap_or(AuctionLayout::Summary)
}

/// Command line first, then `[calendar] market`, then UST.
pub fn resolve_market(market_override: Option<&str>, config: Option<&dyn ConfigPort>) -> Market {
    market_override
        .map(str::to_string)
        .or_else(|| config.and_then(|c| c.get_optional_string("calendar", "market")))
        .map(|code| Market::from_code(&code))
        .unwrap_or_default()
}

fn require_path(config: &dyn ConfigPort, section: &str, key: &str) -> Result<String, AuctionPnlError> {
    config
        .get_optional_string(section, key)
        .ok_or_else(|| AuctionPnlError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        })
}

pub fn load_spread(config: &dyn ConfigPort) -> Result<SpreadSeries, AuctionPnlError> {
    let path = require_path(config, "spread", "file")?;
    let mut adapter = CsvSpreadAdapter::new(&path);
    if let Some(format) = config.get_optional_string("spread", "timestamp_format") {
        adapter = adapter.with_timestamp_format(format);
    }
    let column = config.get_optional_string("spread", "column");
    let series = adapter.load_spread(column.as_deref())?;
    eprintln!("Loaded {} {} observations from {}", series.len(), series.name(), path);
    Ok(series)
}

pub fn load_auction_table(config: &dyn ConfigPort) -> Result<AuctionTable, AuctionPnlError> {
    let path = require_path(config, "auctions", "file")?;
    let table = AuctionCsvAdapter::new(&path)
        .with_corrections(config.get_bool("auctions", "apply_corrections", true))
        .load_auctions(resolve_layout(config))?;
    eprintln!("Loaded {} auction dates from {}", table.len(), path);
    Ok(table)
}

fn output_target(cli: Option<&Path>, config: &dyn ConfigPort, key: &str, default: &str) -> String {
    cli.map(|p| p.display().to_string())
        .or_else(|| config.get_optional_string("report", key))
        .unwrap_or_else(|| default.to_string())
}

fn run_trades(
    config_path: &Path,
    window: &WindowArgs,
    tenor: Option<&str>,
    output: Option<&Path>,
) -> Result<(), AuctionPnlError> {
    let mut config = load_config(config_path)?;
    apply_window_overrides(&mut config, window);
    validate_spread_config(&config)?;
    validate_auctions_config(&config)?;
    validate_pnl_config(&config)?;

    let spec = build_window_spec(&config)?;
    let multiplier = resolve_multiplier(&config);
    let tenor = resolve_tenor(tenor, &config)?;

    let series = load_spread(&config)?;
    let table = load_auction_table(&config)?;
    let auctions = table.auction_timestamps(tenor);
    if auctions.is_empty() {
        return Err(AuctionPnlError::NoAuctions);
    }

    eprintln!(
        "Trading {} {} auctions: {} days before, {} days after",
        auctions.len(),
        tenor,
        spec.days_before,
        spec.days_after
    );
    let book = all_trades(&series, &auctions, spec, multiplier);
    if book.is_empty() {
        return Err(AuctionPnlError::NoAuctions);
    }

    let target = output_target(output, &config, "output", "-");
    CsvReportAdapter::new().write_trades(&book, &target)?;

    eprintln!("\n=== Auction Trades ===");
    eprintln!("Trades:           {}", book.len());
    eprintln!("Skipped:          {}", book.skipped.len());
    eprintln!("Pre-Auction PnL:  {:.2}", book.total_pre());
    eprintln!("Post-Auction PnL: {:.2}", book.total_post());
    eprintln!("Total PnL:        {:.2}", book.total());
    eprintln!("Hit Rate:         {:.1}%", book.hit_rate() * 100.0);
    if target != "-" {
        eprintln!("\nTrades written to: {target}");
    }
    Ok(())
}

fn run_optimize(
    config_path: &Path,
    tenor: Option<&str>,
    asymmetric: bool,
    lower: Option<f64>,
    upper: Option<f64>,
) -> Result<(), AuctionPnlError> {
    let mut config = load_config(config_path)?;
    apply_bound_overrides(&mut config, lower, upper);
    validate_spread_config(&config)?;
    validate_auctions_config(&config)?;
    validate_optimizer_config(&config)?;

    let bounds = resolve_bounds(&config);
    let minimize = build_minimize_config(&config);
    let multiplier = resolve_multiplier(&config);
    let tenor = resolve_tenor(tenor, &config)?;
    let symmetric = !asymmetric && config.get_bool("optimizer", "symmetric", true);

    let series = load_spread(&config)?;
    let table = load_auction_table(&config)?;
    let auctions = table.auction_timestamps(tenor);

    eprintln!(
        "Searching {:.1} to {:.1} days over {} {} auctions...",
        bounds.0,
        bounds.1,
        auctions.len(),
        tenor
    );
    match optimize_entry_time(&series, &auctions, symmetric, multiplier, bounds, &minimize)? {
        EntryTiming::Symmetric { days, pnl } => {
            println!(
                "Optimal entry/exit time: {days:.2} days before/after the auction. PnL: {pnl:.2}"
            );
        }
        EntryTiming::Asymmetric {
            days_before,
            pnl_before,
            days_after,
            pnl_after,
        } => {
            println!(
                "Optimal entry/exit time: {days_before:.2} days before the auction and \
                 {days_after:.2} days after the auction."
            );
            println!("PnL before auction: {pnl_before:.2}. PnL after auction: {pnl_after:.2}.");
        }
    }
    Ok(())
}

fn parse_cli_date(value: &str) -> Result<NaiveDate, AuctionPnlError> {
    parse_date(value).ok_or_else(|| AuctionPnlError::InvalidDate {
        value: value.to_string(),
    })
}

fn run_plot(
    config_path: &Path,
    auction: &str,
    window: &WindowArgs,
    output: Option<&Path>,
) -> Result<(), AuctionPnlError> {
    let auction_date = parse_cli_date(auction)?;
    let mut config = load_config(config_path)?;
    apply_window_overrides(&mut config, window);
    validate_spread_config(&config)?;
    validate_pnl_config(&config)?;

    let spec = build_window_spec(&config)?;
    let multiplier = resolve_multiplier(&config);
    let series = load_spread(&config)?;

    let auction_ts = timestamp_at(auction_date, 0, 0);
    let pnl = slope_curve(&series, auction_ts, spec, multiplier)?;
    let legs = split_around(&series, auction_ts, spec);

    let default_name = format!("trade_{auction_date}.svg");
    let target = output_target(output, &config, "chart", &default_name);
    let chart = TradeChart {
        auction: auction_date,
        spec,
        before: legs.before,
        after: legs.after,
        pnl,
    };
    write_trade_chart(&chart, Path::new(&target))?;

    println!(
        "{auction_date}: PnL before auction {:.2}, after auction {:.2}",
        pnl.pre_auction, pnl.post_auction
    );
    eprintln!("Chart written to: {target}");
    Ok(())
}

fn run_auctions(
    config_path: &Path,
    tenor: Option<&str>,
    summary: bool,
    multi: bool,
    output: Option<&Path>,
) -> Result<(), AuctionPnlError> {
    let config = load_config(config_path)?;
    validate_auctions_config(&config)?;
    let table = load_auction_table(&config)?;
    let target = output_target(output, &config, "auctions", "-");
    let report = CsvReportAdapter::new();

    if let Some(tenor) = tenor {
        let tenor: Tenor = tenor.parse()?;
        let rows = if summary {
            table.single_tenor(tenor)
        } else {
            table.tenor_results(tenor)
        };
        eprintln!("{} {} auctions", rows.len(), tenor);
        return report.write_tenor_auctions(&rows, &target);
    }

    if multi {
        let days = table.multi_auction_days().into_iter().cloned().collect();
        let multi_table = AuctionTable::from_days(table.layout(), days);
        eprintln!("{} dates with more than one auction", multi_table.len());
        return report.write_auctions(&multi_table, &target);
    }

    report.write_auctions(&table, &target)
}

fn out_of_range(what: String) -> AuctionPnlError {
    AuctionPnlError::InvalidDate {
        value: format!("{what} is out of range"),
    }
}

fn run_calendar(
    market: Option<&str>,
    config_path: Option<&Path>,
    op: CalendarCommand,
) -> Result<(), AuctionPnlError> {
    let config = config_path.map(load_config).transpose()?;
    let market = resolve_market(market, config.as_ref().map(|c| c as &dyn ConfigPort));
    let calendar = market.calendar();
    eprintln!("Calendar: {} ({})", market, calendar.name());

    match op {
        CalendarCommand::IsBusinessDay { date } => {
            let date = parse_cli_date(&date)?;
            println!("{}", calendar.is_business_day(date));
        }
        CalendarCommand::Add { date, days } => {
            let start = parse_cli_date(&date)?;
            let result = calendar
                .advance(start, days)
                .ok_or_else(|| out_of_range(format!("{start} + {days} business days")))?;
            println!("{result}");
        }
        CalendarCommand::Between { from, to } => {
            let from = parse_cli_date(&from)?;
            let to = parse_cli_date(&to)?;
            println!("{}", calendar.business_days_between(from, to, true, false));
        }
        CalendarCommand::EndOfMonth { date, check } => {
            let date = parse_cli_date(&date)?;
            if check {
                println!("{}", calendar.is_end_of_month(date));
            } else {
                let eom = calendar
                    .end_of_month(date)
                    .ok_or_else(|| out_of_range(format!("end of month of {date}")))?;
                println!("{eom}");
            }
        }
        CalendarCommand::Adjust { date, convention } => {
            let date = parse_cli_date(&date)?;
            let convention = BusinessDayConvention::from(convention);
            let adjusted = calendar
                .adjust(date, convention)
                .ok_or_else(|| out_of_range(format!("{date} adjusted {convention}")))?;
            println!("{adjusted}");
        }
    }
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), AuctionPnlError> {
    let config = load_config(config_path)?;

    let checks: [(&str, fn(&dyn ConfigPort) -> Result<(), AuctionPnlError>); 4] = [
        ("spread", validate_spread_config),
        ("auctions", validate_auctions_config),
        ("pnl", validate_pnl_config),
        ("optimizer", validate_optimizer_config),
    ];
    for (section, check) in checks {
        check(&config)?;
        eprintln!("  [{section}] ok");
    }

    let market = resolve_market(None, Some(&config));
    eprintln!("  [calendar] {} ({})", market, market.calendar().name());
    eprintln!("\nConfiguration is valid.");
    Ok(())
}
