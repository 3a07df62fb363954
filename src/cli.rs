//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;
use std::time::{Duration, Instant};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report::JsonReportAdapter;
use crate::adapters::table_report::TableReportAdapter;
use crate::domain::error::StockwatchError;
use crate::domain::prompt::summary_prompt;
use crate::domain::scan::{ScanReport, Scanner};
use crate::domain::thresholds::Thresholds;
use crate::domain::watchlist::{WatchlistEntry, WatchlistError, parse_tickers};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;
use crate::ports::watchlist_port::WatchlistPort;

const DEFAULT_CACHE_TTL_SECS: i64 = 3600;
const DEFAULT_WATCH_INTERVAL_SECS: u64 = 300;

#[derive(Parser, Debug)]
#[command(name = "stockwatch", about = "Indicator engine for a stock watchlist")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan the watchlist and render a report
    Scan {
        #[arg(short, long)]
        config: PathBuf,
        /// Comma-separated tickers instead of the configured watchlist
        #[arg(long)]
        ticker: Option<String>,
        /// Evaluation date (defaults to today)
        #[arg(long)]
        as_of: Option<NaiveDate>,
        #[arg(long, value_enum)]
        format: Option<ReportFormat>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Rescan the watchlist periodically, printing a table each round
    Watch {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        ticker: Option<String>,
        /// Seconds between rounds
        #[arg(long, default_value_t = DEFAULT_WATCH_INTERVAL_SECS)]
        interval: u64,
        /// Stop after this many rounds
        #[arg(long)]
        rounds: Option<u32>,
    },
    /// Validate thresholds and backend configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Print the watchlist
    List {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show data range for ticker(s)
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        ticker: Option<String>,
    },
    /// Print a summary prompt for the current scan
    Prompt {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        ticker: Option<String>,
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Table,
    Html,
    Json,
}

impl FromStr for ReportFormat {
    type Err = StockwatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "table" | "text" => Ok(ReportFormat::Table),
            "html" => Ok(ReportFormat::Html),
            "json" => Ok(ReportFormat::Json),
            other => Err(StockwatchError::invalid(
                "report",
                "format",
                format!("unknown format '{}' (expected table, html or json)", other),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Csv,
    Sqlite,
    Postgres,
}

impl FromStr for Backend {
    type Err = StockwatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(Backend::Csv),
            "sqlite" => Ok(Backend::Sqlite),
            "postgres" | "postgresql" => Ok(Backend::Postgres),
            other => Err(StockwatchError::invalid(
                "data",
                "backend",
                format!("unknown backend '{}' (expected csv, sqlite or postgres)", other),
            )),
        }
    }
}

/// A storage backend serving both price data and the watchlist.
pub trait Store {
    fn data(&self) -> &dyn DataPort;
    fn watchlist(&self) -> &dyn WatchlistPort;
}

impl<T: DataPort + WatchlistPort> Store for T {
    fn data(&self) -> &dyn DataPort {
        self
    }

    fn watchlist(&self) -> &dyn WatchlistPort {
        self
    }
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Scan {
            config,
            ticker,
            as_of,
            format,
            output,
        } => run_scan(&config, ticker.as_deref(), as_of, format, output.as_deref()),
        Command::Watch {
            config,
            ticker,
            interval,
            rounds,
        } => run_watch(&config, ticker.as_deref(), interval, rounds),
        Command::Validate { config } => run_validate(&config),
        Command::List { config } => run_list(&config),
        Command::Info { config, ticker } => run_info(&config, ticker.as_deref()),
        Command::Prompt {
            config,
            ticker,
            as_of,
        } => run_prompt(&config, ticker.as_deref(), as_of),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, StockwatchError> {
    info!("loading config from {}", path.display());
    FileConfigAdapter::from_file(path)
}

pub fn backend_from_config(config: &dyn ConfigPort) -> Result<Backend, StockwatchError> {
    config
        .get_string("data", "backend")
        .map(|raw| raw.parse())
        .unwrap_or(Ok(Backend::Csv))
}

pub fn open_store(config: &dyn ConfigPort) -> Result<Box<dyn Store>, StockwatchError> {
    let backend = backend_from_config(config)?;
    debug!("using {:?} backend", backend);

    match backend {
        Backend::Csv => Ok(Box::new(CsvAdapter::from_config(config)?)),
        #[cfg(feature = "sqlite")]
        Backend::Sqlite => Ok(Box::new(
            crate::adapters::sqlite_adapter::SqliteAdapter::from_config(config)?,
        )),
        #[cfg(feature = "postgres")]
        Backend::Postgres => Ok(Box::new(
            crate::adapters::postgres_adapter::PostgresAdapter::from_config(config)?,
        )),
        #[allow(unreachable_patterns)]
        other => Err(StockwatchError::invalid(
            "data",
            "backend",
            format!("{:?} support was not compiled in", other).to_lowercase(),
        )),
    }
}

pub fn cache_ttl(config: &dyn ConfigPort) -> Result<Duration, StockwatchError> {
    if !config.get_bool("cache", "enabled", true) {
        return Ok(Duration::ZERO);
    }
    let secs = config.get_int("cache", "ttl_secs", DEFAULT_CACHE_TTL_SECS);
    if secs < 0 {
        return Err(StockwatchError::invalid(
            "cache",
            "ttl_secs",
            format!("must be >= 0, got {}", secs),
        ));
    }
    Ok(Duration::from_secs(secs as u64))
}

pub fn report_format(
    cli_format: Option<ReportFormat>,
    config: &dyn ConfigPort,
) -> Result<ReportFormat, StockwatchError> {
    match cli_format {
        Some(format) => Ok(format),
        None => config
            .get_string("report", "format")
            .map(|raw| raw.parse())
            .unwrap_or(Ok(ReportFormat::Table)),
    }
}

pub fn reporter(format: ReportFormat) -> Result<Box<dyn ReportPort>, StockwatchError> {
    match format {
        ReportFormat::Table => Ok(Box::new(TableReportAdapter::new())),
        ReportFormat::Json => Ok(Box::new(JsonReportAdapter::new())),
        #[cfg(feature = "html")]
        ReportFormat::Html => Ok(Box::new(crate::adapters::html_report::HtmlReportAdapter::new())),
        #[cfg(not(feature = "html"))]
        ReportFormat::Html => Err(StockwatchError::invalid(
            "report",
            "format",
            "html support was not compiled in",
        )),
    }
}

/// Entries to scan: the `--ticker` override if given, else the watchlist.
///
/// Overridden tickers keep the fair value and tag of a matching watchlist
/// entry when the watchlist can be loaded.
pub fn resolve_entries(
    ticker_override: Option<&str>,
    watchlist: &dyn WatchlistPort,
) -> Result<Vec<WatchlistEntry>, StockwatchError> {
    let entries = match ticker_override {
        Some(raw) => {
            let tickers = parse_tickers(raw)?;
            let known = watchlist.load_watchlist().unwrap_or_else(|e| {
                debug!("watchlist unavailable for override lookup: {}", e);
                Vec::new()
            });
            tickers
                .into_iter()
                .map(|ticker| {
                    known
                        .iter()
                        .find(|entry| entry.ticker == ticker)
                        .cloned()
                        .unwrap_or_else(|| WatchlistEntry::new(ticker))
                })
                .collect()
        }
        None => watchlist.load_watchlist()?,
    };

    if entries.is_empty() {
        return Err(WatchlistError::Empty.into());
    }
    Ok(entries)
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn scan_once(
    config: &dyn ConfigPort,
    ticker: Option<&str>,
    as_of: Option<NaiveDate>,
) -> Result<ScanReport, StockwatchError> {
    let thresholds = Thresholds::from_config(config)?;
    let store = open_store(config)?;
    let entries = resolve_entries(ticker, store.watchlist())?;
    let as_of = as_of.unwrap_or_else(today);

    info!("scanning {} tickers as of {}", entries.len(), as_of);
    let mut scanner = Scanner::new(store.data(), thresholds, cache_ttl(config)?);
    let report = scanner.scan(&entries, as_of, Instant::now());
    ensure_some_data(&report)?;
    Ok(report)
}

fn ensure_some_data(report: &ScanReport) -> Result<(), StockwatchError> {
    if report.snapshots().next().is_none() {
        let tickers: Vec<&str> = report.rows.iter().map(|r| r.entry().ticker.as_str()).collect();
        return Err(StockwatchError::NoData {
            ticker: tickers.join(","),
        });
    }
    Ok(())
}

fn run_scan(
    config_path: &Path,
    ticker: Option<&str>,
    as_of: Option<NaiveDate>,
    format: Option<ReportFormat>,
    output: Option<&Path>,
) -> Result<(), StockwatchError> {
    let config = load_config(config_path)?;
    let format = report_format(format, &config)?;
    let output = output
        .map(Path::to_path_buf)
        .or_else(|| config.get_string("report", "output").map(PathBuf::from));

    let report = scan_once(&config, ticker, as_of)?;
    reporter(format)?.write(&report, output.as_deref())?;

    if let Some(path) = output {
        info!("report written to {}", path.display());
    }
    Ok(())
}

fn run_watch(
    config_path: &Path,
    ticker: Option<&str>,
    interval: u64,
    rounds: Option<u32>,
) -> Result<(), StockwatchError> {
    let config = load_config(config_path)?;
    let thresholds = Thresholds::from_config(&config)?;
    let store = open_store(&config)?;
    let mut scanner = Scanner::new(store.data(), thresholds, cache_ttl(&config)?);
    let table = TableReportAdapter::new();
    info!(
        "watching every {}s with a {}-day lookback",
        interval,
        scanner.thresholds().lookback_days
    );

    let mut round = 0u32;
    loop {
        round += 1;
        let entries = resolve_entries(ticker, store.watchlist())?;
        let report = scanner.scan(&entries, today(), Instant::now());
        table.write(&report, None)?;
        debug!("round {}: {} snapshots cached", round, scanner.cached());

        if rounds.is_some_and(|limit| round >= limit) {
            return Ok(());
        }
        std::thread::sleep(Duration::from_secs(interval));
    }
}

fn run_validate(config_path: &Path) -> Result<(), StockwatchError> {
    let config = load_config(config_path)?;
    let thresholds = Thresholds::from_config(&config)?;
    let backend = backend_from_config(&config)?;
    cache_ttl(&config)?;
    report_format(None, &config)?;

    let store = open_store(&config)?;
    match store.watchlist().load_watchlist() {
        Ok(entries) => println!(
            "OK: {:?} backend, {} watchlist entries, RSI({}) < {}, SMA {}",
            backend,
            entries.len(),
            thresholds.rsi_period,
            thresholds.rsi_buy_threshold,
            thresholds.sma_period
        ),
        Err(e) => {
            warn!("watchlist not loadable: {}", e);
            println!("OK: {:?} backend, watchlist unavailable", backend);
        }
    }
    Ok(())
}

fn run_list(config_path: &Path) -> Result<(), StockwatchError> {
    let config = load_config(config_path)?;
    let store = open_store(&config)?;
    let entries = store.watchlist().load_watchlist()?;

    for entry in &entries {
        let fair_value = entry
            .fair_value
            .map(|v| format!("{:.2}", v))
            .unwrap_or_else(|| "-".to_string());
        let tag = entry.tag.as_ref().map(|t| t.to_string()).unwrap_or_default();
        println!("{:<10} {:>10}  {}", entry.ticker, fair_value, tag);
    }
    info!("{} entries", entries.len());
    Ok(())
}

fn run_info(config_path: &Path, ticker: Option<&str>) -> Result<(), StockwatchError> {
    let config = load_config(config_path)?;
    let store = open_store(&config)?;
    let entries = resolve_entries(ticker, store.watchlist())?;

    for entry in &entries {
        match store.data().get_data_range(&entry.ticker) {
            Ok(Some((min_date, max_date, count))) => {
                println!("{}: {} bars, {} to {}", entry.ticker, count, min_date, max_date);
            }
            Ok(None) => println!("{}: no data found", entry.ticker),
            Err(e) => warn!("error querying {}: {}", entry.ticker, e),
        }
    }
    Ok(())
}

fn run_prompt(
    config_path: &Path,
    ticker: Option<&str>,
    as_of: Option<NaiveDate>,
) -> Result<(), StockwatchError> {
    let config = load_config(config_path)?;
    let report = scan_once(&config, ticker, as_of)?;
    println!("{}", summary_prompt(&report));
    Ok(())
}
