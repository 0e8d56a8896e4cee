//! CLI definition and dispatch.

use chrono::{SecondsFormat, Utc};
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use crate::adapters::csv_store_adapter::CsvStoreAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::listing_adapter::NasdaqListingAdapter;
use crate::adapters::quote_adapter::HttpQuoteAdapter;
use crate::domain::collector::{CancelToken, Collector};
use crate::domain::error::CollectorError;
use crate::domain::record::StockRecord;
use crate::domain::screen::{self, ScreenCriteria};
use crate::domain::symbol::Symbol;
use crate::ports::config_port::ConfigPort;
use crate::ports::quote_source::QuoteSource;
use crate::ports::symbol_source::SymbolSource;

pub const DEFAULT_OUTPUT_FILE: &str = "all_stocks.csv";
pub const DEFAULT_LISTING_URL: &str = "https://api.nasdaq.com/api/screener/stocks";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";
pub const DEFAULT_DELAY_SECONDS: f64 = 1.0;
pub const DEFAULT_TIMEOUT_SECONDS: i64 = 30;

#[derive(Parser, Debug)]
#[command(name = "stockscreen", about = "Incremental stock fundamentals collector")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Collect fundamentals for every unprocessed symbol in the universe
    Collect {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Courtesy delay between quote requests, in seconds
        #[arg(long)]
        delay: Option<f64>,
        /// Cap the number of symbols processed this run
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        listing_url: Option<String>,
        #[arg(long)]
        quote_url: Option<String>,
    },
    /// Fetch the symbol universe and write it to a CSV
    ListSymbols {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long, default_value = "symbols.csv")]
        output: PathBuf,
    },
    /// Filter collected records by age, dividend yield and market cap
    Screen {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Store to read; defaults to the configured output file
        #[arg(short, long)]
        input: Option<PathBuf>,
        #[arg(long, default_value_t = 25.0)]
        min_age: f64,
        /// Percent
        #[arg(long, default_value_t = 5.0)]
        min_dividend: f64,
        /// Billions of dollars
        #[arg(long, default_value_t = 1.0)]
        min_market_cap: f64,
    },
    /// Fetch and print fundamentals for a single symbol
    Info {
        symbol: String,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        quote_url: Option<String>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Collect {
            config,
            output,
            delay,
            limit,
            listing_url,
            quote_url,
        } => run_collect(
            config.as_ref(),
            output,
            delay,
            limit,
            listing_url,
            quote_url,
        ),
        Command::ListSymbols { config, output } => run_list_symbols(config.as_ref(), &output),
        Command::Screen {
            config,
            input,
            min_age,
            min_dividend,
            min_market_cap,
        } => run_screen(config.as_ref(), input, min_age, min_dividend, min_market_cap),
        Command::Info {
            symbol,
            config,
            quote_url,
        } => run_info(&symbol, config.as_ref(), quote_url),
    }
}

/// Settings for a collection run, resolved from config file defaults with CLI
/// flag overrides on top.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectSettings {
    pub output_file: PathBuf,
    pub delay: Duration,
    pub limit: Option<usize>,
    pub listing_url: String,
    pub quote_url: String,
    pub user_agent: String,
    pub timeout: Duration,
}

pub fn build_collect_settings(
    config: Option<&FileConfigAdapter>,
    output: Option<PathBuf>,
    delay: Option<f64>,
    limit: Option<usize>,
    listing_url: Option<String>,
    quote_url: Option<String>,
) -> Result<CollectSettings, CollectorError> {
    let get_string = |section: &str, key: &str| config.and_then(|c| c.get_string(section, key));

    let output_file = output.unwrap_or_else(|| {
        get_string("collector", "output_file")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE))
    });

    let delay_seconds = delay.unwrap_or_else(|| {
        config.map_or(DEFAULT_DELAY_SECONDS, |c| {
            c.get_double("collector", "delay_seconds", DEFAULT_DELAY_SECONDS)
        })
    });
    if !delay_seconds.is_finite() || delay_seconds < 0.0 {
        return Err(CollectorError::ConfigInvalid {
            section: "collector".into(),
            key: "delay_seconds".into(),
            reason: "must be a non-negative number".into(),
        });
    }

    let limit = limit.or_else(|| {
        let configured = config.map_or(0, |c| c.get_int("collector", "limit", 0));
        usize::try_from(configured).ok().filter(|&n| n > 0)
    });

    let listing_url = listing_url
        .or_else(|| get_string("source", "listing_url"))
        .unwrap_or_else(|| DEFAULT_LISTING_URL.to_string());

    // The quote endpoint has no sensible default; it must be configured.
    let quote_url = quote_url
        .or_else(|| get_string("source", "quote_url"))
        .ok_or_else(|| CollectorError::ConfigMissing {
            section: "source".into(),
            key: "quote_url".into(),
        })?;

    let user_agent = get_string("source", "user_agent")
        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
    let timeout_seconds = config.map_or(DEFAULT_TIMEOUT_SECONDS, |c| {
        c.get_int("source", "timeout_seconds", DEFAULT_TIMEOUT_SECONDS)
    });
    if timeout_seconds <= 0 {
        return Err(CollectorError::ConfigInvalid {
            section: "source".into(),
            key: "timeout_seconds".into(),
            reason: "must be a positive number of seconds".into(),
        });
    }

    Ok(CollectSettings {
        output_file,
        delay: Duration::from_secs_f64(delay_seconds),
        limit,
        listing_url,
        quote_url,
        user_agent,
        timeout: Duration::from_secs(timeout_seconds as u64),
    })
}

fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = CollectorError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn load_optional_config(path: Option<&PathBuf>) -> Result<Option<FileConfigAdapter>, ExitCode> {
    match path {
        Some(p) => load_config(p).map(Some),
        None => Ok(None),
    }
}

fn run_collect(
    config_path: Option<&PathBuf>,
    output: Option<PathBuf>,
    delay: Option<f64>,
    limit: Option<usize>,
    listing_url: Option<String>,
    quote_url: Option<String>,
) -> ExitCode {
    let config = match load_optional_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let settings = match build_collect_settings(
        config.as_ref(),
        output,
        delay,
        limit,
        listing_url,
        quote_url,
    ) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let store = match CsvStoreAdapter::open(settings.output_file.clone()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let mut collector = match Collector::new(store, settings.delay, settings.limit) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || handler_token.cancel()) {
        eprintln!("warning: could not install interrupt handler: {e}");
    }

    let listing = NasdaqListingAdapter::new(
        settings.listing_url,
        settings.user_agent.clone(),
        settings.timeout,
    );
    let quotes = HttpQuoteAdapter::new(settings.quote_url, settings.user_agent, settings.timeout);

    match collector.run(&listing, &quotes, &cancel) {
        Ok(summary) => {
            info!(
                "run finished ({:?}): {} appended, {} skipped",
                summary.outcome, summary.appended, summary.skipped
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_list_symbols(config_path: Option<&PathBuf>, output: &PathBuf) -> ExitCode {
    let config = match load_optional_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let get_string = |section: &str, key: &str| {
        config.as_ref().and_then(|c| c.get_string(section, key))
    };
    let listing_url =
        get_string("source", "listing_url").unwrap_or_else(|| DEFAULT_LISTING_URL.to_string());
    let user_agent =
        get_string("source", "user_agent").unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
    let timeout_seconds = config.as_ref().map_or(DEFAULT_TIMEOUT_SECONDS, |c| {
        c.get_int("source", "timeout_seconds", DEFAULT_TIMEOUT_SECONDS)
    });

    let adapter = NasdaqListingAdapter::new(
        listing_url,
        user_agent,
        Duration::from_secs(timeout_seconds.max(1) as u64),
    );
    let symbols = adapter.fetch_symbols();
    info!("found {} symbols", symbols.len());

    if let Err(e) = write_symbol_csv(output, &symbol_rows(&symbols)) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    info!("symbols written to {}", output.display());
    ExitCode::SUCCESS
}

fn symbol_rows(symbols: &[Symbol]) -> Vec<[String; 3]> {
    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    symbols
        .iter()
        .map(|s| {
            [
                s.ticker.clone(),
                s.exchange.clone().unwrap_or_default(),
                timestamp.clone(),
            ]
        })
        .collect()
}

fn write_symbol_csv(path: &PathBuf, rows: &[[String; 3]]) -> Result<(), CollectorError> {
    let mut wtr = csv::Writer::from_path(path).map_err(|e| CollectorError::Storage {
        reason: format!("failed to create {}: {}", path.display(), e),
    })?;
    wtr.write_record(["symbol", "exchange", "timestamp"])
        .and_then(|_| {
            rows.iter()
                .try_for_each(|row| wtr.write_record(row.iter().map(String::as_str)))
        })
        .and_then(|_| wtr.flush().map_err(csv::Error::from))
        .map_err(|e| CollectorError::Storage {
            reason: format!("failed to write {}: {}", path.display(), e),
        })
}

fn run_screen(
    config_path: Option<&PathBuf>,
    input: Option<PathBuf>,
    min_age: f64,
    min_dividend: f64,
    min_market_cap: f64,
) -> ExitCode {
    let config = match load_optional_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let input = input.unwrap_or_else(|| {
        config
            .as_ref()
            .and_then(|c| c.get_string("collector", "output_file"))
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE))
    });

    let store = match CsvStoreAdapter::open(input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let records = match store.load_records() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let criteria = ScreenCriteria {
        min_age_years: min_age,
        min_dividend_yield: min_dividend,
        min_market_cap_billions: min_market_cap,
    };
    let matched = screen::apply(&records, &criteria);

    println!("Found {} matching stocks", matched.len());
    if !matched.is_empty() {
        println!(
            "{:<8} {:<36} {:>10} {:>9} {:>7}  {}",
            "symbol", "name", "cap ($B)", "yield (%)", "age", "exchange"
        );
        for record in &matched {
            println!(
                "{:<8} {:<36} {:>10.2} {:>9.2} {:>7.1}  {}",
                record.symbol,
                truncate(&record.name, 36),
                record.market_cap / 1e9,
                record.dividend_yield,
                record.age_years,
                record.exchange
            );
        }
    }
    ExitCode::SUCCESS
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max.saturating_sub(1)).collect::<String>() + "…"
    }
}

fn run_info(symbol: &str, config_path: Option<&PathBuf>, quote_url: Option<String>) -> ExitCode {
    let config = match load_optional_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let quote_url = match quote_url
        .or_else(|| config.as_ref().and_then(|c| c.get_string("source", "quote_url")))
    {
        Some(u) => u,
        None => {
            let err = CollectorError::ConfigMissing {
                section: "source".into(),
                key: "quote_url".into(),
            };
            eprintln!("error: {err}");
            return (&err).into();
        }
    };
    let user_agent = config
        .as_ref()
        .and_then(|c| c.get_string("source", "user_agent"))
        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

    let adapter = HttpQuoteAdapter::new(
        quote_url,
        user_agent,
        Duration::from_secs(DEFAULT_TIMEOUT_SECONDS as u64),
    );
    match adapter.fetch_quote(symbol) {
        Ok(quote) => {
            let record = StockRecord::from_quote(symbol, &quote, Utc::now());
            println!("Results for {}:", record.symbol);
            println!("  Name:           {}", record.name);
            println!("  Exchange:       {}", record.exchange);
            println!("  Market Cap:     ${:.2}B", record.market_cap / 1e9);
            println!("  Dividend Yield: {:.2}%", record.dividend_yield);
            println!("  Age:            {:.1} years", record.age_years);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error fetching {symbol}: {e}");
            ExitCode::FAILURE
        }
    }
}
