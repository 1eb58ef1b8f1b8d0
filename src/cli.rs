//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use crate::adapters::csv_market_data_adapter::CsvMarketDataAdapter;
use crate::adapters::csv_record_adapter::CsvRecordAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_adapter::{JsonReportAdapter, STDOUT};
use crate::adapters::timeout_market_data::{DEFAULT_TIMEOUT_SECS, TimeoutMarketData};
use crate::domain::backtest::{
    BacktestConfig, DEFAULT_REAL_ESTATE_PROXY, DEFAULT_US_EQUITY_PROXY, run_backtest,
};
use crate::domain::config_validation::{as_of_date, validate_config};
use crate::domain::error::FincastError;
use crate::domain::forecast::{DEFAULT_BACKTEST_YEARS, ForecastRequest, run_forecast};
use crate::domain::goal_simulator::{DEFAULT_PATHS, GoalCheckRequest, check_goals};
use crate::domain::holding::HoldingRecord;
use crate::domain::liability::monthly_payment;
use crate::domain::market_data::{DEFAULT_FX_TICKER, quote_position, refresh_holding_values};
use crate::domain::monte_carlo::{DEFAULT_ITERATIONS, TimeUnit};
use crate::domain::portfolio_metrics::{compute_metrics, total_value};
use crate::domain::sampler::RngSampler;
use crate::ports::config_port::ConfigPort;
use crate::ports::market_data_port::MarketDataPort;
use crate::ports::record_port::RecordSourcePort;
use crate::ports::report_port::ReportPort;

const DEFAULT_YEARS: i64 = 30;
const DEFAULT_DATA_DIR: &str = "data";

#[derive(Parser, Debug)]
#[command(name = "fincast", about = "Personal portfolio forecasting and goal planning")]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Backtest the allocation and project its value forward
    Forecast {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long, default_value = STDOUT)]
        output: String,
        #[arg(long)]
        years: Option<u32>,
        #[arg(long)]
        iterations: Option<usize>,
        #[arg(long)]
        time_unit: Option<TimeUnit>,
        #[arg(long)]
        initial: Option<f64>,
        #[arg(long, allow_negative_numbers = true)]
        contribution: Option<f64>,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Check the probability of reaching each financial goal
    Goals {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long, default_value = STDOUT)]
        output: String,
        #[arg(long)]
        years: Option<u32>,
        #[arg(long, allow_negative_numbers = true)]
        contribution: Option<f64>,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Blend per-class metrics for the current holdings
    Metrics {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long, default_value = STDOUT)]
        output: String,
    },
    /// Run only the historical backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long, default_value = STDOUT)]
        output: String,
        #[arg(long)]
        years: Option<u32>,
    },
    /// Value a position at the latest close
    Quote {
        #[arg(long)]
        ticker: String,
        #[arg(long, default_value_t = 1.0)]
        shares: f64,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long, default_value = STDOUT)]
        output: String,
    },
    /// Monthly repayments due on configured liabilities
    Loans {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long, default_value = STDOUT)]
        output: String,
    },
    /// Validate a configuration file without running anything
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Forecast {
            config,
            output,
            years,
            iterations,
            time_unit,
            initial,
            contribution,
            seed,
        } => run_forecast_command(
            &config,
            &output,
            &ForecastOverrides {
                years,
                iterations,
                time_unit,
                initial,
                contribution,
                seed,
            },
        ),
        Command::Goals {
            config,
            output,
            years,
            contribution,
            seed,
        } => run_goals_command(&config, &output, years, contribution, seed),
        Command::Metrics { config, output } => run_metrics_command(&config, &output),
        Command::Backtest {
            config,
            output,
            years,
        } => run_backtest_command(&config, &output, years),
        Command::Quote {
            ticker,
            shares,
            config,
            output,
        } => run_quote_command(&ticker, shares, config.as_deref(), &output),
        Command::Loans { config, output } => run_loans_command(&config, &output),
        Command::Validate { config } => run_validate(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            (&e).into()
        }
    }
}

/// Command-line values that take precedence over `[forecast]`.
#[derive(Debug, Default, Clone)]
pub struct ForecastOverrides {
    pub years: Option<u32>,
    pub iterations: Option<usize>,
    pub time_unit: Option<TimeUnit>,
    pub initial: Option<f64>,
    pub contribution: Option<f64>,
    pub seed: Option<u64>,
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, FincastError> {
    tracing::info!(path = %path.display(), "loading config");
    let adapter = FileConfigAdapter::from_file(path)?;
    validate_config(&adapter)?;
    Ok(adapter)
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn non_negative(value: i64) -> u32 {
    value.clamp(0, u32::MAX as i64) as u32
}

/// Record source wired from `[portfolio]` paths.
pub fn build_record_source(config: &dyn ConfigPort) -> CsvRecordAdapter {
    let mut records = CsvRecordAdapter::new();
    if let Some(path) = config.get_string("portfolio", "holdings") {
        records = records.with_holdings(path);
    }
    if let Some(path) = config.get_string("portfolio", "goals") {
        records = records.with_goals(path);
    }
    if let Some(path) = config.get_string("portfolio", "liabilities") {
        records = records.with_liabilities(path);
    }
    records
}

/// CSV price files under `[market_data] data_dir`, bounded by the configured timeout.
pub fn build_market_data(config: &dyn ConfigPort) -> TimeoutMarketData {
    let data_dir = config
        .get_string("market_data", "data_dir")
        .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());
    let timeout = config.get_int("market_data", "timeout_secs", DEFAULT_TIMEOUT_SECS as i64);
    TimeoutMarketData::new(
        Arc::new(CsvMarketDataAdapter::new(PathBuf::from(data_dir))),
        Duration::from_secs(timeout.max(1) as u64),
    )
}

fn fx_ticker(config: &dyn ConfigPort) -> String {
    config
        .get_string("market_data", "fx_ticker")
        .unwrap_or_else(|| DEFAULT_FX_TICKER.to_string())
}

fn config_seed(config: &dyn ConfigPort) -> Option<u64> {
    config
        .get_optional_int("forecast", "seed")
        .and_then(|s| u64::try_from(s).ok())
}

fn load_holdings(
    config: &dyn ConfigPort,
    records: &dyn RecordSourcePort,
    port: &dyn MarketDataPort,
) -> Result<Vec<HoldingRecord>, FincastError> {
    if config.get_string("portfolio", "holdings").is_none() {
        return Err(FincastError::ConfigMissing {
            section: "portfolio".into(),
            key: "holdings".into(),
        });
    }
    let holdings = records.load_holdings()?;
    let refreshed = refresh_holding_values(port, &holdings, &fx_ticker(config));
    tracing::info!(
        holdings = refreshed.len(),
        total = total_value(&refreshed),
        "holdings loaded"
    );
    Ok(refreshed)
}

pub fn build_forecast_request(
    config: &dyn ConfigPort,
    overrides: &ForecastOverrides,
    holdings_total: f64,
) -> Result<ForecastRequest, FincastError> {
    let time_unit = match overrides.time_unit {
        Some(unit) => unit,
        None => match config.get_string("forecast", "time_unit") {
            Some(s) => s.parse().map_err(|reason| FincastError::ConfigInvalid {
                section: "forecast".into(),
                key: "time_unit".into(),
                reason,
            })?,
            None => TimeUnit::default(),
        },
    };

    Ok(ForecastRequest {
        initial_portfolio: overrides
            .initial
            .unwrap_or_else(|| config.get_double("forecast", "initial_portfolio", holdings_total)),
        annual_contribution: overrides
            .contribution
            .unwrap_or_else(|| config.get_double("forecast", "annual_contribution", 0.0)),
        years: overrides
            .years
            .unwrap_or_else(|| non_negative(config.get_int("forecast", "years", DEFAULT_YEARS))),
        iterations: overrides.iterations.unwrap_or_else(|| {
            config
                .get_int("forecast", "iterations", DEFAULT_ITERATIONS as i64)
                .max(1) as usize
        }),
        time_unit,
        backtest_years: non_negative(config.get_int(
            "forecast",
            "backtest_years",
            DEFAULT_BACKTEST_YEARS as i64,
        )),
        us_stock_ticker: config
            .get_string("forecast", "us_stock_ticker")
            .unwrap_or_else(|| DEFAULT_US_EQUITY_PROXY.to_string()),
        real_estate_ticker: config
            .get_string("forecast", "real_estate_ticker")
            .unwrap_or_else(|| DEFAULT_REAL_ESTATE_PROXY.to_string()),
    })
}

fn run_forecast_command(
    config_path: &Path,
    output: &str,
    overrides: &ForecastOverrides,
) -> Result<(), FincastError> {
    let config = load_config(config_path)?;
    let as_of = as_of_date(&config, today())?;
    let port = build_market_data(&config);
    let holdings = load_holdings(&config, &build_record_source(&config), &port)?;

    let request = build_forecast_request(&config, overrides, total_value(&holdings))?;
    tracing::info!(
        initial = request.initial_portfolio,
        years = request.years,
        iterations = request.iterations,
        time_unit = %request.time_unit,
        "running forecast"
    );

    let mut sampler = RngSampler::with_optional_seed(overrides.seed.or(config_seed(&config)));
    let report = run_forecast(&request, &holdings, &port, &mut sampler, as_of);
    JsonReportAdapter::new().write_forecast(&report, output)
}

/// `[goals]` settings with command-line overrides applied.
pub fn build_goal_check_request(
    config: &dyn ConfigPort,
    years: Option<u32>,
    contribution: Option<f64>,
    holdings_total: f64,
) -> GoalCheckRequest {
    GoalCheckRequest {
        initial_value: holdings_total,
        annual_contribution: contribution
            .unwrap_or_else(|| config.get_double("goals", "annual_contribution", 0.0)),
        years: years
            .unwrap_or_else(|| non_negative(config.get_int("goals", "years", DEFAULT_YEARS))),
        paths: config.get_int("goals", "paths", DEFAULT_PATHS as i64).max(1) as usize,
    }
}

fn run_goals_command(
    config_path: &Path,
    output: &str,
    years: Option<u32>,
    contribution: Option<f64>,
    seed: Option<u64>,
) -> Result<(), FincastError> {
    let config = load_config(config_path)?;
    let as_of = as_of_date(&config, today())?;
    let port = build_market_data(&config);
    let records = build_record_source(&config);
    let holdings = load_holdings(&config, &records, &port)?;
    let goals = records.load_goals()?;

    let request = build_goal_check_request(&config, years, contribution, total_value(&holdings));
    tracing::info!(
        goals = goals.len(),
        years = request.years,
        paths = request.paths,
        "checking goals"
    );

    let mut sampler = RngSampler::with_optional_seed(seed.or(config_seed(&config)));
    let results = check_goals(&holdings, &goals, &request, as_of, &mut sampler);
    JsonReportAdapter::new().write_goals(&results, output)
}

fn run_metrics_command(config_path: &Path, output: &str) -> Result<(), FincastError> {
    let config = load_config(config_path)?;
    let port = build_market_data(&config);
    let holdings = load_holdings(&config, &build_record_source(&config), &port)?;
    let metrics = compute_metrics(&holdings, None);
    JsonReportAdapter::new().write_metrics(&metrics, output)
}

fn run_backtest_command(
    config_path: &Path,
    output: &str,
    years: Option<u32>,
) -> Result<(), FincastError> {
    let config = load_config(config_path)?;
    let as_of = as_of_date(&config, today())?;
    let port = build_market_data(&config);
    let holdings = load_holdings(&config, &build_record_source(&config), &port)?;

    let mut request = build_forecast_request(
        &config,
        &ForecastOverrides::default(),
        total_value(&holdings),
    )?;
    if let Some(y) = years {
        request.backtest_years = y;
    }
    let backtest = run_backtest(
        &holdings,
        &BacktestConfig {
            initial_value: request.initial_portfolio,
            years: request.backtest_years,
            us_stock_ticker: request.us_stock_ticker,
            real_estate_ticker: request.real_estate_ticker,
            as_of,
        },
        &port,
    );
    if backtest.is_empty() {
        tracing::warn!("backtest produced no data");
    }
    JsonReportAdapter::new().write_value(&serde_json::to_value(&backtest)?, output)
}

fn run_quote_command(
    ticker: &str,
    shares: f64,
    config_path: Option<&Path>,
    output: &str,
) -> Result<(), FincastError> {
    let config = match config_path {
        Some(path) => load_config(path)?,
        None => FileConfigAdapter::empty(),
    };
    let port = build_market_data(&config);
    let quote = quote_position(&port, ticker, shares, &fx_ticker(&config)).ok_or_else(|| {
        FincastError::MarketData {
            reason: format!("stock not found: {ticker}"),
        }
    })?;
    JsonReportAdapter::new().write_value(&serde_json::to_value(&quote)?, output)
}

fn run_loans_command(config_path: &Path, output: &str) -> Result<(), FincastError> {
    let config = load_config(config_path)?;
    let as_of = as_of_date(&config, today())?;
    let liabilities = build_record_source(&config).load_liabilities()?;

    let payments: Vec<_> = liabilities
        .iter()
        .filter_map(|l| monthly_payment(l, as_of))
        .collect();
    let total: f64 = payments.iter().map(|p| p.monthly_payment).sum();
    tracing::info!(loans = payments.len(), total, "monthly repayments computed");

    let value = serde_json::json!({
        "as_of": as_of.format("%Y-%m-%d").to_string(),
        "payments": payments,
        "total_monthly_payment": total,
    });
    JsonReportAdapter::new().write_value(&value, output)
}

pub fn run_validate(config_path: &Path) -> Result<(), FincastError> {
    let config = load_config(config_path)?;
    let as_of = as_of_date(&config, today())?;
    let records = build_record_source(&config);
    let holdings = records.load_holdings()?;
    let goals = records.load_goals()?;
    let liabilities = records.load_liabilities()?;
    tracing::info!(
        %as_of,
        holdings = holdings.len(),
        goals = goals.len(),
        liabilities = liabilities.len(),
        "configuration is valid"
    );
    Ok(())
}
