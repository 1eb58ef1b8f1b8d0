//! Backtest → metrics → projection pipeline.

use super::backtest::{
    BacktestConfig, DEFAULT_REAL_ESTATE_PROXY, DEFAULT_US_EQUITY_PROXY, HistoricalBacktest,
    run_backtest,
};
use super::holding::HoldingRecord;
use super::monte_carlo::{DEFAULT_ITERATIONS, Projection, ProjectionParams, TimeUnit, project};
use super::portfolio_metrics::compute_metrics;
use super::sampler::NormalSampler;
use crate::ports::market_data_port::MarketDataPort;
use chrono::NaiveDate;
use serde::Serialize;

pub const DEFAULT_BACKTEST_YEARS: u32 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRequest {
    pub initial_portfolio: f64,
    pub annual_contribution: f64,
    pub years: u32,
    pub iterations: usize,
    pub time_unit: TimeUnit,
    pub backtest_years: u32,
    pub us_stock_ticker: String,
    pub real_estate_ticker: String,
}

impl ForecastRequest {
    pub fn new(initial_portfolio: f64, annual_contribution: f64, years: u32) -> Self {
        Self {
            initial_portfolio,
            annual_contribution,
            years,
            iterations: DEFAULT_ITERATIONS,
            time_unit: TimeUnit::default(),
            backtest_years: DEFAULT_BACKTEST_YEARS,
            us_stock_ticker: DEFAULT_US_EQUITY_PROXY.to_string(),
            real_estate_ticker: DEFAULT_REAL_ESTATE_PROXY.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastReport {
    #[serde(flatten)]
    pub projection: Projection,
    pub historical_backtest: HistoricalBacktest,
}

/// Backtest the allocation, feed its empirical per-class metrics into the
/// blend (defaults when the backtest is empty), then project forward.
pub fn run_forecast(
    request: &ForecastRequest,
    holdings: &[HoldingRecord],
    port: &dyn MarketDataPort,
    sampler: &mut dyn NormalSampler,
    as_of: NaiveDate,
) -> ForecastReport {
    let backtest = run_backtest(
        holdings,
        &BacktestConfig {
            initial_value: request.initial_portfolio,
            years: request.backtest_years,
            us_stock_ticker: request.us_stock_ticker.clone(),
            real_estate_ticker: request.real_estate_ticker.clone(),
            as_of,
        },
        port,
    );

    let overrides = (!backtest.historical_metrics.is_empty()).then_some(&backtest.historical_metrics);
    let metrics = compute_metrics(holdings, overrides);
    tracing::info!(
        mean_return = metrics.mean_return,
        volatility = metrics.volatility,
        historical = overrides.is_some(),
        "portfolio metrics blended"
    );

    let mut projection = project(
        &ProjectionParams {
            initial_value: request.initial_portfolio,
            annual_contribution: request.annual_contribution,
            years: request.years,
            mean_return: metrics.mean_return,
            volatility: metrics.volatility,
            iterations: request.iterations,
            time_unit: request.time_unit,
        },
        sampler,
    );
    projection.metrics.breakdown = Some(metrics.breakdown);

    ForecastReport {
        projection,
        historical_backtest: backtest,
    }
}
