//! Historical backtest of the current allocation.
//!
//! Each asset class is represented by one proxy instrument; cash is a
//! synthetic 2% compounding curve. The blended daily index is the
//! weight-sum of the per-class normalized series, scaled by the initial
//! portfolio value. Per-class empirical CAGR/volatility from the same data
//! serve as metric overrides for the forward projection.

use super::asset_class::{AssetClass, ClassMetrics, MetricsOverrides};
use super::holding::HoldingRecord;
use super::market_data::history_or_empty;
use super::portfolio_metrics::class_weights;
use super::price_series::PriceTable;
use super::stats::std_dev;
use crate::ports::market_data_port::MarketDataPort;
use chrono::{Months, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;
pub const CASH_ANNUAL_RATE: f64 = 0.02;
pub const CASH_VOLATILITY: f64 = 0.01;

pub const TW_EQUITY_PROXY: &str = "0050.TW";
pub const BOND_PROXY: &str = "BND";
pub const GOLD_PROXY: &str = "GLD";
pub const DEFAULT_US_EQUITY_PROXY: &str = "SPY";
pub const DEFAULT_REAL_ESTATE_PROXY: &str = "VNQ";

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_value: f64,
    pub years: u32,
    pub us_stock_ticker: String,
    pub real_estate_ticker: String,
    /// End of the trailing window.
    pub as_of: NaiveDate,
}

impl BacktestConfig {
    /// Proxy instrument per class. Cash has none.
    pub fn proxies(&self) -> BTreeMap<AssetClass, String> {
        BTreeMap::from([
            (AssetClass::TwEquity, TW_EQUITY_PROXY.to_string()),
            (AssetClass::UsEquity, self.us_stock_ticker.clone()),
            (AssetClass::Bond, BOND_PROXY.to_string()),
            (AssetClass::Gold, GOLD_PROXY.to_string()),
            (AssetClass::RealEstate, self.real_estate_ticker.clone()),
        ])
    }

    pub fn start_date(&self) -> NaiveDate {
        self.as_of
            .checked_sub_months(Months::new(self.years.saturating_mul(12)))
            .unwrap_or(NaiveDate::MIN)
    }
}

/// Backtest output. All series share the `dates` axis; every field is empty
/// when data is unavailable.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HistoricalBacktest {
    pub dates: Vec<String>,
    pub portfolio: Vec<f64>,
    /// Benchmark series (the real-estate proxy), zeros when it has no data.
    pub real_estate: Vec<f64>,
    /// Normalized (start = 1.0) daily index per class, cash included.
    pub class_index: BTreeMap<AssetClass, Vec<f64>>,
    pub historical_metrics: MetricsOverrides,
    /// Held classes whose proxy had no data and were filled with the cash curve.
    pub substituted_classes: Vec<AssetClass>,
}

impl HistoricalBacktest {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// `days` points of a deterministic curve compounding at `annual_rate`
/// over 252 trading days per year, starting at 1.0.
pub fn synthetic_cash_series(days: usize, annual_rate: f64) -> Vec<f64> {
    let daily = (1.0 + annual_rate).powf(1.0 / TRADING_DAYS_PER_YEAR);
    (0..days).map(|i| daily.powi(i as i32)).collect()
}

/// Compound annual growth rate over `years`; 0 when `start` is not positive.
pub fn cagr(start: f64, end: f64, years: f64) -> f64 {
    if start <= 0.0 || years <= 0.0 {
        return 0.0;
    }
    (end / start).powf(1.0 / years) - 1.0
}

/// Sample standard deviation of daily log returns, annualized by sqrt(252).
pub fn annualized_volatility(series: &[f64]) -> f64 {
    let log_returns: Vec<f64> = series
        .windows(2)
        .map(|w| (w[1] / w[0]).ln())
        .filter(|r| r.is_finite())
        .collect();
    std_dev(&log_returns, 1) * TRADING_DAYS_PER_YEAR.sqrt()
}

pub fn run_backtest(
    holdings: &[HoldingRecord],
    config: &BacktestConfig,
    port: &dyn MarketDataPort,
) -> HistoricalBacktest {
    let Some(weights) = class_weights(holdings) else {
        return HistoricalBacktest::empty();
    };

    let proxies = config.proxies();
    let mut tickers: Vec<String> = proxies.values().cloned().collect();
    tickers.sort();
    tickers.dedup();

    let start = config.start_date();
    tracing::info!(
        tickers = %tickers.join(","),
        %start,
        "fetching backtest history"
    );

    let table = PriceTable::align(&history_or_empty(port, &tickers, start));
    if table.is_empty() {
        tracing::warn!("no historical data returned, backtest unavailable");
        return HistoricalBacktest::empty();
    }

    let days = table.len();
    let cash_series = synthetic_cash_series(days, CASH_ANNUAL_RATE);

    let mut class_index = BTreeMap::new();
    class_index.insert(AssetClass::Cash, cash_series.clone());
    for (class, ticker) in &proxies {
        if let Some(series) = table.normalized(ticker) {
            class_index.insert(*class, series);
        }
    }

    let mut blended = vec![0.0; days];
    let mut substituted_classes = Vec::new();
    for (&class, &weight) in &weights {
        if weight <= 0.0 {
            continue;
        }
        let series = match class_index.get(&class) {
            Some(s) => s,
            None => {
                tracing::warn!(%class, "proxy data missing, substituting cash curve");
                substituted_classes.push(class);
                &cash_series
            }
        };
        for (acc, v) in blended.iter_mut().zip(series) {
            *acc += weight * v;
        }
    }

    let portfolio = blended.iter().map(|v| v * config.initial_value).collect();
    let real_estate = match table.normalized(&config.real_estate_ticker) {
        Some(series) => series.iter().map(|v| v * config.initial_value).collect(),
        None => vec![0.0; days],
    };

    let mut historical_metrics = MetricsOverrides::new();
    for (class, ticker) in &proxies {
        if let Some(series) = table.column(ticker) {
            let (first, last) = (series[0], series[series.len() - 1]);
            historical_metrics.insert(
                *class,
                ClassMetrics::new(
                    cagr(first, last, config.years as f64),
                    annualized_volatility(series),
                ),
            );
        }
    }
    historical_metrics.insert(
        AssetClass::Cash,
        ClassMetrics::new(CASH_ANNUAL_RATE, CASH_VOLATILITY),
    );

    HistoricalBacktest {
        dates: table
            .dates
            .iter()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .collect(),
        portfolio,
        real_estate,
        class_index,
        historical_metrics,
        substituted_classes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn cash_curve_compounds_to_annual_rate() {
        let series = synthetic_cash_series(253, 0.02);
        assert_abs_diff_eq!(series[0], 1.0);
        assert_abs_diff_eq!(series[252], 1.02, epsilon = 1e-12);
    }

    #[test]
    fn cagr_doubling_over_ten_years() {
        assert_abs_diff_eq!(
            cagr(100.0, 200.0, 10.0),
            2f64.powf(0.1) - 1.0,
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(cagr(0.0, 200.0, 10.0), 0.0);
        assert_abs_diff_eq!(cagr(-1.0, 200.0, 10.0), 0.0);
    }

    #[test]
    fn flat_series_has_zero_volatility() {
        assert_abs_diff_eq!(annualized_volatility(&[5.0, 5.0, 5.0, 5.0]), 0.0);
        assert_abs_diff_eq!(annualized_volatility(&[5.0]), 0.0);
    }

    #[test]
    fn alternating_series_volatility() {
        // log returns +ln2, -ln2: sample std = ln2 * sqrt(2)
        let vol = annualized_volatility(&[1.0, 2.0, 1.0]);
        let expected = 2f64.ln() * 2f64.sqrt() * 252f64.sqrt();
        assert_abs_diff_eq!(vol, expected, epsilon = 1e-12);
    }

    #[test]
    fn start_date_is_trailing_window() {
        let config = BacktestConfig {
            initial_value: 1.0,
            years: 10,
            us_stock_ticker: "SPY".into(),
            real_estate_ticker: "VNQ".into(),
            as_of: NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
        };
        assert_eq!(
            config.start_date(),
            NaiveDate::from_ymd_opt(2016, 3, 31).unwrap()
        );
        assert_eq!(config.proxies()[&AssetClass::UsEquity], "SPY");
        assert!(!config.proxies().contains_key(&AssetClass::Cash));
    }

    #[test]
    fn huge_window_starts_at_earliest_date() {
        let config = BacktestConfig {
            initial_value: 1.0,
            years: u32::MAX,
            us_stock_ticker: "SPY".into(),
            real_estate_ticker: "VNQ".into(),
            as_of: NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
        };
        assert_eq!(config.start_date(), NaiveDate::MIN);
    }
}
