#![allow(dead_code)]

use chrono::{Days, NaiveDate};
use fincast::domain::error::FincastError;
use fincast::domain::goal::{GoalRecord, GoalType};
pub use fincast::domain::holding::{
    CATEGORY_BOND, CATEGORY_CASH, CATEGORY_REAL_ESTATE, CATEGORY_STOCK, HoldingRecord,
};
use fincast::domain::price_series::PricePoint;
use fincast::ports::market_data_port::MarketDataPort;
use std::cell::RefCell;
use std::collections::HashMap;

/// In-memory price provider. Tickers with an injected error fail every call
/// that touches them; `history` records each request it receives.
pub struct MockMarketData {
    pub series: HashMap<String, Vec<PricePoint>>,
    pub errors: HashMap<String, String>,
    pub history_calls: RefCell<Vec<(Vec<String>, NaiveDate)>>,
}

impl MockMarketData {
    pub fn new() -> Self {
        Self {
            series: HashMap::new(),
            errors: HashMap::new(),
            history_calls: RefCell::new(Vec::new()),
        }
    }

    pub fn with_series(mut self, ticker: &str, points: Vec<PricePoint>) -> Self {
        self.series.insert(ticker.to_string(), points);
        self
    }

    /// Single-point series, enough for `latest_close`.
    pub fn with_price(self, ticker: &str, price: f64) -> Self {
        self.with_series(ticker, vec![PricePoint::new(date(2026, 1, 2), price)])
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }

    fn check(&self, ticker: &str) -> Result<(), FincastError> {
        match self.errors.get(ticker) {
            Some(reason) => Err(FincastError::MarketData {
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl MarketDataPort for MockMarketData {
    fn latest_close(&self, ticker: &str) -> Result<Option<f64>, FincastError> {
        self.check(ticker)?;
        Ok(self
            .series
            .get(ticker)
            .and_then(|points| points.last().map(|p| p.close)))
    }

    fn history(
        &self,
        tickers: &[String],
        start: NaiveDate,
    ) -> Result<HashMap<String, Vec<PricePoint>>, FincastError> {
        self.history_calls
            .borrow_mut()
            .push((tickers.to_vec(), start));
        for ticker in tickers {
            self.check(ticker)?;
        }
        Ok(tickers
            .iter()
            .filter_map(|t| {
                let points: Vec<PricePoint> = self
                    .series
                    .get(t)?
                    .iter()
                    .filter(|p| p.date >= start)
                    .copied()
                    .collect();
                (!points.is_empty()).then(|| (t.clone(), points))
            })
            .collect())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Consecutive daily closes starting at `start`.
pub fn daily_series(start: NaiveDate, closes: &[f64]) -> Vec<PricePoint> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| PricePoint::new(start + Days::new(i as u64), c))
        .collect()
}

/// `n` closes growing by `daily_growth` per step from `first`.
pub fn geometric_closes(first: f64, daily_growth: f64, n: usize) -> Vec<f64> {
    (0..n).map(|i| first * daily_growth.powi(i as i32)).collect()
}

pub fn cash(value: f64) -> HoldingRecord {
    HoldingRecord::new("Savings", CATEGORY_CASH, value)
}

pub fn us_stock(value: f64) -> HoldingRecord {
    HoldingRecord::new("S&P fund", CATEGORY_STOCK, value).with_ticker("VOO")
}

pub fn tw_stock(value: f64) -> HoldingRecord {
    HoldingRecord::new("Taiwan 50", CATEGORY_STOCK, value).with_ticker("0050.TW")
}

pub fn goal(id: i64, amount: f64, target_date: NaiveDate, goal_type: GoalType) -> GoalRecord {
    GoalRecord {
        id,
        name: format!("goal {id}"),
        amount,
        target_date,
        goal_type,
    }
}
