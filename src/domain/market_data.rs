//! Fail-soft access to the market data port, plus position quoting.
//!
//! Provider faults never reach the engine: they are logged and replaced by
//! neutral defaults (price 0, rate 1, empty history).

use super::holding::{HoldingRecord, is_local_market_ticker};
use super::price_series::PricePoint;
use crate::ports::market_data_port::MarketDataPort;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

/// USD→TWD rate ticker used to convert foreign quotes into the base currency.
pub const DEFAULT_FX_TICKER: &str = "TWD=X";

pub const BASE_CURRENCY: &str = "TWD";
pub const FOREIGN_CURRENCY: &str = "USD";

/// Latest price and the conversion rate into the base currency.
/// Local-market tickers have rate 1; faults yield `(0.0, 1.0)`.
pub fn latest_quote(port: &dyn MarketDataPort, ticker: &str, fx_ticker: &str) -> (f64, f64) {
    let price = match port.latest_close(ticker) {
        Ok(Some(p)) if p.is_finite() => p,
        Ok(_) => return (0.0, 1.0),
        Err(e) => {
            tracing::warn!(ticker, error = %e, "price lookup failed");
            return (0.0, 1.0);
        }
    };

    if is_local_market_ticker(ticker) {
        return (price, 1.0);
    }

    let rate = match port.latest_close(fx_ticker) {
        Ok(Some(r)) if r.is_finite() && r > 0.0 => r,
        Ok(_) => 1.0,
        Err(e) => {
            tracing::warn!(ticker = fx_ticker, error = %e, "fx rate lookup failed");
            1.0
        }
    };
    (price, rate)
}

/// Daily history for `tickers`, or an empty map when the provider fails.
pub fn history_or_empty(
    port: &dyn MarketDataPort,
    tickers: &[String],
    start: NaiveDate,
) -> HashMap<String, Vec<PricePoint>> {
    match port.history(tickers, start) {
        Ok(data) => data,
        Err(e) => {
            tracing::warn!(error = %e, "history fetch failed, treating as unavailable");
            HashMap::new()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionQuote {
    pub ticker: String,
    pub price: f64,
    pub currency: String,
    pub exchange_rate: f64,
    pub total_value: f64,
}

/// Value `shares` of `ticker` in the base currency. `None` when no price is available.
pub fn quote_position(
    port: &dyn MarketDataPort,
    ticker: &str,
    shares: f64,
    fx_ticker: &str,
) -> Option<PositionQuote> {
    let (price, rate) = latest_quote(port, ticker, fx_ticker);
    if price == 0.0 {
        return None;
    }
    let currency = if rate == 1.0 {
        BASE_CURRENCY
    } else {
        FOREIGN_CURRENCY
    };
    Some(PositionQuote {
        ticker: ticker.to_string(),
        price,
        currency: currency.to_string(),
        exchange_rate: rate,
        total_value: price * shares * rate,
    })
}

/// Revalue holdings that carry both a ticker and a share count. Holdings
/// without a quote keep their recorded value.
pub fn refresh_holding_values(
    port: &dyn MarketDataPort,
    holdings: &[HoldingRecord],
    fx_ticker: &str,
) -> Vec<HoldingRecord> {
    holdings
        .iter()
        .map(|h| match (h.ticker.as_deref(), h.shares) {
            (Some(ticker), Some(shares)) if shares != 0.0 => {
                match quote_position(port, ticker, shares, fx_ticker) {
                    Some(q) => HoldingRecord {
                        value: q.total_value,
                        ..h.clone()
                    },
                    None => h.clone(),
                }
            }
            _ => h.clone(),
        })
        .collect()
}
