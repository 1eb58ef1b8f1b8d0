//! Deadline wrapper around a market data port.
//!
//! Each call runs on a worker thread; if no answer arrives within the
//! deadline the call fails with `FincastError::Timeout` and the worker's
//! eventual result is discarded.

use crate::domain::error::FincastError;
use crate::domain::price_series::PricePoint;
use crate::ports::market_data_port::MarketDataPort;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub struct TimeoutMarketData {
    inner: Arc<dyn MarketDataPort + Send + Sync>,
    timeout: Duration,
}

impl TimeoutMarketData {
    pub fn new(inner: Arc<dyn MarketDataPort + Send + Sync>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    fn call<T, F>(&self, label: String, f: F) -> Result<T, FincastError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn MarketDataPort) -> Result<T, FincastError> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let inner = Arc::clone(&self.inner);
        thread::spawn(move || {
            // Receiver may be gone after a timeout.
            let _ = tx.send(f(inner.as_ref()));
        });

        match rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                tracing::warn!(ticker = %label, seconds = self.timeout.as_secs(), "market data call timed out");
                Err(FincastError::Timeout {
                    ticker: label,
                    seconds: self.timeout.as_secs(),
                })
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(FincastError::MarketData {
                reason: format!("market data worker for {} exited without a result", label),
            }),
        }
    }
}

impl MarketDataPort for TimeoutMarketData {
    fn latest_close(&self, ticker: &str) -> Result<Option<f64>, FincastError> {
        let owned = ticker.to_string();
        self.call(ticker.to_string(), move |port| port.latest_close(&owned))
    }

    fn history(
        &self,
        tickers: &[String],
        start: NaiveDate,
    ) -> Result<HashMap<String, Vec<PricePoint>>, FincastError> {
        let owned = tickers.to_vec();
        self.call(tickers.join(","), move |port| port.history(&owned, start))
    }
}
