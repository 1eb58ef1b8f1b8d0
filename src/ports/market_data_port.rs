//! Market data access port trait.

use crate::domain::error::FincastError;
use crate::domain::price_series::PricePoint;
use chrono::NaiveDate;
use std::collections::HashMap;

/// Price provider consumed by the engine.
///
/// Unknown tickers are not errors: `latest_close` yields `None` and
/// `history` leaves them out of the returned map. An `Err` means the
/// provider itself was unreachable or returned corrupt data.
pub trait MarketDataPort {
    fn latest_close(&self, ticker: &str) -> Result<Option<f64>, FincastError>;

    /// Daily closes for each ticker from `start` onwards, sorted by date.
    fn history(
        &self,
        tickers: &[String],
        start: NaiveDate,
    ) -> Result<HashMap<String, Vec<PricePoint>>, FincastError>;
}
