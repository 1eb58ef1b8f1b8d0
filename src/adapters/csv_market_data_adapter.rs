//! CSV file market data adapter.
//!
//! One file per ticker, `<data_dir>/<TICKER>.csv`, with a `date,close`
//! header. A ticker without a file is treated as unknown.

use crate::domain::error::FincastError;
use crate::domain::price_series::PricePoint;
use crate::ports::market_data_port::MarketDataPort;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

pub struct CsvMarketDataAdapter {
    base_path: PathBuf,
}

impl CsvMarketDataAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", ticker))
    }

    /// All closes for `ticker` sorted by date, or `None` if there is no file.
    fn read_series(&self, ticker: &str) -> Result<Option<Vec<PricePoint>>, FincastError> {
        let path = self.csv_path(ticker);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path).map_err(|e| FincastError::MarketData {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut points = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| FincastError::MarketData {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;

            let date_str = record.get(0).ok_or_else(|| FincastError::MarketData {
                reason: "missing date column".into(),
            })?;
            let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").map_err(|e| {
                FincastError::MarketData {
                    reason: format!("invalid date '{}' for {}: {}", date_str, ticker, e),
                }
            })?;

            let close_str = record.get(1).ok_or_else(|| FincastError::MarketData {
                reason: "missing close column".into(),
            })?;
            // Blank closes are gaps, filled later during alignment.
            if close_str.trim().is_empty() {
                continue;
            }
            let close: f64 = close_str
                .trim()
                .parse()
                .map_err(|e| FincastError::MarketData {
                    reason: format!("invalid close value for {}: {}", ticker, e),
                })?;

            points.push(PricePoint::new(date, close));
        }

        points.sort_by_key(|p| p.date);
        Ok(Some(points))
    }
}

impl MarketDataPort for CsvMarketDataAdapter {
    fn latest_close(&self, ticker: &str) -> Result<Option<f64>, FincastError> {
        Ok(self
            .read_series(ticker)?
            .and_then(|points| points.last().map(|p| p.close)))
    }

    fn history(
        &self,
        tickers: &[String],
        start: NaiveDate,
    ) -> Result<HashMap<String, Vec<PricePoint>>, FincastError> {
        let mut result = HashMap::new();
        for ticker in tickers {
            let Some(points) = self.read_series(ticker)? else {
                tracing::debug!(ticker = %ticker, "no price file");
                continue;
            };
            let points: Vec<PricePoint> = points.into_iter().filter(|p| p.date >= start).collect();
            if !points.is_empty() {
                result.insert(ticker.clone(), points);
            }
        }
        Ok(result)
    }
}
