//! Daily price series and their alignment onto a shared date axis.

use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet, HashMap};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Several tickers' closes aligned on one sorted date axis, gap-free.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceTable {
    pub dates: Vec<NaiveDate>,
    pub columns: BTreeMap<String, Vec<f64>>,
}

pub fn build_unified_timeline(series: &HashMap<String, Vec<PricePoint>>) -> Vec<NaiveDate> {
    let unique_dates: BTreeSet<NaiveDate> = series
        .values()
        .flat_map(|points| points.iter().map(|p| p.date))
        .collect();
    unique_dates.into_iter().collect()
}

/// Fill gaps forward from the last observation, then fill any leading gap
/// backward from the first. Returns `None` if there is no observation at all.
pub fn forward_back_fill(values: &[Option<f64>]) -> Option<Vec<f64>> {
    let first = values.iter().flatten().next().copied()?;
    let mut last = first;
    Some(
        values
            .iter()
            .map(|v| {
                if let Some(x) = v {
                    last = *x;
                }
                last
            })
            .collect(),
    )
}

impl PriceTable {
    /// Align all series on the union of their dates. Tickers without a single
    /// finite observation are dropped.
    pub fn align(series: &HashMap<String, Vec<PricePoint>>) -> Self {
        let dates = build_unified_timeline(series);
        let index: HashMap<NaiveDate, usize> =
            dates.iter().enumerate().map(|(i, d)| (*d, i)).collect();

        let mut columns = BTreeMap::new();
        for (ticker, points) in series {
            let mut raw = vec![None; dates.len()];
            for p in points.iter().filter(|p| p.close.is_finite()) {
                if let Some(&i) = index.get(&p.date) {
                    raw[i] = Some(p.close);
                }
            }
            if let Some(filled) = forward_back_fill(&raw) {
                columns.insert(ticker.clone(), filled);
            }
        }

        Self { dates, columns }
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty() || self.columns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn column(&self, ticker: &str) -> Option<&[f64]> {
        self.columns.get(ticker).map(|c| c.as_slice())
    }

    /// The ticker's series rescaled to start at 1.0. `None` when the ticker
    /// is absent or its first value is not positive.
    pub fn normalized(&self, ticker: &str) -> Option<Vec<f64>> {
        let column = self.column(ticker)?;
        let first = *column.first()?;
        if first <= 0.0 {
            return None;
        }
        Some(column.iter().map(|v| v / first).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn series(points: &[(&str, f64)]) -> Vec<PricePoint> {
        points.iter().map(|(s, c)| PricePoint::new(d(s), *c)).collect()
    }

    #[test]
    fn forward_then_backward_fill() {
        let filled = forward_back_fill(&[None, Some(2.0), None, Some(4.0), None]).unwrap();
        assert_eq!(filled, vec![2.0, 2.0, 2.0, 4.0, 4.0]);
    }

    #[test]
    fn fill_all_missing_is_none() {
        assert!(forward_back_fill(&[None, None]).is_none());
        assert!(forward_back_fill(&[]).is_none());
    }

    #[test]
    fn align_fills_holiday_gaps() {
        let mut input = HashMap::new();
        input.insert(
            "SPY".to_string(),
            series(&[("2024-01-02", 100.0), ("2024-01-04", 102.0)]),
        );
        input.insert(
            "0050.TW".to_string(),
            series(&[("2024-01-03", 50.0), ("2024-01-04", 51.0)]),
        );

        let table = PriceTable::align(&input);
        assert_eq!(table.dates, vec![d("2024-01-02"), d("2024-01-03"), d("2024-01-04")]);
        assert_eq!(table.column("SPY").unwrap(), &[100.0, 100.0, 102.0]);
        assert_eq!(table.column("0050.TW").unwrap(), &[50.0, 50.0, 51.0]);
    }

    #[test]
    fn align_drops_empty_tickers() {
        let mut input = HashMap::new();
        input.insert("SPY".to_string(), series(&[("2024-01-02", 100.0)]));
        input.insert("GLD".to_string(), Vec::new());

        let table = PriceTable::align(&input);
        assert!(table.column("GLD").is_none());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn normalized_starts_at_one() {
        let mut input = HashMap::new();
        input.insert(
            "BND".to_string(),
            series(&[("2024-01-02", 80.0), ("2024-01-03", 88.0)]),
        );
        let table = PriceTable::align(&input);
        assert_eq!(table.normalized("BND").unwrap(), vec![1.0, 1.1]);
        assert!(table.normalized("VNQ").is_none());
    }

    #[test]
    fn normalized_rejects_non_positive_start() {
        let mut input = HashMap::new();
        input.insert("BAD".to_string(), series(&[("2024-01-02", 0.0), ("2024-01-03", 1.0)]));
        let table = PriceTable::align(&input);
        assert!(table.normalized("BAD").is_none());
    }

    #[test]
    fn empty_input_is_empty_table() {
        let table = PriceTable::align(&HashMap::new());
        assert!(table.is_empty());
    }
}
