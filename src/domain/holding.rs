//! Holding records and the asset classifier.

use super::asset_class::AssetClass;
use serde::{Deserialize, Serialize};

pub const CATEGORY_CASH: &str = "Cash/Bank Deposit";
pub const CATEGORY_STOCK: &str = "Stock/Fund";
pub const CATEGORY_BOND: &str = "Bond";
pub const CATEGORY_INSURANCE: &str = "Insurance";
pub const CATEGORY_REAL_ESTATE: &str = "Real Estate";

/// Ticker suffixes of the local (Taiwan) exchanges.
pub const LOCAL_MARKET_SUFFIXES: [&str; 2] = [".TW", ".TWO"];

const GOLD_TOKENS: [&str; 2] = ["gold", "黃金"];

/// A user-entered asset as supplied by the record source. Read-only to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingRecord {
    pub name: String,
    pub category: String,
    pub value: f64,
    pub ticker: Option<String>,
    pub shares: Option<f64>,
}

impl HoldingRecord {
    pub fn new(name: &str, category: &str, value: f64) -> Self {
        Self {
            name: name.to_string(),
            category: category.to_string(),
            value,
            ticker: None,
            shares: None,
        }
    }

    pub fn with_ticker(mut self, ticker: &str) -> Self {
        self.ticker = Some(ticker.to_string());
        self
    }

    pub fn with_shares(mut self, shares: f64) -> Self {
        self.shares = Some(shares);
        self
    }
}

pub fn is_local_market_ticker(ticker: &str) -> bool {
    LOCAL_MARKET_SUFFIXES.iter().any(|s| ticker.ends_with(s))
}

/// Map a holding to its asset class.
///
/// Category rules take precedence over the name keyword match, and anything
/// left unclassified lands in US equity rather than cash.
pub fn classify(holding: &HoldingRecord) -> AssetClass {
    match holding.category.as_str() {
        CATEGORY_CASH => AssetClass::Cash,
        CATEGORY_STOCK => match holding.ticker.as_deref() {
            Some(t) if is_local_market_ticker(t) => AssetClass::TwEquity,
            _ => AssetClass::UsEquity,
        },
        CATEGORY_BOND | CATEGORY_INSURANCE => AssetClass::Bond,
        CATEGORY_REAL_ESTATE => AssetClass::RealEstate,
        _ => {
            let name = holding.name.to_lowercase();
            if GOLD_TOKENS.iter().any(|t| name.contains(t)) {
                AssetClass::Gold
            } else {
                AssetClass::UsEquity
            }
        }
    }
}
