//! Asset classes and their return/volatility assumptions.
//!
//! Each class carries a static default `(mean_return, volatility)` pair.
//! A [`MetricsOverrides`] map, passed explicitly per call, shadows the
//! default for every computation involving that class within the call.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    Cash,
    TwEquity,
    UsEquity,
    Bond,
    Gold,
    RealEstate,
}

/// Annualized mean return and volatility for one asset class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    #[serde(rename = "return")]
    pub mean_return: f64,
    pub volatility: f64,
}

impl ClassMetrics {
    pub const fn new(mean_return: f64, volatility: f64) -> Self {
        Self {
            mean_return,
            volatility,
        }
    }
}

/// Per-class metrics that replace the static defaults for a single request.
pub type MetricsOverrides = BTreeMap<AssetClass, ClassMetrics>;

impl AssetClass {
    pub const ALL: [AssetClass; 6] = [
        AssetClass::Cash,
        AssetClass::TwEquity,
        AssetClass::UsEquity,
        AssetClass::Bond,
        AssetClass::Gold,
        AssetClass::RealEstate,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            AssetClass::Cash => "Cash/Bank Deposit",
            AssetClass::TwEquity => "Taiwan Stock",
            AssetClass::UsEquity => "US Stock",
            AssetClass::Bond => "Bond",
            AssetClass::Gold => "Gold",
            AssetClass::RealEstate => "Real Estate",
        }
    }

    pub fn default_metrics(self) -> ClassMetrics {
        match self {
            AssetClass::Cash => ClassMetrics::new(0.02, 0.01),
            AssetClass::TwEquity => ClassMetrics::new(0.12, 0.20),
            AssetClass::UsEquity => ClassMetrics::new(0.10, 0.15),
            AssetClass::Bond => ClassMetrics::new(0.04, 0.05),
            AssetClass::Gold => ClassMetrics::new(0.06, 0.15),
            AssetClass::RealEstate => ClassMetrics::new(0.08, 0.10),
        }
    }

    /// Override when present, static default otherwise.
    pub fn effective_metrics(self, overrides: Option<&MetricsOverrides>) -> ClassMetrics {
        overrides
            .and_then(|o| o.get(&self).copied())
            .unwrap_or_else(|| self.default_metrics())
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = match self {
            AssetClass::Cash => "cash",
            AssetClass::TwEquity => "tw_equity",
            AssetClass::UsEquity => "us_equity",
            AssetClass::Bond => "bond",
            AssetClass::Gold => "gold",
            AssetClass::RealEstate => "real_estate",
        };
        f.write_str(key)
    }
}
