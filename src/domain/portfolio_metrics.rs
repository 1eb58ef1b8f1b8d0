//! Value-weighted portfolio return/volatility and per-class breakdown.
//!
//! Classes are blended linearly under their portfolio weights: both mean
//! return and volatility are weight-averaged, with no cross-class covariance.

use super::asset_class::{AssetClass, ClassMetrics, MetricsOverrides};
use super::holding::{HoldingRecord, classify};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassBreakdown {
    pub name: String,
    pub weight: f64,
    pub mean_return: f64,
    pub volatility: f64,
    pub contribution_return: f64,
}

pub type PortfolioBreakdown = BTreeMap<AssetClass, ClassBreakdown>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioMetrics {
    pub mean_return: f64,
    pub volatility: f64,
    pub breakdown: PortfolioBreakdown,
}

pub fn total_value(holdings: &[HoldingRecord]) -> f64 {
    holdings.iter().map(|h| h.value).sum()
}

/// Weight of every class (all six present, zero when unheld).
/// Returns `None` when the total holding value is zero.
pub fn class_weights(holdings: &[HoldingRecord]) -> Option<BTreeMap<AssetClass, f64>> {
    let total = total_value(holdings);
    if total == 0.0 {
        return None;
    }

    let mut weights: BTreeMap<AssetClass, f64> =
        AssetClass::ALL.iter().map(|&c| (c, 0.0)).collect();
    for holding in holdings {
        *weights.entry(classify(holding)).or_insert(0.0) += holding.value / total;
    }
    Some(weights)
}

pub fn compute_metrics(
    holdings: &[HoldingRecord],
    overrides: Option<&MetricsOverrides>,
) -> PortfolioMetrics {
    let total = total_value(holdings);
    if total == 0.0 {
        let cash = AssetClass::Cash.effective_metrics(overrides);
        return PortfolioMetrics {
            mean_return: cash.mean_return,
            volatility: cash.volatility,
            breakdown: PortfolioBreakdown::new(),
        };
    }

    let mut breakdown: PortfolioBreakdown = AssetClass::ALL
        .iter()
        .map(|&class| {
            let ClassMetrics {
                mean_return,
                volatility,
            } = class.effective_metrics(overrides);
            (
                class,
                ClassBreakdown {
                    name: class.display_name().to_string(),
                    weight: 0.0,
                    mean_return,
                    volatility,
                    contribution_return: 0.0,
                },
            )
        })
        .collect();

    let mut weighted_return = 0.0;
    let mut weighted_volatility = 0.0;

    for holding in holdings {
        let weight = holding.value / total;
        let class = classify(holding);
        let metrics = class.effective_metrics(overrides);

        weighted_return += weight * metrics.mean_return;
        weighted_volatility += weight * metrics.volatility;

        if let Some(entry) = breakdown.get_mut(&class) {
            entry.weight += weight;
            entry.contribution_return += weight * metrics.mean_return;
        }
    }

    PortfolioMetrics {
        mean_return: weighted_return,
        volatility: weighted_volatility,
        breakdown,
    }
}
