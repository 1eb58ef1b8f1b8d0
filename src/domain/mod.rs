//! Core domain types and forecasting logic.

pub mod asset_class;
pub mod backtest;
pub mod config_validation;
pub mod error;
pub mod forecast;
pub mod goal;
pub mod goal_simulator;
pub mod holding;
pub mod liability;
pub mod market_data;
pub mod monte_carlo;
pub mod portfolio_metrics;
pub mod price_series;
pub mod sampler;
pub mod stats;
