//! Port traits for the engine's external collaborators.

pub mod config_port;
pub mod market_data_port;
pub mod record_port;
pub mod report_port;
