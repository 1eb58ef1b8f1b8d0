//! Concrete adapter implementations for ports.

pub mod csv_market_data_adapter;
pub mod csv_record_adapter;
pub mod file_config_adapter;
pub mod json_report_adapter;
pub mod timeout_market_data;
