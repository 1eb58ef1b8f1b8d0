//! Report output port trait.

use crate::domain::error::FincastError;
use crate::domain::forecast::ForecastReport;
use crate::domain::goal::GoalResult;
use crate::domain::portfolio_metrics::PortfolioMetrics;

/// Port for writing engine results to a destination (`"-"` means stdout).
pub trait ReportPort {
    fn write_value(&self, value: &serde_json::Value, output: &str) -> Result<(), FincastError>;

    fn write_forecast(&self, report: &ForecastReport, output: &str) -> Result<(), FincastError> {
        self.write_value(&serde_json::to_value(report)?, output)
    }

    fn write_goals(&self, results: &[GoalResult], output: &str) -> Result<(), FincastError> {
        self.write_value(&serde_json::to_value(results)?, output)
    }

    fn write_metrics(&self, metrics: &PortfolioMetrics, output: &str) -> Result<(), FincastError> {
        self.write_value(&serde_json::to_value(metrics)?, output)
    }
}
