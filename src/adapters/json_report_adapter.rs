//! JSON report adapter implementing ReportPort.
//!
//! Writes pretty-printed JSON to a file, or to stdout when the output is `-`.

use std::fs;
use std::io::Write;

use crate::domain::error::FincastError;
use crate::ports::report_port::ReportPort;

pub const STDOUT: &str = "-";

#[derive(Debug, Default)]
pub struct JsonReportAdapter;

impl JsonReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl ReportPort for JsonReportAdapter {
    fn write_value(&self, value: &serde_json::Value, output: &str) -> Result<(), FincastError> {
        let mut rendered = serde_json::to_string_pretty(value)?;
        rendered.push('\n');

        if output == STDOUT {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            stdout.flush()?;
            return Ok(());
        }

        fs::write(output, rendered).map_err(|e| FincastError::Report {
            reason: format!("failed to write {}: {}", output, e),
        })?;
        tracing::info!(path = output, "report written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::goal::{GoalResult, GoalStatus};
    use tempfile::TempDir;

    #[test]
    fn writes_pretty_json_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("goals.json");
        let results = vec![GoalResult {
            goal_id: 7,
            probability: 92.5,
            progress_ratio: 130.0,
            projected_amount: 2_600_000.0,
            status: GoalStatus::OnTrack,
            inflation_adjusted_amount: 2_000_000.0,
        }];

        JsonReportAdapter::new()
            .write_goals(&results, path.to_str().unwrap())
            .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains('\n'));
        let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed[0]["goal_id"], 7);
        assert_eq!(parsed[0]["status"], "On Track");
    }

    #[test]
    fn unwritable_path_is_report_error() {
        let err = JsonReportAdapter::new()
            .write_value(&serde_json::json!({}), "/nonexistent/dir/out.json")
            .unwrap_err();
        assert!(matches!(err, FincastError::Report { .. }));
    }
}
