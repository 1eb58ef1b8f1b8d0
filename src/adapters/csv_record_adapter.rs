//! CSV record source adapter for holdings, goals and liabilities.

use crate::domain::error::FincastError;
use crate::domain::goal::{GoalRecord, GoalType};
use crate::domain::holding::HoldingRecord;
use crate::domain::liability::LiabilityRecord;
use crate::ports::record_port::RecordSourcePort;
use chrono::NaiveDate;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct GoalRow {
    id: i64,
    name: String,
    amount: f64,
    target_date: NaiveDate,
    goal_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LiabilityRow {
    name: String,
    category: String,
    amount: f64,
    interest_rate: Option<f64>,
    start_date: Option<NaiveDate>,
    years: Option<u32>,
    grace_period_months: Option<u32>,
}

/// Reads each record kind from its own CSV file. A kind whose path is not
/// configured loads as empty.
#[derive(Debug, Clone, Default)]
pub struct CsvRecordAdapter {
    holdings: Option<PathBuf>,
    goals: Option<PathBuf>,
    liabilities: Option<PathBuf>,
}

impl CsvRecordAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_holdings(mut self, path: impl Into<PathBuf>) -> Self {
        self.holdings = Some(path.into());
        self
    }

    pub fn with_goals(mut self, path: impl Into<PathBuf>) -> Self {
        self.goals = Some(path.into());
        self
    }

    pub fn with_liabilities(mut self, path: impl Into<PathBuf>) -> Self {
        self.liabilities = Some(path.into());
        self
    }
}

fn parse_error(path: &Path, reason: impl ToString) -> FincastError {
    FincastError::RecordParse {
        file: path.display().to_string(),
        reason: reason.to_string(),
    }
}

fn read_rows<T: DeserializeOwned>(path: Option<&Path>) -> Result<Vec<T>, FincastError> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| parse_error(path, e))?;

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        rows.push(result.map_err(|e| parse_error(path, e))?);
    }
    tracing::debug!(file = %path.display(), rows = rows.len(), "records loaded");
    Ok(rows)
}

impl RecordSourcePort for CsvRecordAdapter {
    fn load_holdings(&self) -> Result<Vec<HoldingRecord>, FincastError> {
        read_rows(self.holdings.as_deref())
    }

    fn load_goals(&self) -> Result<Vec<GoalRecord>, FincastError> {
        let path = self.goals.as_deref();
        read_rows::<GoalRow>(path)?
            .into_iter()
            .map(|row| -> Result<GoalRecord, FincastError> {
                let goal_type = row
                    .goal_type
                    .as_deref()
                    .unwrap_or("")
                    .parse::<GoalType>()
                    .map_err(|reason| parse_error(path.unwrap_or(Path::new("")), reason))?;
                Ok(GoalRecord {
                    id: row.id,
                    name: row.name,
                    amount: row.amount,
                    target_date: row.target_date,
                    goal_type,
                })
            })
            .collect()
    }

    fn load_liabilities(&self) -> Result<Vec<LiabilityRecord>, FincastError> {
        Ok(read_rows::<LiabilityRow>(self.liabilities.as_deref())?
            .into_iter()
            .map(|row| LiabilityRecord {
                name: row.name,
                category: row.category,
                amount: row.amount,
                interest_rate: row.interest_rate,
                start_date: row.start_date,
                years: row.years,
                grace_period_months: row.grace_period_months.unwrap_or(0),
            })
            .collect())
    }
}
