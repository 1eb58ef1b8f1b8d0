//! Financial goal records and feasibility results.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalType {
    /// One-time expenditure, deducted from wealth when due.
    #[default]
    LumpSum,
    /// Recurring monthly income need, checked against a safe withdrawal rate.
    CashFlow,
}

impl FromStr for GoalType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "lump_sum" => Ok(GoalType::LumpSum),
            "cash_flow" => Ok(GoalType::CashFlow),
            other => Err(format!("unknown goal type '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalRecord {
    pub id: i64,
    pub name: String,
    /// Nominal target in today's money (monthly amount for cash-flow goals).
    pub amount: f64,
    pub target_date: NaiveDate,
    pub goal_type: GoalType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GoalStatus {
    #[serde(rename = "On Track")]
    OnTrack,
    #[serde(rename = "Needs Work")]
    NeedsWork,
    #[serde(rename = "At Risk")]
    AtRisk,
}

impl GoalStatus {
    /// Above 80 is on track, below 50 at risk, anything between needs work.
    pub fn from_probability(probability: f64) -> Self {
        if probability > 80.0 {
            GoalStatus::OnTrack
        } else if probability < 50.0 {
            GoalStatus::AtRisk
        } else {
            GoalStatus::NeedsWork
        }
    }
}

impl fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GoalStatus::OnTrack => "On Track",
            GoalStatus::NeedsWork => "Needs Work",
            GoalStatus::AtRisk => "At Risk",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalResult {
    pub goal_id: i64,
    /// Share of simulated paths meeting the goal, 0–100.
    pub probability: f64,
    /// Median outcome relative to the adjusted target, in percent.
    pub progress_ratio: f64,
    /// Median wealth for lump-sum goals; median sustainable monthly income for cash-flow goals.
    pub projected_amount: f64,
    pub status: GoalStatus,
    pub inflation_adjusted_amount: f64,
}
