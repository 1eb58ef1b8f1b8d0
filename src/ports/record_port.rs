//! Holding, goal and liability record source port trait.

use crate::domain::error::FincastError;
use crate::domain::goal::GoalRecord;
use crate::domain::holding::HoldingRecord;
use crate::domain::liability::LiabilityRecord;

/// Read-only supplier of user-entered records for one request.
pub trait RecordSourcePort {
    fn load_holdings(&self) -> Result<Vec<HoldingRecord>, FincastError>;
    fn load_goals(&self) -> Result<Vec<GoalRecord>, FincastError>;
    fn load_liabilities(&self) -> Result<Vec<LiabilityRecord>, FincastError>;
}
