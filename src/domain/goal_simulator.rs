//! Month-stepped stochastic goal feasibility check.
//!
//! A population of wealth paths is advanced one month at a time. Paths with
//! non-negative wealth take a market shock; negative wealth behaves like a
//! loan and accrues a fixed debt rate. Goals are settled in the month they
//! fall due: lump-sum goals are scored and then withdrawn from every path,
//! cash-flow goals are scored against a safe withdrawal rate only.

use super::goal::{GoalRecord, GoalResult, GoalStatus, GoalType};
use super::holding::HoldingRecord;
use super::portfolio_metrics::compute_metrics;
use super::sampler::NormalSampler;
use super::stats::percentile;
use chrono::{Datelike, NaiveDate};

pub const DEFAULT_PATHS: usize = 1000;
pub const DEBT_ANNUAL_RATE: f64 = 0.05;
pub const INFLATION_RATE: f64 = 0.03;
pub const SAFE_WITHDRAWAL_RATE: f64 = 0.04;

#[derive(Debug, Clone, PartialEq)]
pub struct GoalSimParams {
    pub initial_value: f64,
    pub annual_contribution: f64,
    pub years: u32,
    pub mean_return: f64,
    pub volatility: f64,
    pub paths: usize,
}

impl GoalSimParams {
    pub fn total_months(&self) -> usize {
        self.years as usize * 12
    }
}

/// Months from `as_of` to the goal's target month, clamped to `[1, total_months]`.
pub fn due_month(target: NaiveDate, as_of: NaiveDate, total_months: usize) -> usize {
    let months = (target.year() - as_of.year()) as i64 * 12
        + (target.month() as i64 - as_of.month() as i64);
    months.clamp(1, total_months.max(1) as i64) as usize
}

/// Nominal amount grown at the fixed inflation rate for `months` months.
pub fn inflation_adjusted(amount: f64, months: usize) -> f64 {
    amount * (1.0 + INFLATION_RATE).powf(months as f64 / 12.0)
}

pub struct GoalSimulation<'a> {
    params: GoalSimParams,
    wealth: Vec<f64>,
    month: usize,
    sampler: &'a mut dyn NormalSampler,
}

impl<'a> GoalSimulation<'a> {
    pub fn new(params: GoalSimParams, sampler: &'a mut dyn NormalSampler) -> Self {
        let wealth = vec![params.initial_value; params.paths.max(1)];
        Self {
            params,
            wealth,
            month: 0,
            sampler,
        }
    }

    pub fn wealth(&self) -> &[f64] {
        &self.wealth
    }

    pub fn month(&self) -> usize {
        self.month
    }

    /// Advance every path by one month.
    pub fn step(&mut self) {
        let monthly_mean = self.params.mean_return / 12.0;
        let monthly_std = self.params.volatility / 12f64.sqrt();
        let monthly_contribution = self.params.annual_contribution / 12.0;
        let debt_growth = 1.0 + DEBT_ANNUAL_RATE / 12.0;

        for w in self.wealth.iter_mut() {
            let growth = if *w >= 0.0 {
                1.0 + self.sampler.sample(monthly_mean, monthly_std)
            } else {
                debt_growth
            };
            *w = *w * growth + monthly_contribution;
        }
        self.month += 1;
    }

    fn fraction_meeting(&self, predicate: impl Fn(f64) -> bool) -> f64 {
        let hits = self.wealth.iter().filter(|&&w| predicate(w)).count();
        hits as f64 / self.wealth.len() as f64 * 100.0
    }

    /// Score `goal` against the current wealth distribution, applying the
    /// lump-sum withdrawal when relevant.
    pub fn settle(&mut self, goal: &GoalRecord) -> GoalResult {
        let adjusted = inflation_adjusted(goal.amount, self.month);
        let median = percentile(&self.wealth, 50.0);

        let (probability, projected_amount, progress_ratio) = match goal.goal_type {
            GoalType::LumpSum => {
                let probability = self.fraction_meeting(|w| w >= adjusted);
                for w in self.wealth.iter_mut() {
                    *w -= adjusted;
                }
                (probability, median, ratio_percent(median, adjusted))
            }
            GoalType::CashFlow => {
                let annual_need = adjusted * 12.0;
                let probability =
                    self.fraction_meeting(|w| w * SAFE_WITHDRAWAL_RATE >= annual_need);
                let monthly_income = median * SAFE_WITHDRAWAL_RATE / 12.0;
                (
                    probability,
                    monthly_income,
                    ratio_percent(monthly_income, adjusted),
                )
            }
        };

        GoalResult {
            goal_id: goal.id,
            probability,
            progress_ratio,
            projected_amount,
            status: GoalStatus::from_probability(probability),
            inflation_adjusted_amount: adjusted,
        }
    }
}

fn ratio_percent(actual: f64, target: f64) -> f64 {
    if target > 0.0 {
        actual / target * 100.0
    } else {
        100.0
    }
}

/// Simulate `params.years` of monthly steps and settle each goal in its due
/// month. Results are ordered by due month, then by input order. Goals sharing
/// an id all settle, but only the last one settled reports a result.
pub fn run_goal_simulation(
    params: GoalSimParams,
    goals: &[GoalRecord],
    as_of: NaiveDate,
    sampler: &mut dyn NormalSampler,
) -> Vec<GoalResult> {
    let total_months = params.total_months();
    if total_months == 0 || goals.is_empty() {
        return Vec::new();
    }

    let mut buckets: Vec<Vec<&GoalRecord>> = vec![Vec::new(); total_months + 1];
    for goal in goals {
        buckets[due_month(goal.target_date, as_of, total_months)].push(goal);
    }

    tracing::debug!(
        paths = params.paths,
        total_months,
        goals = goals.len(),
        "running goal simulation"
    );

    let mut sim = GoalSimulation::new(params, sampler);
    let mut results = Vec::with_capacity(goals.len());
    for bucket in buckets.iter().skip(1) {
        sim.step();
        for goal in bucket {
            let result = sim.settle(goal);
            results.retain(|r: &GoalResult| r.goal_id != result.goal_id);
            results.push(result);
        }
    }
    results
}

/// Inputs to a goal check that do not come from the holdings.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalCheckRequest {
    pub initial_value: f64,
    /// Negative values are withdrawals.
    pub annual_contribution: f64,
    pub years: u32,
    pub paths: usize,
}

impl Default for GoalCheckRequest {
    fn default() -> Self {
        Self {
            initial_value: 0.0,
            annual_contribution: 0.0,
            years: 30,
            paths: DEFAULT_PATHS,
        }
    }
}

/// Blend the holdings' static class metrics and run the goal simulation.
pub fn check_goals(
    holdings: &[HoldingRecord],
    goals: &[GoalRecord],
    request: &GoalCheckRequest,
    as_of: NaiveDate,
    sampler: &mut dyn NormalSampler,
) -> Vec<GoalResult> {
    let metrics = compute_metrics(holdings, None);
    let params = GoalSimParams {
        initial_value: request.initial_value,
        annual_contribution: request.annual_contribution,
        years: request.years,
        mean_return: metrics.mean_return,
        volatility: metrics.volatility,
        paths: request.paths.max(1),
    };
    run_goal_simulation(params, goals, as_of, sampler)
}
