//! Monte Carlo wealth projection.
//!
//! Every path follows `w[t] = w[t-1] * (1 + shock) + contribution` with
//! `shock ~ N(mean * dt, volatility * sqrt(dt))`. The long-horizon run is
//! monthly and reduced to a per-year percentile fan chart; two auxiliary
//! one-year and one-month runs yield representative scenario paths.

use super::portfolio_metrics::PortfolioBreakdown;
use super::sampler::NormalSampler;
use super::stats::{argmax, nearest_index, percentile_sorted, std_dev};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_ITERATIONS: usize = 1000;
pub const SCENARIO_ITERATIONS: usize = 1000;
pub const MONTHS_PER_YEAR: usize = 12;
pub const TRADING_DAYS_PER_YEAR: usize = 252;
pub const TRADING_DAYS_PER_MONTH: usize = 21;

const FAN_PERCENTILES: [f64; 5] = [5.0, 25.0, 50.0, 75.0, 95.0];

/// Step granularity of the short-term scenario view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Year,
    #[default]
    Month,
    Day,
}

impl TimeUnit {
    /// Steps per year for the short-term view; `None` when no view is produced.
    pub fn short_term_steps(self) -> Option<usize> {
        match self {
            TimeUnit::Day => Some(TRADING_DAYS_PER_YEAR),
            TimeUnit::Month => Some(MONTHS_PER_YEAR),
            TimeUnit::Year => None,
        }
    }
}

impl FromStr for TimeUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "year" => Ok(TimeUnit::Year),
            "month" => Ok(TimeUnit::Month),
            "day" => Ok(TimeUnit::Day),
            other => Err(format!("unknown time unit '{other}' (expected year, month or day)")),
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TimeUnit::Year => "year",
            TimeUnit::Month => "month",
            TimeUnit::Day => "day",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionParams {
    pub initial_value: f64,
    pub annual_contribution: f64,
    pub years: u32,
    pub mean_return: f64,
    pub volatility: f64,
    pub iterations: usize,
    pub time_unit: TimeUnit,
}

/// Per-year percentile bands, each of length `years + 1`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FanChart {
    pub years: Vec<u32>,
    pub p5: Vec<f64>,
    pub p25: Vec<f64>,
    pub p50: Vec<f64>,
    pub p75: Vec<f64>,
    pub p95: Vec<f64>,
}

/// One step of the four representative scenario paths.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioPoint {
    pub step: usize,
    pub best: f64,
    pub worst: f64,
    pub median: f64,
    pub volatile: f64,
}

/// Path indices chosen from one simulation batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepresentativePaths {
    pub best: usize,
    pub worst: usize,
    pub median: usize,
    pub volatile: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionMetrics {
    pub weighted_return: f64,
    pub weighted_volatility: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<PortfolioBreakdown>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection {
    #[serde(flatten)]
    pub fan_chart: FanChart,
    pub short_term_paths: Vec<ScenarioPoint>,
    pub one_month_paths: Vec<ScenarioPoint>,
    pub metrics: ProjectionMetrics,
}

/// Simulate `iterations` independent paths of `steps` steps each.
/// Returns one `Vec` per path, each of length `steps + 1` starting at `initial`.
pub fn simulate_paths(
    initial: f64,
    steps: usize,
    step_mean: f64,
    step_std: f64,
    step_contribution: f64,
    iterations: usize,
    sampler: &mut dyn NormalSampler,
) -> Vec<Vec<f64>> {
    let mut paths: Vec<Vec<f64>> = (0..iterations)
        .map(|_| {
            let mut p = Vec::with_capacity(steps + 1);
            p.push(initial);
            p
        })
        .collect();

    for t in 1..=steps {
        for path in paths.iter_mut() {
            let shock = sampler.sample(step_mean, step_std);
            let next = path[t - 1] * (1.0 + shock) + step_contribution;
            path.push(next);
        }
    }
    paths
}

/// Percentile bands over the year-end columns (every 12th month).
pub fn fan_chart(paths: &[Vec<f64>], years: u32) -> FanChart {
    let mut chart = FanChart {
        years: (0..=years).collect(),
        p5: Vec::with_capacity(years as usize + 1),
        p25: Vec::with_capacity(years as usize + 1),
        p50: Vec::with_capacity(years as usize + 1),
        p75: Vec::with_capacity(years as usize + 1),
        p95: Vec::with_capacity(years as usize + 1),
    };

    for year in 0..=years as usize {
        let mut column: Vec<f64> = paths.iter().map(|p| p[year * MONTHS_PER_YEAR]).collect();
        column.sort_by(|a, b| a.total_cmp(b));
        let [p5, p25, p50, p75, p95] = FAN_PERCENTILES.map(|q| percentile_sorted(&column, q));
        chart.p5.push(p5);
        chart.p25.push(p25);
        chart.p50.push(p50);
        chart.p75.push(p75);
        chart.p95.push(p95);
    }
    chart
}

/// Standard deviation (population) of a path's simple step returns.
/// Steps starting from a zero value contribute a zero return.
pub fn path_return_volatility(path: &[f64]) -> f64 {
    let returns: Vec<f64> = path
        .windows(2)
        .map(|w| {
            let r = (w[1] - w[0]) / w[0];
            if r.is_finite() { r } else { 0.0 }
        })
        .collect();
    std_dev(&returns, 0)
}

/// Pick whole generated paths whose final values sit nearest the 95th, 5th
/// and 50th percentiles, plus the path with the most volatile step returns.
pub fn select_representative(paths: &[Vec<f64>]) -> RepresentativePaths {
    let finals: Vec<f64> = paths
        .iter()
        .map(|p| p.last().copied().unwrap_or(0.0))
        .collect();
    let mut sorted = finals.clone();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let volatilities: Vec<f64> = paths.iter().map(|p| path_return_volatility(p)).collect();

    RepresentativePaths {
        best: nearest_index(&finals, percentile_sorted(&sorted, 95.0)),
        worst: nearest_index(&finals, percentile_sorted(&sorted, 5.0)),
        median: nearest_index(&finals, percentile_sorted(&sorted, 50.0)),
        volatile: argmax(&volatilities),
    }
}

fn scenario_points(paths: &[Vec<f64>], picks: RepresentativePaths) -> Vec<ScenarioPoint> {
    let len = paths.first().map(|p| p.len()).unwrap_or(0);
    (0..len)
        .map(|step| ScenarioPoint {
            step,
            best: paths[picks.best][step],
            worst: paths[picks.worst][step],
            median: paths[picks.median][step],
            volatile: paths[picks.volatile][step],
        })
        .collect()
}

/// Run a scenario batch of `steps` steps at `steps_per_year` granularity.
fn scenario_run(
    params: &ProjectionParams,
    steps: usize,
    steps_per_year: usize,
    sampler: &mut dyn NormalSampler,
) -> Vec<ScenarioPoint> {
    let dt = 1.0 / steps_per_year as f64;
    let paths = simulate_paths(
        params.initial_value,
        steps,
        params.mean_return * dt,
        params.volatility * dt.sqrt(),
        params.annual_contribution / steps_per_year as f64,
        SCENARIO_ITERATIONS,
        sampler,
    );
    let picks = select_representative(&paths);
    scenario_points(&paths, picks)
}

/// Full projection: fan chart, year-one scenarios (unless `Year` granularity)
/// and the always-present one-month daily scenarios.
pub fn project(params: &ProjectionParams, sampler: &mut dyn NormalSampler) -> Projection {
    let iterations = params.iterations.max(1);
    let total_months = params.years as usize * MONTHS_PER_YEAR;
    let dt = 1.0 / MONTHS_PER_YEAR as f64;

    tracing::debug!(
        iterations,
        total_months,
        mean = params.mean_return,
        volatility = params.volatility,
        "running monthly projection"
    );

    let paths = simulate_paths(
        params.initial_value,
        total_months,
        params.mean_return * dt,
        params.volatility * dt.sqrt(),
        params.annual_contribution * dt,
        iterations,
        sampler,
    );
    let fan_chart = fan_chart(&paths, params.years);

    let short_term_paths = match params.time_unit.short_term_steps() {
        Some(steps) => scenario_run(params, steps, steps, sampler),
        None => Vec::new(),
    };
    let one_month_paths =
        scenario_run(params, TRADING_DAYS_PER_MONTH, TRADING_DAYS_PER_YEAR, sampler);

    Projection {
        fan_chart,
        short_term_paths,
        one_month_paths,
        metrics: ProjectionMetrics {
            weighted_return: params.mean_return,
            weighted_volatility: params.volatility,
            breakdown: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sampler::{RngSampler, SequenceSampler};
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    fn params(years: u32, mean: f64, vol: f64, iterations: usize) -> ProjectionParams {
        ProjectionParams {
            initial_value: 1000.0,
            annual_contribution: 0.0,
            years,
            mean_return: mean,
            volatility: vol,
            iterations,
            time_unit: TimeUnit::Month,
        }
    }

    #[test]
    fn deterministic_zero_variance_path() {
        let mut sampler = RngSampler::seeded(3);
        let result = project(&params(1, 0.0, 0.0, 1), &mut sampler);
        let chart = &result.fan_chart;
        assert_eq!(chart.years, vec![0, 1]);
        for series in [&chart.p5, &chart.p25, &chart.p50, &chart.p75, &chart.p95] {
            assert_eq!(series, &vec![1000.0, 1000.0]);
        }
    }

    #[test]
    fn fan_chart_lengths_match_years() {
        let mut sampler = RngSampler::seeded(11);
        let result = project(&params(5, 0.07, 0.15, 50), &mut sampler);
        let chart = &result.fan_chart;
        assert_eq!(chart.years, (0..=5).collect::<Vec<u32>>());
        for series in [&chart.p5, &chart.p25, &chart.p50, &chart.p75, &chart.p95] {
            assert_eq!(series.len(), 6);
        }
    }

    #[test]
    fn fan_chart_is_ordered() {
        let mut sampler = RngSampler::seeded(5);
        let result = project(&params(10, 0.08, 0.2, 200), &mut sampler);
        let c = &result.fan_chart;
        for i in 0..c.years.len() {
            assert!(c.p5[i] <= c.p25[i]);
            assert!(c.p25[i] <= c.p50[i]);
            assert!(c.p50[i] <= c.p75[i]);
            assert!(c.p75[i] <= c.p95[i]);
        }
    }

    #[test]
    fn zero_years_gives_single_point() {
        let mut sampler = RngSampler::seeded(5);
        let result = project(&params(0, 0.08, 0.2, 10), &mut sampler);
        assert_eq!(result.fan_chart.years, vec![0]);
        assert_eq!(result.fan_chart.p50, vec![1000.0]);
    }

    #[test]
    fn zero_iterations_treated_as_one() {
        let mut sampler = SequenceSampler::constant();
        let result = project(&params(2, 0.12, 0.0, 0), &mut sampler);
        assert_eq!(result.fan_chart.p5, result.fan_chart.p95);
        assert_eq!(result.fan_chart.p50.len(), 3);
    }

    #[test]
    fn contributions_accumulate_without_growth() {
        let p = ProjectionParams {
            annual_contribution: 1200.0,
            ..params(2, 0.0, 0.0, 3)
        };
        let mut sampler = SequenceSampler::constant();
        let result = project(&p, &mut sampler);
        assert_abs_diff_eq!(result.fan_chart.p50[1], 2200.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.fan_chart.p50[2], 3400.0, epsilon = 1e-9);
    }

    #[test]
    fn scenario_path_lengths_follow_granularity() {
        let mut sampler = RngSampler::seeded(9);
        let monthly = project(&params(1, 0.05, 0.1, 10), &mut sampler);
        assert_eq!(monthly.short_term_paths.len(), 13);
        assert_eq!(monthly.one_month_paths.len(), 22);

        let daily = project(
            &ProjectionParams {
                time_unit: TimeUnit::Day,
                ..params(1, 0.05, 0.1, 10)
            },
            &mut sampler,
        );
        assert_eq!(daily.short_term_paths.len(), 253);
        assert_eq!(daily.one_month_paths.len(), 22);

        let yearly = project(
            &ProjectionParams {
                time_unit: TimeUnit::Year,
                ..params(1, 0.05, 0.1, 10)
            },
            &mut sampler,
        );
        assert!(yearly.short_term_paths.is_empty());
        assert_eq!(yearly.one_month_paths.len(), 22);
    }

    #[test]
    fn scenario_steps_are_indexed_from_zero() {
        let mut sampler = RngSampler::seeded(1);
        let result = project(&params(1, 0.05, 0.1, 10), &mut sampler);
        for (i, point) in result.one_month_paths.iter().enumerate() {
            assert_eq!(point.step, i);
        }
        assert_eq!(result.one_month_paths[0].best, 1000.0);
    }

    #[test]
    fn median_pick_is_nearest_to_p50_by_exhaustive_scan() {
        let mut sampler = RngSampler::seeded(2024);
        let paths = simulate_paths(100.0, 12, 0.005, 0.04, 0.0, 25, &mut sampler);
        let picks = select_representative(&paths);

        let finals: Vec<f64> = paths.iter().map(|p| *p.last().unwrap()).collect();
        let target = crate::domain::stats::percentile(&finals, 50.0);
        let chosen = (finals[picks.median] - target).abs();
        for f in &finals {
            assert!(chosen <= (f - target).abs());
        }
    }

    #[test]
    fn single_path_selects_itself_everywhere() {
        let mut sampler = RngSampler::seeded(8);
        let paths = simulate_paths(100.0, 5, 0.01, 0.1, 0.0, 1, &mut sampler);
        let picks = select_representative(&paths);
        assert_eq!(
            picks,
            RepresentativePaths {
                best: 0,
                worst: 0,
                median: 0,
                volatile: 0
            }
        );
    }

    #[test]
    fn volatile_pick_has_largest_return_std() {
        let paths = vec![
            vec![100.0, 101.0, 102.0],
            vec![100.0, 120.0, 90.0],
            vec![100.0, 100.0, 100.0],
        ];
        let picks = select_representative(&paths);
        assert_eq!(picks.volatile, 1);
        assert_eq!(picks.best, 0);
        assert_eq!(picks.worst, 1);
    }

    #[test]
    fn zero_start_returns_do_not_poison_volatility() {
        assert_abs_diff_eq!(path_return_volatility(&[0.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn time_unit_parses() {
        assert_eq!("Day".parse::<TimeUnit>().unwrap(), TimeUnit::Day);
        assert_eq!(" month ".parse::<TimeUnit>().unwrap(), TimeUnit::Month);
        assert!("week".parse::<TimeUnit>().is_err());
    }

    fn not_above(lower: f64, upper: f64) -> bool {
        lower <= upper + 1e-9 * upper.abs().max(1.0)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn fan_chart_bands_never_cross(
            mean in -0.2f64..0.3,
            vol in 0.0f64..0.6,
            iterations in 1usize..80,
            years in 0u32..6,
            contribution in -500.0f64..5000.0,
            seed in any::<u64>(),
        ) {
            let p = ProjectionParams {
                annual_contribution: contribution,
                time_unit: TimeUnit::Year,
                ..params(years, mean, vol, iterations)
            };
            let result = project(&p, &mut RngSampler::seeded(seed));
            let c = &result.fan_chart;
            prop_assert_eq!(c.p50.len(), years as usize + 1);
            for i in 0..c.years.len() {
                prop_assert!(not_above(c.p5[i], c.p25[i]));
                prop_assert!(not_above(c.p25[i], c.p50[i]));
                prop_assert!(not_above(c.p50[i], c.p75[i]));
                prop_assert!(not_above(c.p75[i], c.p95[i]));
            }
        }
    }
}
