//! Configuration validation.
//!
//! Validates all config fields before the engine runs.

use crate::domain::error::FincastError;
use crate::domain::monte_carlo::TimeUnit;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), FincastError> {
    validate_as_of(config)?;
    validate_timeout(config)?;
    validate_forecast_config(config)?;
    validate_goals_config(config)?;
    Ok(())
}

pub fn validate_forecast_config(config: &dyn ConfigPort) -> Result<(), FincastError> {
    validate_non_negative_int(config, "forecast", "years")?;
    validate_iterations(config)?;
    validate_backtest_years(config)?;
    validate_time_unit(config)?;
    validate_money(config, "forecast", "initial_portfolio")?;
    validate_finite(config, "forecast", "annual_contribution")?;
    validate_seed(config)?;
    Ok(())
}

pub fn validate_goals_config(config: &dyn ConfigPort) -> Result<(), FincastError> {
    validate_non_negative_int(config, "goals", "years")?;
    validate_finite(config, "goals", "annual_contribution")?;
    if config.get_int("goals", "paths", 1000) < 1 {
        return Err(invalid("goals", "paths", "paths must be at least 1"));
    }
    Ok(())
}

/// `[portfolio] as_of`, or `today` when unset.
pub fn as_of_date(config: &dyn ConfigPort, today: NaiveDate) -> Result<NaiveDate, FincastError> {
    match config.get_string("portfolio", "as_of") {
        None => Ok(today),
        Some(s) if s.trim().is_empty() => Ok(today),
        Some(s) => parse_date(&s, "portfolio", "as_of"),
    }
}

pub fn parse_date(value: &str, section: &str, key: &str) -> Result<NaiveDate, FincastError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| FincastError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: format!("invalid {key} format, expected YYYY-MM-DD"),
    })
}

fn invalid(section: &str, key: &str, reason: &str) -> FincastError {
    FincastError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_as_of(config: &dyn ConfigPort) -> Result<(), FincastError> {
    match config.get_string("portfolio", "as_of") {
        Some(s) if !s.trim().is_empty() => parse_date(&s, "portfolio", "as_of").map(|_| ()),
        _ => Ok(()),
    }
}

fn validate_timeout(config: &dyn ConfigPort) -> Result<(), FincastError> {
    if config.get_int("market_data", "timeout_secs", 10) <= 0 {
        return Err(invalid(
            "market_data",
            "timeout_secs",
            "timeout_secs must be positive",
        ));
    }
    Ok(())
}

fn validate_non_negative_int(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<(), FincastError> {
    if config.get_int(section, key, 0) < 0 {
        return Err(invalid(section, key, &format!("{key} must be non-negative")));
    }
    Ok(())
}

fn validate_money(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), FincastError> {
    let value = config.get_double(section, key, 0.0);
    if !value.is_finite() || value < 0.0 {
        return Err(invalid(section, key, &format!("{key} must be a non-negative amount")));
    }
    Ok(())
}

/// Negative values are withdrawals.
fn validate_finite(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), FincastError> {
    if !config.get_double(section, key, 0.0).is_finite() {
        return Err(invalid(section, key, &format!("{key} must be a finite amount")));
    }
    Ok(())
}

fn validate_iterations(config: &dyn ConfigPort) -> Result<(), FincastError> {
    if config.get_int("forecast", "iterations", 1000) < 1 {
        return Err(invalid(
            "forecast",
            "iterations",
            "iterations must be at least 1",
        ));
    }
    Ok(())
}

fn validate_backtest_years(config: &dyn ConfigPort) -> Result<(), FincastError> {
    if config.get_int("forecast", "backtest_years", 10) < 1 {
        return Err(invalid(
            "forecast",
            "backtest_years",
            "backtest_years must be at least 1",
        ));
    }
    Ok(())
}

fn validate_time_unit(config: &dyn ConfigPort) -> Result<(), FincastError> {
    match config.get_string("forecast", "time_unit") {
        Some(s) => s
            .parse::<TimeUnit>()
            .map(|_| ())
            .map_err(|reason| invalid("forecast", "time_unit", &reason)),
        None => Ok(()),
    }
}

fn validate_seed(config: &dyn ConfigPort) -> Result<(), FincastError> {
    match config.get_string("forecast", "seed") {
        Some(s) if s.trim().parse::<u64>().is_err() => Err(invalid(
            "forecast",
            "seed",
            "seed must be a non-negative integer",
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()
    }

    #[test]
    fn valid_config_passes() {
        let config = make_config(
            r#"
[portfolio]
holdings = holdings.csv
as_of = 2026-01-01

[market_data]
data_dir = data
timeout_secs = 5

[forecast]
initial_portfolio = 1000000
annual_contribution = 120000
years = 20
iterations = 500
time_unit = day
backtest_years = 5
seed = 42

[goals]
years = 25
paths = 200
"#,
        );
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = make_config("");
        assert!(validate_config(&config).is_ok());
        assert_eq!(as_of_date(&config, today()).unwrap(), today());
    }

    #[test]
    fn zero_iterations_fails() {
        let config = make_config("[forecast]\niterations = 0\n");
        let err = validate_config(&config).unwrap_err();
        assert!(
            matches!(err, FincastError::ConfigInvalid { ref key, .. } if key == "iterations")
        );
    }

    #[test]
    fn negative_years_fails() {
        let config = make_config("[forecast]\nyears = -1\n");
        assert!(validate_forecast_config(&config).is_err());
        let config = make_config("[goals]\nyears = -3\n");
        assert!(validate_goals_config(&config).is_err());
    }

    #[test]
    fn zero_years_is_allowed() {
        let config = make_config("[forecast]\nyears = 0\n");
        assert!(validate_forecast_config(&config).is_ok());
    }

    #[test]
    fn backtest_years_must_be_positive() {
        let config = make_config("[forecast]\nbacktest_years = 0\n");
        assert!(validate_forecast_config(&config).is_err());
    }

    #[test]
    fn unknown_time_unit_fails() {
        let config = make_config("[forecast]\ntime_unit = fortnight\n");
        let err = validate_forecast_config(&config).unwrap_err();
        assert!(err.to_string().contains("fortnight"));
    }

    #[test]
    fn zero_timeout_fails() {
        let config = make_config("[market_data]\ntimeout_secs = 0\n");
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn bad_as_of_fails() {
        let config = make_config("[portfolio]\nas_of = 01/02/2026\n");
        assert!(validate_config(&config).is_err());
        assert!(as_of_date(&config, today()).is_err());
    }

    #[test]
    fn as_of_is_read() {
        let config = make_config("[portfolio]\nas_of = 2025-06-30\n");
        assert_eq!(
            as_of_date(&config, today()).unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()
        );
    }

    #[test]
    fn negative_contribution_is_a_withdrawal() {
        let config = make_config("[forecast]\nannual_contribution = -5\n");
        assert!(validate_forecast_config(&config).is_ok());
        let config = make_config("[goals]\nannual_contribution = -24000\n");
        assert!(validate_goals_config(&config).is_ok());
    }

    #[test]
    fn negative_initial_portfolio_fails() {
        let config = make_config("[forecast]\ninitial_portfolio = -5\n");
        assert!(validate_forecast_config(&config).is_err());
    }

    #[test]
    fn infinite_contribution_fails() {
        let config = make_config("[goals]\nannual_contribution = inf\n");
        assert!(validate_goals_config(&config).is_err());
    }

    #[test]
    fn non_numeric_seed_fails() {
        let config = make_config("[forecast]\nseed = abc\n");
        assert!(validate_forecast_config(&config).is_err());
        let config = make_config("[forecast]\nseed = 7\n");
        assert!(validate_forecast_config(&config).is_ok());
    }

    #[test]
    fn zero_goal_paths_fails() {
        let config = make_config("[goals]\npaths = 0\n");
        assert!(validate_goals_config(&config).is_err());
    }
}
