//! Loan repayment schedule for user liabilities.
//!
//! During a grace period only interest is due; afterwards the full principal
//! is amortised over the remaining term.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiabilityRecord {
    pub name: String,
    pub category: String,
    pub amount: f64,
    /// Annual rate in percent (5.0 = 5%).
    pub interest_rate: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub years: Option<u32>,
    pub grace_period_months: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanPayment {
    pub label: String,
    pub monthly_payment: f64,
    pub interest_only: bool,
}

fn months_elapsed(start: NaiveDate, as_of: NaiveDate) -> i64 {
    (as_of.year() - start.year()) as i64 * 12 + (as_of.month() as i64 - start.month() as i64)
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Standard annuity payment for `principal` at `monthly_rate` over `n` months.
pub fn amortized_payment(principal: f64, monthly_rate: f64, n: u32) -> f64 {
    if n == 0 {
        return principal;
    }
    if monthly_rate == 0.0 {
        return principal / n as f64;
    }
    let discount = (1.0 + monthly_rate).powf(-(n as f64));
    principal * monthly_rate / (1.0 - discount)
}

/// Monthly repayment due on `as_of`. `None` when the loan has no term.
pub fn monthly_payment(liability: &LiabilityRecord, as_of: NaiveDate) -> Option<LoanPayment> {
    let years = liability.years.filter(|&y| y > 0)?;
    let annual_rate = liability.interest_rate.unwrap_or(0.0);
    let monthly_rate = annual_rate / 100.0 / 12.0;
    let grace = liability.grace_period_months;

    let in_grace = match liability.start_date {
        Some(start) if grace > 0 => months_elapsed(start, as_of) < grace as i64,
        _ => false,
    };

    let (payment, suffix) = if in_grace {
        (liability.amount * monthly_rate, " (Interest Only)")
    } else {
        let total_months = years.saturating_mul(12);
        let amortization_months = if total_months > grace {
            total_months - grace
        } else {
            total_months
        };
        (
            amortized_payment(liability.amount, monthly_rate, amortization_months),
            "",
        )
    };

    Some(LoanPayment {
        label: format!("Debt Repayment: {}{}", liability.name, suffix),
        monthly_payment: round_cents(payment),
        interest_only: in_grace,
    })
}
