//! Recognition exemptions for short-term and low-value leases

use crate::core::depreciation::add_months;
use crate::core::measurement::round_cents;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest term that still qualifies as a short-term lease
pub const SHORT_TERM_MAX_MONTHS: u32 = 12;

/// Why a lease is kept off balance sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExemptionReason {
    LowValue,
    ShortTerm,
}

impl fmt::Display for ExemptionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExemptionReason::LowValue => f.write_str("Low-value lease (IFRS 16.5)"),
            ExemptionReason::ShortTerm => f.write_str("Short-term lease (IFRS 16.6)"),
        }
    }
}

/// One month of straight-line lease expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRow {
    pub period: u32,
    pub date: NaiveDate,
    pub lease_expense: f64,
}

/// A lease accounted for as a straight-line expense
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExemptLease {
    pub reasons: Vec<ExemptionReason>,
    /// Straight-line expense recognised each month
    pub monthly_expense: f64,
    pub schedule: Vec<ExpenseRow>,
}

impl ExemptLease {
    /// Spread the scheduled payment stream evenly over its months.
    ///
    /// `payments` is the monthly-aligned stream after frequency, so quarterly
    /// and annual leases expense the cash actually paid. The last month takes
    /// the rounding remainder.
    pub fn new(start_date: NaiveDate, payments: &[f64], reasons: Vec<ExemptionReason>) -> Self {
        let total = round_cents(payments.iter().sum());
        let months = payments.len();
        let monthly_expense = if months == 0 {
            0.0
        } else {
            round_cents(total / months as f64)
        };

        let schedule = (0..months)
            .map(|i| {
                let lease_expense = if i + 1 == months {
                    round_cents(total - monthly_expense * (months - 1) as f64)
                } else {
                    monthly_expense
                };
                ExpenseRow {
                    period: i as u32 + 1,
                    date: add_months(start_date, i as u32),
                    lease_expense,
                }
            })
            .collect();

        Self {
            reasons,
            monthly_expense,
            schedule,
        }
    }

    /// Reasons joined for display
    pub fn reason_text(&self) -> String {
        self.reasons
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join(" and ")
    }

    pub fn total_expense(&self) -> f64 {
        self.schedule.iter().map(|r| r.lease_expense).sum()
    }

    /// Monthly journal lines as (account, amount)
    pub fn monthly_journal(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("Dr Lease Expense", self.monthly_expense),
            ("Cr Cash/Accrued Lease Payments", self.monthly_expense),
        ]
    }
}
