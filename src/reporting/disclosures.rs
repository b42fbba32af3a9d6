//! Financial statement disclosures

use crate::core::{LeaseSchedule, round_cents};
use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Amounts for one financial year
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YearMetrics {
    pub depreciation: f64,
    pub interest: f64,
    pub principal_payments: f64,
    /// Principal falling due within a year of the reference date
    pub liability_current: f64,
    /// Principal falling due more than a year after the reference date
    pub liability_noncurrent: f64,
    /// ROU balance at the year's last schedule row
    pub rou_balance: f64,
}

/// Current and prior year amounts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaseMetrics {
    pub current_year: YearMetrics,
    pub prior_year: YearMetrics,
}

fn year_metrics(schedule: &LeaseSchedule, year: i32, reference: NaiveDate) -> YearMetrics {
    let mut metrics = YearMetrics::default();
    for row in schedule.rows_in_year(year) {
        metrics.depreciation += row.depreciation;
        metrics.interest += row.interest;
        metrics.principal_payments += row.principal;
        metrics.rou_balance = row.rou_balance;
    }

    let one_year_later = reference
        .checked_add_months(Months::new(12))
        .unwrap_or(NaiveDate::MAX);
    for row in schedule.rows() {
        if row.date > reference && row.date <= one_year_later {
            metrics.liability_current += row.principal;
        } else if row.date > one_year_later {
            metrics.liability_noncurrent += row.principal;
        }
    }

    YearMetrics {
        depreciation: round_cents(metrics.depreciation),
        interest: round_cents(metrics.interest),
        principal_payments: round_cents(metrics.principal_payments),
        liability_current: round_cents(metrics.liability_current),
        liability_noncurrent: round_cents(metrics.liability_noncurrent),
        rou_balance: metrics.rou_balance,
    }
}

/// Aggregate the schedule for the reporting year and the year before it.
///
/// Income statement amounts are calendar-year sums. The current / non-current
/// split of the liability is measured from the reporting date (and from the
/// same date a year earlier for the prior year).
pub fn calculate_lease_metrics(schedule: &LeaseSchedule, reporting_date: NaiveDate) -> LeaseMetrics {
    let prior_reference = reporting_date
        .checked_sub_months(Months::new(12))
        .unwrap_or(NaiveDate::MIN);

    LeaseMetrics {
        current_year: year_metrics(schedule, reporting_date.year(), reporting_date),
        prior_year: year_metrics(schedule, reporting_date.year() - 1, prior_reference),
    }
}

/// A statement with one column per reported year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementTable {
    pub title: String,
    /// Year headers, current year first
    pub years: Vec<i32>,
    /// Line description and one amount per year
    pub lines: Vec<(String, Vec<f64>)>,
}

/// Statement of financial position and statement of comprehensive income
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Disclosures {
    pub reporting_date: NaiveDate,
    pub metrics: LeaseMetrics,
    pub financial_position: StatementTable,
    pub comprehensive_income: StatementTable,
}

impl Disclosures {
    /// Build disclosures; the prior-year column only appears when the
    /// schedule has rows in that year.
    pub fn build(schedule: &LeaseSchedule, reporting_date: NaiveDate) -> Self {
        let metrics = calculate_lease_metrics(schedule, reporting_date);
        let year = reporting_date.year();
        let with_prior = schedule.has_year(year - 1);

        let mut years = vec![year];
        let mut columns = vec![&metrics.current_year];
        if with_prior {
            years.push(year - 1);
            columns.push(&metrics.prior_year);
        }

        let line = |label: &str, pick: fn(&YearMetrics) -> f64| {
            (label.to_string(), columns.iter().map(|m| pick(*m)).collect::<Vec<_>>())
        };

        let financial_position = StatementTable {
            title: "Statement of Financial Position".to_string(),
            years: years.clone(),
            lines: vec![
                line("Right-of-use assets", |m| m.rou_balance),
                line("Lease liabilities - current", |m| m.liability_current),
                line("Lease liabilities - non-current", |m| m.liability_noncurrent),
            ],
        };
        let comprehensive_income = StatementTable {
            title: "Statement of Comprehensive Income".to_string(),
            years,
            lines: vec![
                line("Depreciation expense", |m| m.depreciation),
                line("Interest expense", |m| m.interest),
            ],
        };

        Self {
            reporting_date,
            metrics,
            financial_position,
            comprehensive_income,
        }
    }
}
