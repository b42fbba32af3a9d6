//! Quality assurance checks over a generated schedule

use crate::core::{DepreciationMethod, LeaseSchedule};
use serde::{Deserialize, Serialize};

const CLOSE: f64 = 0.01;
const TOTAL_TOLERANCE: f64 = 1.0;

/// Outcome of a single check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckStatus {
    Pass,
    Fail,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaCheck {
    pub name: String,
    pub status: CheckStatus,
    pub detail: Option<String>,
}

impl QaCheck {
    fn pass(name: &str) -> Self {
        Self { name: name.to_string(), status: CheckStatus::Pass, detail: None }
    }

    fn fail(name: &str, detail: String) -> Self {
        Self { name: name.to_string(), status: CheckStatus::Fail, detail: Some(detail) }
    }

    fn warn(name: &str, detail: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            detail: Some(detail.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QaReport {
    pub checks: Vec<QaCheck>,
}

impl QaReport {
    /// Warnings never fail a report
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|c| c.status != CheckStatus::Fail)
    }

    pub fn failures(&self) -> impl Iterator<Item = &QaCheck> {
        self.checks.iter().filter(|c| c.status == CheckStatus::Fail)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &QaCheck> {
        self.checks.iter().filter(|c| c.status == CheckStatus::Warning)
    }
}

/// Options for [`run_qa_checks`]
#[derive(Debug, Clone, Copy, Default)]
pub struct QaOptions {
    pub residual_value: f64,
    /// Verify an even monthly charge when the asset is depreciated straight-line
    pub method: Option<DepreciationMethod>,
}

/// Run the schedule checks.
pub fn run_qa_checks(schedule: &LeaseSchedule, options: QaOptions) -> QaReport {
    let mut checks = Vec::new();

    let (Some(first), Some(last)) = (schedule.first(), schedule.last()) else {
        checks.push(QaCheck::fail("Schedule has rows", "Schedule is empty".to_string()));
        return QaReport { checks };
    };

    let name = "Liability amortizes to zero";
    if last.closing_liability.abs() < CLOSE {
        checks.push(QaCheck::pass(name));
    } else {
        checks.push(QaCheck::fail(
            name,
            format!("Closing liability is {:.2} at lease end", last.closing_liability),
        ));
    }

    let name = "ROU asset depreciates to residual value";
    if (last.rou_balance - options.residual_value).abs() < CLOSE {
        checks.push(QaCheck::pass(name));
    } else {
        checks.push(QaCheck::fail(
            name,
            format!(
                "ROU balance is {:.2} at lease end, expected {:.2}",
                last.rou_balance, options.residual_value
            ),
        ));
    }

    // Opening asset is the first balance before its own charge
    let name = "Depreciation adds up to ROU asset";
    let depreciable = first.rou_balance + first.depreciation - options.residual_value;
    let total = schedule.total_depreciation();
    if (total - depreciable).abs() <= TOTAL_TOLERANCE {
        checks.push(QaCheck::pass(name));
    } else {
        checks.push(QaCheck::fail(
            name,
            format!(
                "Total depreciation ({:.0}) differs from depreciable amount ({:.0})",
                total, depreciable
            ),
        ));
    }

    if options.method == Some(DepreciationMethod::StraightLine) && schedule.len() > 1 {
        let name = "Straight-line depreciation verified";
        let rows = &schedule.rows()[..schedule.len() - 1];
        let mean = rows.iter().map(|r| r.depreciation).sum::<f64>() / rows.len() as f64;
        if rows.iter().all(|r| (r.depreciation - mean).abs() < CLOSE) {
            checks.push(QaCheck::pass(name));
        } else {
            checks.push(QaCheck::fail(
                name,
                "Monthly depreciation is not constant".to_string(),
            ));
        }
    }

    let mut payments: Vec<f64> = schedule.rows().iter().map(|r| r.payment).collect();
    payments.sort_by(|a, b| a.total_cmp(b));
    let mut distinct = payments.clone();
    distinct.dedup_by(|a, b| (*a - *b).abs() < CLOSE);

    if distinct.len() > 1 {
        checks.push(QaCheck::warn(
            "Payments are constant",
            "Payments vary month-to-month - CPI or modification logic should be confirmed.",
        ));
    }
    if schedule.len() > 1 && distinct.len() == payments.len() {
        checks.push(QaCheck::warn(
            "Payments repeat",
            "All payments are different - did you intend CPI-linked escalation?",
        ));
    }

    QaReport { checks }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        calculate_lease_liability, generate_lease_schedule, generate_variable_payments,
        PaymentTiming, ScheduleRequest,
    };
    use chrono::NaiveDate;

    fn build(payments: &[f64], residual: f64) -> LeaseSchedule {
        let liability = calculate_lease_liability(payments, 0.05, PaymentTiming::End).unwrap();
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let request = ScheduleRequest::new(start, payments, 0.05, payments.len() as u32, liability)
            .with_residual_value(residual);
        generate_lease_schedule(&request).unwrap().0
    }

    #[test]
    fn test_clean_schedule_passes() {
        let schedule = build(&vec![1000.0; 24], 0.0);
        let report = run_qa_checks(
            &schedule,
            QaOptions { residual_value: 0.0, method: Some(DepreciationMethod::StraightLine) },
        );
        assert!(report.passed(), "{:?}", report);
        assert_eq!(report.warnings().count(), 0);
        assert_eq!(report.checks.len(), 4);
    }

    #[test]
    fn test_residual_value_respected() {
        let mut payments = vec![1000.0; 12];
        payments[11] += 2000.0;
        let schedule = build(&payments, 2000.0);

        let report = run_qa_checks(&schedule, QaOptions { residual_value: 2000.0, method: None });
        assert!(report.passed(), "{:?}", report);

        let report = run_qa_checks(&schedule, QaOptions::default());
        assert!(!report.passed());
        assert_eq!(report.failures().count(), 2);
    }

    #[test]
    fn test_escalating_payments_warn() {
        let payments = generate_variable_payments(1000.0, 12, &[], 5.0);
        let schedule = build(&payments, 0.0);
        let report = run_qa_checks(&schedule, QaOptions::default());
        assert!(report.passed());
        assert_eq!(report.warnings().count(), 2);
    }

    #[test]
    fn test_tampered_schedule_fails() {
        let schedule = build(&vec![1000.0; 12], 0.0);
        let mut rows = schedule.into_rows();
        rows.last_mut().unwrap().closing_liability = 150.0;
        let report = run_qa_checks(&LeaseSchedule::new(rows), QaOptions::default());
        assert!(!report.passed());
        assert_eq!(report.failures().next().unwrap().name, "Liability amortizes to zero");
    }

    #[test]
    fn test_empty_schedule_fails() {
        let report = run_qa_checks(&LeaseSchedule::default(), QaOptions::default());
        assert!(!report.passed());
    }
}
