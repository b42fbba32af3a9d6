//! Lease amortisation schedule

use crate::core::depreciation::{generate_depreciation_schedule, DepreciationMethod};
use crate::core::error::{LeaseError, LeaseResult};
use crate::core::measurement::{calculate_lease_liability, round_cents};
use crate::core::payments::PaymentTiming;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// One month of the amortisation schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaseRow {
    pub period: u32,
    pub date: NaiveDate,
    pub payment: f64,
    pub interest: f64,
    pub principal: f64,
    pub closing_liability: f64,
    pub depreciation: f64,
    pub rou_balance: f64,
    pub total_expense: f64,
}

/// Headline amounts of a generated schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleMetrics {
    pub initial_liability: f64,
    pub rou_asset: f64,
    pub total_payments: f64,
    pub total_interest: f64,
    /// Annual discount rate as a fraction
    pub effective_interest_rate: f64,
    pub depreciation_method: DepreciationMethod,
    pub residual_value: f64,
}

/// Ordered monthly rows of a lease
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeaseSchedule {
    rows: Vec<LeaseRow>,
}

impl LeaseSchedule {
    pub fn new(rows: Vec<LeaseRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[LeaseRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<LeaseRow> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first(&self) -> Option<&LeaseRow> {
        self.rows.first()
    }

    pub fn last(&self) -> Option<&LeaseRow> {
        self.rows.last()
    }

    pub fn total_payments(&self) -> f64 {
        self.rows.iter().map(|r| r.payment).sum()
    }

    pub fn total_interest(&self) -> f64 {
        self.rows.iter().map(|r| r.interest).sum()
    }

    pub fn total_depreciation(&self) -> f64 {
        self.rows.iter().map(|r| r.depreciation).sum()
    }

    /// Rows dated strictly before `date`
    pub fn rows_before(&self, date: NaiveDate) -> impl Iterator<Item = &LeaseRow> {
        self.rows.iter().filter(move |r| r.date < date)
    }

    /// Rows falling in a calendar year
    pub fn rows_in_year(&self, year: i32) -> impl Iterator<Item = &LeaseRow> {
        self.rows.iter().filter(move |r| r.date.year() == year)
    }

    /// Whether any row falls in a calendar year
    pub fn has_year(&self, year: i32) -> bool {
        self.rows.iter().any(|r| r.date.year() == year)
    }
}

/// Inputs for [`generate_lease_schedule`]
#[derive(Debug, Clone)]
pub struct ScheduleRequest<'a> {
    pub start_date: NaiveDate,
    pub payments: &'a [f64],
    /// Annual discount rate as a fraction (0.05 for 5%)
    pub discount_rate: f64,
    pub term_months: u32,
    pub rou_asset: f64,
    pub depreciation_method: DepreciationMethod,
    pub residual_value: f64,
    pub timing: PaymentTiming,
}

impl<'a> ScheduleRequest<'a> {
    /// Request with straight-line depreciation, no residual, payments in arrears
    pub fn new(
        start_date: NaiveDate,
        payments: &'a [f64],
        discount_rate: f64,
        term_months: u32,
        rou_asset: f64,
    ) -> Self {
        Self {
            start_date,
            payments,
            discount_rate,
            term_months,
            rou_asset,
            depreciation_method: DepreciationMethod::StraightLine,
            residual_value: 0.0,
            timing: PaymentTiming::End,
        }
    }

    pub fn with_depreciation(mut self, method: DepreciationMethod) -> Self {
        self.depreciation_method = method;
        self
    }

    pub fn with_residual_value(mut self, residual_value: f64) -> Self {
        self.residual_value = residual_value;
        self
    }

    pub fn with_timing(mut self, timing: PaymentTiming) -> Self {
        self.timing = timing;
        self
    }
}

/// Generate the monthly amortisation schedule using the effective interest method.
pub fn generate_lease_schedule(
    request: &ScheduleRequest<'_>,
) -> LeaseResult<(LeaseSchedule, ScheduleMetrics)> {
    if request.payments.len() != request.term_months as usize {
        return Err(LeaseError::TermMismatch {
            payments: request.payments.len(),
            term_months: request.term_months,
        });
    }

    let liability =
        calculate_lease_liability(request.payments, request.discount_rate, request.timing)?;
    let monthly_rate = request.discount_rate / 12.0;
    let depreciation = generate_depreciation_schedule(
        request.start_date,
        request.term_months,
        request.rou_asset,
        request.depreciation_method,
        request.residual_value,
    )?;

    let mut rows = Vec::with_capacity(depreciation.len());
    let mut remaining = liability;
    let last_instalment = request.payments.iter().rposition(|p| *p > 0.0);

    for (i, (payment, depr)) in request.payments.iter().zip(depreciation).enumerate() {
        let (interest, principal) = if Some(i) == last_instalment {
            // Final instalment settles whatever cent drift is left
            let principal = remaining;
            (round_cents(payment - principal), principal)
        } else {
            let interest_base = match request.timing {
                PaymentTiming::End => remaining,
                PaymentTiming::Beginning => remaining - payment,
            };
            let interest = round_cents(interest_base * monthly_rate);
            (interest, round_cents(payment - interest))
        };
        remaining = round_cents(remaining - principal).max(0.0);

        rows.push(LeaseRow {
            period: depr.period,
            date: depr.date,
            payment: *payment,
            interest,
            principal,
            closing_liability: remaining,
            depreciation: depr.depreciation,
            rou_balance: depr.balance,
            total_expense: round_cents(interest + depr.depreciation),
        });
    }

    let schedule = LeaseSchedule::new(rows);
    let metrics = ScheduleMetrics {
        initial_liability: liability,
        rou_asset: request.rou_asset,
        total_payments: round_cents(request.payments.iter().sum()),
        total_interest: round_cents(schedule.total_interest()),
        effective_interest_rate: request.discount_rate,
        depreciation_method: request.depreciation_method,
        residual_value: request.residual_value,
    };

    Ok((schedule, metrics))
}
