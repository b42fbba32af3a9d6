//! Lease modification and remeasurement

use crate::core::depreciation::DepreciationMethod;
use crate::core::error::{LeaseError, LeaseResult};
use crate::core::measurement::{calculate_lease_liability, calculate_right_of_use_asset, round_cents};
use crate::core::payments::PaymentTiming;
use crate::core::schedule::{generate_lease_schedule, LeaseSchedule, ScheduleRequest};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Revised terms taking effect at a modification date
#[derive(Debug, Clone)]
pub struct ModificationRequest<'a> {
    pub modification_date: NaiveDate,
    pub new_payments: &'a [f64],
    /// Revised annual discount rate as a fraction
    pub new_discount_rate: f64,
    /// Carrying amount of the ROU asset to use instead of the schedule balance
    pub rou_asset_remaining: Option<f64>,
    pub direct_costs: f64,
    pub incentives: f64,
    pub depreciation_method: DepreciationMethod,
    pub residual_value: f64,
    pub timing: PaymentTiming,
}

impl<'a> ModificationRequest<'a> {
    pub fn new(modification_date: NaiveDate, new_payments: &'a [f64], new_discount_rate: f64) -> Self {
        Self {
            modification_date,
            new_payments,
            new_discount_rate,
            rou_asset_remaining: None,
            direct_costs: 0.0,
            incentives: 0.0,
            depreciation_method: DepreciationMethod::StraightLine,
            residual_value: 0.0,
            timing: PaymentTiming::End,
        }
    }
}

/// Result of remeasuring a lease at a modification date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModificationOutcome {
    pub modification_date: NaiveDate,

    /// Pre-modification rows followed by the remeasured rows
    pub schedule: LeaseSchedule,

    /// Number of rows kept from the original schedule
    pub pre_modification_rows: usize,

    /// Liability carried immediately before the modification
    pub opening_liability: f64,

    /// ROU asset carried immediately before the modification
    pub opening_rou: f64,

    /// Present value of the revised payments
    pub remeasured_liability: f64,

    /// ROU asset the revised schedule depreciates
    pub remeasured_rou: f64,
}

impl ModificationOutcome {
    /// Change in the lease liability caused by the modification
    pub fn liability_adjustment(&self) -> f64 {
        round_cents(self.remeasured_liability - self.opening_liability)
    }

    /// Change in the ROU asset caused by the modification
    pub fn rou_adjustment(&self) -> f64 {
        round_cents(self.remeasured_rou - self.opening_rou)
    }

    /// Rows generated under the revised terms
    pub fn post_modification(&self) -> &[crate::core::LeaseRow] {
        &self.schedule.rows()[self.pre_modification_rows..]
    }
}

/// Cut the original schedule at the modification date and continue it with a
/// schedule under the revised terms.
///
/// The ROU asset carried forward is adjusted by the difference between the
/// remeasured ROU asset and the liability outstanding at the modification date.
pub fn handle_lease_modification(
    original: &LeaseSchedule,
    request: &ModificationRequest<'_>,
) -> LeaseResult<ModificationOutcome> {
    if request.new_payments.is_empty() {
        return Err(LeaseError::EmptyPayments);
    }

    let pre_mod: Vec<_> = original.rows_before(request.modification_date).cloned().collect();

    let (opening_liability, schedule_rou) = match pre_mod.last() {
        Some(row) => (row.closing_liability, row.rou_balance),
        None => (0.0, 0.0),
    };
    let opening_rou = request.rou_asset_remaining.unwrap_or(schedule_rou);

    let new_liability = calculate_lease_liability(
        request.new_payments,
        request.new_discount_rate,
        request.timing,
    )?;
    let new_rou =
        calculate_right_of_use_asset(new_liability, request.direct_costs, request.incentives, 0.0)?;
    let remeasured_rou = round_cents(opening_rou + (new_rou - opening_liability));

    debug!(
        opening_liability,
        opening_rou,
        new_liability,
        remeasured_rou,
        "Remeasuring lease at {}",
        request.modification_date
    );

    if remeasured_rou <= 0.0 {
        return Err(LeaseError::InvalidModification(format!(
            "Remeasured ROU asset must be positive (got {:.2})",
            remeasured_rou
        )));
    }

    let term_months = request.new_payments.len() as u32;
    let schedule_request = ScheduleRequest::new(
        request.modification_date,
        request.new_payments,
        request.new_discount_rate,
        term_months,
        remeasured_rou,
    )
    .with_depreciation(request.depreciation_method)
    .with_residual_value(request.residual_value)
    .with_timing(request.timing);
    let (new_schedule, _) = generate_lease_schedule(&schedule_request)?;

    let last_period = pre_mod.last().map(|row| row.period).unwrap_or(0);
    let pre_modification_rows = pre_mod.len();
    let mut rows = pre_mod;
    rows.extend(new_schedule.into_rows().into_iter().map(|mut row| {
        row.period += last_period;
        row
    }));

    Ok(ModificationOutcome {
        modification_date: request.modification_date,
        schedule: LeaseSchedule::new(rows),
        pre_modification_rows,
        opening_liability,
        opening_rou,
        remeasured_liability: new_liability,
        remeasured_rou,
    })
}
