//! Initial measurement of the lease liability and right-of-use asset

use crate::core::error::{LeaseError, LeaseResult};
use crate::core::payments::PaymentTiming;

/// Round a monetary amount to cents
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Measure the right-of-use asset at commencement.
///
/// ROU = liability + initial direct costs - incentives received + prepayments.
/// All inputs must be non-negative.
pub fn calculate_right_of_use_asset(
    liability: f64,
    direct_costs: f64,
    incentives: f64,
    prepayments: f64,
) -> LeaseResult<f64> {
    let amounts = [liability, direct_costs, incentives, prepayments];
    if amounts.iter().any(|x| *x < 0.0 || !x.is_finite()) {
        return Err(LeaseError::InvalidInput(
            "All financial inputs must be non-negative".to_string(),
        ));
    }
    Ok(round_cents(liability + direct_costs - incentives + prepayments))
}

/// Present value of a monthly payment stream at `annual_rate / 12`.
pub fn calculate_lease_liability(
    payments: &[f64],
    annual_rate: f64,
    timing: PaymentTiming,
) -> LeaseResult<f64> {
    if payments.is_empty() {
        return Err(LeaseError::EmptyPayments);
    }
    if annual_rate < 0.0 {
        return Err(LeaseError::NegativeRate);
    }

    let r = annual_rate / 12.0;
    if r == 0.0 {
        return Ok(round_cents(payments.iter().sum()));
    }

    let offset = match timing {
        PaymentTiming::End => 1,
        PaymentTiming::Beginning => 0,
    };
    let present_value: f64 = payments
        .iter()
        .enumerate()
        .map(|(k, payment)| payment / (1.0 + r).powi(k as i32 + offset))
        .sum();

    Ok(round_cents(present_value))
}
