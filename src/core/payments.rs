//! Lease payment streams

use crate::core::measurement::round_cents;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// When a payment falls within its period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentTiming {
    /// Paid in arrears, at the end of the period
    #[default]
    End,
    /// Paid in advance, at the start of the period
    Beginning,
}

/// How often a lease payment is made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentFrequency {
    #[default]
    Monthly,
    Quarterly,
    Annually,
}

impl PaymentFrequency {
    /// Number of months covered by one payment
    pub fn months_per_period(&self) -> u32 {
        match self {
            PaymentFrequency::Monthly => 1,
            PaymentFrequency::Quarterly => 3,
            PaymentFrequency::Annually => 12,
        }
    }
}

/// A one-off percentage change applied to the payment of a given month
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaymentAdjustment {
    /// Zero-based month index
    pub month: u32,

    /// Percentage change (e.g. 5.0 for +5%)
    pub percent: f64,
}

/// Build a monthly payment stream with CPI escalation and step adjustments.
///
/// CPI compounds monthly from the first month: month `m` is scaled by
/// `(1 + cpi/100)^((m + 1) / 12)`. An adjustment for month `m` is applied
/// on top of the CPI-scaled amount. When several adjustments name the same
/// month the last one wins.
pub fn generate_variable_payments(
    base_payment: f64,
    term_months: u32,
    adjustments: &[PaymentAdjustment],
    annual_cpi_percent: f64,
) -> Vec<f64> {
    let cpi_factor = (1.0 + annual_cpi_percent / 100.0).powf(1.0 / 12.0);
    let adjustments: HashMap<u32, f64> = adjustments
        .iter()
        .map(|adj| (adj.month, adj.percent))
        .collect();

    (0..term_months)
        .map(|m| {
            let mut payment = base_payment;
            if annual_cpi_percent != 0.0 {
                payment *= cpi_factor.powi(m as i32 + 1);
            }
            if let Some(pct) = adjustments.get(&m) {
                payment *= 1.0 + pct / 100.0;
            }
            round_cents(payment)
        })
        .collect()
}

/// Spread a monthly stream onto the months a payment actually falls due.
///
/// Months that are not payment months carry a zero payment so the stream
/// stays aligned with the monthly schedule.
pub fn apply_frequency(
    monthly: &[f64],
    frequency: PaymentFrequency,
    timing: PaymentTiming,
) -> Vec<f64> {
    let k = frequency.months_per_period() as usize;
    if k == 1 {
        return monthly.to_vec();
    }

    monthly
        .iter()
        .enumerate()
        .map(|(m, amount)| {
            let due = match timing {
                PaymentTiming::End => m % k == k - 1,
                PaymentTiming::Beginning => m % k == 0,
            };
            if due { *amount } else { 0.0 }
        })
        .collect()
}
