//! Shared helpers for integration tests

#![allow(dead_code)]

use chrono::NaiveDate;
use leasebook::LeaseConfig;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[track_caller]
pub fn assert_close(actual: f64, expected: f64, tol: f64, label: &str) {
    assert!(
        (actual - expected).abs() < tol,
        "{}: expected {}, got {}",
        label,
        expected,
        actual
    );
}

/// A three-year office lease paid monthly in arrears
pub const OFFICE_LEASE: &str = r#"
name: "Head Office"
description: "office space in the city centre"
start_date: 2025-01-01
term_months: 36
payment: 10000
discount_rate: 5.0
direct_costs: 2000
incentives: 1500
reporting_date: 2025-12-31
"#;

pub fn office_lease() -> LeaseConfig {
    LeaseConfig::from_yaml(OFFICE_LEASE).unwrap()
}

pub fn lease_with(extra: &str) -> LeaseConfig {
    LeaseConfig::from_yaml(&format!("{}{}", OFFICE_LEASE, extra)).unwrap()
}
