//! Measurement and schedule calculations

mod common;

use common::{assert_close, date};
use leasebook::core::{
    calculate_lease_liability, calculate_right_of_use_asset, generate_lease_schedule,
    round_cents, DepreciationMethod, LeaseError, PaymentTiming, ScheduleRequest,
};

#[test]
fn test_cpi_escalation() {
    let term = 24;
    let cpi: f64 = 3.0;
    let payments: Vec<f64> = (0..term)
        .map(|m| round_cents(1000.0 * (1.0 + cpi / 100.0).powi(m / 12)))
        .collect();
    let liability = calculate_lease_liability(&payments, 0.05, PaymentTiming::End).unwrap();
    let rou = calculate_right_of_use_asset(liability, 0.0, 0.0, 0.0).unwrap();
    let (schedule, _) = generate_lease_schedule(&ScheduleRequest::new(
        date(2025, 1, 1),
        &payments,
        0.05,
        term as u32,
        rou,
    ))
    .unwrap();

    assert_close(
        schedule.total_payments(),
        payments.iter().sum(),
        1.0,
        "CPI total payments",
    );
    assert_eq!(schedule.rows()[12].payment, 1030.0);
}

#[test]
fn test_incentives_and_direct_costs() {
    let rou = calculate_right_of_use_asset(10000.0, 500.0, 300.0, 0.0).unwrap();
    assert_close(rou, 10200.0, 1.0, "ROU asset with adjustments");
}

#[test]
fn test_residual_value_guarantee() {
    let mut payments = vec![1000.0; 23];
    payments.push(1500.0);
    let liability = calculate_lease_liability(&payments, 0.06, PaymentTiming::End).unwrap();
    let rou = calculate_right_of_use_asset(liability, 0.0, 0.0, 0.0).unwrap();
    let (schedule, _) = generate_lease_schedule(&ScheduleRequest::new(
        date(2025, 1, 1),
        &payments,
        0.06,
        24,
        rou,
    ))
    .unwrap();

    assert_close(
        schedule.last().unwrap().payment,
        1500.0,
        1.0,
        "RVG included in final payment",
    );
}

#[test]
fn test_short_term_lease() {
    let payments = vec![2000.0; 6];
    let liability = calculate_lease_liability(&payments, 0.04, PaymentTiming::End).unwrap();
    let rou = calculate_right_of_use_asset(liability, 0.0, 0.0, 0.0).unwrap();
    let (schedule, _) =
        generate_lease_schedule(&ScheduleRequest::new(date(2025, 1, 1), &payments, 0.04, 6, rou))
            .unwrap();

    assert_eq!(schedule.len(), 6, "Short-term lease should have 6 rows");
    let last = schedule.last().unwrap();
    assert_close(last.closing_liability, 0.0, 1.0, "Short lease liability zero");
    assert_close(last.rou_balance, 0.0, 1.0, "Short lease ROU zero");
}

#[test]
fn test_reporting_date_depreciation() {
    let payments = vec![1000.0; 12];
    let liability = calculate_lease_liability(&payments, 0.05, PaymentTiming::End).unwrap();
    let rou = calculate_right_of_use_asset(liability, 0.0, 0.0, 0.0).unwrap();
    let (schedule, _) =
        generate_lease_schedule(&ScheduleRequest::new(date(2025, 1, 1), &payments, 0.05, 12, rou))
            .unwrap();

    let ytd: f64 = schedule
        .rows()
        .iter()
        .filter(|r| r.date <= date(2025, 6, 30))
        .map(|r| r.depreciation)
        .sum();
    assert!(ytd > 0.0, "Depreciation YTD must be non-zero for mid-year report");
}

#[test]
fn test_zero_discount_rate() {
    let payments = vec![1000.0; 12];
    let liability = calculate_lease_liability(&payments, 0.0, PaymentTiming::End).unwrap();
    assert_close(liability, 12000.0, 1.0, "Zero discount rate liability");
}

#[test]
fn test_rou_with_prepayments() {
    let rou = calculate_right_of_use_asset(12000.0, 500.0, 0.0, 1000.0).unwrap();
    assert_close(rou, 13500.0, 1.0, "ROU with prepayments");
}

#[test]
fn test_sum_of_years_digits_depreciation() {
    let payments = vec![4000.0; 6];
    let request = ScheduleRequest::new(date(2025, 1, 1), &payments, 0.05, 6, 24000.0)
        .with_depreciation(DepreciationMethod::SumOfYears);
    let (schedule, _) = generate_lease_schedule(&request).unwrap();

    assert_close(schedule.total_depreciation(), 24000.0, 1.0, "SOYD should fully depreciate asset");
    // Front-loaded: 6/21 of the asset in the first month
    assert_close(schedule.rows()[0].depreciation, 24000.0 * 6.0 / 21.0, 0.01, "SOYD first month");
}

#[test]
fn test_double_declining_depreciation() {
    let payments = vec![4000.0; 6];
    let request = ScheduleRequest::new(date(2025, 1, 1), &payments, 0.05, 6, 24000.0)
        .with_depreciation(DepreciationMethod::DoubleDeclining);
    let (schedule, _) = generate_lease_schedule(&request).unwrap();

    assert_close(
        schedule.total_depreciation(),
        24000.0,
        1.0,
        "Double-declining should fully depreciate asset",
    );
    assert_eq!(schedule.last().unwrap().rou_balance, 0.0);
}

#[test]
fn test_input_validation() {
    assert!(matches!(
        calculate_right_of_use_asset(-1000.0, 0.0, 0.0, 0.0),
        Err(LeaseError::InvalidInput(_))
    ));
    assert_eq!(
        calculate_lease_liability(&[], 0.05, PaymentTiming::End),
        Err(LeaseError::EmptyPayments)
    );
}
