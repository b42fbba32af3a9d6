//! Right-of-use asset depreciation

use crate::core::error::{LeaseError, LeaseResult};
use crate::core::measurement::round_cents;
use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Depreciation pattern for the right-of-use asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepreciationMethod {
    #[default]
    StraightLine,
    /// Sum of the months' digits
    SumOfYears,
    DoubleDeclining,
}

impl DepreciationMethod {
    /// Identifier used in configuration and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            DepreciationMethod::StraightLine => "straight_line",
            DepreciationMethod::SumOfYears => "sum_of_years",
            DepreciationMethod::DoubleDeclining => "double_declining",
        }
    }

    /// Human-readable name for notes
    pub fn label(&self) -> &'static str {
        match self {
            DepreciationMethod::StraightLine => "straight-line",
            DepreciationMethod::SumOfYears => "sum-of-the-months'-digits",
            DepreciationMethod::DoubleDeclining => "double-declining balance",
        }
    }
}

impl fmt::Display for DepreciationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DepreciationMethod {
    type Err = LeaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "straight_line" => Ok(DepreciationMethod::StraightLine),
            "sum_of_years" => Ok(DepreciationMethod::SumOfYears),
            "double_declining" => Ok(DepreciationMethod::DoubleDeclining),
            other => Err(LeaseError::Config(format!(
                "Unknown depreciation method '{}'",
                other
            ))),
        }
    }
}

/// One month of depreciation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepreciationRow {
    pub period: u32,
    pub date: NaiveDate,
    pub depreciation: f64,
    pub balance: f64,
}

/// Add whole months, clamping to the last day of shorter months
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}

/// Generate the monthly depreciation schedule of a right-of-use asset.
///
/// The final month absorbs any rounding so that the asset is depreciated
/// exactly down to its residual value.
pub fn generate_depreciation_schedule(
    start_date: NaiveDate,
    term_months: u32,
    rou_asset: f64,
    method: DepreciationMethod,
    residual_value: f64,
) -> LeaseResult<Vec<DepreciationRow>> {
    if rou_asset <= 0.0 {
        return Err(LeaseError::InvalidAsset(rou_asset));
    }
    if residual_value < 0.0 || residual_value >= rou_asset {
        return Err(LeaseError::InvalidResidual(
            "Residual value must be non-negative and less than ROU asset".to_string(),
        ));
    }
    if term_months == 0 {
        return Err(LeaseError::InvalidInput(
            "Lease term must be at least one month".to_string(),
        ));
    }

    let term = term_months as f64;
    let depreciable_amount = rou_asset - residual_value;
    let sum_of_months = term * (term + 1.0) / 2.0;
    let declining_rate = 2.0 / term;

    let mut schedule = Vec::with_capacity(term_months as usize);
    let mut cumulative = 0.0;

    for i in 0..term_months {
        let mut depr = match method {
            DepreciationMethod::StraightLine => depreciable_amount / term,
            DepreciationMethod::SumOfYears => {
                let remaining = (term_months - i) as f64;
                remaining / sum_of_months * depreciable_amount
            }
            DepreciationMethod::DoubleDeclining => {
                let book_value = rou_asset - cumulative;
                let charge = book_value * declining_rate;
                if book_value - charge < residual_value {
                    book_value - residual_value
                } else {
                    charge
                }
            }
        };

        if i == term_months - 1 {
            depr = depreciable_amount - cumulative;
        }

        let depr = round_cents(depr);
        cumulative += depr;
        schedule.push(DepreciationRow {
            period: i + 1,
            date: add_months(start_date, i),
            depreciation: depr,
            balance: round_cents(rou_asset - cumulative),
        });
    }

    Ok(schedule)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    fn total(rows: &[DepreciationRow]) -> f64 {
        rows.iter().map(|r| r.depreciation).sum()
    }

    #[test]
    fn test_straight_line() {
        let rows =
            generate_depreciation_schedule(start(), 12, 1200.0, DepreciationMethod::StraightLine, 0.0)
                .unwrap();
        assert_eq!(rows.len(), 12);
        assert!(rows.iter().all(|r| r.depreciation == 100.0));
        assert_eq!(rows.last().unwrap().balance, 0.0);
    }

    #[test]
    fn test_final_month_absorbs_rounding() {
        let rows =
            generate_depreciation_schedule(start(), 3, 100.0, DepreciationMethod::StraightLine, 0.0)
                .unwrap();
        assert_eq!(rows[0].depreciation, 33.33);
        assert_eq!(rows[1].depreciation, 33.33);
        assert_eq!(rows[2].depreciation, 33.34);
        assert_eq!(rows[2].balance, 0.0);
    }

    #[test]
    fn test_sum_of_years_front_loads() {
        let rows =
            generate_depreciation_schedule(start(), 6, 24000.0, DepreciationMethod::SumOfYears, 0.0)
                .unwrap();
        assert!(rows[0].depreciation > rows[5].depreciation);
        assert!((total(&rows) - 24000.0).abs() < 0.01);
    }

    #[test]
    fn test_double_declining_stops_at_residual() {
        let rows = generate_depreciation_schedule(
            start(),
            6,
            24000.0,
            DepreciationMethod::DoubleDeclining,
            2000.0,
        )
        .unwrap();
        assert!((total(&rows) - 22000.0).abs() < 0.01);
        assert!(rows.iter().all(|r| r.balance >= 2000.0 - 0.01));
        assert_eq!(rows.last().unwrap().balance, 2000.0);
    }

    #[test]
    fn test_dates_clamp_to_month_end() {
        let jan31 = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        let rows =
            generate_depreciation_schedule(jan31, 3, 300.0, DepreciationMethod::StraightLine, 0.0)
                .unwrap();
        assert_eq!(rows[1].date, NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());
        assert_eq!(rows[2].date, NaiveDate::from_ymd_opt(2025, 3, 31).unwrap());
    }

    #[test]
    fn test_rejects_invalid_inputs() {
        let sl = DepreciationMethod::StraightLine;
        assert!(matches!(
            generate_depreciation_schedule(start(), 12, 0.0, sl, 0.0),
            Err(LeaseError::InvalidAsset(_))
        ));
        assert!(matches!(
            generate_depreciation_schedule(start(), 12, 100.0, sl, 100.0),
            Err(LeaseError::InvalidResidual(_))
        ));
        assert!(matches!(
            generate_depreciation_schedule(start(), 0, 100.0, sl, 0.0),
            Err(LeaseError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_method_round_trips_through_str() {
        for method in [
            DepreciationMethod::StraightLine,
            DepreciationMethod::SumOfYears,
            DepreciationMethod::DoubleDeclining,
        ] {
            assert_eq!(method.as_str().parse::<DepreciationMethod>().unwrap(), method);
        }
        assert!("reducing".parse::<DepreciationMethod>().is_err());
    }
}
