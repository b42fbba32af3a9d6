//! Lease configuration from YAML

use crate::core::depreciation::DepreciationMethod;
use crate::core::error::LeaseError;
use crate::core::exemption::{ExemptionReason, SHORT_TERM_MAX_MONTHS};
use crate::core::payments::{PaymentAdjustment, PaymentFrequency, PaymentTiming};
use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level lease configuration loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaseConfig {
    /// Lease name, used for history and export file names
    pub name: String,

    /// Optional description of the leased asset
    #[serde(default)]
    pub description: Option<String>,

    /// Commencement date
    pub start_date: NaiveDate,

    /// Lease term in months
    pub term_months: u32,

    /// Payment per instalment, due once per `payment_frequency` period
    pub payment: f64,

    #[serde(default)]
    pub payment_frequency: PaymentFrequency,

    #[serde(default)]
    pub payment_timing: PaymentTiming,

    /// Annual discount rate in percent (5.0 for 5%)
    pub discount_rate: f64,

    /// Expected annual CPI escalation in percent
    #[serde(default)]
    pub cpi_percent: f64,

    /// One-off payment step changes
    #[serde(default)]
    pub adjustments: Vec<PaymentAdjustment>,

    #[serde(default)]
    pub direct_costs: f64,

    #[serde(default)]
    pub incentives: f64,

    #[serde(default)]
    pub prepayments: f64,

    /// Guaranteed residual value, paid with the final instalment
    #[serde(default)]
    pub residual_value: f64,

    #[serde(default)]
    pub depreciation_method: DepreciationMethod,

    /// Reporting date for disclosures (defaults to today)
    #[serde(default)]
    pub reporting_date: Option<NaiveDate>,

    #[serde(default)]
    pub exemptions: ExemptionConfig,

    #[serde(default)]
    pub modification: Option<ModificationConfig>,
}

/// Recognition exemptions claimed for the lease
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExemptionConfig {
    #[serde(default)]
    pub short_term: bool,

    #[serde(default)]
    pub low_value: bool,
}

impl ExemptionConfig {
    /// Claimed exemptions, low-value first
    pub fn reasons(&self) -> Vec<ExemptionReason> {
        let mut reasons = Vec::new();
        if self.low_value {
            reasons.push(ExemptionReason::LowValue);
        }
        if self.short_term {
            reasons.push(ExemptionReason::ShortTerm);
        }
        reasons
    }

    pub fn any(&self) -> bool {
        self.short_term || self.low_value
    }
}

/// Modification or reassessment event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModificationConfig {
    /// Date the revised terms take effect
    pub effective_date: NaiveDate,

    /// Revised remaining term in months
    pub term_months: u32,

    /// Revised monthly payment
    pub payment: f64,

    /// Revised annual discount rate in percent (defaults to the original rate)
    #[serde(default)]
    pub discount_rate: Option<f64>,

    /// Audit trail note
    #[serde(default)]
    pub reason: String,

    /// ROU carrying amount override at the effective date
    #[serde(default)]
    pub rou_asset_remaining: Option<f64>,
}

impl LeaseConfig {
    /// Load lease configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse lease configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: LeaseConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the lease configuration
    pub fn validate(&self) -> Result<(), LeaseError> {
        if self.name.trim().is_empty() {
            return Err(LeaseError::Config("Lease name cannot be empty".to_string()));
        }
        if self.term_months == 0 {
            return Err(LeaseError::Config(
                "Lease term must be at least one month".to_string(),
            ));
        }

        let amounts = [
            ("payment", self.payment),
            ("discount_rate", self.discount_rate),
            ("cpi_percent", self.cpi_percent),
            ("direct_costs", self.direct_costs),
            ("incentives", self.incentives),
            ("prepayments", self.prepayments),
            ("residual_value", self.residual_value),
        ];
        for (field, value) in amounts {
            if value < 0.0 || !value.is_finite() {
                return Err(LeaseError::Config(format!(
                    "'{}' must be a non-negative number (got {})",
                    field, value
                )));
            }
        }
        if self.discount_rate > 100.0 {
            return Err(LeaseError::Config(format!(
                "'discount_rate' is a percentage and cannot exceed 100 (got {})",
                self.discount_rate
            )));
        }

        for adj in &self.adjustments {
            if adj.month >= self.term_months {
                return Err(LeaseError::Config(format!(
                    "Adjustment month {} is outside the {}-month term",
                    adj.month, self.term_months
                )));
            }
        }

        if self.exemptions.short_term && self.term_months > SHORT_TERM_MAX_MONTHS {
            return Err(LeaseError::Config(format!(
                "Short-term exemption requires a term of {} months or less (got {})",
                SHORT_TERM_MAX_MONTHS, self.term_months
            )));
        }

        if let Some(modification) = &self.modification {
            if modification.term_months == 0 {
                return Err(LeaseError::Config(
                    "Modification term must be at least one month".to_string(),
                ));
            }
            if modification.payment < 0.0 {
                return Err(LeaseError::Config(
                    "Modification payment must be non-negative".to_string(),
                ));
            }
            if matches!(modification.discount_rate, Some(rate) if !(0.0..=100.0).contains(&rate)) {
                return Err(LeaseError::Config(
                    "Modification discount rate must be between 0 and 100".to_string(),
                ));
            }
            if modification.effective_date <= self.start_date {
                return Err(LeaseError::Config(format!(
                    "Modification date {} must fall after the lease start {}",
                    modification.effective_date, self.start_date
                )));
            }
        }

        Ok(())
    }

    /// Apply a `key=value` override from the command line
    pub fn apply_override(&mut self, key: &str, value: &str) -> Result<(), LeaseError> {
        fn number(key: &str, value: &str) -> Result<f64, LeaseError> {
            value.parse::<f64>().map_err(|_| {
                LeaseError::Config(format!("'{}' expects a number, got '{}'", key, value))
            })
        }
        fn date(key: &str, value: &str) -> Result<NaiveDate, LeaseError> {
            NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
                LeaseError::Config(format!("'{}' expects a YYYY-MM-DD date, got '{}'", key, value))
            })
        }

        match key {
            "name" => self.name = value.to_string(),
            "description" => self.description = Some(value.to_string()),
            "start_date" => self.start_date = date(key, value)?,
            "reporting_date" => self.reporting_date = Some(date(key, value)?),
            "term_months" => {
                self.term_months = value.parse().map_err(|_| {
                    LeaseError::Config(format!("'{}' expects a whole number, got '{}'", key, value))
                })?
            }
            "payment" => self.payment = number(key, value)?,
            "discount_rate" => self.discount_rate = number(key, value)?,
            "cpi_percent" => self.cpi_percent = number(key, value)?,
            "direct_costs" => self.direct_costs = number(key, value)?,
            "incentives" => self.incentives = number(key, value)?,
            "prepayments" => self.prepayments = number(key, value)?,
            "residual_value" => self.residual_value = number(key, value)?,
            "depreciation_method" => self.depreciation_method = value.parse()?,
            "payment_timing" => {
                self.payment_timing = serde_yaml::from_str(value)
                    .map_err(|_| LeaseError::Config(format!("Unknown payment timing '{}'", value)))?
            }
            "payment_frequency" => {
                self.payment_frequency = serde_yaml::from_str(value).map_err(|_| {
                    LeaseError::Config(format!("Unknown payment frequency '{}'", value))
                })?
            }
            other => {
                return Err(LeaseError::Config(format!(
                    "Unknown override key '{}'",
                    other
                )))
            }
        }
        Ok(())
    }

    /// Reporting date, falling back to today
    pub fn reporting_date_or_today(&self) -> NaiveDate {
        self.reporting_date
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    /// Annual discount rate as a fraction
    pub fn discount_rate_fraction(&self) -> f64 {
        self.discount_rate / 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC: &str = r#"
name: "Office Rent"
start_date: 2025-01-01
term_months: 36
payment: 10000
discount_rate: 5.0
"#;

    #[test]
    fn test_parse_minimal_lease() {
        let config = LeaseConfig::from_yaml(BASIC).unwrap();
        assert_eq!(config.name, "Office Rent");
        assert_eq!(config.term_months, 36);
        assert_eq!(config.payment_frequency, PaymentFrequency::Monthly);
        assert_eq!(config.payment_timing, PaymentTiming::End);
        assert_eq!(config.depreciation_method, DepreciationMethod::StraightLine);
        assert!(config.modification.is_none());
        assert!(!config.exemptions.any());
        assert_eq!(config.discount_rate_fraction(), 0.05);
    }

    #[test]
    fn test_parse_full_lease() {
        let yaml = r#"
name: "Warehouse"
description: "Distribution centre"
start_date: 2024-07-01
term_months: 60
payment: 25000
payment_frequency: quarterly
payment_timing: beginning
discount_rate: 6.5
cpi_percent: 2.5
adjustments:
  - month: 24
    percent: 10
direct_costs: 5000
incentives: 2000
prepayments: 1000
residual_value: 15000
depreciation_method: sum_of_years
reporting_date: 2025-06-30
modification:
  effective_date: 2026-07-01
  term_months: 24
  payment: 27000
  discount_rate: 7.0
  reason: "Extension of floor space"
"#;
        let config = LeaseConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.payment_frequency, PaymentFrequency::Quarterly);
        assert_eq!(config.payment_timing, PaymentTiming::Beginning);
        assert_eq!(config.depreciation_method, DepreciationMethod::SumOfYears);
        assert_eq!(config.adjustments.len(), 1);
        assert_eq!(
            config.reporting_date,
            Some(NaiveDate::from_ymd_opt(2025, 6, 30).unwrap())
        );
        let modification = config.modification.unwrap();
        assert_eq!(modification.discount_rate, Some(7.0));
        assert_eq!(modification.reason, "Extension of floor space");
    }

    #[test]
    fn test_zero_term_fails() {
        let yaml = BASIC.replace("term_months: 36", "term_months: 0");
        assert!(LeaseConfig::from_yaml(&yaml).is_err());
    }

    #[test]
    fn test_negative_amount_fails() {
        let yaml = format!("{}incentives: -5\n", BASIC);
        let err = LeaseConfig::from_yaml(&yaml).unwrap_err();
        assert!(err.to_string().contains("incentives"));
    }

    #[test]
    fn test_short_term_exemption_requires_short_term() {
        let yaml = format!("{}exemptions:\n  short_term: true\n", BASIC);
        assert!(LeaseConfig::from_yaml(&yaml).is_err());

        let yaml = yaml.replace("term_months: 36", "term_months: 12");
        let config = LeaseConfig::from_yaml(&yaml).unwrap();
        assert_eq!(config.exemptions.reasons(), vec![ExemptionReason::ShortTerm]);
    }

    #[test]
    fn test_adjustment_outside_term_fails() {
        let yaml = format!("{}adjustments:\n  - month: 36\n    percent: 5\n", BASIC);
        assert!(LeaseConfig::from_yaml(&yaml).is_err());
    }

    #[test]
    fn test_modification_before_start_fails() {
        let yaml = format!(
            "{}modification:\n  effective_date: 2024-12-01\n  term_months: 12\n  payment: 100\n",
            BASIC
        );
        assert!(LeaseConfig::from_yaml(&yaml).is_err());
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = LeaseConfig::from_yaml(BASIC).unwrap();
        config.apply_override("discount_rate", "7.25").unwrap();
        config.apply_override("term_months", "48").unwrap();
        config.apply_override("reporting_date", "2025-12-31").unwrap();
        config.apply_override("depreciation_method", "double_declining").unwrap();
        config.apply_override("payment_timing", "beginning").unwrap();

        assert_eq!(config.discount_rate, 7.25);
        assert_eq!(config.term_months, 48);
        assert_eq!(config.depreciation_method, DepreciationMethod::DoubleDeclining);
        assert_eq!(config.payment_timing, PaymentTiming::Beginning);
        assert_eq!(
            config.reporting_date_or_today(),
            NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()
        );
    }

    #[test]
    fn test_bad_overrides() {
        let mut config = LeaseConfig::from_yaml(BASIC).unwrap();
        assert!(config.apply_override("payment", "lots").is_err());
        assert!(config.apply_override("start_date", "01/01/2025").is_err());
        assert!(config.apply_override("colour", "blue").is_err());
    }
}
