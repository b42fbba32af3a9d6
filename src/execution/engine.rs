//! Model engine - turns a lease configuration into a measured lease

use crate::core::{
    apply_frequency, calculate_lease_liability, calculate_right_of_use_asset,
    config::LeaseConfig, generate_lease_schedule, generate_variable_payments,
    handle_lease_modification, round_cents, ExemptLease, LeaseError, LeaseResult,
    ModificationRequest, ScheduleRequest,
};
use crate::execution::model::{LeaseModel, ModelOutcome};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Events emitted while a lease model is generated
#[derive(Debug, Clone, PartialEq)]
pub enum ModelEvent {
    Started {
        lease_name: String,
    },
    ExemptionApplied {
        lease_name: String,
        reasons: String,
    },
    PaymentsGenerated {
        months: usize,
        total: f64,
    },
    LiabilityMeasured {
        liability: f64,
        rou_asset: f64,
    },
    ScheduleGenerated {
        rows: usize,
        total_interest: f64,
    },
    ModificationApplied {
        effective_date: chrono::NaiveDate,
        liability_adjustment: f64,
    },
    Completed {
        lease_name: String,
    },
    Failed {
        lease_name: String,
        error: String,
    },
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(&ModelEvent) + Send + Sync>;

/// Lease model engine
#[derive(Default)]
pub struct ModelEngine {
    event_handlers: Mutex<Vec<EventHandler>>,
}

impl ModelEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an event handler
    pub fn add_event_handler<F>(&self, handler: F)
    where
        F: Fn(&ModelEvent) + Send + Sync + 'static,
    {
        if let Ok(mut handlers) = self.event_handlers.lock() {
            handlers.push(Arc::new(handler));
        }
    }

    /// Emit an event to all handlers
    fn emit_event(&self, event: ModelEvent) {
        let handlers = match self.event_handlers.lock() {
            Ok(handlers) => handlers.clone(),
            Err(_) => return,
        };
        for handler in handlers.iter() {
            handler(&event);
        }
    }

    /// Run the lease model for a configuration
    pub fn run(&self, config: &LeaseConfig) -> LeaseResult<ModelOutcome> {
        self.emit_event(ModelEvent::Started {
            lease_name: config.name.clone(),
        });

        let result = self.run_inner(config);
        match &result {
            Ok(_) => {
                info!("Lease model '{}' generated", config.name);
                self.emit_event(ModelEvent::Completed {
                    lease_name: config.name.clone(),
                });
            }
            Err(e) => {
                warn!("Lease model '{}' failed: {}", config.name, e);
                self.emit_event(ModelEvent::Failed {
                    lease_name: config.name.clone(),
                    error: e.to_string(),
                });
            }
        }
        result
    }

    fn run_inner(&self, config: &LeaseConfig) -> LeaseResult<ModelOutcome> {
        config.validate()?;

        let monthly = generate_variable_payments(
            config.payment,
            config.term_months,
            &config.adjustments,
            config.cpi_percent,
        );
        let mut payments = apply_frequency(&monthly, config.payment_frequency, config.payment_timing);

        if config.exemptions.any() {
            let lease = ExemptLease::new(config.start_date, &payments, config.exemptions.reasons());
            self.emit_event(ModelEvent::ExemptionApplied {
                lease_name: config.name.clone(),
                reasons: lease.reason_text(),
            });
            return Ok(ModelOutcome::Exempt {
                name: config.name.clone(),
                lease,
            });
        }

        if config.residual_value >= payments.iter().sum::<f64>() {
            return Err(LeaseError::InvalidResidual(
                "Residual value cannot exceed total lease payments".to_string(),
            ));
        }
        if config.residual_value > 0.0 {
            if let Some(last) = payments.last_mut() {
                *last = round_cents(*last + config.residual_value);
            }
        }
        self.emit_event(ModelEvent::PaymentsGenerated {
            months: payments.len(),
            total: round_cents(payments.iter().sum()),
        });

        let rate = config.discount_rate_fraction();
        let liability = calculate_lease_liability(&payments, rate, config.payment_timing)?;
        let rou_asset = calculate_right_of_use_asset(
            liability,
            config.direct_costs,
            config.incentives,
            config.prepayments,
        )?;
        debug!(liability, rou_asset, "Measured lease '{}'", config.name);
        self.emit_event(ModelEvent::LiabilityMeasured { liability, rou_asset });

        if config.residual_value >= rou_asset {
            return Err(LeaseError::InvalidResidual(
                "Residual value must be less than right-of-use asset value".to_string(),
            ));
        }

        let request = ScheduleRequest::new(
            config.start_date,
            &payments,
            rate,
            config.term_months,
            rou_asset,
        )
        .with_depreciation(config.depreciation_method)
        .with_residual_value(config.residual_value)
        .with_timing(config.payment_timing);
        let (original_schedule, metrics) = generate_lease_schedule(&request)?;
        self.emit_event(ModelEvent::ScheduleGenerated {
            rows: original_schedule.len(),
            total_interest: metrics.total_interest,
        });

        let modification = match &config.modification {
            Some(modification) => {
                let new_payments = apply_frequency(
                    &vec![modification.payment; modification.term_months as usize],
                    config.payment_frequency,
                    config.payment_timing,
                );
                let new_rate = modification
                    .discount_rate
                    .map(|pct| pct / 100.0)
                    .unwrap_or(rate);
                let mut mod_request = ModificationRequest::new(
                    modification.effective_date,
                    &new_payments,
                    new_rate,
                );
                mod_request.rou_asset_remaining = modification.rou_asset_remaining;
                mod_request.depreciation_method = config.depreciation_method;
                mod_request.timing = config.payment_timing;

                let outcome = handle_lease_modification(&original_schedule, &mod_request)?;
                info!(
                    "Lease '{}' remeasured at {} ({})",
                    config.name,
                    modification.effective_date,
                    if modification.reason.is_empty() {
                        "no reason given"
                    } else {
                        modification.reason.as_str()
                    }
                );
                self.emit_event(ModelEvent::ModificationApplied {
                    effective_date: modification.effective_date,
                    liability_adjustment: outcome.liability_adjustment(),
                });
                Some(outcome)
            }
            None => None,
        };

        Ok(ModelOutcome::Recognised(Box::new(LeaseModel {
            config: config.clone(),
            payments,
            liability,
            rou_asset,
            metrics,
            original_schedule,
            modification,
        })))
    }
}

/// Run the lease model without event handlers
pub fn run_lease_model(config: &LeaseConfig) -> LeaseResult<ModelOutcome> {
    ModelEngine::new().run(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(yaml_extra: &str) -> LeaseConfig {
        let yaml = format!(
            r#"
name: "Office Rent"
start_date: 2025-01-01
term_months: 36
payment: 10000
discount_rate: 5.0
{}"#,
            yaml_extra
        );
        serde_yaml::from_str(&yaml).unwrap()
    }

    #[test]
    fn test_basic_model() {
        let outcome = run_lease_model(&config("")).unwrap();
        let model = outcome.as_recognised().expect("recognised lease");
        assert_eq!(model.payments.len(), 36);
        assert_eq!(model.rou_asset, model.liability);
        assert_eq!(model.schedule().len(), 36);
        assert!(model.liability < 360000.0);
    }

    #[test]
    fn test_residual_added_to_final_payment() {
        let outcome = run_lease_model(&config("residual_value: 5000\n")).unwrap();
        let model = outcome.as_recognised().unwrap();
        assert_eq!(*model.payments.last().unwrap(), 15000.0);
        assert_eq!(model.schedule().last().unwrap().rou_balance, 5000.0);
    }

    #[test]
    fn test_residual_exceeding_payments_fails() {
        let result = run_lease_model(&config("residual_value: 360000\n"));
        assert_eq!(
            result.unwrap_err(),
            LeaseError::InvalidResidual("Residual value cannot exceed total lease payments".to_string())
        );
    }

    #[test]
    fn test_exemption_short_circuits() {
        let mut cfg = config("exemptions:\n  low_value: true\n");
        cfg.payment = 50.0;
        let outcome = run_lease_model(&cfg).unwrap();
        match outcome {
            ModelOutcome::Exempt { lease, .. } => {
                assert_eq!(lease.schedule.len(), 36);
                assert_eq!(lease.total_expense(), 1800.0);
            }
            other => panic!("Expected exempt lease, got {:?}", other),
        }
    }

    #[test]
    fn test_quarterly_exemption_expenses_cash_paid() {
        let mut cfg = config("payment_frequency: quarterly\nexemptions:\n  low_value: true\n");
        cfg.payment = 300.0;
        let outcome = run_lease_model(&cfg).unwrap();
        let lease = match outcome {
            ModelOutcome::Exempt { lease, .. } => lease,
            other => panic!("Expected exempt lease, got {:?}", other),
        };
        assert_eq!(lease.monthly_expense, 100.0);
        assert_eq!(lease.total_expense(), 3600.0);
    }

    #[test]
    fn test_quarterly_modification_keeps_frequency() {
        let outcome = run_lease_model(&config(
            "payment_frequency: quarterly\npayment_timing: beginning\nmodification:\n  effective_date: 2026-01-01\n  term_months: 24\n  payment: 11000\n",
        ))
        .unwrap();
        let model = outcome.as_recognised().unwrap();
        let rows = &model.schedule().rows()[12..16];
        let paid: Vec<f64> = rows.iter().map(|r| r.payment).collect();
        assert_eq!(paid, vec![11000.0, 0.0, 0.0, 11000.0]);
        assert_eq!(model.schedule().total_payments(), 4.0 * 10000.0 + 8.0 * 11000.0);
        assert_eq!(model.schedule().last().unwrap().closing_liability, 0.0);
    }

    #[test]
    fn test_events_emitted_in_order() {
        let engine = ModelEngine::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        engine.add_event_handler(move |event| {
            let label = match event {
                ModelEvent::Started { .. } => "started",
                ModelEvent::PaymentsGenerated { .. } => "payments",
                ModelEvent::LiabilityMeasured { .. } => "liability",
                ModelEvent::ScheduleGenerated { .. } => "schedule",
                ModelEvent::ModificationApplied { .. } => "modification",
                ModelEvent::ExemptionApplied { .. } => "exemption",
                ModelEvent::Completed { .. } => "completed",
                ModelEvent::Failed { .. } => "failed",
            };
            sink.lock().unwrap().push(label);
        });

        engine
            .run(&config(
                "modification:\n  effective_date: 2026-01-01\n  term_months: 24\n  payment: 11000\n",
            ))
            .unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["started", "payments", "liability", "schedule", "modification", "completed"]
        );
    }

    #[test]
    fn test_failed_event() {
        let engine = ModelEngine::new();
        let failed = Arc::new(Mutex::new(false));
        let flag = failed.clone();
        engine.add_event_handler(move |event| {
            if matches!(event, ModelEvent::Failed { .. }) {
                *flag.lock().unwrap() = true;
            }
        });
        assert!(engine.run(&config("residual_value: 400000\n")).is_err());
        assert!(*failed.lock().unwrap());
    }
}
