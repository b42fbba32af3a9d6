//! Results of a lease model run

use crate::core::{
    config::LeaseConfig, ExemptLease, LeaseSchedule, ModificationOutcome, ScheduleMetrics,
};
use crate::reporting::{run_qa_checks, QaOptions, QaReport};
use serde::{Deserialize, Serialize};

/// A lease recognised on balance sheet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaseModel {
    pub config: LeaseConfig,

    /// Monthly payment stream used for measurement
    pub payments: Vec<f64>,

    /// Lease liability at commencement
    pub liability: f64,

    /// Right-of-use asset at commencement
    pub rou_asset: f64,

    pub metrics: ScheduleMetrics,

    /// Commencement schedule, before any modification
    pub original_schedule: LeaseSchedule,

    pub modification: Option<ModificationOutcome>,
}

impl LeaseModel {
    /// Schedule to report on: the modified schedule when there is one
    pub fn schedule(&self) -> &LeaseSchedule {
        match &self.modification {
            Some(outcome) => &outcome.schedule,
            None => &self.original_schedule,
        }
    }

    /// Undiscounted payments over the reported schedule
    pub fn undiscounted_payments(&self) -> f64 {
        self.schedule().total_payments()
    }

    /// QA checks over the rows measured from the latest carrying amounts.
    ///
    /// After a modification only the remeasured rows are checked, since the
    /// rows before it depreciate the original asset. Revised terms carry no
    /// residual value guarantee.
    pub fn run_qa(&self) -> QaReport {
        let method = Some(self.config.depreciation_method);
        match &self.modification {
            Some(outcome) => run_qa_checks(
                &LeaseSchedule::new(outcome.post_modification().to_vec()),
                QaOptions { residual_value: 0.0, method },
            ),
            None => run_qa_checks(
                &self.original_schedule,
                QaOptions { residual_value: self.config.residual_value, method },
            ),
        }
    }
}

/// Either a recognised lease or an exempt one
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelOutcome {
    Recognised(Box<LeaseModel>),
    Exempt {
        name: String,
        lease: ExemptLease,
    },
}

impl ModelOutcome {
    pub fn name(&self) -> &str {
        match self {
            ModelOutcome::Recognised(model) => &model.config.name,
            ModelOutcome::Exempt { name, .. } => name,
        }
    }

    pub fn as_recognised(&self) -> Option<&LeaseModel> {
        match self {
            ModelOutcome::Recognised(model) => Some(model),
            ModelOutcome::Exempt { .. } => None,
        }
    }
}
