//! Persistence layer for lease model run history

#[cfg(feature = "sqlite")]
pub mod store;

#[cfg(feature = "sqlite")]
pub use store::SqliteRunStore;

pub use crate::core::RunStatus;
use crate::execution::ModelOutcome;
use crate::reporting::QaReport;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Summary of a lease model run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Unique run ID
    pub run_id: Uuid,

    /// Lease name
    pub lease_name: String,

    /// Run status
    pub status: RunStatus,

    /// When the model was calculated
    pub calculated_at: DateTime<Utc>,

    /// Lease term in months
    pub term_months: u32,

    /// Liability at commencement (0 for exempt leases)
    pub initial_liability: f64,

    /// ROU asset at commencement (0 for exempt leases)
    pub rou_asset: f64,

    /// Interest over the reported schedule
    pub total_interest: f64,

    /// Undiscounted payments over the reported schedule
    pub total_payments: f64,

    /// Failure message, when the run failed
    pub error: Option<String>,
}

/// Trait for persistence backends
#[async_trait::async_trait]
pub trait PersistenceBackend: Send + Sync {
    /// Save a run
    async fn save_run(&self, run: &RunSummary) -> Result<()>;

    /// Load a run by ID
    async fn load_run(&self, run_id: Uuid) -> Result<Option<RunSummary>>;

    /// List runs for a lease, most recent first
    async fn list_runs(&self, lease_name: &str) -> Result<Vec<RunSummary>>;

    /// List all lease names with history
    async fn list_leases(&self) -> Result<Vec<String>>;
}

/// In-memory persistence (for testing or ephemeral use)
pub struct InMemoryPersistence {
    runs: tokio::sync::RwLock<std::collections::HashMap<Uuid, RunSummary>>,
    by_lease: tokio::sync::RwLock<std::collections::BTreeMap<String, Vec<Uuid>>>,
}

impl InMemoryPersistence {
    pub fn new() -> Self {
        Self {
            runs: tokio::sync::RwLock::new(std::collections::HashMap::new()),
            by_lease: tokio::sync::RwLock::new(std::collections::BTreeMap::new()),
        }
    }
}

impl Default for InMemoryPersistence {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PersistenceBackend for InMemoryPersistence {
    async fn save_run(&self, run: &RunSummary) -> Result<()> {
        let mut runs = self.runs.write().await;
        let replaced = runs.insert(run.run_id, run.clone()).is_some();

        if !replaced {
            let mut by_lease = self.by_lease.write().await;
            by_lease
                .entry(run.lease_name.clone())
                .or_default()
                .push(run.run_id);
        }

        Ok(())
    }

    async fn load_run(&self, run_id: Uuid) -> Result<Option<RunSummary>> {
        let runs = self.runs.read().await;
        Ok(runs.get(&run_id).cloned())
    }

    async fn list_runs(&self, lease_name: &str) -> Result<Vec<RunSummary>> {
        let runs = self.runs.read().await;
        let by_lease = self.by_lease.read().await;

        let mut result: Vec<RunSummary> = by_lease
            .get(lease_name)
            .map(|ids| ids.iter().filter_map(|id| runs.get(id).cloned()).collect())
            .unwrap_or_default();
        result.sort_by(|a, b| b.calculated_at.cmp(&a.calculated_at));
        Ok(result)
    }

    async fn list_leases(&self) -> Result<Vec<String>> {
        let by_lease = self.by_lease.read().await;
        Ok(by_lease.keys().cloned().collect())
    }
}

/// Create a summary from a model outcome and its QA report
pub fn create_summary(outcome: &ModelOutcome, qa: Option<&QaReport>) -> RunSummary {
    let base = RunSummary {
        run_id: Uuid::new_v4(),
        lease_name: outcome.name().to_string(),
        status: RunStatus::Completed,
        calculated_at: Utc::now(),
        term_months: 0,
        initial_liability: 0.0,
        rou_asset: 0.0,
        total_interest: 0.0,
        total_payments: 0.0,
        error: None,
    };

    match outcome {
        ModelOutcome::Recognised(model) => {
            let schedule = model.schedule();
            let passed = qa.map(|report| report.passed()).unwrap_or(true);
            RunSummary {
                status: if passed { RunStatus::Completed } else { RunStatus::QaFailed },
                term_months: model.config.term_months,
                initial_liability: model.liability,
                rou_asset: model.rou_asset,
                total_interest: crate::core::round_cents(schedule.total_interest()),
                total_payments: crate::core::round_cents(schedule.total_payments()),
                ..base
            }
        }
        ModelOutcome::Exempt { lease, .. } => RunSummary {
            status: RunStatus::Exempt,
            term_months: lease.schedule.len() as u32,
            total_payments: crate::core::round_cents(lease.total_expense()),
            ..base
        },
    }
}

/// Create a summary for a run that failed before producing a model
pub fn failed_summary(lease_name: &str, error: &str) -> RunSummary {
    RunSummary {
        run_id: Uuid::new_v4(),
        lease_name: lease_name.to_string(),
        status: RunStatus::Failed,
        calculated_at: Utc::now(),
        term_months: 0,
        initial_liability: 0.0,
        rou_asset: 0.0,
        total_interest: 0.0,
        total_payments: 0.0,
        error: Some(error.to_string()),
    }
}
