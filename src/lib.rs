//! leasebook - IFRS 16 lease accounting models

pub mod cli;
pub mod core;
pub mod execution;
pub mod persistence;
pub mod reporting;

// Re-export commonly used types
pub use core::config::LeaseConfig;
pub use core::{DepreciationMethod, LeaseError, LeaseResult, LeaseSchedule, PaymentTiming, RunStatus};
pub use execution::{run_lease_model, LeaseModel, ModelEngine, ModelEvent, ModelOutcome};
pub use persistence::{InMemoryPersistence, PersistenceBackend, RunSummary};
pub use reporting::{run_qa_checks, Disclosures, QaOptions, QaReport};
