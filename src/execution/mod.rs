//! Lease model execution

pub mod engine;
pub mod model;

pub use engine::{run_lease_model, EventHandler, ModelEngine, ModelEvent};
pub use model::{LeaseModel, ModelOutcome};
