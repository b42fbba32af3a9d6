//! Core lease accounting models
//!
//! Measurement of the lease liability and right-of-use asset, payment
//! streams, depreciation, the amortisation schedule and remeasurement on
//! modification.

pub mod config;
pub mod depreciation;
pub mod error;
pub mod exemption;
pub mod measurement;
pub mod modification;
pub mod payments;
pub mod schedule;
pub mod state;

pub use depreciation::*;
pub use error::*;
pub use exemption::*;
pub use measurement::*;
pub use modification::*;
pub use payments::*;
pub use schedule::*;
pub use state::*;
