//! Model run state

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a lease model run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// Model generated and all QA checks passed
    Completed,
    /// Lease qualified for a recognition exemption
    Exempt,
    /// Model generated but at least one QA check failed
    QaFailed,
    /// Model could not be generated
    Failed,
}

impl RunStatus {
    /// Whether the run should be reported as a success
    pub fn is_success(&self) -> bool {
        matches!(self, RunStatus::Completed | RunStatus::Exempt)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunStatus::Completed => "Completed",
            RunStatus::Exempt => "Exempt",
            RunStatus::QaFailed => "QaFailed",
            RunStatus::Failed => "Failed",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for RunStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Completed" => Ok(RunStatus::Completed),
            "Exempt" => Ok(RunStatus::Exempt),
            "QaFailed" => Ok(RunStatus::QaFailed),
            "Failed" => Ok(RunStatus::Failed),
            other => Err(format!("Unknown run status '{}'", other)),
        }
    }
}
