//! Descriptive note disclosures

use crate::core::DepreciationMethod;
use crate::reporting::format_currency_whole;
use serde::{Deserialize, Serialize};

/// A titled block of narrative text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub title: String,
    pub body: String,
}

/// Narrative notes accompanying the lease disclosures
pub fn build_notes(
    description: Option<&str>,
    undiscounted_payments: f64,
    method: DepreciationMethod,
) -> Vec<Note> {
    let activities = match description {
        Some(desc) if !desc.trim().is_empty() => format!(
            "The entity leases {}. Leases are recognised as a right-of-use asset and a corresponding liability at commencement.",
            desc.trim()
        ),
        _ => "The entity leases various assets including office space, vehicles, and equipment."
            .to_string(),
    };

    vec![
        Note {
            title: "59(a) - Leasing Activities".to_string(),
            body: activities,
        },
        Note {
            title: "59(b) - Future Cash Outflows".to_string(),
            body: format!(
                "The entity has undiscounted lease payments totaling {}.",
                format_currency_whole(undiscounted_payments)
            ),
        },
        Note {
            title: "Depreciation Policy".to_string(),
            body: format!(
                "ROU assets are depreciated on a {} basis over the lease term in accordance with IFRS 16.31.",
                method.label()
            ),
        },
    ]
}
