//! Journal entries for recognised leases

use crate::core::{round_cents, LeaseRow, ModificationOutcome};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Debit or credit side of a journal line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Debit,
    Credit,
    /// Posted to profit or loss on either side
    Either,
}

impl Side {
    pub fn prefix(&self) -> &'static str {
        match self {
            Side::Debit => "Dr",
            Side::Credit => "Cr",
            Side::Either => "Dr/Cr",
        }
    }
}

/// A single journal line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalLine {
    pub side: Side,
    pub account: String,
    pub amount: f64,
}

impl JournalLine {
    fn new(side: Side, account: &str, amount: f64) -> Self {
        Self {
            side,
            account: account.to_string(),
            amount: round_cents(amount),
        }
    }

    /// Account with its Dr/Cr prefix
    pub fn label(&self) -> String {
        format!("{} {}", self.side.prefix(), self.account)
    }
}

/// Entries posted at commencement
pub fn initial_recognition(
    rou_asset: f64,
    liability: f64,
    direct_costs: f64,
    incentives: f64,
) -> Vec<JournalLine> {
    let mut lines = vec![
        JournalLine::new(Side::Debit, "Right-of-use Asset", rou_asset),
        JournalLine::new(Side::Credit, "Lease Liability", liability),
    ];
    if direct_costs > 0.0 {
        lines.push(JournalLine::new(Side::Debit, "Initial Direct Costs", direct_costs));
    }
    if incentives > 0.0 {
        lines.push(JournalLine::new(Side::Credit, "Lease Incentives Received", incentives));
    }
    lines
}

/// Monthly entry for one schedule row
pub fn recurring_entry(row: &LeaseRow) -> Vec<JournalLine> {
    vec![
        JournalLine::new(Side::Debit, "Depreciation Expense", row.depreciation),
        JournalLine::new(Side::Debit, "Interest Expense", row.interest),
        JournalLine::new(Side::Credit, "Lease Liability", row.principal),
        JournalLine::new(Side::Credit, "Cash/Bank", row.payment),
    ]
}

/// Adjustment posted when a lease is remeasured
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModificationEntry {
    pub effective_date: NaiveDate,
    pub reason: String,
    pub lines: Vec<JournalLine>,
}

/// Adjustment entry at the modification date, or `None` when the carrying
/// amounts do not change.
pub fn modification_entry(outcome: &ModificationOutcome, reason: &str) -> Option<ModificationEntry> {
    let rou_adj = outcome.rou_adjustment();
    let liability_adj = outcome.liability_adjustment();
    let mut lines = Vec::new();

    if rou_adj > 0.0 {
        lines.push(JournalLine::new(Side::Debit, "Right-of-use Asset (modification)", rou_adj.abs()));
    } else if rou_adj < 0.0 {
        lines.push(JournalLine::new(Side::Credit, "Right-of-use Asset (modification)", rou_adj.abs()));
    }

    if liability_adj > 0.0 {
        lines.push(JournalLine::new(Side::Credit, "Lease Liability (modification)", liability_adj.abs()));
    } else if liability_adj < 0.0 {
        lines.push(JournalLine::new(Side::Debit, "Lease Liability (modification)", liability_adj.abs()));
    }

    // Liability reductions beyond the ROU carrying amount go to profit or loss
    let rou_written_off = outcome.opening_rou + rou_adj <= 0.0;
    if rou_written_off && liability_adj < 0.0 {
        lines.push(JournalLine::new(Side::Either, "Gain or Loss (P&L)", liability_adj.abs()));
    }

    if lines.is_empty() {
        return None;
    }

    Some(ModificationEntry {
        effective_date: outcome.modification_date,
        reason: reason.to_string(),
        lines,
    })
}
