//! Reporting artefacts derived from a lease schedule
//!
//! Disclosures, descriptive notes, journal entries, QA checks and CSV export.

pub mod disclosures;
pub mod export;
pub mod journals;
pub mod notes;
pub mod qa;

pub use disclosures::{calculate_lease_metrics, Disclosures, LeaseMetrics, StatementTable, YearMetrics};
pub use export::{read_schedule_csv, write_schedule_csv};
pub use journals::{initial_recognition, modification_entry, recurring_entry, JournalLine, ModificationEntry};
pub use notes::{build_notes, Note};
pub use qa::{run_qa_checks, CheckStatus, QaCheck, QaOptions, QaReport};

fn group_thousands(whole: u64) -> String {
    let digits = whole.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Format an amount as `$1,234.56`
pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, group_thousands(cents / 100), cents % 100)
}

/// Format an amount as `$1,235`, rounded to whole units
pub fn format_currency_whole(amount: f64) -> String {
    let whole = amount.abs().round() as u64;
    let sign = if amount < 0.0 && whole > 0 { "-" } else { "" };
    format!("{}${}", sign, group_thousands(whole))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(999.999), "$1,000.00");
        assert_eq!(format_currency(1234567.891), "$1,234,567.89");
        assert_eq!(format_currency(-42.5), "-$42.50");
    }

    #[test]
    fn test_format_currency_whole() {
        assert_eq!(format_currency_whole(360000.0), "$360,000");
        assert_eq!(format_currency_whole(999.4), "$999");
        assert_eq!(format_currency_whole(-1500.6), "-$1,501");
    }
}
