//! CLI output formatting

use crate::{
    core::{ExemptLease, LeaseSchedule, RunStatus},
    execution::ModelEvent,
    persistence::RunSummary,
    reporting::{format_currency, CheckStatus, JournalLine, QaReport, StatementTable},
};
use comfy_table::{presets, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "! ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Create a progress bar
pub fn create_progress_bar(total: usize) -> ProgressBar {
    let progress = ProgressBar::new(total as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    progress.set_style(style);
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}

/// Format a run status for display
pub fn format_status(status: RunStatus) -> String {
    match status {
        RunStatus::Completed => style("COMPLETED").green().to_string(),
        RunStatus::Exempt => style("EXEMPT").blue().to_string(),
        RunStatus::QaFailed => style("QA FAILED").yellow().to_string(),
        RunStatus::Failed => style("FAILED").red().to_string(),
    }
}

fn short_id(summary: &RunSummary) -> String {
    summary.run_id.to_string()[..8].to_string()
}

/// Format run summary for display
pub fn format_run_summary(summary: &RunSummary) -> String {
    let status_icon = match summary.status {
        RunStatus::Completed | RunStatus::Exempt => CHECK,
        RunStatus::QaFailed => WARN,
        RunStatus::Failed => CROSS,
    };

    format!(
        "{} {} - {} - {} - {} - liability {}",
        status_icon,
        style(short_id(summary)).dim(),
        style(&summary.lease_name).bold(),
        format_status(summary.status),
        style(summary.calculated_at.format("%Y-%m-%d %H:%M")).dim(),
        style(format_currency(summary.initial_liability)).cyan()
    )
}

/// Format a model event for display
pub fn format_model_event(event: &ModelEvent) -> String {
    match event {
        ModelEvent::Started { lease_name } => {
            format!("{} Modelling {}", ROCKET, style(lease_name).bold())
        }
        ModelEvent::ExemptionApplied { lease_name, reasons } => format!(
            "{} {} exempt from recognition: {}",
            INFO,
            style(lease_name).cyan(),
            style(reasons).dim()
        ),
        ModelEvent::PaymentsGenerated { months, total } => format!(
            "{} {} monthly payments totalling {}",
            INFO,
            style(months).cyan(),
            style(format_currency(*total)).cyan()
        ),
        ModelEvent::LiabilityMeasured { liability, rou_asset } => format!(
            "{} Liability {} / ROU asset {}",
            INFO,
            style(format_currency(*liability)).cyan(),
            style(format_currency(*rou_asset)).cyan()
        ),
        ModelEvent::ScheduleGenerated { rows, total_interest } => format!(
            "{} Schedule of {} periods, interest {}",
            INFO,
            style(rows).cyan(),
            style(format_currency(*total_interest)).dim()
        ),
        ModelEvent::ModificationApplied {
            effective_date,
            liability_adjustment,
        } => format!(
            "{} Modification at {} → liability {}",
            WARN,
            style(effective_date).yellow(),
            style(format_currency(*liability_adjustment)).yellow()
        ),
        ModelEvent::Completed { lease_name } => {
            format!("{} {}", CHECK, style(lease_name).green())
        }
        ModelEvent::Failed { lease_name, error } => {
            format!("{} {}: {}", CROSS, style(lease_name).red(), style(error).dim())
        }
    }
}

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn header(labels: &[&str]) -> Vec<Cell> {
    labels.iter().map(|l| Cell::new(l).fg(Color::White)).collect()
}

fn amount(value: f64) -> Cell {
    Cell::new(format_currency(value)).set_alignment(CellAlignment::Right)
}

/// Render the amortisation schedule
pub fn schedule_table(schedule: &LeaseSchedule) -> Table {
    let mut table = new_table();
    table.set_header(header(&[
        "Period",
        "Date",
        "Payment",
        "Interest",
        "Principal",
        "Closing Liability",
        "Depreciation",
        "ROU Balance",
        "Total Expense",
    ]));

    for row in schedule.rows() {
        table.add_row(vec![
            Cell::new(row.period).fg(Color::DarkGrey),
            Cell::new(row.date.format("%Y-%m-%d")),
            amount(row.payment),
            amount(row.interest),
            amount(row.principal),
            amount(row.closing_liability).fg(Color::Cyan),
            amount(row.depreciation),
            amount(row.rou_balance).fg(Color::Cyan),
            amount(row.total_expense),
        ]);
    }
    table
}

/// Render the straight-line expense schedule of an exempt lease
pub fn exempt_table(lease: &ExemptLease) -> Table {
    let mut table = new_table();
    table.set_header(header(&["Period", "Date", "Lease Expense"]));
    for row in &lease.schedule {
        table.add_row(vec![
            Cell::new(row.period).fg(Color::DarkGrey),
            Cell::new(row.date.format("%Y-%m-%d")),
            amount(row.lease_expense),
        ]);
    }
    table
}

/// Render a CY/PY statement extract
pub fn statement_table(statement: &StatementTable) -> Table {
    let mut table = new_table();
    let mut columns = vec![Cell::new(&statement.title).fg(Color::White)];
    columns.extend(
        statement
            .years
            .iter()
            .map(|y| Cell::new(y).fg(Color::White).set_alignment(CellAlignment::Right)),
    );
    table.set_header(columns);

    for (label, values) in &statement.lines {
        let mut cells = vec![Cell::new(label)];
        cells.extend(values.iter().map(|v| amount(*v)));
        table.add_row(cells);
    }
    table
}

/// Render journal lines
pub fn journal_table(lines: &[JournalLine]) -> Table {
    let mut table = new_table();
    table.set_header(header(&["Account", "Amount"]));
    for line in lines {
        table.add_row(vec![Cell::new(line.label()), amount(line.amount)]);
    }
    table
}

/// Render a QA report
pub fn qa_table(report: &QaReport) -> Table {
    let mut table = new_table();
    table.set_header(header(&["Check", "Status", "Detail"]));
    for check in &report.checks {
        let status = match check.status {
            CheckStatus::Pass => Cell::new("PASS").fg(Color::Green),
            CheckStatus::Fail => Cell::new("FAIL").fg(Color::Red),
            CheckStatus::Warning => Cell::new("WARN").fg(Color::Yellow),
        };
        table.add_row(vec![
            Cell::new(&check.name),
            status,
            Cell::new(check.detail.as_deref().unwrap_or("")).fg(Color::DarkGrey),
        ]);
    }
    table
}

/// Render run history
pub fn history_table(runs: &[RunSummary]) -> Table {
    let mut table = new_table();
    table.set_header(header(&["ID", "Lease", "Status", "Calculated", "Liability", "Interest"]));
    for run in runs {
        let status = match run.status {
            RunStatus::Completed => Cell::new("completed").fg(Color::Green),
            RunStatus::Exempt => Cell::new("exempt").fg(Color::Blue),
            RunStatus::QaFailed => Cell::new("qa failed").fg(Color::Yellow),
            RunStatus::Failed => Cell::new("failed").fg(Color::Red),
        };
        table.add_row(vec![
            Cell::new(short_id(run)).fg(Color::DarkGrey),
            Cell::new(&run.lease_name).fg(Color::Cyan),
            status,
            Cell::new(run.calculated_at.format("%Y-%m-%d %H:%M")),
            amount(run.initial_liability),
            amount(run.total_interest),
        ]);
    }
    table
}
