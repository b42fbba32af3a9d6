//! CLI command definitions

use clap::{Args, ValueEnum};
use chrono::NaiveDate;

/// Run the lease model
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Path to one or more lease YAML files
    #[arg(short, long, num_args = 1.., required = true)]
    pub file: Vec<String>,

    /// Field overrides (key=value)
    #[arg(long = "set", value_parser = parse_key_value)]
    pub overrides: Vec<(String, String)>,

    /// Reporting date (YYYY-MM-DD), overrides the lease file
    #[arg(long)]
    pub reporting_date: Option<NaiveDate>,

    /// Sections to print (defaults to all)
    #[arg(long, value_enum, value_delimiter = ',')]
    pub section: Vec<Section>,

    /// Export the schedule to CSV (single lease only)
    #[arg(long)]
    pub export: Option<String>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    /// Don't save the run to history
    #[arg(long)]
    pub no_history: bool,

    /// History database path
    #[arg(long)]
    pub db: Option<String>,
}

impl RunCommand {
    /// Whether a section was requested
    pub fn shows(&self, section: Section) -> bool {
        self.section.is_empty() || self.section.contains(&section)
    }
}

/// Output sections of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Section {
    Summary,
    Schedule,
    Disclosures,
    Notes,
    Journals,
    Qa,
}

/// Validate a lease configuration
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Path to lease YAML file
    #[arg(short, long)]
    pub file: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Check an exported schedule
#[derive(Debug, Args, Clone)]
pub struct QaCommand {
    /// Path to schedule CSV
    #[arg(short, long)]
    pub file: String,

    /// Expected residual value at the end of the term
    #[arg(long, default_value_t = 0.0)]
    pub residual_value: f64,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// List leases with history
#[derive(Debug, Args, Clone)]
pub struct ListCommand {
    /// Show run counts
    #[arg(long)]
    pub with_counts: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    /// History database path
    #[arg(long)]
    pub db: Option<String>,
}

/// Show run history
#[derive(Debug, Args, Clone)]
pub struct HistoryCommand {
    /// Lease name to filter by
    #[arg(short, long)]
    pub lease: Option<String>,

    /// Number of recent runs to show
    #[arg(short = 'n', long, default_value_t = 10)]
    pub limit: usize,

    /// Show full details
    #[arg(long)]
    pub details: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    /// Show a specific run
    #[arg(long)]
    pub run_id: Option<String>,

    /// History database path
    #[arg(long)]
    pub db: Option<String>,
}

/// Parse key=value pairs
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("Invalid key=value pair: {}", s)),
    }
}
