use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use leasebook::cli::commands::{
    HistoryCommand, ListCommand, QaCommand, RunCommand, Section, ValidateCommand,
};
use leasebook::cli::output::*;
use leasebook::cli::{Cli, Command};
use leasebook::core::config::LeaseConfig;
use leasebook::core::{ExemptLease, RunStatus};
use leasebook::execution::{LeaseModel, ModelEngine, ModelOutcome};
use leasebook::persistence::{
    create_summary, failed_summary, InMemoryPersistence, PersistenceBackend, RunSummary,
};
use leasebook::reporting::{
    build_notes, format_currency, initial_recognition, modification_entry, read_schedule_csv,
    recurring_entry, run_qa_checks, write_schedule_csv, Disclosures, QaOptions, QaReport,
};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    // Execute command
    match &cli.command {
        Command::Run(cmd) => run_leases(cmd).await?,
        Command::Validate(cmd) => validate_lease(cmd)?,
        Command::Qa(cmd) => check_schedule(cmd)?,
        Command::History(cmd) => show_history(cmd).await?,
        Command::List(cmd) => list_leases(cmd).await?,
    }

    Ok(())
}

#[cfg(feature = "sqlite")]
async fn open_store(db: Option<&str>) -> Result<Arc<dyn PersistenceBackend>> {
    use leasebook::persistence::SqliteRunStore;

    let store = match db {
        Some(path) => SqliteRunStore::open(std::path::Path::new(path)).await?,
        None => SqliteRunStore::with_default_path().await?,
    };
    Ok(Arc::new(store))
}

#[cfg(not(feature = "sqlite"))]
async fn open_store(_db: Option<&str>) -> Result<Arc<dyn PersistenceBackend>> {
    tracing::warn!("Built without SQLite support, history is kept for this process only");
    Ok(Arc::new(InMemoryPersistence::new()))
}

fn load_config(path: &str, cmd: &RunCommand) -> Result<LeaseConfig> {
    let mut config = LeaseConfig::from_file(path)
        .with_context(|| format!("Failed to load lease config {}", path))?;

    for (key, value) in &cmd.overrides {
        config
            .apply_override(key, value)
            .with_context(|| format!("Invalid override {}={}", key, value))?;
        info!("Override: {} = {}", key, value);
    }
    if let Some(date) = cmd.reporting_date {
        config.reporting_date = Some(date);
    }

    Ok(config)
}

async fn run_leases(cmd: &RunCommand) -> Result<()> {
    if cmd.export.is_some() && cmd.file.len() > 1 {
        bail!("--export needs exactly one lease file");
    }

    let store: Arc<dyn PersistenceBackend> = if cmd.no_history {
        Arc::new(InMemoryPersistence::new())
    } else {
        open_store(cmd.db.as_deref()).await?
    };

    let progress = (cmd.file.len() > 1 && !cmd.json).then(|| create_progress_bar(cmd.file.len()));

    let engine = ModelEngine::new();
    if !cmd.json {
        let bar = progress.clone();
        engine.add_event_handler(move |event| {
            let line = format_model_event(event);
            match &bar {
                Some(bar) => bar.println(line),
                None => println!("{}", line),
            }
        });
    }

    let mut failed = 0usize;
    let mut reports = Vec::new();

    for path in &cmd.file {
        if let Some(bar) = &progress {
            bar.set_message(path.clone());
        }

        let config = match load_config(path, cmd) {
            Ok(config) => config,
            Err(e) => {
                error!("{:#}", e);
                failed += 1;
                if cmd.json {
                    reports.push(serde_json::json!({ "file": path, "error": format!("{:#}", e) }));
                }
                if let Some(bar) = &progress {
                    bar.inc(1);
                }
                continue;
            }
        };

        let mut exported = true;
        let summary = match engine.run(&config) {
            Ok(outcome) => {
                let qa = outcome.as_recognised().map(LeaseModel::run_qa);
                let summary = create_summary(&outcome, qa.as_ref());
                let reporting_date = config.reporting_date_or_today();

                if let Some(export) = &cmd.export {
                    if let Err(e) = export_schedule(&outcome, export) {
                        error!("{:#}", e);
                        exported = false;
                    }
                }

                if cmd.json {
                    reports.push(report_json(&outcome, qa.as_ref(), reporting_date)?);
                } else {
                    let print = || print_outcome(cmd, &outcome, qa.as_ref(), reporting_date);
                    match &progress {
                        Some(bar) => bar.suspend(print),
                        None => print(),
                    }
                }
                summary
            }
            Err(e) => {
                if cmd.json {
                    reports.push(serde_json::json!({
                        "name": config.name,
                        "file": path,
                        "error": e.to_string(),
                    }));
                }
                failed_summary(&config.name, &e.to_string())
            }
        };

        if !summary.status.is_success() || !exported {
            failed += 1;
        }
        if !cmd.no_history {
            store.save_run(&summary).await?;
            info!("Run saved to history (ID: {})", &summary.run_id.to_string()[..8]);
        }
        if let Some(bar) = &progress {
            bar.inc(1);
        }
    }

    if let Some(bar) = &progress {
        bar.finish_with_message("done");
    }

    if cmd.json {
        let data = serde_json::json!({ "leases": reports });
        println!("{}", serde_json::to_string_pretty(&data)?);
    }

    if failed > 0 {
        if !cmd.json {
            println!(
                "\n{} {} of {} lease(s) {}",
                CROSS,
                style(failed).bold(),
                cmd.file.len(),
                style("failed").red()
            );
        }
        std::process::exit(1);
    }

    if !cmd.json {
        println!(
            "\n{} {} lease(s) modelled {}",
            CHECK,
            style(cmd.file.len()).bold(),
            style("successfully").green()
        );
    }

    Ok(())
}

fn export_schedule(outcome: &ModelOutcome, path: &str) -> Result<()> {
    let Some(model) = outcome.as_recognised() else {
        bail!("'{}' is exempt from recognition and has no schedule to export", outcome.name());
    };
    let file = File::create(path).with_context(|| format!("Failed to create {}", path))?;
    write_schedule_csv(model.schedule(), BufWriter::new(file))
        .with_context(|| format!("Failed to write {}", path))?;
    info!("Schedule exported to {}", path);
    Ok(())
}

fn report_json(
    outcome: &ModelOutcome,
    qa: Option<&QaReport>,
    reporting_date: NaiveDate,
) -> Result<serde_json::Value> {
    let mut value = serde_json::json!({
        "outcome": outcome,
        "reporting_date": reporting_date,
        "qa": qa,
    });
    if let Some(model) = outcome.as_recognised() {
        value["disclosures"] =
            serde_json::to_value(Disclosures::build(model.schedule(), reporting_date))?;
        value["notes"] = serde_json::to_value(build_notes(
            model.config.description.as_deref(),
            model.undiscounted_payments(),
            model.config.depreciation_method,
        ))?;
    }
    Ok(value)
}

fn print_outcome(
    cmd: &RunCommand,
    outcome: &ModelOutcome,
    qa: Option<&QaReport>,
    reporting_date: NaiveDate,
) {
    match outcome {
        ModelOutcome::Exempt { name, lease } => print_exempt(cmd, name, lease),
        ModelOutcome::Recognised(model) => {
            print_model(cmd, model, reporting_date);
            if let Some(report) = qa.filter(|_| cmd.shows(Section::Qa)) {
                print_qa(report);
            }
        }
    }
}

fn print_exempt(cmd: &RunCommand, name: &str, lease: &ExemptLease) {
    println!("\n{} {}", INFO, style(name).bold());
    println!("  Exempt: {}", style(lease.reason_text()).cyan());
    println!("  Total expense: {}", style(format_currency(lease.total_expense())).cyan());

    if cmd.shows(Section::Schedule) {
        println!("\n{}", exempt_table(lease));
    }
    if cmd.shows(Section::Journals) {
        println!("\n{}", style("Monthly journal").bold());
        for (account, amount) in lease.monthly_journal() {
            println!("  {:<24} {:>14}", account, format_currency(amount));
        }
    }
}

fn print_model(cmd: &RunCommand, model: &LeaseModel, reporting_date: NaiveDate) {
    let config = &model.config;
    let schedule = model.schedule();

    if cmd.shows(Section::Summary) {
        println!("\n{} {}", INFO, style(&config.name).bold());
        println!("  Lease liability: {}", style(format_currency(model.liability)).cyan());
        println!("  Right-of-use asset: {}", style(format_currency(model.rou_asset)).cyan());
        println!(
            "  Total payments: {}",
            style(format_currency(model.metrics.total_payments)).cyan()
        );
        println!(
            "  Total interest: {}",
            style(format_currency(model.metrics.total_interest)).cyan()
        );
        println!("  Depreciation: {}", style(config.depreciation_method.label()).dim());
        if let Some(outcome) = &model.modification {
            println!(
                "  Modified {}: liability {} / ROU {}",
                style(outcome.modification_date).yellow(),
                style(format_currency(outcome.liability_adjustment())).yellow(),
                style(format_currency(outcome.rou_adjustment())).yellow()
            );
        }
    }

    if cmd.shows(Section::Schedule) {
        println!("\n{}", schedule_table(schedule));
    }

    if cmd.shows(Section::Disclosures) {
        let disclosures = Disclosures::build(schedule, reporting_date);
        println!(
            "\n{} {}",
            style("Disclosures at").bold(),
            style(reporting_date).bold()
        );
        println!("{}", statement_table(&disclosures.financial_position));
        println!("{}", statement_table(&disclosures.comprehensive_income));
    }

    if cmd.shows(Section::Notes) {
        let notes = build_notes(
            config.description.as_deref(),
            model.undiscounted_payments(),
            config.depreciation_method,
        );
        for note in notes {
            println!("\n{}", style(&note.title).bold());
            println!("  {}", note.body);
        }
    }

    if cmd.shows(Section::Journals) {
        println!("\n{}", style("Initial recognition").bold());
        println!(
            "{}",
            journal_table(&initial_recognition(
                model.rou_asset,
                model.liability,
                config.direct_costs,
                config.incentives,
            ))
        );
        if let Some(row) = schedule.first() {
            println!("\n{}", style("Monthly entry (first period)").bold());
            println!("{}", journal_table(&recurring_entry(row)));
        }
        let reason = config
            .modification
            .as_ref()
            .map(|m| m.reason.as_str())
            .unwrap_or_default();
        if let Some(entry) = model
            .modification
            .as_ref()
            .and_then(|outcome| modification_entry(outcome, reason))
        {
            println!(
                "\n{} {}",
                style("Modification").bold(),
                style(format!("{} {}", entry.effective_date, entry.reason)).dim()
            );
            println!("{}", journal_table(&entry.lines));
        }
    }
}

fn print_qa(report: &QaReport) {
    println!("\n{}", qa_table(report));
    if report.passed() {
        println!("{} All QA checks passed", CHECK);
    } else {
        println!(
            "{} {} QA check(s) failed",
            CROSS,
            style(report.failures().count()).red()
        );
    }
}

fn validate_lease(cmd: &ValidateCommand) -> Result<()> {
    println!("{} Validating lease...", INFO);

    match LeaseConfig::from_file(&cmd.file) {
        Ok(config) => {
            println!("{} Lease configuration is valid!", CHECK);
            println!("  Name: {}", style(&config.name).bold());
            println!("  Term: {} months", style(config.term_months).cyan());
            println!("  Payment: {}", style(format_currency(config.payment)).cyan());
            println!("  Discount rate: {}%", style(config.discount_rate).cyan());
            if config.exemptions.any() {
                println!("  Exemptions: {}", style(config.exemptions.reasons().len()).cyan());
            }

            if cmd.json {
                let json = serde_json::to_string_pretty(&config)?;
                println!("\n{}", json);
            }
            Ok(())
        }
        Err(e) => {
            println!("{} Validation failed:", CROSS);
            println!("  {}", style(format!("{:#}", e)).red());
            std::process::exit(1);
        }
    }
}

fn check_schedule(cmd: &QaCommand) -> Result<()> {
    let file = File::open(&cmd.file).with_context(|| format!("Failed to open {}", cmd.file))?;
    let schedule = read_schedule_csv(BufReader::new(file))
        .with_context(|| format!("Failed to read schedule {}", cmd.file))?;
    info!("Loaded {} schedule rows from {}", schedule.len(), cmd.file);

    let report = run_qa_checks(
        &schedule,
        QaOptions {
            residual_value: cmd.residual_value,
            method: None,
        },
    );

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_qa(&report);
    }

    if !report.passed() {
        std::process::exit(1);
    }
    Ok(())
}

async fn list_leases(cmd: &ListCommand) -> Result<()> {
    let store = open_store(cmd.db.as_deref()).await?;
    let leases = store.list_leases().await?;

    if cmd.json {
        let mut json_data = Vec::new();
        for lease in &leases {
            let runs = store.list_runs(lease).await?;
            json_data.push(serde_json::json!({
                "name": lease,
                "run_count": runs.len(),
            }));
        }
        let data = serde_json::json!({ "leases": json_data });
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    if leases.is_empty() {
        println!("{} No leases found in history", INFO);
        return Ok(());
    }

    println!("{} Leases in history:", INFO);

    for lease in &leases {
        if cmd.with_counts {
            let runs = store.list_runs(lease).await?;
            let succeeded = runs.iter().filter(|r| r.status.is_success()).count();
            println!(
                "  {} ({} runs: {} succeeded, {} failed)",
                style(lease).bold(),
                style(runs.len()).cyan(),
                style(succeeded).green(),
                style(runs.len() - succeeded).red()
            );
        } else {
            println!("  {}", style(lease).bold());
        }
    }

    Ok(())
}

async fn show_history(cmd: &HistoryCommand) -> Result<()> {
    let store = open_store(cmd.db.as_deref()).await?;

    // If a specific run is requested
    if let Some(run_id) = &cmd.run_id {
        let run_id = uuid::Uuid::parse_str(run_id).context("Invalid run ID format")?;
        match store.load_run(run_id).await? {
            Some(summary) if cmd.json => println!("{}", serde_json::to_string_pretty(&summary)?),
            Some(summary) => print_run_details(&summary, cmd.details)?,
            None => println!("{} Run not found", WARN),
        }
        return Ok(());
    }

    let mut runs = match &cmd.lease {
        Some(lease) => store.list_runs(lease).await?,
        None => {
            let mut all = Vec::new();
            for lease in store.list_leases().await? {
                all.extend(store.list_runs(&lease).await?);
            }
            all.sort_by(|a, b| b.calculated_at.cmp(&a.calculated_at));
            all
        }
    };
    runs.truncate(cmd.limit);

    if cmd.json {
        let data = serde_json::json!({ "runs": runs });
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    if runs.is_empty() {
        println!("{} No runs found", INFO);
        return Ok(());
    }

    println!("{} Run history (showing latest {}):", INFO, runs.len());
    if cmd.details {
        for summary in &runs {
            println!("  {}", format_run_summary(summary));
        }
    } else {
        println!("{}", history_table(&runs));
    }

    Ok(())
}

fn print_run_details(summary: &RunSummary, details: bool) -> Result<()> {
    println!("{} Run Details", INFO);
    println!("  ID: {}", style(summary.run_id).cyan());
    println!("  Lease: {}", style(&summary.lease_name).bold());
    println!("  Status: {}", format_status(summary.status));
    println!("  Calculated: {}", style(summary.calculated_at.to_rfc3339()).dim());
    if summary.status != RunStatus::Failed {
        println!("  Term: {} months", summary.term_months);
        println!("  Liability: {}", style(format_currency(summary.initial_liability)).cyan());
        println!("  ROU asset: {}", style(format_currency(summary.rou_asset)).cyan());
        println!("  Interest: {}", style(format_currency(summary.total_interest)).cyan());
        println!("  Payments: {}", style(format_currency(summary.total_payments)).cyan());
    }
    if let Some(error) = &summary.error {
        println!("  Error: {}", style(error).red());
    }

    if details {
        println!("\n  {}", style("Full details:").bold());
        let json = serde_json::to_string_pretty(summary)?;
        for line in json.lines() {
            println!("    {}", line);
        }
    }

    Ok(())
}
