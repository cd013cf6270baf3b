mod commands;
mod logging;
mod progress;

use std::io::{self, Write};
use std::process;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use colored::*;
use commands::{Cli, Commands};
use dotenv::dotenv;
use organizer_core::classifier::OpenRouterClassifier;
use organizer_core::config::load_configuration;
use organizer_core::linker::clean_tree;
use organizer_core::storage::{Ledger, SqliteLedger};
use organizer_core::{AppConfig, PassReport, ReconcileEngine, RunScheduler, SilentReporter};
use progress::CliReporter;
use tracing::{error, info, warn};

fn main() {
    dotenv().ok();

    let _guard = logging::init_logger();

    let args = Cli::parse();

    let mut config = match load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };
    if args.real_run {
        config.real_run = true;
    }

    let result = match args.command.unwrap_or(Commands::Run) {
        Commands::Run => run_scheduled(&config),
        Commands::Once => run_once(&config),
        Commands::Clean => run_clean(&config),
        Commands::Status { list } => print_status(&config, list),
        Commands::PrintConfig => print_config(&config),
        Commands::ResetLedger => reset_ledger(&config),
    };

    if let Err(err) = result {
        error!("Error: {:#}", err);
        process::exit(1);
    }
}

fn build_engine(config: &AppConfig) -> anyhow::Result<ReconcileEngine> {
    let settings = config.resolve().context("Invalid configuration")?;
    let ledger = SqliteLedger::open(&settings.ledger_path())
        .with_context(|| format!("Error opening ledger {}", settings.ledger_path().display()))?;
    let classifier = OpenRouterClassifier::from_config(config)?;
    if settings.run_mode.is_dry_run() {
        warn!("REAL_RUN is not set: symlink changes will only be logged");
    }
    Ok(ReconcileEngine::new(
        settings,
        Box::new(ledger),
        Box::new(classifier),
    ))
}

fn run_scheduled(config: &AppConfig) -> anyhow::Result<()> {
    let engine = Arc::new(build_engine(config)?);
    let scheduler = RunScheduler::new(engine.settings().interval);

    info!(
        "File organizer is running every {}s. Press Ctrl+C to exit.",
        scheduler.interval().as_secs()
    );
    scheduler.run(move || engine.run_pass(&SilentReporter));
    Ok(())
}

fn run_once(config: &AppConfig) -> anyhow::Result<()> {
    let engine = build_engine(config)?;
    let reporter = CliReporter::new();
    let report = engine.run_pass(&reporter)?;
    print_summary(&report);
    Ok(())
}

fn print_summary(report: &PassReport) {
    println!();
    if report.skipped {
        info!(
            "{} entries listed, nothing new ({})",
            format!("{}", report.listed).cyan(),
            format!("{:.2}s", report.duration.as_secs_f64()).green(),
        );
        return;
    }
    info!(
        "{} entries listed, {} new, {} categorizations in {}",
        format!("{}", report.listed).cyan(),
        format!("{}", report.unprocessed).cyan(),
        format!("{}", report.categorizations).cyan(),
        format!("{:.2}s", report.duration.as_secs_f64()).green(),
    );
    let links = &report.links;
    info!(
        "{} created, {} replaced, {} unchanged, {} planned, {} rejected, {} blocked, {} failed",
        format!("{}", links.created).green(),
        format!("{}", links.replaced).green(),
        links.already_linked,
        format!("{}", links.planned).yellow(),
        format!("{}", links.rejected).yellow(),
        format!("{}", links.foreign).red(),
        format!("{}", links.failed).red(),
    );
    if report.mark_failures > 0 {
        warn!("{} items could not be recorded in the ledger", report.mark_failures);
    }
}

fn run_clean(config: &AppConfig) -> anyhow::Result<()> {
    let settings = config.resolve().context("Invalid configuration")?;
    let report = clean_tree(&settings.target_root, settings.run_mode);
    info!(
        "{} symlinks and {} directories {}, {} failures",
        format!("{}", report.links_removed).green(),
        format!("{}", report.dirs_removed).green(),
        if settings.run_mode.is_dry_run() {
            "would be removed"
        } else {
            "removed"
        },
        format!("{}", report.failures).red(),
    );
    Ok(())
}

fn print_status(config: &AppConfig, list: bool) -> anyhow::Result<()> {
    let settings = config.resolve().context("Invalid configuration")?;
    let ledger = SqliteLedger::open(&settings.ledger_path())?;
    let entries =
        organizer_core::scanner::list_root_entries(&settings.source_root, &settings.ignore_patterns)?;
    let mut new_entries = 0;
    for entry in &entries {
        if !ledger.is_processed(&entry.name)? {
            new_entries += 1;
        }
    }

    println!("Source:    {}", settings.source_root.display());
    println!("Target:    {}", settings.target_root.display());
    println!("Ledger:    {}", settings.ledger_path().display());
    println!("Processed: {}", format!("{}", ledger.count()?).cyan());
    println!(
        "Source entries: {} ({} new)",
        entries.len(),
        format!("{}", new_entries).yellow()
    );
    if list {
        for name in ledger.processed_names()? {
            println!("  {}", name);
        }
    }
    Ok(())
}

fn print_config(config: &AppConfig) -> anyhow::Result<()> {
    println!("{}", config.redacted().to_toml()?);
    Ok(())
}

fn reset_ledger(config: &AppConfig) -> anyhow::Result<()> {
    let settings = config.resolve().context("Invalid configuration")?;
    if !prompt_confirm(
        "Are you SURE you want to forget every processed item?",
        Some(false),
    )? {
        return Ok(());
    }
    let ledger = SqliteLedger::open(&settings.ledger_path())?;
    ledger.clear()?;
    println!("Ledger cleared");
    Ok(())
}

fn prompt_confirm(prompt: &str, default: Option<bool>) -> io::Result<bool> {
    let mut input = String::new();

    loop {
        input.clear();

        match default {
            Some(true) => print!("{} (Y/n): ", prompt),
            Some(false) | None => print!("{} (y/N): ", prompt),
        }
        io::stdout().flush()?;

        io::stdin().read_line(&mut input)?;

        match input.trim().to_uppercase().as_str() {
            "Y" => return Ok(true),
            "N" => return Ok(false),
            "" => match default {
                Some(default) => return Ok(default),
                None => continue,
            },
            _ => continue,
        }
    }
}
