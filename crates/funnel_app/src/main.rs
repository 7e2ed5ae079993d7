mod cli;
mod config;
mod effects;
mod session;

use anyhow::Context;
use clap::Parser;
use funnel_core::{SubmissionOutcome, SubmissionSummary};
use funnel_engine::{EngineHandle, FileKvStore, SubmissionStore};
use funnel_logging::{funnel_info, funnel_warn};
use log::LevelFilter;
use serde_json::Value;

use crate::cli::{Cli, Command};
use crate::config::AppConfig;
use crate::session::Session;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let loaded = config::load(cli.config.as_deref());
    let config = cli.apply_overrides(loaded.config);

    funnel_logging::initialize(config.log_destination(), LevelFilter::Info);
    for warning in &loaded.warnings {
        funnel_warn!("{}", warning);
    }

    match cli.command {
        Command::Submit(args) => {
            let engine = EngineHandle::new(config.engine_config());
            let report = Session::new(engine).run(&args);
            match report.view.summary {
                Some(summary) => print_summary(&summary, report.outcome.as_ref()),
                None => println!("No usable images were provided; nothing was submitted."),
            }
            Ok(())
        }
        Command::List { with_images } => list(&config, with_images),
    }
}

fn print_summary(summary: &SubmissionSummary, outcome: Option<&SubmissionOutcome>) {
    if let Some(SubmissionOutcome::Accepted { id }) = outcome {
        funnel_info!("Submission stored with id {}", id);
    }
    println!("Thank you! We received your details and will get back to you soon.");
    println!("  Name:        {}", summary.full_name);
    println!("  Phone:       {}", summary.phone_number);
    println!(
        "  Budget:      {} - {}",
        summary.budget_lower, summary.budget_upper
    );
    match &summary.specific_date {
        Some(date) if summary.due_date == funnel_core::DueDateKind::Specific => {
            println!("  Due date:    {date}")
        }
        _ => println!("  Due date:    {}", summary.due_date),
    }
    println!("  Images:      {}", summary.image_count);
}

fn list(config: &AppConfig, with_images: bool) -> anyhow::Result<()> {
    let store = SubmissionStore::new(
        FileKvStore::new(config.store_dir.clone()),
        config.store_key.clone(),
    );
    let mut entries = Vec::new();
    for record in store.records() {
        let mut value = serde_json::to_value(&record).context("serialize submission record")?;
        if !with_images {
            let sizes: Vec<Value> = record
                .images
                .iter()
                .map(|image| Value::from(format!("<{} bytes>", image.len())))
                .collect();
            value["images"] = Value::Array(sizes);
        }
        entries.push(value);
    }
    let text = serde_json::to_string_pretty(&entries).context("render submission log")?;
    println!("{text}");
    Ok(())
}
