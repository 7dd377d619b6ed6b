use std::fs::File;
use std::path::Path;

use chrono::{Local, NaiveDate};
use clap::Args;

use crate::cli::BulkArgs;
use crate::infra::{build_engine, seed_businesses, Engine};
use zonecert::bulk::{export_csv, parse_identifiers, JobError};
use zonecert::config::BulkConfig;
use zonecert::error::AppError;
use zonecert::verification::{BusinessId, TriggeredBy};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Evaluation date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    /// Skip the bulk verification portion of the demo.
    #[arg(long)]
    pub(crate) skip_bulk: bool,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let as_of = args.as_of.unwrap_or_else(|| Local::now().date_naive());
    let engine = build_engine(BulkConfig::default())?;

    println!("Zone certification demo (as of {as_of})");
    println!("\nSingle verifications");
    for snapshot in seed_businesses() {
        let triggered_by = TriggeredBy::Operator("demo".to_string());
        match engine.service.verify(&snapshot.id, as_of, triggered_by) {
            Ok(record) => {
                let zone = record
                    .verdict
                    .zone_id
                    .as_ref()
                    .map(|id| id.0.as_str())
                    .unwrap_or("none");
                println!(
                    "  {} {:<28} {:<13} risk {:>3} ({:8}) zone {}",
                    record.business_id.as_str(),
                    record.business_name,
                    record.status.label(),
                    record.risk_score,
                    record.risk_level.label(),
                    zone,
                );
                if record.verdict.in_grace_period {
                    let days = record.verdict.grace_days_remaining.unwrap_or(0);
                    println!("      grace period: {days} days remaining");
                }
                if record.breakdown.certification.requires_recertification {
                    println!("      recertification window open");
                }
            }
            Err(err) => println!("  {} failed: {err}", snapshot.id.as_str()),
        }
    }

    if !args.skip_bulk {
        let mut identifiers: Vec<BusinessId> = seed_businesses()
            .into_iter()
            .map(|snapshot| snapshot.id)
            .collect();
        if let Ok(unknown) = BusinessId::parse("ZZZZ00000000") {
            identifiers.push(unknown);
        }
        run_batch(&engine, identifiers, as_of, None).await?;
    }

    Ok(())
}

pub(crate) async fn run_bulk(args: BulkArgs) -> Result<(), AppError> {
    let as_of = args.as_of.unwrap_or_else(|| Local::now().date_naive());
    let engine = build_engine(BulkConfig::default())?;

    let input = File::open(&args.input)?;
    let identifiers = parse_identifiers(input, engine.orchestrator.max_batch())?;
    run_batch(&engine, identifiers, as_of, args.export.as_deref()).await
}

async fn run_batch(
    engine: &Engine,
    identifiers: Vec<BusinessId>,
    as_of: NaiveDate,
    export_path: Option<&Path>,
) -> Result<(), AppError> {
    let job_id = engine.orchestrator.submit(identifiers, as_of)?;
    println!("\nBulk job {} submitted", job_id.0);

    let status = engine.orchestrator.run(&job_id).await?;
    println!("Bulk job finished: {}", status.label());

    let job = engine
        .orchestrator
        .snapshot(&job_id)
        .ok_or_else(|| AppError::Job(JobError::UnknownJob(job_id.0.clone())))?;

    if let Some(summary) = &job.summary {
        println!(
            "  compliant {}  non-compliant {}  expired {}  not found {}  errors {}{}",
            summary.compliant,
            summary.non_compliant,
            summary.expired,
            summary.not_found,
            summary.errors,
            if summary.degraded { "  (degraded)" } else { "" },
        );
    }
    if let Some(fault) = &job.fault {
        println!("  fault: {fault}");
    }

    let csv = export_csv(&job)
        .map_err(|err| AppError::Io(std::io::Error::new(std::io::ErrorKind::Other, err)))?;
    match export_path {
        Some(path) => {
            std::fs::write(path, &csv)?;
            println!("Export written to {}", path.display());
        }
        None => {
            println!("\nExport");
            print!("{csv}");
        }
    }

    Ok(())
}
