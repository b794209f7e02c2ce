//! Sort command - copy confirmations into the target directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error};

use belegsort_core::batch::DocumentExtraction;
use belegsort_core::{
    discover, BatchReport, CompletenessPolicy, DatePolicy, DocumentOutcome, Field, SortConfig,
    Sorter,
};

/// Arguments for the sort command.
#[derive(Args)]
pub struct SortArgs {
    /// Files or directories to scan (default: `parser.src` from the config)
    sources: Vec<PathBuf>,

    /// Target directory
    #[arg(short, long)]
    target: Option<PathBuf>,

    /// Replace existing files instead of appending _1, _2, ...
    #[arg(long)]
    overwrite: bool,

    /// Also require the transaction number
    #[arg(long)]
    strict: bool,

    /// Date format of the date line
    #[arg(long)]
    read_format: Option<String>,

    /// Date format used in file names
    #[arg(long)]
    write_format: Option<String>,

    /// Handling of date lines that fail to parse
    #[arg(long, value_enum)]
    date_policy: Option<DatePolicyArg>,

    /// Number of parallel extraction workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Write a CSV summary to this path
    #[arg(long)]
    summary: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum DatePolicyArg {
    /// Keep looking after an unparsable date line
    Retry,
    /// Only the first date-shaped line is considered
    FirstCandidate,
}

impl From<DatePolicyArg> for DatePolicy {
    fn from(arg: DatePolicyArg) -> Self {
        match arg {
            DatePolicyArg::Retry => DatePolicy::Retry,
            DatePolicyArg::FirstCandidate => DatePolicy::FirstCandidate,
        }
    }
}

impl SortArgs {
    /// Command line values take precedence over the config file.
    fn apply(&self, config: &mut SortConfig) {
        if !self.sources.is_empty() {
            config.parser.src = self.sources.clone();
        }
        if let Some(target) = &self.target {
            config.parser.target_path = target.clone();
        }
        if self.overwrite {
            config.parser.overwrite = true;
        }
        if self.strict {
            config.extraction.completeness = CompletenessPolicy::Strict;
        }
        if let Some(format) = &self.read_format {
            config.parser.date_read_format = format.clone();
        }
        if let Some(format) = &self.write_format {
            config.parser.date_write_format = format.clone();
        }
        if let Some(policy) = self.date_policy {
            config.extraction.date_policy = policy.into();
        }
    }
}

pub async fn run(args: SortArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = super::load_config(config_path)?;
    args.apply(&mut config);

    if config.parser.src.is_empty() {
        anyhow::bail!("No sources given. Pass files/directories or set parser.src in the config.");
    }

    let sorter = Arc::new(Sorter::from_config(&config)?);

    let documents = discover(&config.parser.src);
    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        documents.len()
    );
    if documents.is_empty() {
        return Ok(());
    }

    let pb = ProgressBar::new(documents.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    // Extraction runs in parallel; results are kept in discovery order.
    let semaphore = Arc::new(Semaphore::new(args.jobs.max(1)));
    let mut tasks = JoinSet::new();
    for (index, document) in documents.iter().cloned().enumerate() {
        let permit = Arc::clone(&semaphore).acquire_owned().await?;
        let sorter = Arc::clone(&sorter);
        tasks.spawn_blocking(move || {
            let _permit = permit;
            (index, sorter.extract(&document))
        });
    }

    let mut extractions: Vec<Option<DocumentExtraction>> =
        (0..documents.len()).map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        let (index, extraction) = joined?;
        extractions[index] = Some(extraction);
        pb.inc(1);
    }
    pb.finish_and_clear();

    // Placement is sequential so collision indices follow discovery order.
    let mut report = BatchReport::default();
    for extraction in extractions.into_iter().flatten() {
        let outcome = match extraction {
            Ok(result) => sorter.route(result),
            Err(outcome) => Ok(outcome),
        };
        match outcome {
            Ok(outcome) => report.outcomes.push(outcome),
            Err(e) => {
                error!("Aborting run: {}", e);
                print_report(&report, &config);
                return Err(e.into());
            }
        }
    }

    if let Some(path) = &args.summary {
        write_summary(path, &report)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            path.display()
        );
    }

    print_report(&report, &config);
    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn print_report(report: &BatchReport, config: &SortConfig) {
    println!();
    println!(
        "{} Processed {} files into {}",
        style("✓").green(),
        report.outcomes.len(),
        config.parser.target_path.display()
    );
    println!(
        "   {} placed, {} incomplete, {} unreadable, {} failed",
        style(report.placed()).green(),
        style(report.incomplete()).yellow(),
        style(report.unreadable()).red(),
        style(report.failed()).red()
    );

    let problems: Vec<&DocumentOutcome> = report
        .outcomes
        .iter()
        .filter(|o| !matches!(o, DocumentOutcome::Placed { .. }))
        .collect();

    if !problems.is_empty() {
        println!();
        println!("{}", style("Not placed:").yellow());
        for outcome in problems {
            println!("  - {}: {}", outcome.source().display(), detail(outcome));
        }
    }
}

fn detail(outcome: &DocumentOutcome) -> String {
    match outcome {
        DocumentOutcome::Placed { placement, .. } => placement.destination.display().to_string(),
        DocumentOutcome::Incomplete { missing, .. } => format!(
            "missing {}",
            missing
                .iter()
                .map(Field::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        ),
        DocumentOutcome::Unreadable { reason, .. } | DocumentOutcome::Failed { reason, .. } => {
            reason.clone()
        }
    }
}

fn write_summary(path: &Path, report: &BatchReport) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "file",
        "status",
        "transaction_kind",
        "transaction_number",
        "transaction_date",
        "isin",
        "broker_name",
        "detail",
    ])?;

    for outcome in &report.outcomes {
        let file = outcome.source().display().to_string();
        let status = outcome.status();
        let detail = detail(outcome);

        match outcome {
            DocumentOutcome::Placed { record, .. }
            | DocumentOutcome::Incomplete { record, .. }
            | DocumentOutcome::Failed { record, .. } => {
                let values: Vec<String> = Field::ALL
                    .iter()
                    .map(|f| {
                        if record.has(*f) {
                            record.display_value(*f)
                        } else {
                            String::new()
                        }
                    })
                    .collect();

                let mut row = vec![file, status.to_string()];
                row.extend(values);
                row.push(detail);
                wtr.write_record(&row)?;
            }
            DocumentOutcome::Unreadable { .. } => {
                wtr.write_record([file.as_str(), status, "", "", "", "", "", detail.as_str()])?;
            }
        }
    }

    wtr.flush()?;
    Ok(())
}
