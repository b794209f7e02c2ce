//! Inspect command - show the fields extracted from a single confirmation.

use std::path::PathBuf;

use clap::Args;
use console::style;
use serde::Serialize;

use belegsort_core::confirmation::RuleHit;
use belegsort_core::{
    missing_fields, validate, ConfirmationParser, ExtractedRecord, Field, NamingScheme,
    PdfTextSource, TextSource,
};

/// Arguments for the inspect command.
#[derive(Args)]
pub struct InspectArgs {
    /// Input PDF
    #[arg(required = true)]
    input: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Date format of the date line
    #[arg(long)]
    read_format: Option<String>,

    /// Also print the raw first-page lines
    #[arg(long)]
    show_lines: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Plain text summary
    Text,
}

#[derive(Serialize)]
struct Inspection {
    record: ExtractedRecord,
    complete: bool,
    missing: Vec<Field>,
    warnings: Vec<String>,
    hits: Vec<RuleHit>,
    proposed_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    lines: Option<Vec<String>>,
}

pub async fn run(args: InspectArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = super::load_config(config_path)?;
    if let Some(format) = &args.read_format {
        config.parser.date_read_format = format.clone();
    }
    config.validate()?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let lines = PdfTextSource.first_page_lines(&args.input)?;
    let parser = ConfirmationParser::from_config(&config.parser, &config.extraction);
    let result = parser.parse(&args.input, &lines);

    let policy = config.extraction.completeness;
    let scheme = NamingScheme::from_config(&config.parser, &config.extraction)?;
    let proposed_name = validate(&result.record, policy)
        .ok()
        .map(|complete| scheme.synthesize(&complete, 0))
        .transpose()?;

    let inspection = Inspection {
        missing: missing_fields(&result.record, policy),
        complete: proposed_name.is_some(),
        record: result.record,
        warnings: result.warnings.iter().map(|w| w.to_string()).collect(),
        hits: result.hits,
        proposed_name,
        lines: args.show_lines.then_some(lines),
    };

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&inspection)?),
        OutputFormat::Text => print!("{}", format_text(&inspection)),
    }

    Ok(())
}

fn format_text(inspection: &Inspection) -> String {
    let mut output = String::new();

    output.push_str(&format!("File: {}\n\n", inspection.record.source_path.display()));

    for field in Field::ALL {
        output.push_str(&format!(
            "  {:<20} {}\n",
            field.label(),
            inspection.record.display_value(field)
        ));
    }
    output.push('\n');

    match &inspection.proposed_name {
        Some(name) => output.push_str(&format!("{} {}\n", style("→").green(), name)),
        None => output.push_str(&format!(
            "{} incomplete, missing: {}\n",
            style("✗").red(),
            inspection
                .missing
                .iter()
                .map(Field::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        )),
    }

    if !inspection.warnings.is_empty() {
        output.push_str(&format!("\n{}\n", style("Warnings:").yellow()));
        for warning in &inspection.warnings {
            output.push_str(&format!("  - {}\n", warning));
        }
    }

    if let Some(lines) = &inspection.lines {
        output.push_str("\nLines:\n");
        for (index, line) in lines.iter().enumerate() {
            let rule = inspection
                .hits
                .iter()
                .find(|h| h.line_number == index + 1)
                .map(|h| h.rule)
                .unwrap_or("");
            output.push_str(&format!("  {:>3} {:<18} {}\n", index + 1, rule, line));
        }
    }

    output
}
