//! Per-document pipeline and batch orchestration.
//!
//! Documents are independent: unreadable, inconsistent and incomplete
//! documents are reported and skipped. Only an exhausted collision search
//! stops a run.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{error, warn};

use crate::confirmation::{ConfirmationParser, ExtractionResult};
use crate::error::{ExtractionError, PlacementError, Result, SortError};
use crate::models::config::{CompletenessPolicy, SortConfig};
use crate::models::record::{ExtractedRecord, Field, SourceDocument};
use crate::naming::NamingScheme;
use crate::pdf::{PdfTextSource, TextSource};
use crate::placement::{Placement, Placer};
use crate::validate::validate;

/// What happened to one document.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DocumentOutcome {
    /// Copied into the target directory.
    Placed {
        record: ExtractedRecord,
        placement: Placement,
    },
    /// Required fields were missing.
    Incomplete {
        record: ExtractedRecord,
        missing: Vec<Field>,
    },
    /// The file could not be read as a PDF.
    Unreadable { source: PathBuf, reason: String },
    /// Copying failed.
    Failed {
        record: ExtractedRecord,
        reason: String,
    },
}

impl DocumentOutcome {
    pub fn source(&self) -> &Path {
        match self {
            DocumentOutcome::Placed { record, .. }
            | DocumentOutcome::Incomplete { record, .. }
            | DocumentOutcome::Failed { record, .. } => &record.source_path,
            DocumentOutcome::Unreadable { source, .. } => source,
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            DocumentOutcome::Placed { .. } => "placed",
            DocumentOutcome::Incomplete { .. } => "incomplete",
            DocumentOutcome::Unreadable { .. } => "unreadable",
            DocumentOutcome::Failed { .. } => "failed",
        }
    }
}

/// Outcomes of a run, in discovery order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub outcomes: Vec<DocumentOutcome>,
}

impl BatchReport {
    fn count(&self, status: &str) -> usize {
        self.outcomes.iter().filter(|o| o.status() == status).count()
    }

    pub fn placed(&self) -> usize {
        self.count("placed")
    }

    pub fn incomplete(&self) -> usize {
        self.count("incomplete")
    }

    pub fn unreadable(&self) -> usize {
        self.count("unreadable")
    }

    pub fn failed(&self) -> usize {
        self.count("failed")
    }
}

/// Extraction of one document, or why it could not be read.
pub type DocumentExtraction = std::result::Result<ExtractionResult, DocumentOutcome>;

/// Drives documents through extraction, validation, naming and placement.
pub struct Sorter<S = PdfTextSource> {
    source: S,
    parser: ConfirmationParser,
    completeness: CompletenessPolicy,
    placer: Placer,
}

impl Sorter<PdfTextSource> {
    /// Build a sorter reading PDFs from disk.
    ///
    /// Validates the configuration and creates the target directory.
    pub fn from_config(config: &SortConfig) -> Result<Self> {
        Self::with_source(PdfTextSource, config)
    }
}

impl<S: TextSource> Sorter<S> {
    /// Build a sorter around any [`TextSource`].
    pub fn with_source(source: S, config: &SortConfig) -> Result<Self> {
        config.validate()?;

        let scheme = NamingScheme::from_config(&config.parser, &config.extraction)?;
        let placer = Placer::new(&config.parser.target_path, scheme, config.parser.overwrite)?;

        Ok(Self {
            source,
            parser: ConfirmationParser::from_config(&config.parser, &config.extraction),
            completeness: config.extraction.completeness,
            placer,
        })
    }

    pub fn parser(&self) -> &ConfirmationParser {
        &self.parser
    }

    pub fn placer(&self) -> &Placer {
        &self.placer
    }

    /// Read and parse one document.
    pub fn extract(&self, document: &SourceDocument) -> DocumentExtraction {
        let path = document.path();
        match self.source.first_page_lines(path) {
            Ok(lines) => Ok(self.parser.parse(path, &lines)),
            Err(e) => {
                warn!("Skipping unreadable document {}: {}", path.display(), e);
                Err(DocumentOutcome::Unreadable {
                    source: path.to_path_buf(),
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Validate an extraction and place it if complete.
    ///
    /// Returns `Err` only for errors that abort the run.
    pub fn route(&self, extraction: ExtractionResult) -> Result<DocumentOutcome> {
        let record = extraction.record;

        let complete = match validate(&record, self.completeness) {
            Ok(complete) => complete,
            Err(ExtractionError::IncompleteRecord { missing }) => {
                warn!(
                    "Incomplete record, missing {}: {}",
                    missing
                        .iter()
                        .map(|f| f.to_string())
                        .collect::<Vec<_>>()
                        .join(", "),
                    record.describe()
                );
                return Ok(DocumentOutcome::Incomplete { record, missing });
            }
            Err(e) => return Err(e.into()),
        };

        match self.placer.place(&complete) {
            Ok(placement) => Ok(DocumentOutcome::Placed { record, placement }),
            Err(e @ PlacementError::CollisionExhausted { .. }) => {
                error!("{}", e);
                Err(SortError::from(e))
            }
            Err(e) => {
                warn!("Failed to place {}: {}", record.source_path.display(), e);
                Ok(DocumentOutcome::Failed {
                    record,
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Extract and route one document.
    pub fn process(&self, document: &SourceDocument) -> Result<DocumentOutcome> {
        match self.extract(document) {
            Ok(extraction) => self.route(extraction),
            Err(outcome) => Ok(outcome),
        }
    }

    /// Process documents sequentially, stopping at the first fatal error.
    pub fn run(&self, documents: &[SourceDocument]) -> Result<BatchReport> {
        let mut report = BatchReport::default();
        for document in documents {
            report.outcomes.push(self.process(document)?);
        }
        Ok(report)
    }
}
