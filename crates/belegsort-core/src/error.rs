//! Error types for the belegsort-core library.

use std::path::PathBuf;

use thiserror::Error;

use crate::models::record::Field;

/// Main error type for the belegsort library.
#[derive(Error, Debug)]
pub enum SortError {
    /// The source document could not be read as a PDF.
    #[error("document unreadable: {0}")]
    Pdf(#[from] PdfError),

    /// Field extraction or validation error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Placement into the target directory failed.
    #[error("placement error: {0}")]
    Placement(#[from] PlacementError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration value is not supported (unknown log level, bad date format).
    #[error("unrecognized configuration: {0}")]
    UnrecognizedConfiguration(String),

    /// Configuration file could not be loaded or saved.
    #[error("configuration error: {0}")]
    Config(String),
}

impl SortError {
    /// Whether this error aborts the whole run instead of a single document.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SortError::UnrecognizedConfiguration(_)
                | SortError::Config(_)
                | SortError::Placement(PlacementError::CollisionExhausted { .. })
        )
    }
}

/// Errors related to PDF processing. Every variant means the document is unreadable.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// The file itself could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors related to confirmation field extraction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// A single-valued field received a second, conflicting candidate.
    #[error("inconsistent {field}: kept {existing:?}, rejected {candidate:?}")]
    InconsistentField {
        field: Field,
        existing: String,
        candidate: String,
    },

    /// A line looked like a date but did not parse with the read format.
    #[error("failed to parse date {line:?} with format {format:?}: {reason}")]
    DateParse {
        line: String,
        format: String,
        reason: String,
    },

    /// Required fields are absent after a full scan.
    #[error("incomplete record, missing: {}", format_fields(.missing))]
    IncompleteRecord { missing: Vec<Field> },
}

/// Errors related to placing a document in the target directory.
#[derive(Error, Debug)]
pub enum PlacementError {
    /// Every collision index up to the bound is taken.
    #[error(
        "no free file name for {} after {attempts} attempts, last candidate {}",
        .source_path.display(),
        .last_candidate.display()
    )]
    CollisionExhausted {
        source_path: PathBuf,
        last_candidate: PathBuf,
        attempts: u32,
    },

    /// Copying the source to its destination failed.
    #[error("failed to copy {} to {}: {source}", .from.display(), .to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file name could not be formatted.
    #[error("failed to format file name")]
    Naming(#[from] std::fmt::Error),

    /// Any other filesystem error while preparing the target.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_fields(fields: &[Field]) -> String {
    fields
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type for the belegsort library.
pub type Result<T> = std::result::Result<T, SortError>;
