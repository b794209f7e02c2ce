//! Core library for sorting brokerage confirmation PDFs.
//!
//! This crate provides:
//! - PDF text extraction (first page, line by line)
//! - Marker-based field extraction (transaction kind and number, date, ISIN, broker)
//! - Completeness validation and deterministic file naming
//! - Collision-safe placement into a target directory

pub mod batch;
pub mod confirmation;
pub mod error;
pub mod models;
pub mod naming;
pub mod pdf;
pub mod placement;
pub mod sources;
pub mod validate;

pub use batch::{BatchReport, DocumentOutcome, Sorter};
pub use confirmation::{ConfirmationParser, ExtractionResult};
pub use error::{ExtractionError, PdfError, PlacementError, Result, SortError};
pub use models::config::{CompletenessPolicy, DatePolicy, LogLevel, SortConfig};
pub use models::record::{CompleteRecord, ExtractedRecord, Field, SourceDocument};
pub use naming::NamingScheme;
pub use pdf::{PdfExtractor, PdfProcessor, PdfTextSource, TextSource};
pub use placement::{Placement, Placer};
pub use sources::discover;
pub use validate::{is_complete, missing_fields, validate};
