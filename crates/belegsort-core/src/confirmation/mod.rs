//! Confirmation field extraction module.

pub mod draft;
mod parser;
pub mod rules;

pub use draft::{RecordDraft, SlotPolicy};
pub use parser::{ConfirmationParser, ExtractionResult, RuleHit};
