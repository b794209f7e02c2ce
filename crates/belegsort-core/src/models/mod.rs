//! Data models: extracted records and configuration.

pub mod config;
pub mod record;

pub use config::{CompletenessPolicy, DatePolicy, LogLevel, SortConfig};
pub use record::{CompleteRecord, ExtractedRecord, Field, SourceDocument};
