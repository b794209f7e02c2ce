//! Deterministic target file names.

use std::fmt::{self, Write as _};

use crate::error::Result;
use crate::models::config::{check_write_format, ExtractionConfig, ParserConfig};
use crate::models::record::CompleteRecord;

/// Extension of every synthesized name.
pub const EXTENSION: &str = "pdf";

/// Segment separator.
pub const SEPARATOR: char = '_';

/// How records are turned into file names.
#[derive(Debug, Clone)]
pub struct NamingScheme {
    write_format: String,
    include_number: bool,
}

impl NamingScheme {
    /// Create a scheme writing dates with `write_format`.
    ///
    /// Fails with `UnrecognizedConfiguration` if chrono cannot format a date with it.
    pub fn new(write_format: impl Into<String>) -> Result<Self> {
        let write_format = write_format.into();
        check_write_format("date_write_format", &write_format)?;
        Ok(Self {
            write_format,
            include_number: true,
        })
    }

    pub fn from_config(parser: &ParserConfig, extraction: &ExtractionConfig) -> Result<Self> {
        Ok(Self::new(parser.date_write_format.clone())?
            .with_number(extraction.include_number_in_name))
    }

    /// Include the transaction number segment when the record has one.
    pub fn with_number(mut self, include: bool) -> Self {
        self.include_number = include;
        self
    }

    pub fn write_format(&self) -> &str {
        &self.write_format
    }

    /// `<date>_<broker>_<isin>[_<number>]_<kind>[_<index>].pdf`
    ///
    /// Values are used verbatim. Identical records yield identical names at
    /// index 0. Fails only for a write format `new` would have rejected.
    pub fn synthesize(
        &self,
        record: &CompleteRecord,
        collision_index: u32,
    ) -> std::result::Result<String, fmt::Error> {
        let mut name = String::new();
        write!(name, "{}", record.transaction_date.format(&self.write_format))?;

        let mut segments = vec![record.broker_name.as_str(), record.isin.as_str()];
        if self.include_number {
            if let Some(number) = record.transaction_number.as_deref() {
                segments.push(number);
            }
        }
        segments.push(record.transaction_kind.as_str());

        for segment in segments {
            name.push(SEPARATOR);
            name.push_str(segment);
        }

        if collision_index > 0 {
            write!(name, "{}{}", SEPARATOR, collision_index)?;
        }

        name.push('.');
        name.push_str(EXTENSION);
        Ok(name)
    }
}
