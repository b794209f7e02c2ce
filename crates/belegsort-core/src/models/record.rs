//! Data model for extracted brokerage confirmations.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Marker used when a field is shown but was never captured.
pub const ABSENT: &str = "<absent>";

/// The primary fields of a confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    TransactionKind,
    TransactionNumber,
    TransactionDate,
    Isin,
    BrokerName,
}

impl Field {
    /// All primary fields in reporting order.
    pub const ALL: [Field; 5] = [
        Field::TransactionKind,
        Field::TransactionNumber,
        Field::TransactionDate,
        Field::Isin,
        Field::BrokerName,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Field::TransactionKind => "transaction kind",
            Field::TransactionNumber => "transaction number",
            Field::TransactionDate => "transaction date",
            Field::Isin => "ISIN",
            Field::BrokerName => "broker name",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One input file, identified by its path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceDocument {
    path: PathBuf,
}

impl SourceDocument {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Structured result of parsing one document. Fields stay `None` until a marker sets them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    /// Origin file location.
    pub source_path: PathBuf,
    /// Transaction category label, e.g. `Kauf` or `Ausschüttung`.
    pub transaction_kind: Option<String>,
    /// Internal reference number.
    pub transaction_number: Option<String>,
    /// Date taken from the first date line.
    pub transaction_date: Option<NaiveDate>,
    /// 12-character security identifier, verbatim.
    pub isin: Option<String>,
    /// Normalized broker label.
    pub broker_name: Option<String>,
}

impl ExtractedRecord {
    pub fn new(source_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            ..Self::default()
        }
    }

    /// Whether the given field holds a non-empty value.
    pub fn has(&self, field: Field) -> bool {
        match field {
            Field::TransactionKind => non_empty(&self.transaction_kind),
            Field::TransactionNumber => non_empty(&self.transaction_number),
            Field::TransactionDate => self.transaction_date.is_some(),
            Field::Isin => non_empty(&self.isin),
            Field::BrokerName => non_empty(&self.broker_name),
        }
    }

    /// Display value of a field, [`ABSENT`] if missing.
    pub fn display_value(&self, field: Field) -> String {
        let value = match field {
            Field::TransactionKind => self.transaction_kind.clone(),
            Field::TransactionNumber => self.transaction_number.clone(),
            Field::TransactionDate => self.transaction_date.map(|d| d.to_string()),
            Field::Isin => self.isin.clone(),
            Field::BrokerName => self.broker_name.clone(),
        };
        value
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| ABSENT.to_string())
    }

    /// All five primary fields plus the source path, for diagnostics.
    pub fn describe(&self) -> String {
        let fields = Field::ALL
            .iter()
            .map(|f| format!("{}={}", f.label(), self.display_value(*f)))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}, file={}", fields, self.source_path.display())
    }
}

fn non_empty(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

/// A record that passed validation. Gating fields are no longer optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompleteRecord {
    pub source_path: PathBuf,
    pub transaction_kind: String,
    pub transaction_number: Option<String>,
    pub transaction_date: NaiveDate,
    pub isin: String,
    pub broker_name: String,
}
