//! Configuration structures for the sorting pipeline.

use std::fmt::{self, Write as _};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::NaiveDate;
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SortError};

/// Main configuration for belegsort.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SortConfig {
    /// Sources, target and formats.
    pub parser: ParserConfig,

    /// Extraction and completeness policies.
    pub extraction: ExtractionConfig,
}

/// Input/output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Files or directories to scan for `.pdf` documents.
    pub src: Vec<PathBuf>,

    /// Directory receiving the renamed copies. Created if absent.
    pub target_path: PathBuf,

    /// strftime format used to read the date line.
    pub date_read_format: String,

    /// strftime format used for the date in file names.
    pub date_write_format: String,

    /// Replace existing files instead of appending a collision index.
    pub overwrite: bool,

    /// One of `info`, `debug`, `error`.
    pub log_level: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            src: Vec::new(),
            target_path: PathBuf::from("sorted"),
            date_read_format: "%d.%m.%Y".to_string(),
            date_write_format: "%Y-%m-%d".to_string(),
            overwrite: false,
            log_level: "info".to_string(),
        }
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Which fields a record needs before it is placed.
    pub completeness: CompletenessPolicy,

    /// What a date line that fails to parse does to later date lines.
    pub date_policy: DatePolicy,

    /// Put the transaction number into the file name when present.
    pub include_number_in_name: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            completeness: CompletenessPolicy::Minimal,
            date_policy: DatePolicy::Retry,
            include_number_in_name: true,
        }
    }
}

/// Fields required for a record to count as complete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletenessPolicy {
    /// Kind, date, ISIN and broker.
    #[default]
    Minimal,
    /// Minimal plus the transaction number.
    Strict,
}

/// Handling of a date-shaped line that does not parse with the read format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatePolicy {
    /// Warn and keep looking; a later date line may still be accepted.
    #[default]
    Retry,
    /// Warn and stop looking; the first date-shaped line is the only candidate.
    FirstCandidate,
}

/// Supported log levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Debug,
    Error,
}

impl FromStr for LogLevel {
    type Err = SortError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "error" => Ok(LogLevel::Error),
            other => Err(SortError::UnrecognizedConfiguration(format!(
                "unrecognized log level {other:?}"
            ))),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Error => "error",
        })
    }
}

/// Reject strftime strings chrono cannot format with.
pub fn check_date_format(name: &str, format: &str) -> Result<()> {
    if format.is_empty() || StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(SortError::UnrecognizedConfiguration(format!(
            "invalid {name} {format:?}"
        )));
    }
    Ok(())
}

/// Like [`check_date_format`], and also reject specifiers a bare date cannot fill (`%H`, `%M`, ...).
pub fn check_write_format(name: &str, format: &str) -> Result<()> {
    check_date_format(name, format)?;
    let mut sample = String::new();
    write!(sample, "{}", NaiveDate::MIN.format(format)).map_err(|_| {
        SortError::UnrecognizedConfiguration(format!(
            "{name} {format:?} needs more than a date"
        ))
    })
}

impl SortConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SortError::Config(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| SortError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| SortError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Parsed log level.
    pub fn log_level(&self) -> Result<LogLevel> {
        self.parser.log_level.parse()
    }

    /// Check every value the run depends on before any document is touched.
    pub fn validate(&self) -> Result<()> {
        self.log_level()?;
        check_date_format("date_read_format", &self.parser.date_read_format)?;
        check_write_format("date_write_format", &self.parser.date_write_format)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_validate() {
        let config = SortConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.log_level().unwrap(), LogLevel::Info);
        assert_eq!(config.extraction.completeness, CompletenessPolicy::Minimal);
        assert_eq!(config.extraction.date_policy, DatePolicy::Retry);
    }

    #[test]
    fn test_unknown_log_level_is_unrecognized() {
        let mut config = SortConfig::default();
        config.parser.log_level = "verbose".to_string();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, SortError::UnrecognizedConfiguration(_)));
    }

    #[test]
    fn test_invalid_date_format_is_unrecognized() {
        let mut config = SortConfig::default();
        config.parser.date_write_format = "%Y-%Q".to_string();
        assert!(matches!(
            config.validate(),
            Err(SortError::UnrecognizedConfiguration(_))
        ));
    }

    #[test]
    fn test_time_specifier_in_write_format_is_unrecognized() {
        let mut config = SortConfig::default();
        config.parser.date_write_format = "%Y-%m-%d_%H%M".to_string();
        assert!(matches!(
            config.validate(),
            Err(SortError::UnrecognizedConfiguration(_))
        ));

        // Reading only needs the date fields to be present.
        assert!(check_date_format("date_read_format", "%d.%m.%Y %H:%M").is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{
            "parser": { "src": ["inbox"], "target_path": "out", "overwrite": true },
            "extraction": { "completeness": "strict", "date_policy": "first_candidate" }
        }"#;
        let config: SortConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.parser.src, vec![PathBuf::from("inbox")]);
        assert!(config.parser.overwrite);
        assert_eq!(config.parser.date_read_format, "%d.%m.%Y");
        assert_eq!(config.extraction.completeness, CompletenessPolicy::Strict);
        assert_eq!(config.extraction.date_policy, DatePolicy::FirstCandidate);
        assert!(config.extraction.include_number_in_name);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = SortConfig::default();
        config.parser.log_level = "debug".to_string();
        config.save(&path).unwrap();

        let loaded = SortConfig::from_file(&path).unwrap();
        assert_eq!(loaded.log_level().unwrap(), LogLevel::Debug);
    }
}
