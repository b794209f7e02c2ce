//! Line-by-line parser for brokerage confirmations.

use std::path::Path;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, warn};

use super::draft::RecordDraft;
use super::rules::{find_rule, RuleContext};
use crate::error::ExtractionError;
use crate::models::config::{DatePolicy, ExtractionConfig, ParserConfig};
use crate::models::record::ExtractedRecord;
use crate::pdf::split_lines;

/// A line claimed by a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleHit {
    /// 1-indexed line number on the page.
    pub line_number: usize,
    pub rule: &'static str,
}

/// Result of parsing one document.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Extracted, possibly incomplete record.
    pub record: ExtractedRecord,
    /// Conflicts and parse failures that were downgraded to warnings.
    pub warnings: Vec<ExtractionError>,
    /// Which rule claimed which line.
    pub hits: Vec<RuleHit>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Scans the lines of a confirmation once and assembles an [`ExtractedRecord`].
#[derive(Debug, Clone)]
pub struct ConfirmationParser {
    read_format: String,
    date_policy: DatePolicy,
}

impl ConfirmationParser {
    /// Create a parser reading dates with `read_format`.
    pub fn new(read_format: impl Into<String>) -> Self {
        Self {
            read_format: read_format.into(),
            date_policy: DatePolicy::default(),
        }
    }

    /// Build a parser from the configuration sections it depends on.
    pub fn from_config(parser: &ParserConfig, extraction: &ExtractionConfig) -> Self {
        Self::new(parser.date_read_format.clone()).with_date_policy(extraction.date_policy)
    }

    /// Set the date policy.
    pub fn with_date_policy(mut self, policy: DatePolicy) -> Self {
        self.date_policy = policy;
        self
    }

    pub fn read_format(&self) -> &str {
        &self.read_format
    }

    /// Parse the lines of one document.
    ///
    /// Never fails: conflicting or unparsable values are logged, collected in
    /// [`ExtractionResult::warnings`] and the previously set value is kept.
    pub fn parse<S: AsRef<str>>(&self, source_path: &Path, lines: &[S]) -> ExtractionResult {
        let start = Instant::now();
        let ctx = RuleContext {
            read_format: &self.read_format,
            date_policy: self.date_policy,
        };

        let mut draft = RecordDraft::new(source_path);
        let mut warnings = Vec::new();
        let mut hits = Vec::new();

        for (index, line) in lines.iter().enumerate() {
            let line = line.as_ref();
            let Some(rule) = find_rule(line, &draft) else {
                continue;
            };

            debug!("line {} matched rule {}: {:?}", index + 1, rule.name, line);
            hits.push(RuleHit {
                line_number: index + 1,
                rule: rule.name,
            });

            if let Err(e) = (rule.apply)(line, &mut draft, &ctx) {
                warn!("{} in {}", e, source_path.display());
                warnings.push(e);
            }
        }

        ExtractionResult {
            record: draft.finish(),
            warnings,
            hits,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }

    /// Parse raw page text.
    pub fn parse_text(&self, source_path: &Path, text: &str) -> ExtractionResult {
        self.parse(source_path, &split_lines(text))
    }
}

impl Default for ConfirmationParser {
    fn default() -> Self {
        Self::from_config(&ParserConfig::default(), &ExtractionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::Field;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    const SETTLEMENT: [&str; 5] = [
        "Wertpapierabrechnung: Kauf",
        "Vorgangs-Nr.: 12345",
        "14.03.2023",
        "ISIN: DE0007164600",
        "Scalable Capital GmbH",
    ];

    fn expected(path: &str) -> ExtractedRecord {
        ExtractedRecord {
            source_path: path.into(),
            transaction_kind: Some("Kauf".into()),
            transaction_number: Some("12345".into()),
            transaction_date: NaiveDate::from_ymd_opt(2023, 3, 14),
            isin: Some("DE0007164600".into()),
            broker_name: Some("ScalableCapital".into()),
        }
    }

    #[test]
    fn test_parse_settlement() {
        let parser = ConfirmationParser::default();
        let result = parser.parse(Path::new("in/a.pdf"), &SETTLEMENT);

        assert_eq!(result.record, expected("in/a.pdf"));
        assert!(result.warnings.is_empty());
        assert_eq!(result.hits.len(), 5);
    }

    #[test]
    fn test_marker_order_does_not_matter() {
        let parser = ConfirmationParser::default();
        let orders: [[usize; 5]; 4] = [
            [4, 3, 2, 1, 0],
            [2, 0, 4, 1, 3],
            [3, 4, 0, 2, 1],
            [1, 2, 3, 4, 0],
        ];

        for order in orders {
            let mut lines: Vec<&str> = vec!["Depotauszug", "Seite 1"];
            for i in order {
                lines.push(SETTLEMENT[i]);
                lines.push("Kundennummer 0000");
            }
            let result = parser.parse(Path::new("b.pdf"), &lines);
            assert_eq!(result.record, expected("b.pdf"), "order {:?}", order);
        }
    }

    #[test]
    fn test_first_date_line_wins() {
        let text = "Wertpapierabrechnung: Kauf\n14.03.2023\n16.03.2023\nISIN: DE0007164600";
        let result = ConfirmationParser::default().parse_text(Path::new("c.pdf"), text);
        assert_eq!(
            result.record.transaction_date,
            NaiveDate::from_ymd_opt(2023, 3, 14)
        );
    }

    #[test]
    fn test_conflicting_kind_is_a_warning() {
        let lines = [
            "Ausschüttung",
            "Wertpapierabrechnung: Kauf",
            "ISIN: IE00B4L5Y983",
        ];
        let result = ConfirmationParser::default().parse(Path::new("d.pdf"), &lines);

        assert_eq!(result.record.transaction_kind.as_deref(), Some("Ausschüttung"));
        assert_eq!(result.record.isin.as_deref(), Some("IE00B4L5Y983"));
        assert_eq!(
            result.warnings,
            vec![ExtractionError::InconsistentField {
                field: Field::TransactionKind,
                existing: "Ausschüttung".into(),
                candidate: "Kauf".into(),
            }]
        );
    }

    #[test]
    fn test_custom_read_format() {
        let parser = ConfirmationParser::new("%d.%m.%Y Handelstag");
        let result = parser.parse(Path::new("e.pdf"), &["14.03.2023 Handelstag"]);
        assert_eq!(
            result.record.transaction_date,
            NaiveDate::from_ymd_opt(2023, 3, 14)
        );
    }

    #[test]
    fn test_empty_page() {
        let lines: [&str; 0] = [];
        let result = ConfirmationParser::default().parse(Path::new("f.pdf"), &lines);
        assert_eq!(result.record, ExtractedRecord::new("f.pdf"));
        assert!(result.hits.is_empty());
    }
}
