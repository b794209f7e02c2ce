//! Ordered marker rules applied to each line of a confirmation.
//!
//! Each line is tested against [`RULES`] from top to bottom and only the
//! first matching rule is applied.

pub mod patterns;

use chrono::NaiveDate;

use super::draft::{RecordDraft, SlotPolicy};
use crate::error::ExtractionError;
use crate::models::config::DatePolicy;
use patterns::*;

/// Settings a rule may need besides the line itself.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    /// strftime format of the date line.
    pub read_format: &'a str,
    pub date_policy: DatePolicy,
}

/// Decides whether a rule claims a line.
pub type Predicate = fn(&str, &RecordDraft) -> bool;

/// Applies a claimed line to the draft.
pub type Handler = fn(&str, &mut RecordDraft, &RuleContext<'_>) -> Result<(), ExtractionError>;

/// A (predicate, handler) pair.
pub struct MarkerRule {
    pub name: &'static str,
    pub matches: Predicate,
    pub apply: Handler,
}

/// All rules in evaluation order.
pub static RULES: [MarkerRule; 7] = [
    MarkerRule {
        name: "settlement",
        matches: |line, _| line.contains(SETTLEMENT_MARKER),
        apply: apply_settlement,
    },
    MarkerRule {
        name: "transaction_number",
        matches: |line, _| line.contains(TRANSACTION_NUMBER_MARKER),
        apply: apply_transaction_number,
    },
    MarkerRule {
        name: "distribution",
        matches: |line, _| line.contains(DISTRIBUTION_MARKER),
        apply: apply_whole_line_kind,
    },
    MarkerRule {
        name: "deposit_in",
        matches: |line, _| line.contains(DEPOSIT_IN_MARKER),
        apply: apply_whole_line_kind,
    },
    MarkerRule {
        name: "date",
        matches: |line, draft| draft.accepts_date() && DATE_LINE.is_match(line.trim()),
        apply: apply_date,
    },
    MarkerRule {
        name: "isin",
        matches: |line, _| line.contains(ISIN_MARKER),
        apply: apply_isin,
    },
    MarkerRule {
        name: "broker",
        matches: |line, _| broker_label(line).is_some(),
        apply: apply_broker,
    },
];

/// First rule claiming `line`, if any.
pub fn find_rule(line: &str, draft: &RecordDraft) -> Option<&'static MarkerRule> {
    RULES.iter().find(|rule| (rule.matches)(line, draft))
}

/// Text after the first occurrence of `separator`.
fn value_after<'a>(line: &'a str, separator: &str) -> Option<&'a str> {
    line.split_once(separator).map(|(_, rest)| rest)
}

fn apply_settlement(
    line: &str,
    draft: &mut RecordDraft,
    _: &RuleContext<'_>,
) -> Result<(), ExtractionError> {
    // The marker itself contains the separator, so a value always follows.
    let kind = value_after(line, VALUE_SEPARATOR).unwrap_or_default().trim();
    draft.offer_kind(kind.to_string(), SlotPolicy::Once)
}

fn apply_transaction_number(
    line: &str,
    draft: &mut RecordDraft,
    _: &RuleContext<'_>,
) -> Result<(), ExtractionError> {
    match value_after(line, TRANSACTION_NUMBER_SEPARATOR) {
        Some(number) => draft.offer_number(number.trim().to_string()),
        None => {
            tracing::debug!("transaction number line without {:?}: {:?}", TRANSACTION_NUMBER_SEPARATOR, line);
            Ok(())
        }
    }
}

fn apply_whole_line_kind(
    line: &str,
    draft: &mut RecordDraft,
    _: &RuleContext<'_>,
) -> Result<(), ExtractionError> {
    draft.offer_kind(line.trim().to_string(), SlotPolicy::OnceUnlessEqual)
}

fn apply_date(
    line: &str,
    draft: &mut RecordDraft,
    ctx: &RuleContext<'_>,
) -> Result<(), ExtractionError> {
    let candidate = line.trim();
    match NaiveDate::parse_from_str(candidate, ctx.read_format) {
        Ok(date) => {
            draft.accept_date(date);
            Ok(())
        }
        Err(e) => {
            if ctx.date_policy == DatePolicy::FirstCandidate {
                draft.close_date_search();
            }
            Err(ExtractionError::DateParse {
                line: candidate.to_string(),
                format: ctx.read_format.to_string(),
                reason: e.to_string(),
            })
        }
    }
}

fn apply_isin(
    line: &str,
    draft: &mut RecordDraft,
    _: &RuleContext<'_>,
) -> Result<(), ExtractionError> {
    let isin = value_after(line, VALUE_SEPARATOR).unwrap_or_default().trim();
    draft.offer_isin(isin.to_string())
}

fn apply_broker(
    line: &str,
    draft: &mut RecordDraft,
    _: &RuleContext<'_>,
) -> Result<(), ExtractionError> {
    match broker_label(line) {
        Some(label) => draft.offer_broker(label),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::Field;
    use pretty_assertions::assert_eq;

    const CTX: RuleContext<'static> = RuleContext {
        read_format: "%d.%m.%Y",
        date_policy: DatePolicy::Retry,
    };

    fn rule_name(line: &str) -> Option<&'static str> {
        find_rule(line, &RecordDraft::new("a.pdf")).map(|r| r.name)
    }

    fn run(lines: &[&str], ctx: &RuleContext<'_>) -> (RecordDraft, Vec<ExtractionError>) {
        let mut draft = RecordDraft::new("a.pdf");
        let mut errors = Vec::new();
        for line in lines {
            if let Some(rule) = find_rule(line, &draft) {
                if let Err(e) = (rule.apply)(line, &mut draft, ctx) {
                    errors.push(e);
                }
            }
        }
        (draft, errors)
    }

    #[test]
    fn test_rule_selection() {
        assert_eq!(rule_name("Wertpapierabrechnung: Kauf"), Some("settlement"));
        assert_eq!(rule_name("Vorgangs-Nr.: 12345"), Some("transaction_number"));
        assert_eq!(rule_name("Ausschüttung"), Some("distribution"));
        assert_eq!(rule_name("Depoteinlieferung"), Some("deposit_in"));
        assert_eq!(rule_name("14.03.2023"), Some("date"));
        assert_eq!(rule_name("ISIN: DE0007164600"), Some("isin"));
        assert_eq!(rule_name("Scalable Capital GmbH"), Some("broker"));
        assert_eq!(rule_name("Seite 1 von 2"), None);
    }

    #[test]
    fn test_first_match_wins() {
        // Settlement marker shadows the ISIN marker on the same line.
        let (draft, errors) = run(&["Wertpapierabrechnung: Kauf ISIN: DE0007164600"], &CTX);
        assert!(errors.is_empty());
        assert_eq!(draft.record().transaction_kind.as_deref(), Some("Kauf ISIN: DE0007164600"));
        assert_eq!(draft.record().isin, None);

        // A distribution line mentioning the broker only sets the kind.
        let (draft, _) = run(&["Ausschüttung Scalable Capital"], &CTX);
        assert_eq!(draft.record().broker_name, None);
    }

    #[test]
    fn test_settlement_conflict_keeps_prior_value() {
        let (draft, errors) = run(
            &["Wertpapierabrechnung: Kauf", "Wertpapierabrechnung: Verkauf"],
            &CTX,
        );
        assert_eq!(draft.record().transaction_kind.as_deref(), Some("Kauf"));
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            ExtractionError::InconsistentField { field: Field::TransactionKind, .. }
        ));
    }

    #[test]
    fn test_whole_line_kind_repeats_are_fine() {
        let (draft, errors) = run(&["  Ausschüttung ", "Ausschüttung"], &CTX);
        assert!(errors.is_empty());
        assert_eq!(draft.record().transaction_kind.as_deref(), Some("Ausschüttung"));

        let (_, errors) = run(&["Ausschüttung", "Depoteinlieferung"], &CTX);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_transaction_number_first_wins() {
        let (draft, errors) = run(&["Vorgangs-Nr.: 111 ", "Vorgangs-Nr.: 222", "Vorgangs-Nr 333"], &CTX);
        assert!(errors.is_empty());
        assert_eq!(draft.record().transaction_number.as_deref(), Some("111"));
    }

    #[test]
    fn test_isin_overwrites() {
        let (draft, _) = run(&["ISIN: DE0007164600", "ISIN:  US0378331005 "], &CTX);
        assert_eq!(draft.record().isin.as_deref(), Some("US0378331005"));
    }

    #[test]
    fn test_date_retry_policy() {
        let (draft, errors) = run(&["31.02.2023", "14.03.2023", "16.03.2023"], &CTX);
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ExtractionError::DateParse { .. }));
        assert_eq!(
            draft.record().transaction_date,
            NaiveDate::from_ymd_opt(2023, 3, 14)
        );
    }

    #[test]
    fn test_date_first_candidate_policy() {
        let ctx = RuleContext {
            date_policy: DatePolicy::FirstCandidate,
            ..CTX
        };
        let (draft, errors) = run(&["31.02.2023", "14.03.2023"], &ctx);
        assert_eq!(errors.len(), 1);
        assert_eq!(draft.record().transaction_date, None);
    }

    #[test]
    fn test_later_date_lines_fall_through() {
        // Once a date is accepted, date lines are tested against the remaining rules.
        let mut draft = RecordDraft::new("a.pdf");
        draft.accept_date(NaiveDate::from_ymd_opt(2023, 3, 14).unwrap());
        assert!(find_rule("16.03.2023", &draft).is_none());
    }

    #[test]
    fn test_broker_needs_marker() {
        let (draft, _) = run(&["Baader Bank AG", "Weildorfer Str. 1"], &CTX);
        assert_eq!(draft.record().broker_name, None);
    }
}
