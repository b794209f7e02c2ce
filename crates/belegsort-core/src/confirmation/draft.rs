//! Accumulator filled while scanning the lines of one document.

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::error::ExtractionError;
use crate::models::record::{ExtractedRecord, Field};

/// How a field slot reacts to a second candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotPolicy {
    /// Any second candidate is a conflict, even an identical one.
    Once,
    /// A second candidate is a conflict only if it differs.
    OnceUnlessEqual,
    /// The first value is kept, later candidates are dropped silently.
    FirstWins,
    /// Every candidate replaces the previous value.
    Overwrite,
}

/// Put `candidate` into `slot` according to `policy`.
///
/// On conflict the slot keeps its prior value and the conflict is returned.
pub fn fill(
    slot: &mut Option<String>,
    field: Field,
    candidate: String,
    policy: SlotPolicy,
) -> Result<(), ExtractionError> {
    if slot.is_none() || policy == SlotPolicy::Overwrite {
        *slot = Some(candidate);
        return Ok(());
    }

    let existing = slot.as_deref().unwrap_or_default();
    match policy {
        SlotPolicy::FirstWins => Ok(()),
        SlotPolicy::OnceUnlessEqual if existing == candidate => Ok(()),
        _ => Err(ExtractionError::InconsistentField {
            field,
            existing: existing.to_string(),
            candidate,
        }),
    }
}

/// Record under construction plus the date search state.
#[derive(Debug, Clone)]
pub struct RecordDraft {
    record: ExtractedRecord,
    date_closed: bool,
}

impl RecordDraft {
    pub fn new(source_path: impl Into<PathBuf>) -> Self {
        Self {
            record: ExtractedRecord::new(source_path),
            date_closed: false,
        }
    }

    pub fn record(&self) -> &ExtractedRecord {
        &self.record
    }

    /// Offer a transaction kind.
    pub fn offer_kind(&mut self, candidate: String, policy: SlotPolicy) -> Result<(), ExtractionError> {
        fill(&mut self.record.transaction_kind, Field::TransactionKind, candidate, policy)
    }

    /// Offer a transaction number; the first one wins.
    pub fn offer_number(&mut self, candidate: String) -> Result<(), ExtractionError> {
        fill(
            &mut self.record.transaction_number,
            Field::TransactionNumber,
            candidate,
            SlotPolicy::FirstWins,
        )
    }

    /// Offer an ISIN; later lines overwrite earlier ones.
    pub fn offer_isin(&mut self, candidate: String) -> Result<(), ExtractionError> {
        fill(&mut self.record.isin, Field::Isin, candidate, SlotPolicy::Overwrite)
    }

    /// Offer a broker label; later lines overwrite earlier ones.
    pub fn offer_broker(&mut self, label: &str) -> Result<(), ExtractionError> {
        fill(
            &mut self.record.broker_name,
            Field::BrokerName,
            label.to_string(),
            SlotPolicy::Overwrite,
        )
    }

    /// Whether date lines are still considered.
    pub fn accepts_date(&self) -> bool {
        !self.date_closed
    }

    /// Accept the transaction date and stop looking for further date lines.
    pub fn accept_date(&mut self, date: NaiveDate) {
        if self.date_closed {
            return;
        }
        self.record.transaction_date = Some(date);
        self.date_closed = true;
    }

    /// Stop looking for date lines without a date.
    pub fn close_date_search(&mut self) {
        self.date_closed = true;
    }

    pub fn finish(self) -> ExtractedRecord {
        self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_once_rejects_identical_second_value() {
        let mut slot = Some("Kauf".to_string());
        let err = fill(&mut slot, Field::TransactionKind, "Kauf".into(), SlotPolicy::Once).unwrap_err();
        assert_eq!(
            err,
            ExtractionError::InconsistentField {
                field: Field::TransactionKind,
                existing: "Kauf".into(),
                candidate: "Kauf".into(),
            }
        );
        assert_eq!(slot.as_deref(), Some("Kauf"));
    }

    #[test]
    fn test_once_unless_equal() {
        let mut slot = Some("Ausschüttung".to_string());
        assert!(fill(&mut slot, Field::TransactionKind, "Ausschüttung".into(), SlotPolicy::OnceUnlessEqual).is_ok());
        assert!(fill(&mut slot, Field::TransactionKind, "Depoteinlieferung".into(), SlotPolicy::OnceUnlessEqual).is_err());
        assert_eq!(slot.as_deref(), Some("Ausschüttung"));
    }

    #[test]
    fn test_first_wins_and_overwrite() {
        let mut number = None;
        fill(&mut number, Field::TransactionNumber, "1".into(), SlotPolicy::FirstWins).unwrap();
        fill(&mut number, Field::TransactionNumber, "2".into(), SlotPolicy::FirstWins).unwrap();
        assert_eq!(number.as_deref(), Some("1"));

        let mut isin = None;
        fill(&mut isin, Field::Isin, "DE0007164600".into(), SlotPolicy::Overwrite).unwrap();
        fill(&mut isin, Field::Isin, "US0378331005".into(), SlotPolicy::Overwrite).unwrap();
        assert_eq!(isin.as_deref(), Some("US0378331005"));
    }

    #[test]
    fn test_date_accepted_once() {
        let mut draft = RecordDraft::new("a.pdf");
        let first = NaiveDate::from_ymd_opt(2023, 3, 14).unwrap();
        let second = NaiveDate::from_ymd_opt(2023, 3, 16).unwrap();

        assert!(draft.accepts_date());
        draft.accept_date(first);
        assert!(!draft.accepts_date());
        draft.accept_date(second);

        assert_eq!(draft.finish().transaction_date, Some(first));
    }
}
