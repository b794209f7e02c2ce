//! Completeness checks run before a record may be placed.

use crate::error::ExtractionError;
use crate::models::config::CompletenessPolicy;
use crate::models::record::{CompleteRecord, ExtractedRecord, Field};

impl CompletenessPolicy {
    /// Fields that must be present under this policy.
    pub fn required_fields(&self) -> &'static [Field] {
        match self {
            CompletenessPolicy::Minimal => &[
                Field::TransactionKind,
                Field::TransactionDate,
                Field::Isin,
                Field::BrokerName,
            ],
            CompletenessPolicy::Strict => &[
                Field::TransactionKind,
                Field::TransactionNumber,
                Field::TransactionDate,
                Field::Isin,
                Field::BrokerName,
            ],
        }
    }
}

/// Required fields absent from `record`, in reporting order.
pub fn missing_fields(record: &ExtractedRecord, policy: CompletenessPolicy) -> Vec<Field> {
    policy
        .required_fields()
        .iter()
        .copied()
        .filter(|field| !record.has(*field))
        .collect()
}

pub fn is_complete(record: &ExtractedRecord, policy: CompletenessPolicy) -> bool {
    missing_fields(record, policy).is_empty()
}

/// Turn a record into a [`CompleteRecord`] or report what is missing.
pub fn validate(
    record: &ExtractedRecord,
    policy: CompletenessPolicy,
) -> Result<CompleteRecord, ExtractionError> {
    let missing = missing_fields(record, policy);

    match (
        &record.transaction_kind,
        record.transaction_date,
        &record.isin,
        &record.broker_name,
    ) {
        (Some(kind), Some(date), Some(isin), Some(broker)) if missing.is_empty() => {
            Ok(CompleteRecord {
                source_path: record.source_path.clone(),
                transaction_kind: kind.clone(),
                transaction_number: record.transaction_number.clone().filter(|n| !n.is_empty()),
                transaction_date: date,
                isin: isin.clone(),
                broker_name: broker.clone(),
            })
        }
        _ => Err(ExtractionError::IncompleteRecord { missing }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn full_record() -> ExtractedRecord {
        ExtractedRecord {
            source_path: "a.pdf".into(),
            transaction_kind: Some("Kauf".into()),
            transaction_number: Some("12345".into()),
            transaction_date: NaiveDate::from_ymd_opt(2023, 3, 14),
            isin: Some("DE0007164600".into()),
            broker_name: Some("ScalableCapital".into()),
        }
    }

    #[test]
    fn test_complete_record() {
        let record = full_record();
        assert!(is_complete(&record, CompletenessPolicy::Minimal));
        assert!(is_complete(&record, CompletenessPolicy::Strict));

        let complete = validate(&record, CompletenessPolicy::Strict).unwrap();
        assert_eq!(complete.isin, "DE0007164600");
        assert_eq!(complete.transaction_number.as_deref(), Some("12345"));
    }

    #[test]
    fn test_each_gating_field_is_reported() {
        let cases = [
            Field::TransactionKind,
            Field::TransactionDate,
            Field::Isin,
            Field::BrokerName,
        ];

        for field in cases {
            let mut record = full_record();
            match field {
                Field::TransactionKind => record.transaction_kind = None,
                Field::TransactionDate => record.transaction_date = None,
                Field::Isin => record.isin = None,
                Field::BrokerName => record.broker_name = None,
                Field::TransactionNumber => unreachable!(),
            }

            assert!(!is_complete(&record, CompletenessPolicy::Minimal));
            assert_eq!(
                validate(&record, CompletenessPolicy::Minimal).unwrap_err(),
                ExtractionError::IncompleteRecord { missing: vec![field] }
            );
        }
    }

    #[test]
    fn test_number_gates_only_in_strict_policy() {
        let mut record = full_record();
        record.transaction_number = None;

        assert!(is_complete(&record, CompletenessPolicy::Minimal));
        assert_eq!(
            missing_fields(&record, CompletenessPolicy::Strict),
            vec![Field::TransactionNumber]
        );
    }

    #[test]
    fn test_empty_values_count_as_missing() {
        let mut record = full_record();
        record.isin = Some(String::new());
        record.broker_name = None;
        assert_eq!(
            missing_fields(&record, CompletenessPolicy::Minimal),
            vec![Field::Isin, Field::BrokerName]
        );
    }
}
