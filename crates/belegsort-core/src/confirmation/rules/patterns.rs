//! Marker strings and patterns found on brokerage confirmations.

use lazy_static::lazy_static;
use regex::Regex;

/// Settlement header, e.g. `Wertpapierabrechnung: Kauf`.
pub const SETTLEMENT_MARKER: &str = "Wertpapierabrechnung: ";

/// Internal reference number, e.g. `Vorgangs-Nr.: 12345`.
pub const TRANSACTION_NUMBER_MARKER: &str = "Vorgangs-Nr";

/// Separator between the number label and its value.
pub const TRANSACTION_NUMBER_SEPARATOR: &str = ".:";

/// Distribution notices carry the label on the whole line.
pub const DISTRIBUTION_MARKER: &str = "Ausschüttung";

/// Deposit-in notices carry the label on the whole line.
pub const DEPOSIT_IN_MARKER: &str = "Depoteinlieferung";

pub const ISIN_MARKER: &str = "ISIN: ";

/// Separator between a label and its value on settlement and ISIN lines.
pub const VALUE_SEPARATOR: &str = ": ";

/// Known broker marker strings and their normalized labels, most specific first.
pub const BROKER_MARKERS: &[(&str, &str)] = &[
    ("Scalable Capital GmbH", "ScalableCapital"),
    ("Scalable Capital", "ScalableCapital"),
];

lazy_static! {
    // DD.MM.YYYY at the start of a line
    pub static ref DATE_LINE: Regex = Regex::new(
        r"^[0-9]{2}\.[0-9]{2}\.[0-9]{4}"
    ).unwrap();
}

/// Normalized label of the first broker marker contained in `line`.
pub fn broker_label(line: &str) -> Option<&'static str> {
    BROKER_MARKERS
        .iter()
        .find(|(marker, _)| line.contains(marker))
        .map(|(_, label)| *label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_line_is_anchored() {
        assert!(DATE_LINE.is_match("14.03.2023"));
        assert!(DATE_LINE.is_match("14.03.2023 Handelstag"));
        assert!(!DATE_LINE.is_match("Datum 14.03.2023"));
        assert!(!DATE_LINE.is_match("4.03.2023"));
        assert!(!DATE_LINE.is_match("14.03.23"));
    }

    #[test]
    fn test_broker_label_requires_marker() {
        assert_eq!(broker_label("Scalable Capital GmbH, Seitzstr. 8e"), Some("ScalableCapital"));
        assert_eq!(broker_label("Kunde: Scalable Capital"), Some("ScalableCapital"));
        assert_eq!(broker_label("Baader Bank AG"), None);
        assert_eq!(broker_label(""), None);
    }
}
