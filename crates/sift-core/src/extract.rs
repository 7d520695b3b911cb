//! Extraction engine for notification text
//!
//! Pure parsing: raw message body in, `ExtractedFact` out. There is no
//! failure mode; anything that doesn't match degrades to the sentinel
//! values ("0", "N/A", unknown direction).

use std::sync::OnceLock;

use regex::Regex;

use crate::models::{Direction, ExtractedFact};

/// Currency marker (3-letter code, abbreviation, or glyph) followed by a
/// number that may use a comma as thousands separator
fn amount_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(INR|Rs\.?|₹)\s?(\d+[,.]?\d*)").expect("valid amount regex"))
}

/// "to " followed by a contiguous alphabetic run (spaces allowed)
fn counterpart_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)to\s([A-Za-z\s]+)").expect("valid counterpart regex"))
}

/// Extract structured transaction facts from a message body
pub fn extract(body: &str) -> ExtractedFact {
    let amount = amount_regex()
        .captures(body)
        .and_then(|c| c.get(2))
        .map(|m| m.as_str().replace(',', ""))
        .unwrap_or_else(|| "0".to_string());

    let counterpart = counterpart_regex()
        .captures(body)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "N/A".to_string());

    // Credit markers win over debit markers when both appear
    let lower = body.to_lowercase();
    let direction = if lower.contains("credited") || lower.contains("received") {
        Direction::Credit
    } else if lower.contains("debited") || lower.contains("sent") {
        Direction::Debit
    } else {
        Direction::Unknown
    };

    ExtractedFact {
        amount,
        counterpart,
        direction,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_amount_counterpart_and_direction() {
        let fact = extract("Rs. 1,500 sent to John Doe");
        assert_eq!(fact.amount, "1500");
        assert_eq!(fact.counterpart, "John Doe");
        assert_eq!(fact.direction, Direction::Debit);
        assert_eq!(fact.amount_value(), 1500.0);
    }

    #[test]
    fn parses_inr_prefix_and_decimal() {
        let fact = extract("INR 2500 debited for shopping, sent to Amazon");
        assert_eq!(fact.amount, "2500");
        assert_eq!(fact.counterpart, "Amazon");
        assert_eq!(fact.direction, Direction::Debit);

        let fact = extract("₹199.50 debited to Netflix");
        assert_eq!(fact.amount, "199.50");
        assert_eq!(fact.amount_value(), 199.5);
    }

    #[test]
    fn credit_marker_wins_over_debit() {
        let fact = extract("INR 5000 credited, sent by employer");
        assert_eq!(fact.direction, Direction::Credit);

        let fact = extract("You received Rs. 250 from Asha");
        assert_eq!(fact.direction, Direction::Credit);
    }

    #[test]
    fn missing_fields_use_sentinels() {
        let fact = extract("Your OTP is 482910");
        assert_eq!(fact.amount, "0");
        assert_eq!(fact.counterpart, "N/A");
        assert_eq!(fact.direction, Direction::Unknown);
        assert_eq!(fact.amount_value(), 0.0);
    }

    #[test]
    fn counterpart_stops_at_non_alphabetic() {
        let fact = extract("Rs. 300 sent to Ravi Kumar 9876543210");
        assert_eq!(fact.counterpart, "Ravi Kumar");
    }
}
