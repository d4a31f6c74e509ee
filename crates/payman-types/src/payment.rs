//! Transfers to be paid out.

use serde::{Deserialize, Serialize};

/// A single transfer of `amount` mutez to `destination_address`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// Receiving account.
    #[serde(rename = "address")]
    pub destination_address: String,
    /// Amount in mutez.
    pub amount: u64,
}

impl Payment {
    pub fn new(destination_address: impl Into<String>, amount: u64) -> Self {
        Self {
            destination_address: destination_address.into(),
            amount,
        }
    }
}

/// Sum of payment amounts, saturating at `u64::MAX`.
pub fn total_amount(payments: &[Payment]) -> u64 {
    payments
        .iter()
        .fold(0u64, |acc, p| acc.saturating_add(p.amount))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_file_shape() {
        let json = r#"[{"address":"tz1abc","amount":1500},{"address":"KT1xyz","amount":7}]"#;
        let payments: Vec<Payment> = serde_json::from_str(json).expect("parse");
        assert_eq!(payments[0], Payment::new("tz1abc", 1500));
        assert_eq!(total_amount(&payments), 1507);
    }
}
