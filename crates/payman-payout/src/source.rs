//! Payment sources.
//!
//! Payments normally come from a filtered [`DelegateReport`]. Operators can
//! instead supply their own list, read from a JSON file of
//! `{"address": ..., "amount": ...}` objects, which then feeds the batch
//! builder directly.

use std::path::Path;

use payman_types::{DelegateReport, Payment};

use crate::{PayoutError, Result};

/// Where the payments of a run come from. Chosen before the pipeline starts.
#[derive(Clone, Debug, PartialEq)]
pub enum PaymentSource {
    /// One payment per delegation of a (filtered) report.
    Report(DelegateReport),
    /// An externally supplied payment list, used as-is.
    Supplied(Vec<Payment>),
}

impl PaymentSource {
    /// Load an externally supplied payment list from a JSON file.
    ///
    /// # Errors
    ///
    /// - [`PayoutError::PaymentsFile`] if the file cannot be read or parsed
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| PayoutError::PaymentsFile(format!("{}: {e}", path.display())))?;
        let payments: Vec<Payment> = serde_json::from_str(&content)
            .map_err(|e| PayoutError::PaymentsFile(format!("{}: {e}", path.display())))?;

        tracing::info!(
            path = %path.display(),
            payments = payments.len(),
            "loaded supplied payments"
        );

        Ok(PaymentSource::Supplied(payments))
    }

    /// The payments to make, in order.
    pub fn payments(&self) -> Vec<Payment> {
        match self {
            PaymentSource::Report(report) => report.payments(),
            PaymentSource::Supplied(payments) => payments.clone(),
        }
    }

    /// Consume the source, yielding its payments.
    pub fn into_payments(self) -> Vec<Payment> {
        match self {
            PaymentSource::Report(report) => report.payments(),
            PaymentSource::Supplied(payments) => payments,
        }
    }
}

impl From<DelegateReport> for PaymentSource {
    fn from(report: DelegateReport) -> Self {
        PaymentSource::Report(report)
    }
}

impl From<Vec<Payment>> for PaymentSource {
    fn from(payments: Vec<Payment>) -> Self {
        PaymentSource::Supplied(payments)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use payman_types::{DelegationReport, FeeRate};

    use super::*;

    #[test]
    fn test_report_source() {
        let report = DelegateReport {
            delegate_address: "tz1baker".to_string(),
            cycle: 1,
            delegate_fee: FeeRate::ZERO,
            staking_balance: 10,
            total_rewards: 10,
            delegations: vec![DelegationReport {
                delegator_address: "tz1a".to_string(),
                balance: 10,
                stake_share: 1.0,
                gross_rewards: 10,
                fee_amount: 0,
                net_rewards: 10,
            }],
        };
        let source = PaymentSource::from(report);
        assert_eq!(source.payments(), vec![Payment::new("tz1a", 10)]);
    }

    #[test]
    fn test_supplied_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"[{{"address":"tz1a","amount":5}},{{"address":"tz1b","amount":6}}]"#
        )
        .expect("write");

        let source = PaymentSource::from_file(file.path()).expect("load");
        assert_eq!(
            source.into_payments(),
            vec![Payment::new("tz1a", 5), Payment::new("tz1b", 6)]
        );
    }

    #[test]
    fn test_malformed_file_rejected() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{"address":"tz1a"}}"#).expect("write");
        assert!(matches!(
            PaymentSource::from_file(file.path()),
            Err(PayoutError::PaymentsFile(_))
        ));

        let missing = file.path().with_extension("missing");
        assert!(PaymentSource::from_file(&missing).is_err());
    }
}
