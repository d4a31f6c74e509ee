//! Snapshot-backed dry-run chain client.
//!
//! Reads per-cycle snapshots exported from an indexer
//! (`<snapshot_dir>/<delegate>/<cycle>.json`, a serialized
//! [`CycleSnapshot`]) and simulates batch construction and injection.
//! Built operations are hex-encoded JSON envelopes; injection never leaves
//! the process and returns a BLAKE3-derived pseudo hash.
//!
//! Batches are checked the way a node would refuse them at build time:
//! malformed destination addresses and transfers exceeding the wallet's
//! spendable balance are rejected.

use std::path::PathBuf;
use std::sync::Mutex;

use serde::Serialize;
use tracing::{debug, info};

use payman_payout::rewards::{calculate_report, CycleSnapshot};
use payman_payout::{ChainClient, ChainError, PayoutError};
use payman_types::{DelegateReport, FeeRate, OperationHash, Payment, SignedOperation};

/// Length of a base58check implicit or originated account address.
const ADDRESS_LEN: usize = 36;

/// Address prefixes accepted as transfer destinations.
const ADDRESS_PREFIXES: [&str; 4] = ["tz1", "tz2", "tz3", "KT1"];

const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Whether `address` looks like a valid account address.
pub fn is_valid_address(address: &str) -> bool {
    address.len() == ADDRESS_LEN
        && ADDRESS_PREFIXES.iter().any(|p| address.starts_with(p))
        && address.chars().all(|c| BASE58_ALPHABET.contains(c))
}

#[derive(Serialize)]
struct Envelope<'a> {
    counter: u64,
    network_fee: u64,
    gas_limit: u64,
    transfers: &'a [Payment],
}

#[derive(Debug, Default)]
struct Ledger {
    counter: u64,
    committed: u64,
}

/// A [`ChainClient`] that reads snapshots from disk and never submits.
#[derive(Debug)]
pub struct DryRunChain {
    snapshot_dir: PathBuf,
    wallet_balance: Option<u64>,
    ledger: Mutex<Ledger>,
}

impl DryRunChain {
    /// Create a dry-run chain over `snapshot_dir`.
    ///
    /// `wallet_balance` bounds the total (amounts plus fees) of all batches
    /// built through this client.
    pub fn new(snapshot_dir: PathBuf, wallet_balance: Option<u64>) -> Self {
        Self {
            snapshot_dir,
            wallet_balance,
            ledger: Mutex::new(Ledger::default()),
        }
    }

    fn snapshot_path(&self, delegate: &str, cycle: u32) -> PathBuf {
        self.snapshot_dir
            .join(delegate)
            .join(format!("{cycle}.json"))
    }
}

impl ChainClient for DryRunChain {
    async fn fetch_delegate_report(
        &self,
        delegate: &str,
        cycle: u32,
        fee: FeeRate,
    ) -> Result<DelegateReport, ChainError> {
        let path = self.snapshot_path(delegate, cycle);
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ChainError::Unavailable(format!("{}: {e}", path.display())))?;
        let snapshot: CycleSnapshot = serde_json::from_str(&content)
            .map_err(|e| ChainError::Unavailable(format!("{}: {e}", path.display())))?;

        if snapshot.delegate != delegate || snapshot.cycle != cycle {
            return Err(ChainError::Unavailable(format!(
                "{} holds {} cycle {}",
                path.display(),
                snapshot.delegate,
                snapshot.cycle
            )));
        }

        debug!(path = %path.display(), "snapshot loaded");

        calculate_report(&snapshot, fee).map_err(|e| match e {
            PayoutError::DataUnavailable { reason, .. } => ChainError::Unavailable(reason),
            other => ChainError::Unavailable(other.to_string()),
        })
    }

    async fn build_batch_operation(
        &self,
        payments: &[Payment],
        network_fee: u64,
        gas_limit: u64,
    ) -> Result<SignedOperation, ChainError> {
        if let Some(bad) = payments
            .iter()
            .find(|p| !is_valid_address(&p.destination_address))
        {
            return Err(ChainError::Rejected(format!(
                "malformed destination address {:?}",
                bad.destination_address
            )));
        }

        let cost = payments.iter().try_fold(0u64, |acc, p| {
            acc.checked_add(p.amount)?.checked_add(network_fee)
        });
        let cost = cost.ok_or_else(|| ChainError::Rejected("batch total overflows".to_string()))?;

        let mut ledger = self.ledger.lock().unwrap_or_else(|e| e.into_inner());
        let committed = ledger.committed.saturating_add(cost);
        if let Some(balance) = self.wallet_balance {
            if committed > balance {
                return Err(ChainError::Rejected(format!(
                    "insufficient balance: have {balance}, batches need {committed}"
                )));
            }
        }
        ledger.counter += 1;
        ledger.committed = committed;

        let envelope = Envelope {
            counter: ledger.counter,
            network_fee,
            gas_limit,
            transfers: payments,
        };
        let bytes = serde_json::to_vec(&envelope)
            .map_err(|e| ChainError::Rejected(format!("encoding batch: {e}")))?;
        Ok(SignedOperation(hex::encode(bytes)))
    }

    async fn inject_operation(
        &self,
        operation: &SignedOperation,
    ) -> Result<OperationHash, ChainError> {
        let digest = blake3::hash(operation.as_str().as_bytes());
        let hash = OperationHash(format!("o{}", &digest.to_hex().as_str()[..50]));
        info!(hash = %hash, "dry run: operation not broadcast");
        Ok(hash)
    }
}
