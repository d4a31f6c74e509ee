//! In-memory chain client for development and tests.
//!
//! [`StubChain`] serves reports from registered [`CycleSnapshot`]s, builds
//! deterministic operation strings, and injects them according to a script
//! keyed by injection call number. Every build and injection attempt is
//! recorded so callers can assert on what reached the "chain".

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use payman_types::{DelegateReport, FeeRate, OperationHash, Payment, SignedOperation};

use crate::client::{ChainClient, ChainError};
use crate::rewards::{calculate_report, CycleSnapshot};
use crate::PayoutError;

/// Scripted response to one injection call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InjectBehavior {
    /// Accept and return a hash.
    Accept,
    /// Refuse with the given reason.
    Reject(String),
    /// Drop the connection after the request was sent.
    Disconnect,
    /// Never answer.
    Hang,
}

#[derive(Debug, Default)]
struct StubState {
    builds: usize,
    built_fees: Vec<(u64, u64)>,
    injected: Vec<SignedOperation>,
    confirmed: Vec<OperationHash>,
}

/// A scripted, in-memory [`ChainClient`].
#[derive(Debug, Default)]
pub struct StubChain {
    snapshots: HashMap<(String, u32), CycleSnapshot>,
    rejected_addresses: Vec<String>,
    inject_script: HashMap<usize, InjectBehavior>,
    state: Mutex<StubState>,
}

impl StubChain {
    /// Create a stub chain that accepts every build and injection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a snapshot served by `fetch_delegate_report`.
    pub fn with_snapshot(mut self, snapshot: CycleSnapshot) -> Self {
        self.snapshots
            .insert((snapshot.delegate.clone(), snapshot.cycle), snapshot);
        self
    }

    /// Refuse to build any batch containing a transfer to `address`.
    pub fn reject_build_for(mut self, address: impl Into<String>) -> Self {
        self.rejected_addresses.push(address.into());
        self
    }

    /// Script the `call`-th injection (1-based, counted across runs).
    pub fn on_inject(mut self, call: usize, behavior: InjectBehavior) -> Self {
        self.inject_script.insert(call, behavior);
        self
    }

    /// `(network_fee, gas_limit)` of every successful build, in order.
    pub fn built_fees(&self) -> Vec<(u64, u64)> {
        self.lock().built_fees.clone()
    }

    /// Every operation passed to `inject_operation`, in call order.
    pub fn injected(&self) -> Vec<SignedOperation> {
        self.lock().injected.clone()
    }

    /// Hashes returned by accepted injections, in call order.
    pub fn injected_hashes(&self) -> Vec<OperationHash> {
        self.lock().confirmed.clone()
    }

    fn lock(&self) -> MutexGuard<'_, StubState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ChainClient for StubChain {
    async fn fetch_delegate_report(
        &self,
        delegate: &str,
        cycle: u32,
        fee: FeeRate,
    ) -> Result<DelegateReport, ChainError> {
        let snapshot = self
            .snapshots
            .get(&(delegate.to_string(), cycle))
            .ok_or_else(|| {
                ChainError::Unavailable(format!("no snapshot for {delegate} at cycle {cycle}"))
            })?;

        calculate_report(snapshot, fee).map_err(|e| match e {
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
            .find(|p| self.rejected_addresses.contains(&p.destination_address))
        {
            return Err(ChainError::Rejected(format!(
                "invalid destination {}",
                bad.destination_address
            )));
        }

        let mut state = self.lock();
        state.builds += 1;
        state.built_fees.push((network_fee, gas_limit));

        let transfers: Vec<String> = payments
            .iter()
            .map(|p| format!("{}={}", p.destination_address, p.amount))
            .collect();
        Ok(SignedOperation(format!(
            "stub-op-{}[fee={network_fee};gas={gas_limit};{}]",
            state.builds,
            transfers.join(",")
        )))
    }

    async fn inject_operation(
        &self,
        operation: &SignedOperation,
    ) -> Result<OperationHash, ChainError> {
        let behavior = {
            let mut state = self.lock();
            state.injected.push(operation.clone());
            let call = state.injected.len();
            self.inject_script
                .get(&call)
                .cloned()
                .unwrap_or(InjectBehavior::Accept)
        };

        match behavior {
            InjectBehavior::Accept => {
                let mut state = self.lock();
                let hash = OperationHash(format!("oo{}", state.confirmed.len() + 1));
                state.confirmed.push(hash.clone());
                Ok(hash)
            }
            InjectBehavior::Reject(reason) => Err(ChainError::Rejected(reason)),
            InjectBehavior::Disconnect => {
                Err(ChainError::ConnectionLost("connection reset by peer".to_string()))
            }
            InjectBehavior::Hang => std::future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewards::DelegatorBalance;

    #[tokio::test]
    async fn test_unknown_snapshot_unavailable() {
        let chain = StubChain::new();
        let err = chain
            .fetch_delegate_report("tz1baker", 10, FeeRate::ZERO)
            .await
            .expect_err("no snapshot");
        assert!(matches!(err, ChainError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_serves_registered_snapshot() {
        let chain = StubChain::new().with_snapshot(CycleSnapshot {
            delegate: "tz1baker".to_string(),
            cycle: 10,
            finalized_cycle: 12,
            staking_balance: 100,
            total_rewards: 50,
            delegators: vec![DelegatorBalance {
                address: "tz1a".to_string(),
                balance: 40,
            }],
        });
        let report = chain
            .fetch_delegate_report("tz1baker", 10, FeeRate::ZERO)
            .await
            .expect("report");
        assert_eq!(report.delegations[0].gross_rewards, 20);
    }

    #[tokio::test]
    async fn test_distinct_operations_and_hashes() {
        let chain = StubChain::new();
        let payments = [Payment::new("tz1a", 1)];
        let a = chain.build_batch_operation(&payments, 1, 2).await.expect("build");
        let b = chain.build_batch_operation(&payments, 1, 2).await.expect("build");
        assert_ne!(a, b);

        let ha = chain.inject_operation(&a).await.expect("inject");
        let hb = chain.inject_operation(&b).await.expect("inject");
        assert_ne!(ha, hb);
        assert_eq!(chain.injected_hashes(), vec![ha, hb]);
    }
}
