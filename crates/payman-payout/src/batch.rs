//! Batch builder.
//!
//! Splits the payment list into contiguous chunks of at most
//! `max_batch_size` transfers and has the chain client build one signed
//! operation group per chunk. Every group is built before anything is
//! injected, so a rejected chunk aborts the run with nothing on chain.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use payman_types::{
    Payment, SignedOperation, DEFAULT_GAS_LIMIT, DEFAULT_MAX_BATCH_SIZE, DEFAULT_NETWORK_FEE,
};

use crate::client::ChainClient;
use crate::{PayoutError, Result};

/// Default per-submission timeout in seconds.
pub const DEFAULT_SUBMISSION_TIMEOUT_SECS: u64 = 60;

/// Fee, gas and chunking policy applied to every transfer of a run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchPolicy {
    /// Network fee per transfer, in mutez.
    pub network_fee: u64,
    /// Gas limit per transfer.
    pub gas_limit: u64,
    /// Maximum transfers per operation group.
    pub max_batch_size: usize,
    /// Upper bound on a single injection call. `None` waits indefinitely.
    pub submission_timeout: Option<Duration>,
}

impl Default for BatchPolicy {
    fn default() -> Self {
        Self {
            network_fee: DEFAULT_NETWORK_FEE,
            gas_limit: DEFAULT_GAS_LIMIT,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            submission_timeout: Some(Duration::from_secs(DEFAULT_SUBMISSION_TIMEOUT_SECS)),
        }
    }
}

impl BatchPolicy {
    /// Validate the policy.
    pub fn validate(&self) -> Result<()> {
        if self.max_batch_size == 0 {
            return Err(PayoutError::InvalidPolicy(
                "max_batch_size must be at least 1".to_string(),
            ));
        }
        if self.submission_timeout == Some(Duration::ZERO) {
            return Err(PayoutError::InvalidPolicy(
                "submission timeout must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// One signed operation group, ready for injection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchOperationGroup {
    /// 1-based position of the group within the run.
    pub index: usize,
    /// The transfers bundled in this group, in payment order.
    pub payments: Vec<Payment>,
    /// Network fee applied to each transfer.
    pub network_fee: u64,
    /// Gas limit applied to each transfer.
    pub gas_limit: u64,
    /// The chunk bound this group was built under.
    pub max_ops_per_batch: usize,
    /// The signed operation produced by the chain client.
    pub operation: SignedOperation,
}

/// Build one operation group per chunk of `payments`.
///
/// Produces `ceil(n / max_batch_size)` groups whose payments, concatenated,
/// reproduce `payments` exactly. An empty list yields no groups.
///
/// # Errors
///
/// - [`PayoutError::InvalidPolicy`] if the policy is invalid
/// - [`PayoutError::BuildFailed`] if the client rejects any chunk; no groups
///   are returned in that case
pub async fn build_batches<C: ChainClient>(
    client: &C,
    payments: Vec<Payment>,
    policy: &BatchPolicy,
) -> Result<Vec<BatchOperationGroup>> {
    policy.validate()?;

    let total = payments.len();
    let mut groups = Vec::with_capacity(total.div_ceil(policy.max_batch_size));

    for (offset, chunk) in payments.chunks(policy.max_batch_size).enumerate() {
        let index = offset + 1;
        let operation = client
            .build_batch_operation(chunk, policy.network_fee, policy.gas_limit)
            .await
            .map_err(|e| {
                warn!(group = index, error = %e, "batch build rejected");
                PayoutError::BuildFailed {
                    group: index,
                    reason: e.to_string(),
                }
            })?;

        debug!(group = index, transfers = chunk.len(), "batch built");

        groups.push(BatchOperationGroup {
            index,
            payments: chunk.to_vec(),
            network_fee: policy.network_fee,
            gas_limit: policy.gas_limit,
            max_ops_per_batch: policy.max_batch_size,
            operation,
        });
    }

    info!(
        payments = total,
        groups = groups.len(),
        max_batch_size = policy.max_batch_size,
        "batches built"
    );

    Ok(groups)
}
