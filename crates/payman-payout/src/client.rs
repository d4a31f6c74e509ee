//! Chain client boundary.
//!
//! Node communication, signing and operation encoding live behind
//! [`ChainClient`]. The payout core only orchestrates calls to it.

use std::future::Future;

use payman_types::{DelegateReport, FeeRate, OperationHash, Payment, SignedOperation};

/// Errors surfaced by a chain client.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ChainError {
    /// The requested chain state is not available (unknown delegate,
    /// unfinalized cycle, pruned history).
    #[error("chain data unavailable: {0}")]
    Unavailable(String),

    /// The node or client definitively refused the request.
    #[error("rejected: {0}")]
    Rejected(String),

    /// The request timed out; the node may still have processed it.
    #[error("request timed out")]
    Timeout,

    /// The connection dropped mid-request; the node may still have processed it.
    #[error("connection lost: {0}")]
    ConnectionLost(String),
}

impl ChainError {
    /// Whether the node may have processed the request despite the error.
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, ChainError::Timeout | ChainError::ConnectionLost(_))
    }
}

/// Capabilities the payout core consumes from a chain.
///
/// Implementors provide the actual node I/O. Calls are always issued one at a
/// time; implementations need not support concurrent use.
pub trait ChainClient {
    /// Fetch the reward report for `delegate` at `cycle`, applying `fee`.
    ///
    /// Must not mutate chain state. Implementations typically fetch a
    /// [`crate::rewards::CycleSnapshot`] and hand it to
    /// [`crate::rewards::calculate_report`].
    fn fetch_delegate_report(
        &self,
        delegate: &str,
        cycle: u32,
        fee: FeeRate,
    ) -> impl Future<Output = std::result::Result<DelegateReport, ChainError>> + Send;

    /// Build and sign one operation group transferring every payment, each
    /// with the same `network_fee` and `gas_limit`.
    fn build_batch_operation(
        &self,
        payments: &[Payment],
        network_fee: u64,
        gas_limit: u64,
    ) -> impl Future<Output = std::result::Result<SignedOperation, ChainError>> + Send;

    /// Inject a signed operation group and return its hash.
    fn inject_operation(
        &self,
        operation: &SignedOperation,
    ) -> impl Future<Output = std::result::Result<OperationHash, ChainError>> + Send;
}
