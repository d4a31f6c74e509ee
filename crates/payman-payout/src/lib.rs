//! # payman-payout
//!
//! Reward computation, payout filtering and batch injection for delegate
//! payouts.
//!
//! A payout run flows through four stages, each completing before the next
//! begins:
//!
//! 1. [`rewards`]: derive per-delegator gross/fee/net from a cycle snapshot
//! 2. [`filter`]: drop delegations below the payment minimum
//! 3. [`batch`]: chunk payments and build one operation group per chunk
//! 4. [`inject`]: submit groups in order, keeping every confirmed hash
//!
//! Chain access goes through the [`client::ChainClient`] trait. The
//! [`pipeline`] module exposes the two entry points callers use.
//!
//! ## Modules
//!
//! - [`client`] — Chain client boundary
//! - [`rewards`] — Reward calculator
//! - [`filter`] — Payout filter
//! - [`source`] — Payment sources (computed or externally supplied)
//! - [`batch`] — Batch builder
//! - [`inject`] — Sequential injector
//! - [`pipeline`] — `compute_payout` / `run_batch_payout`
//! - [`stub`] — In-memory scripted chain client

pub mod batch;
pub mod client;
pub mod filter;
pub mod inject;
pub mod pipeline;
pub mod rewards;
pub mod source;
pub mod stub;

pub use batch::{BatchOperationGroup, BatchPolicy};
pub use client::{ChainClient, ChainError};
pub use inject::{GroupState, Injector, PayoutOutcome};
pub use pipeline::{compute_payout, run_batch_payout, PayoutParams};
pub use source::PaymentSource;

/// Error types for payout operations.
///
/// `DataUnavailable`, `InvalidFeeRate`, `InvalidPolicy`, `PaymentsFile` and
/// `BuildFailed` occur before anything reaches the chain. The remaining
/// variants are returned alongside the hashes of groups already confirmed.
#[derive(Debug, thiserror::Error)]
pub enum PayoutError {
    /// Chain state for the cycle could not be retrieved.
    #[error("data unavailable for cycle {cycle}: {reason}")]
    DataUnavailable {
        /// The requested cycle.
        cycle: u32,
        /// Underlying cause.
        reason: String,
    },

    /// Fee rate outside [0, 1].
    #[error(transparent)]
    InvalidFeeRate(#[from] payman_types::TypesError),

    /// Batch policy cannot be applied.
    #[error("invalid batch policy: {0}")]
    InvalidPolicy(String),

    /// The externally supplied payments could not be loaded.
    #[error("payments file error: {0}")]
    PaymentsFile(String),

    /// The chain client refused to build an operation group.
    #[error("failed to build batch {group}: {reason}")]
    BuildFailed {
        /// 1-based index of the rejected group.
        group: usize,
        /// Underlying cause.
        reason: String,
    },

    /// A group was definitely rejected during submission.
    #[error("injection of batch {group} failed: {reason}")]
    InjectionFailed {
        /// 1-based index of the failed group.
        group: usize,
        /// Underlying cause.
        reason: String,
    },

    /// Submission outcome unknown (timeout or lost connection). The group may
    /// or may not have been accepted and must be reconciled manually.
    #[error("submission of batch {group} is ambiguous: {reason}")]
    SubmissionAmbiguous {
        /// 1-based index of the ambiguous group.
        group: usize,
        /// Underlying cause.
        reason: String,
    },

    /// The run was cancelled before `next_group` was submitted.
    #[error("payout cancelled before batch {next_group}")]
    Cancelled {
        /// 1-based index of the first group not submitted.
        next_group: usize,
    },
}

impl PayoutError {
    /// Whether the error guarantees nothing was submitted, so the whole run
    /// can be retried as-is.
    pub fn is_retry_safe(&self) -> bool {
        matches!(
            self,
            PayoutError::DataUnavailable { .. }
                | PayoutError::InvalidFeeRate(_)
                | PayoutError::InvalidPolicy(_)
                | PayoutError::PaymentsFile(_)
                | PayoutError::BuildFailed { .. }
        )
    }

    /// The 1-based group the error refers to, if any.
    pub fn group(&self) -> Option<usize> {
        match self {
            PayoutError::BuildFailed { group, .. }
            | PayoutError::InjectionFailed { group, .. }
            | PayoutError::SubmissionAmbiguous { group, .. } => Some(*group),
            PayoutError::Cancelled { next_group } => Some(*next_group),
            _ => None,
        }
    }
}

/// Convenience result type for payout operations.
pub type Result<T> = std::result::Result<T, PayoutError>;
