//! # payman-types
//!
//! Shared domain types used across the payman workspace: delegate reward
//! reports, payments, fee rates and the opaque operation handles exchanged
//! with a chain client.

pub mod fee;
pub mod operation;
pub mod payment;
pub mod report;

pub use fee::FeeRate;
pub use operation::{OperationHash, SignedOperation};
pub use payment::Payment;
pub use report::{DelegateReport, DelegationReport, ReportTotals};

/// Mutez per tez (1 tez = 1,000,000 mutez).
pub const MUTEZ_PER_TEZ: u64 = 1_000_000;

/// Default maximum number of transfers bundled into one operation group.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 100;

/// Default network fee per transfer, in mutez.
pub const DEFAULT_NETWORK_FEE: u64 = 2941;

/// Default gas limit per transfer.
pub const DEFAULT_GAS_LIMIT: u64 = 26283;

/// Error types for domain type construction.
#[derive(Debug, thiserror::Error)]
pub enum TypesError {
    /// Fee rate outside [0, 1] or not a finite number.
    #[error("invalid fee rate {0}: must be a finite value in [0, 1]")]
    InvalidFeeRate(f64),
}

/// Convenience result type for domain type construction.
pub type Result<T> = std::result::Result<T, TypesError>;
