//! Integration tests for payman.
//!
//! Shared fixtures live here; the tests themselves exercise end-to-end
//! payout flows across the workspace crates.

use payman_payout::rewards::{CycleSnapshot, DelegatorBalance};
use payman_payout::PayoutParams;
use payman_types::FeeRate;

/// Delegate used by every fixture.
pub const BAKER: &str = "tz1KqTpEZ7Yob7QbPE4Hy4Wo8fHG8LhKxZSx";

/// A finalized cycle snapshot with one delegator per `(address, balance)`.
pub fn snapshot(cycle: u32, total_rewards: u64, delegators: &[(String, u64)]) -> CycleSnapshot {
    CycleSnapshot {
        delegate: BAKER.to_string(),
        cycle,
        finalized_cycle: cycle + 5,
        staking_balance: delegators.iter().map(|(_, b)| *b).sum(),
        total_rewards,
        delegators: delegators
            .iter()
            .map(|(address, balance)| DelegatorBalance {
                address: address.clone(),
                balance: *balance,
            })
            .collect(),
    }
}

/// `n` delegators with equal balances.
pub fn equal_delegators(n: usize, balance: u64) -> Vec<(String, u64)> {
    (0..n).map(|i| (format!("tz1delegator{i:04}"), balance)).collect()
}

/// Payout parameters for [`BAKER`].
pub fn params(cycle: u32, fee: f64, minimum_payout: u64) -> PayoutParams {
    PayoutParams {
        delegate: BAKER.to_string(),
        cycle,
        fee: FeeRate::from_fraction(fee).expect("fixture fee"),
        minimum_payout,
    }
}
