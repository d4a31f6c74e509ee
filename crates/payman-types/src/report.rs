//! Delegate reward reports.
//!
//! A [`DelegateReport`] describes what a delegate owes each of its delegators
//! for one cycle. Every [`DelegationReport`] satisfies
//! `net_rewards + fee_amount == gross_rewards` exactly.

use serde::{Deserialize, Serialize};

use crate::{FeeRate, Payment};

/// Reward breakdown for a single delegator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DelegationReport {
    /// The delegator's account.
    pub delegator_address: String,
    /// The delegator's balance at the cycle snapshot, in mutez.
    pub balance: u64,
    /// Share of the delegate's staking balance (0.0 - 1.0). Informational;
    /// reward arithmetic uses the integer balances.
    pub stake_share: f64,
    /// Rewards before the delegate fee, in mutez.
    pub gross_rewards: u64,
    /// Delegate fee withheld, in mutez.
    pub fee_amount: u64,
    /// Rewards owed to the delegator, in mutez.
    pub net_rewards: u64,
}

/// Rewards owed by a delegate to its delegators for one cycle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DelegateReport {
    /// The delegate (baker) account.
    pub delegate_address: String,
    /// The cycle the rewards were earned in.
    pub cycle: u32,
    /// Fee rate charged by the delegate.
    pub delegate_fee: FeeRate,
    /// Staking balance of the delegate at the cycle snapshot, in mutez.
    pub staking_balance: u64,
    /// Total rewards earned by the delegate in the cycle, in mutez.
    pub total_rewards: u64,
    /// Per-delegator breakdown, in chain order.
    pub delegations: Vec<DelegationReport>,
}

/// Column sums over a report's delegations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportTotals {
    pub gross_rewards: u64,
    pub fee_amount: u64,
    pub net_rewards: u64,
}

impl DelegateReport {
    /// Sum gross, fee and net over all delegations.
    pub fn totals(&self) -> ReportTotals {
        self.delegations
            .iter()
            .fold(ReportTotals::default(), |acc, d| ReportTotals {
                gross_rewards: acc.gross_rewards.saturating_add(d.gross_rewards),
                fee_amount: acc.fee_amount.saturating_add(d.fee_amount),
                net_rewards: acc.net_rewards.saturating_add(d.net_rewards),
            })
    }

    /// One payment per delegation, paying out its net rewards, in order.
    pub fn payments(&self) -> Vec<Payment> {
        self.delegations
            .iter()
            .map(|d| Payment::new(d.delegator_address.clone(), d.net_rewards))
            .collect()
    }
}
