//! Reward calculator.
//!
//! Turns a delegate's per-cycle snapshot into a [`DelegateReport`]. Each
//! delegator earns a share of the cycle's rewards proportional to its balance
//! relative to the delegate's staking balance:
//!
//! ```text
//! gross = floor(total_rewards * balance / staking_balance)
//! net   = floor(gross * (1 - fee))
//! fee   = gross - net
//! ```
//!
//! ## Rounding
//!
//! Truncation is applied to the delegator's net amount, never to the fee.
//! Whatever dust a division leaves behind stays with the delegate, and
//! `net + fee == gross` holds exactly for every delegation.

use serde::{Deserialize, Serialize};

use payman_types::fee::PPM;
use payman_types::{DelegateReport, DelegationReport, FeeRate};

use crate::{PayoutError, Result};

/// Balance of one delegator at the cycle snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegatorBalance {
    /// The delegator's account.
    pub address: String,
    /// Balance in mutez.
    pub balance: u64,
}

/// Raw chain state needed to compute one cycle's payout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleSnapshot {
    /// The delegate (baker) account.
    pub delegate: String,
    /// The cycle being paid out.
    pub cycle: u32,
    /// The most recent cycle whose rewards are final.
    pub finalized_cycle: u32,
    /// Delegate staking balance at the snapshot, in mutez.
    pub staking_balance: u64,
    /// Total rewards earned by the delegate in the cycle, in mutez.
    pub total_rewards: u64,
    /// Delegators in chain order.
    pub delegators: Vec<DelegatorBalance>,
}

/// Split a gross reward into `(fee_amount, net_rewards)`.
///
/// The net amount is truncated toward zero, so the delegate receives any
/// remainder.
pub fn split_reward(gross: u64, fee: FeeRate) -> (u64, u64) {
    let keep_ppm = PPM - u64::from(fee.ppm());
    // gross * keep_ppm / PPM <= gross, so the result fits in u64.
    let net = (u128::from(gross) * u128::from(keep_ppm) / u128::from(PPM)) as u64;
    (gross - net, net)
}

/// A delegator's gross share of `total_rewards`, truncated toward zero.
fn gross_share(total_rewards: u64, balance: u64, staking_balance: u64) -> u64 {
    // Callers guarantee balance <= staking_balance, so the result fits in u64.
    (u128::from(total_rewards) * u128::from(balance) / u128::from(staking_balance)) as u64
}

/// Compute the delegate report for a finalized cycle.
///
/// Delegator order is preserved. The snapshot is not modified.
///
/// # Errors
///
/// - [`PayoutError::DataUnavailable`] if the cycle is not finalized yet
/// - [`PayoutError::DataUnavailable`] if the staking balance is zero while
///   delegators exist, or smaller than the sum of delegator balances
pub fn calculate_report(snapshot: &CycleSnapshot, fee: FeeRate) -> Result<DelegateReport> {
    if snapshot.cycle > snapshot.finalized_cycle {
        return Err(PayoutError::DataUnavailable {
            cycle: snapshot.cycle,
            reason: format!(
                "cycle is not finalized (last finalized cycle is {})",
                snapshot.finalized_cycle
            ),
        });
    }

    let delegated: u128 = snapshot
        .delegators
        .iter()
        .map(|d| u128::from(d.balance))
        .sum();
    if delegated > u128::from(snapshot.staking_balance) {
        return Err(PayoutError::DataUnavailable {
            cycle: snapshot.cycle,
            reason: format!(
                "delegated balances ({delegated}) exceed staking balance ({})",
                snapshot.staking_balance
            ),
        });
    }
    if snapshot.staking_balance == 0 && !snapshot.delegators.is_empty() {
        return Err(PayoutError::DataUnavailable {
            cycle: snapshot.cycle,
            reason: "staking balance is zero".to_string(),
        });
    }

    let delegations: Vec<DelegationReport> = snapshot
        .delegators
        .iter()
        .map(|d| {
            let gross = gross_share(snapshot.total_rewards, d.balance, snapshot.staking_balance);
            let (fee_amount, net_rewards) = split_reward(gross, fee);
            DelegationReport {
                delegator_address: d.address.clone(),
                balance: d.balance,
                stake_share: d.balance as f64 / snapshot.staking_balance as f64,
                gross_rewards: gross,
                fee_amount,
                net_rewards,
            }
        })
        .collect();

    tracing::debug!(
        delegate = %snapshot.delegate,
        cycle = snapshot.cycle,
        delegations = delegations.len(),
        total_rewards = snapshot.total_rewards,
        "reward report computed"
    );

    Ok(DelegateReport {
        delegate_address: snapshot.delegate.clone(),
        cycle: snapshot.cycle,
        delegate_fee: fee,
        staking_balance: snapshot.staking_balance,
        total_rewards: snapshot.total_rewards,
        delegations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fee(fraction: f64) -> FeeRate {
        FeeRate::from_fraction(fraction).expect("valid fee")
    }

    fn snapshot(
        balances: &[(&str, u64)],
        staking_balance: u64,
        total_rewards: u64,
    ) -> CycleSnapshot {
        CycleSnapshot {
            delegate: "tz1baker".to_string(),
            cycle: 300,
            finalized_cycle: 305,
            staking_balance,
            total_rewards,
            delegators: balances
                .iter()
                .map(|(address, balance)| DelegatorBalance {
                    address: address.to_string(),
                    balance: *balance,
                })
                .collect(),
        }
    }

    #[test]
    fn test_three_delegators_ten_percent() {
        let snap = snapshot(
            &[("tz1a", 5_000_000), ("tz1b", 3_000_000), ("tz1c", 2_000_000)],
            10_000_000,
            1_000_000,
        );
        let report = calculate_report(&snap, fee(0.1)).expect("report");

        let gross: Vec<u64> = report.delegations.iter().map(|d| d.gross_rewards).collect();
        let fees: Vec<u64> = report.delegations.iter().map(|d| d.fee_amount).collect();
        let net: Vec<u64> = report.delegations.iter().map(|d| d.net_rewards).collect();
        assert_eq!(gross, vec![500_000, 300_000, 200_000]);
        assert_eq!(fees, vec![50_000, 30_000, 20_000]);
        assert_eq!(net, vec![450_000, 270_000, 180_000]);
        assert_eq!(report.totals().fee_amount, 100_000);
        assert!((report.delegations[1].stake_share - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_dust_goes_to_delegate() {
        let (fee_amount, net) = split_reward(7, fee(0.1));
        assert_eq!(net, 6);
        assert_eq!(fee_amount, 1);

        let (fee_amount, net) = split_reward(1, fee(0.5));
        assert_eq!((fee_amount, net), (1, 0));
    }

    #[test]
    fn test_fee_bounds() {
        assert_eq!(split_reward(12_345, FeeRate::ZERO), (0, 12_345));
        assert_eq!(split_reward(12_345, fee(1.0)), (12_345, 0));
        let (cut, net) = split_reward(u64::MAX, fee(0.3));
        assert_eq!(cut + net, u64::MAX);
    }

    #[test]
    fn test_net_plus_fee_equals_gross() {
        let snap = snapshot(
            &[
                ("tz1a", 1_234_567),
                ("tz1b", 7_654_321),
                ("tz1c", 1),
                ("tz1d", 999_999_999),
            ],
            1_500_000_000,
            87_654_321,
        );
        for rate in [0.0, 0.0333, 0.05, 0.125, 0.999] {
            let report = calculate_report(&snap, fee(rate)).expect("report");
            for d in &report.delegations {
                assert_eq!(d.net_rewards + d.fee_amount, d.gross_rewards);
            }
            let totals = report.totals();
            assert_eq!(totals.net_rewards + totals.fee_amount, totals.gross_rewards);
            assert!(totals.gross_rewards <= snap.total_rewards);
        }
    }

    #[test]
    fn test_future_cycle_unavailable() {
        let mut snap = snapshot(&[("tz1a", 1)], 10, 10);
        snap.cycle = 306;
        let err = calculate_report(&snap, fee(0.1)).expect_err("future cycle");
        assert!(matches!(err, PayoutError::DataUnavailable { cycle: 306, .. }));
    }

    #[test]
    fn test_finalized_boundary_accepted() {
        let mut snap = snapshot(&[("tz1a", 1)], 10, 10);
        snap.cycle = snap.finalized_cycle;
        assert!(calculate_report(&snap, fee(0.1)).is_ok());
    }

    #[test]
    fn test_inconsistent_balances_rejected() {
        let snap = snapshot(&[("tz1a", 6), ("tz1b", 6)], 10, 100);
        assert!(matches!(
            calculate_report(&snap, fee(0.1)),
            Err(PayoutError::DataUnavailable { .. })
        ));

        let snap = snapshot(&[("tz1a", 0)], 0, 100);
        assert!(calculate_report(&snap, fee(0.1)).is_err());
    }

    #[test]
    fn test_no_delegators() {
        let snap = snapshot(&[], 0, 100);
        let report = calculate_report(&snap, fee(0.1)).expect("empty report");
        assert!(report.delegations.is_empty());
        assert_eq!(report.totals().gross_rewards, 0);
    }
}
