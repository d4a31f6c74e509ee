//! Payout filter.
//!
//! Drops delegations whose net reward falls below the operator's payment
//! minimum. Passing entries are moved into a fresh vector in their original
//! order; the source collection is never appended to while it is walked.

use payman_types::DelegateReport;

/// Keep only delegations with `net_rewards >= minimum`.
///
/// The returned report holds exactly the passing entries, in order, with no
/// duplicates. All other report fields are carried over unchanged.
pub fn filter_report(report: DelegateReport, minimum: u64) -> DelegateReport {
    let DelegateReport {
        delegate_address,
        cycle,
        delegate_fee,
        staking_balance,
        total_rewards,
        delegations,
    } = report;

    let before = delegations.len();
    let kept: Vec<_> = delegations
        .into_iter()
        .filter(|d| d.net_rewards >= minimum)
        .collect();

    tracing::info!(
        cycle,
        minimum,
        kept = kept.len(),
        dropped = before - kept.len(),
        "payout filter applied"
    );

    DelegateReport {
        delegate_address,
        cycle,
        delegate_fee,
        staking_balance,
        total_rewards,
        delegations: kept,
    }
}
