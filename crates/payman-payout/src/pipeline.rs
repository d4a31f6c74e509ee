//! Payout pipeline entry points.
//!
//! [`compute_payout`] produces the filtered report for a cycle;
//! [`run_batch_payout`] turns a payment source into injected operations.
//! Run configuration is passed explicitly on every call.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{info, warn};

use payman_types::{DelegateReport, FeeRate};

use crate::batch::{build_batches, BatchPolicy};
use crate::client::ChainClient;
use crate::filter::filter_report;
use crate::inject::{Injector, PayoutOutcome};
use crate::source::PaymentSource;
use crate::{PayoutError, Result};

/// What to pay out and to whom.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PayoutParams {
    /// The delegate (baker) account.
    pub delegate: String,
    /// The cycle to pay out.
    pub cycle: u32,
    /// The delegate's fee rate.
    pub fee: FeeRate,
    /// Delegations with net rewards below this amount (mutez) are not paid.
    pub minimum_payout: u64,
}

/// Fetch the report for `params.cycle` and apply the payout filter.
///
/// # Errors
///
/// - [`PayoutError::DataUnavailable`] if the chain cannot provide the cycle
pub async fn compute_payout<C: ChainClient>(
    client: &C,
    params: &PayoutParams,
) -> Result<DelegateReport> {
    info!(
        delegate = %params.delegate,
        cycle = params.cycle,
        fee = %params.fee,
        minimum = params.minimum_payout,
        "computing payout"
    );

    let report = client
        .fetch_delegate_report(&params.delegate, params.cycle, params.fee)
        .await
        .map_err(|e| PayoutError::DataUnavailable {
            cycle: params.cycle,
            reason: e.to_string(),
        })?;

    Ok(filter_report(report, params.minimum_payout))
}

/// Build every operation group for `source`, then inject them in order.
///
/// Build failures abort before anything is submitted and yield an outcome
/// with no hashes. Injection failures yield the hashes confirmed so far plus
/// the error for the failing group.
pub async fn run_batch_payout<C: ChainClient>(
    client: &C,
    source: PaymentSource,
    policy: &BatchPolicy,
    cancel: Option<&watch::Receiver<bool>>,
) -> PayoutOutcome {
    let payments = source.into_payments();

    let groups = match build_batches(client, payments, policy).await {
        Ok(groups) => groups,
        Err(e) => {
            warn!(error = %e, "batch payout aborted before submission");
            return PayoutOutcome {
                submitted: Vec::new(),
                error: Some(e),
            };
        }
    };

    let mut injector = Injector::new(groups, policy.submission_timeout);
    injector.run(client, cancel).await
}
