//! `payman payout`: compute rewards for a cycle and batch-pay them.

use tokio::sync::watch;
use tracing::info;

use payman_payout::{compute_payout, run_batch_payout, ChainClient, PaymentSource};

use crate::config::PaymanConfig;
use crate::print;

pub async fn run<C: ChainClient>(
    config: &PaymanConfig,
    client: &C,
    cycle: Option<u32>,
    json: bool,
    cancel: &watch::Receiver<bool>,
) -> anyhow::Result<()> {
    config.validate_payout()?;
    let params = config.payout_params(cycle)?;
    let report = compute_payout(client, &params).await?;

    info!(
        cycle = report.cycle,
        payments = report.delegations.len(),
        "paying out"
    );

    let outcome = run_batch_payout(
        client,
        PaymentSource::Report(report.clone()),
        &config.batch_policy(),
        Some(cancel),
    )
    .await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", print::report_table(&report));
    }

    super::finish(outcome)
}
