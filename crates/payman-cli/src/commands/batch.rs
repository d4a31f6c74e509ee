//! `payman batch`: pay an externally supplied list of transfers.

use std::path::Path;

use tokio::sync::watch;

use payman_payout::{run_batch_payout, ChainClient, PaymentSource};
use payman_types::payment::total_amount;

use crate::config::PaymanConfig;
use crate::print;

pub async fn run<C: ChainClient>(
    config: &PaymanConfig,
    client: &C,
    payments_file: &Path,
    cancel: &watch::Receiver<bool>,
) -> anyhow::Result<()> {
    config.validate_network()?;
    let source = PaymentSource::from_file(payments_file)?;

    let payments = source.payments();
    println!(
        "Paying {} transfer(s) totalling {}",
        payments.len(),
        print::format_tez(total_amount(&payments))
    );

    let outcome = run_batch_payout(client, source, &config.batch_policy(), Some(cancel)).await;
    super::finish(outcome)
}
