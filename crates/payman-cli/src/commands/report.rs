//! `payman report`: simulate a payout without submitting anything.

use payman_payout::{compute_payout, ChainClient};

use crate::config::PaymanConfig;
use crate::print;

pub async fn run<C: ChainClient>(
    config: &PaymanConfig,
    client: &C,
    cycle: Option<u32>,
    json: bool,
) -> anyhow::Result<()> {
    config.validate_payout()?;
    let params = config.payout_params(cycle)?;
    let report = compute_payout(client, &params).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", print::report_table(&report));
    }
    Ok(())
}
