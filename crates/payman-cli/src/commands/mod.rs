//! Command handlers.
//!
//! Each submodule implements one `payman` subcommand.

pub mod batch;
pub mod payout;
pub mod report;

use payman_payout::PayoutOutcome;

use crate::print;

/// Print the confirmed hashes of `outcome`, then turn its error (if any)
/// into a command failure.
fn finish(outcome: PayoutOutcome) -> anyhow::Result<()> {
    print::print_hashes(&outcome.submitted);
    match outcome.error {
        None => Ok(()),
        Some(e) if e.is_retry_safe() => Err(anyhow::anyhow!("{e}; nothing was submitted")),
        Some(e) => Err(anyhow::anyhow!(
            "{e}; {} batch(es) were confirmed before the failure and must not be resubmitted",
            outcome.submitted.len()
        )),
    }
}
