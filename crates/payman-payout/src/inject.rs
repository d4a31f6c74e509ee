//! Sequential injector.
//!
//! Operation groups are submitted one at a time, in list order. Groups may
//! share sequencing state (account counters) at the chain-client level, so
//! concurrent or out-of-order submission is never attempted.
//!
//! ## Group states
//!
//! ```text
//! Pending -> Submitted -> Confirmed(hash)
//!                      -> Failed(kind)
//! ```
//!
//! When group k fails, the hashes of groups 1..k-1 are returned together
//! with an error naming group k. Nothing is retried or rolled back; a further
//! call to [`Injector::run`] is the caller's decision and resumes at the first
//! group that is not confirmed.

use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use payman_types::OperationHash;

use crate::batch::BatchOperationGroup;
use crate::client::{ChainClient, ChainError};
use crate::PayoutError;

/// Why a submission failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FailureKind {
    /// The chain definitively refused the group.
    Rejected(String),
    /// Timeout or lost connection; acceptance is unknown.
    Ambiguous(String),
}

/// Lifecycle of one operation group within a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GroupState {
    Pending,
    Submitted,
    Confirmed(OperationHash),
    Failed(FailureKind),
}

/// Result of a batch payout run.
///
/// `submitted` always holds the hashes of the confirmed groups, in submission
/// order, even when `error` is set.
#[derive(Debug, Default)]
pub struct PayoutOutcome {
    pub submitted: Vec<OperationHash>,
    pub error: Option<PayoutError>,
}

impl PayoutOutcome {
    /// Whether every group was confirmed.
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

struct TrackedGroup {
    group: BatchOperationGroup,
    state: GroupState,
}

/// Owns the operation groups of a run until each reaches a terminal state.
pub struct Injector {
    groups: Vec<TrackedGroup>,
    timeout: Option<Duration>,
}

impl Injector {
    /// Create an injector over `groups`, all pending.
    ///
    /// `timeout` bounds each individual submission.
    pub fn new(groups: Vec<BatchOperationGroup>, timeout: Option<Duration>) -> Self {
        Self {
            groups: groups
                .into_iter()
                .map(|group| TrackedGroup {
                    group,
                    state: GroupState::Pending,
                })
                .collect(),
            timeout,
        }
    }

    /// Whether the injector owns no groups.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Per-group `(index, state)` pairs, in submission order.
    pub fn states(&self) -> impl Iterator<Item = (usize, &GroupState)> {
        self.groups.iter().map(|t| (t.group.index, &t.state))
    }

    /// Hashes of the confirmed prefix of groups.
    pub fn confirmed_hashes(&self) -> Vec<OperationHash> {
        self.groups
            .iter()
            .map_while(|t| match &t.state {
                GroupState::Confirmed(hash) => Some(hash.clone()),
                _ => None,
            })
            .collect()
    }

    /// Whether every group has been confirmed.
    pub fn is_complete(&self) -> bool {
        self.groups
            .iter()
            .all(|t| matches!(t.state, GroupState::Confirmed(_)))
    }

    /// Submit every group that is not yet confirmed, in order.
    ///
    /// Stops at the first failure. If `cancel` reads `true` before a
    /// submission, that group and all later ones are left pending.
    pub async fn run<C: ChainClient>(
        &mut self,
        client: &C,
        cancel: Option<&watch::Receiver<bool>>,
    ) -> PayoutOutcome {
        let mut error = None;

        for i in 0..self.groups.len() {
            if matches!(self.groups[i].state, GroupState::Confirmed(_)) {
                continue;
            }

            let index = self.groups[i].group.index;
            if cancel.is_some_and(|rx| *rx.borrow()) {
                info!(next_group = index, "payout cancelled; remaining batches not submitted");
                error = Some(PayoutError::Cancelled { next_group: index });
                break;
            }

            self.groups[i].state = GroupState::Submitted;
            debug!(
                group = index,
                transfers = self.groups[i].group.payments.len(),
                "submitting batch"
            );

            let result = self.submit(client, i).await;
            match result {
                Ok(hash) => {
                    info!(group = index, hash = %hash, "batch confirmed");
                    self.groups[i].state = GroupState::Confirmed(hash);
                }
                Err(e) if e.is_ambiguous() => {
                    warn!(
                        group = index,
                        error = %e,
                        "batch submission ambiguous; reconcile before resubmitting"
                    );
                    self.groups[i].state =
                        GroupState::Failed(FailureKind::Ambiguous(e.to_string()));
                    error = Some(PayoutError::SubmissionAmbiguous {
                        group: index,
                        reason: e.to_string(),
                    });
                    break;
                }
                Err(e) => {
                    warn!(group = index, error = %e, "batch injection failed");
                    self.groups[i].state =
                        GroupState::Failed(FailureKind::Rejected(e.to_string()));
                    error = Some(PayoutError::InjectionFailed {
                        group: index,
                        reason: e.to_string(),
                    });
                    break;
                }
            }
        }

        let submitted = self.confirmed_hashes();
        if error.is_none() {
            info!(groups = submitted.len(), "all batches confirmed");
        }

        PayoutOutcome { submitted, error }
    }

    async fn submit<C: ChainClient>(
        &self,
        client: &C,
        i: usize,
    ) -> std::result::Result<OperationHash, ChainError> {
        let operation = &self.groups[i].group.operation;
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, client.inject_operation(operation))
                .await
                .unwrap_or(Err(ChainError::Timeout)),
            None => client.inject_operation(operation).await,
        }
    }
}
