use std::sync::Arc;

use tracing::{debug, info, warn};

use slalink_codec::UsageReportCodec;
use slalink_core_types::{Address, CheckpointState, RequestUsage, Wei};
use slalink_crypto::Identity;
use slalink_ledger::contract::sla;
use slalink_ledger::{Call, LedgerError, LedgerGateway};

use crate::{CheckpointError, UsageSource};

/// Submits the provider's checkpoint reports for one SLA.
///
/// Submitting takes `&mut self`, so a single submitter never has two
/// reports in flight. Running two submitters for the same SLA is caught by
/// the ledger and surfaces as [`CheckpointError::SequenceConflict`].
#[derive(Debug)]
pub struct CheckpointSubmitter {
    identity: Arc<Identity>,
    sla: Address,
    codec: UsageReportCodec,
    state: CheckpointState,
}

impl CheckpointSubmitter {
    /// A submitter for an SLA that has not received any report yet.
    pub fn new(identity: Arc<Identity>, sla: Address) -> Self {
        Self::resume(identity, sla, CheckpointState::new())
    }

    /// A submitter picking up from a previously saved state.
    pub fn resume(identity: Arc<Identity>, sla: Address, state: CheckpointState) -> Self {
        Self {
            identity,
            sla,
            codec: UsageReportCodec,
            state,
        }
    }

    pub fn sla_address(&self) -> Address {
        self.sla
    }

    pub fn state(&self) -> &CheckpointState {
        &self.state
    }

    /// Reports the usage of `usages.len()` requests.
    ///
    /// The sequence number advances once the ledger includes the report,
    /// and the balances are then read back. If reading them fails the
    /// error is returned, but the sequence number has already advanced.
    pub async fn submit<L>(
        &mut self,
        ledger: &L,
        usages: &[RequestUsage],
    ) -> Result<CheckpointState, CheckpointError>
    where
        L: LedgerGateway + ?Sized,
    {
        let report = self.codec.encode_batch(usages)?;
        let seq = self.state.sequence_number;

        let call = Call::new(self.sla, sla::HOST_CHECKPOINT_REPORT)
            .arg(seq)
            .arg(usages.len() as u64)
            .arg(report);

        debug!(sla = %self.sla, seq, requests = usages.len(), "Submitting checkpoint report");

        let signed = call.sign(&self.identity)?;

        let receipt = match ledger.submit_call(signed).await {
            Ok(receipt) => receipt,
            Err(LedgerError::SubmissionRejected { reason }) => {
                return Err(self.explain_rejection(ledger, seq, reason).await);
            }
            Err(e) => return Err(e.into()),
        };

        self.state.sequence_number += 1;

        info!(
            sla = %self.sla,
            seq,
            requests = usages.len(),
            block = %receipt.block_number,
            "Checkpoint report included"
        );

        self.state.provider_balance = balance(ledger, self.sla, sla::GET_PROVIDER_BALANCE).await?;
        self.state.client_balance = balance(ledger, self.sla, sla::GET_CLIENT_BALANCE).await?;

        info!(
            provider_balance = %self.state.provider_balance,
            client_balance = %self.state.client_balance,
            "Balances after checkpoint"
        );

        Ok(self.state)
    }

    /// Draws `count` usages from `source` and reports them.
    pub async fn submit_from<L, S>(
        &mut self,
        ledger: &L,
        source: &mut S,
        count: usize,
    ) -> Result<CheckpointState, CheckpointError>
    where
        L: LedgerGateway + ?Sized,
        S: UsageSource + ?Sized,
    {
        let usages = source.next_batch(count);
        self.submit(ledger, &usages).await
    }

    /// Tells a reused sequence number apart from other reverts. The revert
    /// reason is kept whenever the ledger's sequence number cannot be read.
    async fn explain_rejection<L>(&self, ledger: &L, submitted: u64, reason: String) -> CheckpointError
    where
        L: LedgerGateway + ?Sized,
    {
        let expected = match ledger
            .read_view(self.sla, sla::GET_CHECKPOINT_SEQ_NUM, &[])
            .await
            .and_then(|token| token.as_u64())
        {
            Ok(expected) => expected,
            Err(e) => {
                warn!(
                    sla = %self.sla,
                    seq = submitted,
                    %reason,
                    "Checkpoint report rejected, sequence number unknown: {e}"
                );
                return CheckpointError::SubmissionRejected { reason };
            }
        };

        if expected != submitted {
            warn!(sla = %self.sla, submitted, expected, "Checkpoint sequence conflict");
            return CheckpointError::SequenceConflict { submitted, expected };
        }

        warn!(sla = %self.sla, seq = submitted, %reason, "Checkpoint report rejected");
        CheckpointError::SubmissionRejected { reason }
    }
}

async fn balance<L>(ledger: &L, sla: Address, function: &str) -> Result<Wei, LedgerError>
where
    L: LedgerGateway + ?Sized,
{
    let token = ledger.read_view(sla, function, &[]).await?;
    Ok(Wei::new(token.as_uint()?))
}
