use std::sync::Arc;

use async_trait::async_trait;

use slalink_core_types::{Address, BlockNumber};

use crate::{EventRecord, LedgerError, SignedCall, Token, TransactionReceipt};

/// The narrow view of the ledger the protocol relies on.
///
/// Implementations must apply calls atomically: a call either produces a
/// receipt and all of its events, or fails with
/// [`LedgerError::SubmissionRejected`] and changes nothing.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Submits a signed call and waits for it to be included in a block.
    async fn submit_call(&self, call: SignedCall) -> Result<TransactionReceipt, LedgerError>;

    /// All events named `event` emitted by `contract` in `from_block` or later,
    /// in log order.
    async fn events(
        &self,
        contract: Address,
        event: &str,
        from_block: BlockNumber,
    ) -> Result<Vec<EventRecord>, LedgerError>;

    /// Evaluates a read-only contract function.
    async fn read_view(
        &self,
        contract: Address,
        function: &str,
        args: &[Token],
    ) -> Result<Token, LedgerError>;
}

#[async_trait]
impl<L> LedgerGateway for Arc<L>
where
    L: LedgerGateway + ?Sized,
{
    async fn submit_call(&self, call: SignedCall) -> Result<TransactionReceipt, LedgerError> {
        (**self).submit_call(call).await
    }

    async fn events(
        &self,
        contract: Address,
        event: &str,
        from_block: BlockNumber,
    ) -> Result<Vec<EventRecord>, LedgerError> {
        (**self).events(contract, event, from_block).await
    }

    async fn read_view(
        &self,
        contract: Address,
        function: &str,
        args: &[Token],
    ) -> Result<Token, LedgerError> {
        (**self).read_view(contract, function, args).await
    }
}
