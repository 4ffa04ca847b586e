use std::sync::Arc;

use slalink_core_types::{Address, Wei};
use slalink_crypto::Identity;
use slalink_ledger::{
    Call, EventPoller, EventQuery, EventRecord, LedgerGateway, TransactionReceipt,
};

use crate::HandshakeError;

/// What a party carries through every state of its handshake.
#[derive(Clone, Debug)]
pub(crate) struct Party {
    pub identity: Arc<Identity>,
    pub manager: Address,
    pub stake: Wei,
    pub poller: EventPoller,
}

impl Party {
    pub fn address(&self) -> Address {
        self.identity.address()
    }

    pub async fn submit<L>(&self, ledger: &L, call: Call) -> Result<TransactionReceipt, HandshakeError>
    where
        L: LedgerGateway + ?Sized,
    {
        let signed = call.sign(&self.identity)?;
        Ok(ledger.submit_call(signed).await?)
    }

    pub async fn await_exactly_one<L, F>(
        &self,
        ledger: &L,
        query: EventQuery,
        filter: F,
    ) -> Result<EventRecord, HandshakeError>
    where
        L: LedgerGateway + ?Sized,
        F: Fn(&EventRecord) -> bool + Send + Sync,
    {
        Ok(self.poller.await_exactly_one(ledger, &query, filter).await?)
    }
}
