use tracing::{trace, warn};

use slalink_config::LedgerConfig;
use slalink_core_types::{Address, BlockNumber};

use crate::{EventRecord, LedgerError, LedgerGateway};

/// Which part of the event log to look at.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EventQuery {
    pub contract: Address,
    pub event: &'static str,
    pub from_block: BlockNumber,
}

impl EventQuery {
    pub fn new(contract: Address, event: &'static str, from_block: BlockNumber) -> Self {
        Self {
            contract,
            event,
            from_block,
        }
    }
}

/// Waits for events by polling the ledger with bounded exponential back-off.
///
/// The poller never gives up on its own: callers that need a deadline wrap
/// the returned future in a timeout. Dropping the future stops the polling.
#[derive(Copy, Clone, Debug, Default)]
pub struct EventPoller {
    config: LedgerConfig,
}

impl EventPoller {
    pub fn new(config: LedgerConfig) -> Self {
        Self { config }
    }

    /// Events matched by `filter` at the time of the call.
    pub async fn matching<L, F>(
        &self,
        ledger: &L,
        query: &EventQuery,
        filter: F,
    ) -> Result<Vec<EventRecord>, LedgerError>
    where
        L: LedgerGateway + ?Sized,
        F: Fn(&EventRecord) -> bool + Send + Sync,
    {
        let events = ledger
            .events(query.contract, query.event, query.from_block)
            .await?;

        Ok(events.into_iter().filter(|e| filter(e)).collect())
    }

    /// Polls until at least one event is matched by `filter`, and returns
    /// every match seen by that poll.
    ///
    /// Transient read failures are retried; every other error is returned.
    pub async fn await_event<L, F>(
        &self,
        ledger: &L,
        query: &EventQuery,
        filter: F,
    ) -> Result<Vec<EventRecord>, LedgerError>
    where
        L: LedgerGateway + ?Sized,
        F: Fn(&EventRecord) -> bool + Send + Sync,
    {
        let mut delay = self.config.poll_interval;

        loop {
            match self.matching(ledger, query, &filter).await {
                Ok(matches) if !matches.is_empty() => return Ok(matches),
                Ok(_) => {
                    trace!(event = query.event, from_block = %query.from_block, "No matching event yet");
                }
                Err(e) if e.is_transient() => {
                    warn!(event = query.event, "Failed to read event log, retrying: {e}");
                }
                Err(e) => return Err(e),
            }

            tokio::time::sleep(delay).await;
            delay = self.config.next_delay(delay);
        }
    }

    /// Polls until an event is matched by `filter`, and requires it to be the
    /// only match.
    ///
    /// Zero matches means the event is still pending. More than one is a
    /// [`LedgerError::ProtocolViolation`].
    pub async fn await_exactly_one<L, F>(
        &self,
        ledger: &L,
        query: &EventQuery,
        filter: F,
    ) -> Result<EventRecord, LedgerError>
    where
        L: LedgerGateway + ?Sized,
        F: Fn(&EventRecord) -> bool + Send + Sync,
    {
        let mut matches = self.await_event(ledger, query, filter).await?;

        match matches.len() {
            1 => Ok(matches.remove(0)),
            n => Err(LedgerError::ProtocolViolation {
                event: query.event.to_string(),
                matches: n,
            }),
        }
    }
}
