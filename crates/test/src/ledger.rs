use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use slalink_core_types::{Address, BlockNumber};
use slalink_crypto::Identity;
use slalink_ledger::contract::{args, manager};
use slalink_ledger::{EventRecord, LedgerError, LedgerGateway, SignedCall, Token, TransactionReceipt};

use crate::contracts::{create_address, Contract, Invocation, Manager};

/// An in-memory ledger running the manager and SLA contracts.
///
/// Every successful call is mined into its own block. Reverted calls leave
/// no trace. Events can also be appended directly with
/// [`MockLedger::emit_event`] to provoke faults that honest contracts never
/// produce.
#[derive(Default)]
pub struct MockLedger {
    state: Mutex<State>,
    failing_reads: AtomicUsize,
}

#[derive(Default)]
struct State {
    block: BlockNumber,
    nonces: HashMap<Address, u64>,
    contracts: HashMap<Address, Contract>,
    log: Vec<EventRecord>,
}

impl State {
    fn mine(&mut self, sender: Address) -> BlockNumber {
        self.block = self.block.increment();
        *self.nonces.entry(sender).or_default() += 1;
        self.block
    }
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deploys a manager contract, which emits `ServiceDeployed` in its
    /// deployment block.
    pub async fn deploy_manager(&self, deployer: &Identity) -> TransactionReceipt {
        let mut state = self.state.lock().await;

        let sender = deployer.address();
        let nonce = state.nonces.get(&sender).copied().unwrap_or_default();
        let address = create_address(&sender, nonce);

        let block = state.mine(sender);
        state
            .contracts
            .insert(address, Contract::Manager(Manager::new(address)));

        state.log.push(
            EventRecord::new(block, address, manager::events::SERVICE_DEPLOYED)
                .with_arg(args::SERVICE_ADDR, address),
        );

        debug!(%address, %block, "Deployed manager contract");

        TransactionReceipt {
            block_number: block,
            sender,
            contract_address: Some(address),
        }
    }

    /// Appends `record` to the log in a block of its own, whatever block
    /// number it carries. Returns that block.
    pub async fn emit_event(&self, mut record: EventRecord) -> BlockNumber {
        let mut state = self.state.lock().await;

        state.block = state.block.increment();
        record.block_number = state.block;

        debug!(event = %record.event, block = %record.block_number, "Injected event");

        state.log.push(record);
        state.block
    }

    /// Makes the next `count` event log reads fail as if the node were
    /// unreachable.
    pub fn fail_next_reads(&self, count: usize) {
        self.failing_reads.store(count, Ordering::SeqCst);
    }

    pub async fn current_block(&self) -> BlockNumber {
        self.state.lock().await.block
    }

    /// The whole event log, in order.
    pub async fn event_log(&self) -> Vec<EventRecord> {
        self.state.lock().await.log.clone()
    }
}

#[async_trait]
impl LedgerGateway for MockLedger {
    async fn submit_call(&self, signed: SignedCall) -> Result<TransactionReceipt, LedgerError> {
        let sender = signed.sender()?;
        let call = signed.call;

        let mut state = self.state.lock().await;

        let contract = state
            .contracts
            .get_mut(&call.contract)
            .ok_or(LedgerError::UnknownContract(call.contract))?;

        let invocation = Invocation {
            sender,
            value: call.value,
            function: &call.function,
            args: &call.args,
        };

        let outcome = match contract.call(&invocation) {
            Ok(outcome) => outcome,
            Err(e) => {
                debug!(%sender, function = %call.function, "Call reverted: {e}");
                return Err(e);
            }
        };

        let block = state.mine(sender);

        let created = outcome.created.map(|(address, sla)| {
            state.contracts.insert(address, Contract::Sla(sla));
            address
        });

        for emitted in outcome.events {
            let mut record = EventRecord::new(block, call.contract, emitted.event);
            for (name, token) in emitted.args {
                record = record.with_arg(name, token);
            }
            state.log.push(record);
        }

        debug!(%sender, function = %call.function, %block, "Call included");

        Ok(TransactionReceipt {
            block_number: block,
            sender,
            contract_address: created,
        })
    }

    async fn events(
        &self,
        contract: Address,
        event: &str,
        from_block: BlockNumber,
    ) -> Result<Vec<EventRecord>, LedgerError> {
        let failing = self
            .failing_reads
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));

        if failing.is_ok() {
            return Err(LedgerError::Unavailable("injected read failure".to_string()));
        }

        let state = self.state.lock().await;

        Ok(state
            .log
            .iter()
            .filter(|e| e.address == contract && e.event == event && e.block_number >= from_block)
            .cloned()
            .collect())
    }

    async fn read_view(
        &self,
        contract: Address,
        function: &str,
        _args: &[Token],
    ) -> Result<Token, LedgerError> {
        let state = self.state.lock().await;

        state
            .contracts
            .get(&contract)
            .ok_or(LedgerError::UnknownContract(contract))?
            .view(function)
    }
}
