use std::collections::HashMap;

use bytes::Bytes;

use slalink_codec::rlp::{self, Item};
use slalink_codec::UsageReportCodec;
use slalink_core_types::{Address, ContractId, HardwareId, Wei};
use slalink_crypto::keccak256;
use slalink_ledger::contract::{args, manager, sla};
use slalink_ledger::{Bytes32, LedgerError, Token};

/// A call as seen by the contract it targets.
pub(crate) struct Invocation<'a> {
    pub sender: Address,
    pub value: Wei,
    pub function: &'a str,
    pub args: &'a [Token],
}

impl Invocation<'_> {
    fn expect_arity(&self, arity: usize) -> Result<(), LedgerError> {
        if self.args.len() != arity {
            return Err(revert(format!(
                "{} expects {arity} arguments, got {}",
                self.function,
                self.args.len()
            )));
        }

        Ok(())
    }

    fn require_stake(&self) -> Result<(), LedgerError> {
        if self.value == Wei::ZERO {
            return Err(revert("stake required"));
        }

        Ok(())
    }
}

pub(crate) struct Emitted {
    pub event: &'static str,
    pub args: Vec<(&'static str, Token)>,
}

/// State changes of a successful call, other than those to the called
/// contract itself.
#[derive(Default)]
pub(crate) struct Outcome {
    pub events: Vec<Emitted>,
    pub created: Option<(Address, Sla)>,
}

impl Outcome {
    fn emit(event: &'static str, args: Vec<(&'static str, Token)>) -> Self {
        Self {
            events: vec![Emitted { event, args }],
            created: None,
        }
    }
}

pub(crate) enum Contract {
    Manager(Manager),
    Sla(Sla),
}

impl Contract {
    pub fn call(&mut self, inv: &Invocation<'_>) -> Result<Outcome, LedgerError> {
        match self {
            Contract::Manager(manager) => manager.call(inv),
            Contract::Sla(sla) => sla.call(inv),
        }
    }

    pub fn view(&self, function: &str) -> Result<Token, LedgerError> {
        match self {
            Contract::Manager(_) => Err(LedgerError::UnknownFunction(function.to_string())),
            Contract::Sla(sla) => sla.view(function),
        }
    }
}

pub(crate) fn revert(reason: impl Into<String>) -> LedgerError {
    LedgerError::SubmissionRejected {
        reason: reason.into(),
    }
}

/// Address of the contract created by `creator` with the given nonce:
/// the tail of `keccak256(rlp([creator, nonce]))`.
pub(crate) fn create_address(creator: &Address, nonce: u64) -> Address {
    let nonce = nonce.to_be_bytes();
    let skip = nonce.iter().take_while(|b| **b == 0).count();

    let item = Item::list([
        Item::bytes(Bytes::copy_from_slice(creator.as_bytes())),
        Item::bytes(Bytes::copy_from_slice(&nonce[skip..])),
    ]);

    Address::from_hash_tail(&keccak256(rlp::encode(&item)))
}

struct ProviderEntry {
    provider: Address,
    rate: Wei,
}

struct Proposal {
    client: Address,
    hardware_id: HardwareId,
    stake: Wei,
    accepted: bool,
}

pub(crate) struct Manager {
    address: Address,
    /// Contract creation nonce. Contracts start at 1.
    nonce: u64,
    clients: HashMap<Address, (Bytes32, Bytes32)>,
    providers: HashMap<HardwareId, ProviderEntry>,
    proposals: HashMap<ContractId, Proposal>,
    next_contract_id: u64,
}

impl Manager {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            nonce: 1,
            clients: HashMap::new(),
            providers: HashMap::new(),
            proposals: HashMap::new(),
            next_contract_id: 0,
        }
    }

    fn call(&mut self, inv: &Invocation<'_>) -> Result<Outcome, LedgerError> {
        match inv.function {
            manager::REGISTER_CLIENT => self.register_client(inv),
            manager::REGISTER_PROVIDER => self.register_provider(inv),
            manager::PROPOSE_CONTRACT => self.propose_contract(inv),
            manager::ACCEPT_PROPOSAL => self.accept_proposal(inv),
            other => Err(LedgerError::UnknownFunction(other.to_string())),
        }
    }

    fn register_client(&mut self, inv: &Invocation<'_>) -> Result<Outcome, LedgerError> {
        inv.expect_arity(2)?;
        let dh_x = *inv.args[0].as_fixed_bytes()?;
        let dh_y = *inv.args[1].as_fixed_bytes()?;

        self.clients.insert(inv.sender, (dh_x, dh_y));

        Ok(Outcome::emit(
            manager::events::CLIENT_REGISTERED,
            vec![
                (args::CLIENT, inv.sender.into()),
                (args::DH_KEY_X, dh_x.into()),
                (args::DH_KEY_Y, dh_y.into()),
            ],
        ))
    }

    fn register_provider(&mut self, inv: &Invocation<'_>) -> Result<Outcome, LedgerError> {
        inv.expect_arity(5)?;
        let rate = Wei::new(inv.args[0].as_uint()?);
        let dh_x = *inv.args[1].as_fixed_bytes()?;
        let dh_y = *inv.args[2].as_fixed_bytes()?;
        let _server_cert = inv.args[3].as_bytes()?;
        let app_cert = inv.args[4].as_bytes()?;

        let hardware_id = HardwareId::new(keccak256(app_cert));

        if let Some(entry) = self.providers.get(&hardware_id) {
            if entry.provider != inv.sender {
                return Err(revert("hardware already registered by another provider"));
            }
        }

        self.providers.insert(
            hardware_id,
            ProviderEntry {
                provider: inv.sender,
                rate,
            },
        );

        Ok(Outcome::emit(
            manager::events::PROVIDER_REGISTERED,
            vec![
                (args::PROVIDER, inv.sender.into()),
                (args::HARDWARE_ID, hardware_id.into()),
                (args::DH_KEY_X, dh_x.into()),
                (args::DH_KEY_Y, dh_y.into()),
                (args::RATE, rate.into()),
            ],
        ))
    }

    fn propose_contract(&mut self, inv: &Invocation<'_>) -> Result<Outcome, LedgerError> {
        inv.expect_arity(1)?;
        let hardware_id = HardwareId::new(*inv.args[0].as_fixed_bytes()?);

        let Some(&(dh_x, dh_y)) = self.clients.get(&inv.sender) else {
            return Err(revert("client not registered"));
        };

        if !self.providers.contains_key(&hardware_id) {
            return Err(revert("no provider registered for hardware"));
        }

        inv.require_stake()?;

        let contract_id = ContractId::new(self.next_contract_id);
        self.next_contract_id += 1;

        self.proposals.insert(
            contract_id,
            Proposal {
                client: inv.sender,
                hardware_id,
                stake: inv.value,
                accepted: false,
            },
        );

        Ok(Outcome::emit(
            manager::events::SLA_PROPOSAL,
            vec![
                (args::CLIENT, inv.sender.into()),
                (args::HARDWARE_ID, hardware_id.into()),
                (args::CONTRACT_ID, contract_id.into()),
                (args::CLT_DH_KEY_X, dh_x.into()),
                (args::CLT_DH_KEY_Y, dh_y.into()),
            ],
        ))
    }

    fn accept_proposal(&mut self, inv: &Invocation<'_>) -> Result<Outcome, LedgerError> {
        inv.expect_arity(2)?;
        let contract_id = ContractId::new(inv.args[0].as_u64()?);
        let message = inv.args[1].as_bytes()?.clone();

        let Some(proposal) = self.proposals.get(&contract_id) else {
            return Err(revert("unknown proposal"));
        };

        if proposal.accepted {
            return Err(revert("proposal already accepted"));
        }

        let Some(entry) = self.providers.get(&proposal.hardware_id) else {
            return Err(revert("no provider registered for hardware"));
        };

        if entry.provider != inv.sender {
            return Err(revert("only the proposed provider can accept"));
        }

        inv.require_stake()?;

        let sla = Sla {
            client: proposal.client,
            provider: entry.provider,
            rate: entry.rate,
            client_balance: proposal.stake,
            provider_balance: inv.value,
            sequence_number: 0,
        };

        let sla_address = create_address(&self.address, self.nonce);
        self.nonce += 1;

        if let Some(proposal) = self.proposals.get_mut(&contract_id) {
            proposal.accepted = true;
        }

        Ok(Outcome {
            events: vec![Emitted {
                event: manager::events::SLA_PROPOSAL_ACCEPTED,
                args: vec![
                    (args::CONTRACT_ID, contract_id.into()),
                    (args::SLA_ADDR, sla_address.into()),
                    (args::PROVIDER_MESSAGE, message.into()),
                ],
            }],
            created: Some((sla_address, sla)),
        })
    }
}

pub(crate) struct Sla {
    client: Address,
    provider: Address,
    rate: Wei,
    client_balance: Wei,
    provider_balance: Wei,
    sequence_number: u64,
}

impl Sla {
    fn call(&mut self, inv: &Invocation<'_>) -> Result<Outcome, LedgerError> {
        match inv.function {
            sla::HOST_CHECKPOINT_REPORT => self.host_checkpoint_report(inv),
            other => Err(LedgerError::UnknownFunction(other.to_string())),
        }
    }

    fn view(&self, function: &str) -> Result<Token, LedgerError> {
        match function {
            sla::GET_PROVIDER_BALANCE => Ok(self.provider_balance.into()),
            sla::GET_CLIENT_BALANCE => Ok(self.client_balance.into()),
            sla::GET_CHECKPOINT_SEQ_NUM => Ok(self.sequence_number.into()),
            other => Err(LedgerError::UnknownFunction(other.to_string())),
        }
    }

    fn host_checkpoint_report(&mut self, inv: &Invocation<'_>) -> Result<Outcome, LedgerError> {
        inv.expect_arity(3)?;
        let sequence_number = inv.args[0].as_u64()?;
        let count = inv.args[1].as_u64()?;
        let report = inv.args[2].as_bytes()?;

        if inv.sender != self.provider {
            return Err(revert("only the provider can report"));
        }

        if sequence_number != self.sequence_number {
            return Err(revert(format!(
                "unexpected checkpoint sequence number {sequence_number}, expected {}",
                self.sequence_number
            )));
        }

        let count = usize::try_from(count).map_err(|_| revert("too many requests"))?;
        let entries = UsageReportCodec
            .decode_batch(report, count)
            .map_err(|e| revert(e.to_string()))?;

        for entry in entries {
            let cost = self
                .rate
                .checked_mul(entry.units_used)
                .unwrap_or(Wei::new(u128::MAX));

            let charged = cost.min(self.client_balance);
            self.client_balance = self.client_balance.saturating_sub(charged);
            self.provider_balance = self
                .provider_balance
                .checked_add(charged)
                .unwrap_or(Wei::new(u128::MAX));
        }

        self.sequence_number += 1;

        Ok(Outcome::emit(
            sla::events::CHECKPOINT_REPORTED,
            vec![
                (args::SEQ_NUM, sequence_number.into()),
                (args::NUMBER_OF_REQUESTS, (count as u64).into()),
                (args::CLIENT, self.client.into()),
            ],
        ))
    }
}
