//! The client side of the handshake.
//!
//! ```text
//! Unstarted --register--> Registered --await_provider--> ProviderObserved
//!     --propose--> ProposalSent --await_acceptance--> Accepted
//!     --open_session--> SessionEstablished
//! ```

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, info};

use slalink_codec::{Codec, WireCodec};
use slalink_config::HandshakeConfig;
use slalink_core_types::{
    Address, BlockNumber, ConnectionPayload, ContractId, HardwareId, SealedEnvelope, Wei,
};
use slalink_crypto::{envelope, DhPublicKey, Identity, KeyAgreementKeyPair, SharedSecret};
use slalink_ledger::contract::{args, manager};
use slalink_ledger::{Call, EventPoller, EventQuery, EventRecord, LedgerGateway};

use crate::error::AbortAt;
use crate::party::Party;
use crate::{Aborted, HandshakeError, HandshakeRecord, HandshakeStage};

/// Where to find the manager contract, and how to deal with it.
#[derive(Clone, Debug)]
pub struct ClientParams {
    pub manager: Address,
    /// Block in which the manager was deployed.
    pub deploy_block: BlockNumber,
    /// Only consider the provider with this hardware id, if set.
    pub hardware_id: Option<HardwareId>,
    pub stake: Wei,
    pub poller: EventPoller,
}

impl ClientParams {
    pub fn new(manager: Address, deploy_block: BlockNumber) -> Self {
        Self {
            manager,
            deploy_block,
            hardware_id: None,
            stake: HandshakeConfig::default().stake,
            poller: EventPoller::default(),
        }
    }

    pub fn with_config(mut self, config: &HandshakeConfig) -> Self {
        self.stake = config.stake;
        self
    }

    pub fn with_hardware_id(mut self, hardware_id: HardwareId) -> Self {
        self.hardware_id = Some(hardware_id);
        self
    }

    pub fn with_poller(mut self, poller: EventPoller) -> Self {
        self.poller = poller;
        self
    }
}

/// The provider as registered on the ledger.
#[derive(Clone, Debug)]
struct ProviderInfo {
    address: Address,
    hardware_id: HardwareId,
    public_key: DhPublicKey,
    rate: Wei,
}

#[derive(Debug)]
pub struct Unstarted {
    party: Party,
    params: ClientParams,
    keys: KeyAgreementKeyPair,
}

impl Unstarted {
    /// Prepares a handshake with a freshly generated key agreement pair.
    pub fn new(identity: Arc<Identity>, params: ClientParams) -> Self {
        let party = Party {
            identity,
            manager: params.manager,
            stake: params.stake,
            poller: params.poller,
        };

        Self {
            party,
            params,
            keys: KeyAgreementKeyPair::generate(),
        }
    }

    /// Checks that the manager is the service it claims to be, then publishes
    /// this client's key agreement public key.
    pub async fn register<L>(self, ledger: &L) -> Result<Registered, Aborted>
    where
        L: LedgerGateway + ?Sized,
    {
        self.verify_deployment(ledger)
            .await
            .abort_at(HandshakeStage::Unstarted)?;

        let (dh_x, dh_y) = self.keys.public_key().coordinates();
        let call = Call::new(self.party.manager, manager::REGISTER_CLIENT)
            .arg(dh_x)
            .arg(dh_y);

        let receipt = self
            .party
            .submit(ledger, call)
            .await
            .abort_at(HandshakeStage::Unstarted)?;

        info!(client = %self.party.address(), block = %receipt.block_number, "Client registered");

        Ok(Registered {
            party: self.party,
            params: self.params,
            keys: self.keys,
        })
    }

    async fn verify_deployment<L>(&self, ledger: &L) -> Result<(), HandshakeError>
    where
        L: LedgerGateway + ?Sized,
    {
        let expected = self.party.manager;

        let query = EventQuery::new(expected, manager::events::SERVICE_DEPLOYED, BlockNumber::ZERO);
        let deployed = self.party.await_exactly_one(ledger, query, |_| true).await?;

        if deployed.block_number != self.params.deploy_block {
            return Err(HandshakeError::ProtocolViolation(format!(
                "service deployed in block {}, expected {}",
                deployed.block_number, self.params.deploy_block
            )));
        }

        let service = deployed.address_arg(args::SERVICE_ADDR)?;
        if deployed.address != expected || service != expected {
            return Err(HandshakeError::ProtocolViolation(format!(
                "service deployed at {service}, expected {expected}"
            )));
        }

        debug!(manager = %expected, block = %deployed.block_number, "Verified service deployment");
        Ok(())
    }
}

#[derive(Debug)]
pub struct Registered {
    party: Party,
    params: ClientParams,
    keys: KeyAgreementKeyPair,
}

impl Registered {
    /// Waits for the one provider registration, and derives the shared
    /// secret from its public key.
    pub async fn await_provider<L>(self, ledger: &L) -> Result<ProviderObserved, Aborted>
    where
        L: LedgerGateway + ?Sized,
    {
        let provider = self
            .find_provider(ledger)
            .await
            .abort_at(HandshakeStage::Registered)?;

        info!(
            provider = %provider.address,
            hardware_id = %provider.hardware_id,
            rate = %provider.rate,
            "Observed provider registration"
        );

        let client_public_key = self.keys.public_key().clone();
        let secret = self.keys.derive_shared_secret(&provider.public_key);

        Ok(ProviderObserved {
            party: self.party,
            provider,
            client_public_key,
            secret,
        })
    }

    async fn find_provider<L>(&self, ledger: &L) -> Result<ProviderInfo, HandshakeError>
    where
        L: LedgerGateway + ?Sized,
    {
        let query = EventQuery::new(
            self.party.manager,
            manager::events::PROVIDER_REGISTERED,
            self.params.deploy_block,
        );

        let expected = self.params.hardware_id;
        let registered = self
            .party
            .await_exactly_one(ledger, query, move |e| match expected {
                Some(expected) => e
                    .fixed_bytes(args::HARDWARE_ID)
                    .is_ok_and(|id| id == expected.as_bytes()),
                None => true,
            })
            .await?;

        parse_provider(&registered)
    }
}

fn parse_provider(event: &EventRecord) -> Result<ProviderInfo, HandshakeError> {
    let public_key = DhPublicKey::from_coordinates(
        event.fixed_bytes(args::DH_KEY_X)?,
        event.fixed_bytes(args::DH_KEY_Y)?,
    )?;

    Ok(ProviderInfo {
        address: event.address_arg(args::PROVIDER)?,
        hardware_id: HardwareId::new(*event.fixed_bytes(args::HARDWARE_ID)?),
        public_key,
        rate: Wei::new(event.uint(args::RATE)?),
    })
}

#[derive(Debug)]
pub struct ProviderObserved {
    party: Party,
    provider: ProviderInfo,
    client_public_key: DhPublicKey,
    secret: SharedSecret,
}

impl ProviderObserved {
    /// Proposes an SLA to the provider, staking the configured amount, and
    /// waits for the ledger to assign it a contract id.
    pub async fn propose<L>(self, ledger: &L) -> Result<ProposalSent, Aborted>
    where
        L: LedgerGateway + ?Sized,
    {
        let (contract_id, proposed_at) = self
            .send_proposal(ledger)
            .await
            .abort_at(HandshakeStage::ProviderObserved)?;

        info!(%contract_id, block = %proposed_at, stake = %self.party.stake, "Proposal sent");

        Ok(ProposalSent {
            party: self.party,
            provider: self.provider,
            client_public_key: self.client_public_key,
            secret: self.secret,
            contract_id,
            proposed_at,
        })
    }

    async fn send_proposal<L>(&self, ledger: &L) -> Result<(ContractId, BlockNumber), HandshakeError>
    where
        L: LedgerGateway + ?Sized,
    {
        let call = Call::new(self.party.manager, manager::PROPOSE_CONTRACT)
            .arg(self.provider.hardware_id)
            .value(self.party.stake);

        let receipt = self.party.submit(ledger, call).await?;

        let client = self.party.address();
        let query = EventQuery::new(
            self.party.manager,
            manager::events::SLA_PROPOSAL,
            receipt.block_number,
        );

        let proposal = self
            .party
            .await_exactly_one(ledger, query, move |e| {
                e.address_arg(args::CLIENT).is_ok_and(|c| c == client)
            })
            .await?;

        let contract_id = ContractId::new(proposal.u64(args::CONTRACT_ID)?);
        Ok((contract_id, receipt.block_number))
    }
}

#[derive(Debug)]
pub struct ProposalSent {
    party: Party,
    provider: ProviderInfo,
    client_public_key: DhPublicKey,
    secret: SharedSecret,
    contract_id: ContractId,
    proposed_at: BlockNumber,
}

impl ProposalSent {
    pub fn contract_id(&self) -> ContractId {
        self.contract_id
    }

    /// Waits for the provider's acceptance of this proposal.
    pub async fn await_acceptance<L>(self, ledger: &L) -> Result<Accepted, Aborted>
    where
        L: LedgerGateway + ?Sized,
    {
        let (sla_address, message) = self
            .find_acceptance(ledger)
            .await
            .abort_at(HandshakeStage::ProposalSent)?;

        info!(contract_id = %self.contract_id, sla = %sla_address, "Proposal accepted");

        let record = HandshakeRecord {
            contract_id: self.contract_id,
            client: self.party.address(),
            provider: self.provider.address,
            client_public_key: self.client_public_key,
            provider_public_key: self.provider.public_key,
            hardware_id: self.provider.hardware_id,
            rate: self.provider.rate,
        };

        Ok(Accepted {
            record,
            secret: self.secret,
            sla_address,
            message,
        })
    }

    async fn find_acceptance<L>(&self, ledger: &L) -> Result<(Address, Bytes), HandshakeError>
    where
        L: LedgerGateway + ?Sized,
    {
        let query = EventQuery::new(
            self.party.manager,
            manager::events::SLA_PROPOSAL_ACCEPTED,
            self.proposed_at,
        );

        // Other pairs' acceptances share the manager; only ours counts.
        let contract_id = self.contract_id.as_u64();
        let accepted = self
            .party
            .await_exactly_one(ledger, query, move |e| {
                e.u64(args::CONTRACT_ID).is_ok_and(|id| id == contract_id)
            })
            .await?;

        Ok((
            accepted.address_arg(args::SLA_ADDR)?,
            accepted.bytes(args::PROVIDER_MESSAGE)?.clone(),
        ))
    }
}

#[derive(Debug)]
pub struct Accepted {
    record: HandshakeRecord,
    secret: SharedSecret,
    sla_address: Address,
    message: Bytes,
}

impl Accepted {
    pub fn record(&self) -> &HandshakeRecord {
        &self.record
    }

    /// Decrypts the provider's connection details.
    ///
    /// Fails if the message does not authenticate under the shared secret,
    /// in which case the session must not be used.
    pub fn open_session(self) -> Result<SessionEstablished, Aborted> {
        let payload = self.open_message().abort_at(HandshakeStage::Accepted)?;

        Ok(SessionEstablished {
            record: self.record,
            secret: self.secret,
            sla_address: self.sla_address,
            payload,
        })
    }

    fn open_message(&self) -> Result<ConnectionPayload, HandshakeError> {
        let sealed = Codec::<SealedEnvelope>::decode(&WireCodec, self.message.clone())?;
        let plaintext = envelope::open(&self.secret, &sealed)?;
        let payload =
            Codec::<ConnectionPayload>::decode(&WireCodec, Bytes::copy_from_slice(&plaintext))?;

        Ok(payload)
    }
}

/// A client's view of an established SLA.
#[derive(Debug)]
pub struct SessionEstablished {
    pub record: HandshakeRecord,
    pub secret: SharedSecret,
    pub sla_address: Address,
    /// Where to reach the provider.
    pub payload: ConnectionPayload,
}
