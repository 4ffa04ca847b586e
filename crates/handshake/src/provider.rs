//! The provider side of the handshake.
//!
//! ```text
//! Unstarted --register--> Registered --await_proposal--> ProposalObserved
//!     --accept--> AcceptanceSent --await_confirmation--> SessionEstablished
//! ```

use std::sync::Arc;

use bytes::Bytes;
use tracing::info;

use slalink_codec::{Codec, WireCodec};
use slalink_config::{HandshakeConfig, ProviderConfig};
use slalink_core_types::{
    Address, BlockNumber, ConnectionPayload, ContractId, HardwareId, SealedEnvelope, Wei,
};
use slalink_crypto::{envelope, DhPublicKey, Identity, KeyAgreementKeyPair, SharedSecret};
use slalink_ledger::contract::{args, manager};
use slalink_ledger::{Call, EventPoller, EventQuery, LedgerGateway};

use crate::error::AbortAt;
use crate::party::Party;
use crate::{Aborted, HandshakeError, HandshakeRecord, HandshakeStage};

/// What the provider registers, and what it hands out to its client.
#[derive(Clone, Debug)]
pub struct ProviderParams {
    pub manager: Address,
    pub rate: Wei,
    /// DER-encoded server attestation certificate.
    pub server_cert: Bytes,
    /// DER-encoded application certificate.
    pub app_cert: Bytes,
    pub payload: ConnectionPayload,
    pub stake: Wei,
    pub poller: EventPoller,
}

impl ProviderParams {
    pub fn new(manager: Address) -> Self {
        let defaults = ProviderConfig::default();

        Self {
            manager,
            rate: defaults.rate,
            server_cert: Bytes::new(),
            app_cert: Bytes::new(),
            payload: ConnectionPayload::new(defaults.host_address, defaults.host_port),
            stake: HandshakeConfig::default().stake,
            poller: EventPoller::default(),
        }
    }

    /// Takes rate and connection details from `provider`, and the stake from
    /// `handshake`. Certificates are left untouched.
    pub fn with_config(mut self, provider: &ProviderConfig, handshake: &HandshakeConfig) -> Self {
        self.rate = provider.rate;
        self.payload = ConnectionPayload::new(provider.host_address.clone(), provider.host_port);
        self.stake = handshake.stake;
        self
    }

    pub fn with_certificates(mut self, server_cert: Bytes, app_cert: Bytes) -> Self {
        self.server_cert = server_cert;
        self.app_cert = app_cert;
        self
    }

    pub fn with_payload(mut self, payload: ConnectionPayload) -> Self {
        self.payload = payload;
        self
    }

    pub fn with_poller(mut self, poller: EventPoller) -> Self {
        self.poller = poller;
        self
    }
}

#[derive(Debug)]
pub struct Unstarted {
    party: Party,
    params: ProviderParams,
    keys: KeyAgreementKeyPair,
}

impl Unstarted {
    /// Prepares a handshake with a freshly generated key agreement pair.
    pub fn new(identity: Arc<Identity>, params: ProviderParams) -> Self {
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

    /// Publishes the provider's rate, key agreement public key and
    /// certificates, and learns the hardware id the ledger derived from them.
    pub async fn register<L>(self, ledger: &L) -> Result<Registered, Aborted>
    where
        L: LedgerGateway + ?Sized,
    {
        let (hardware_id, registered_at) = self
            .send_registration(ledger)
            .await
            .abort_at(HandshakeStage::Unstarted)?;

        info!(
            provider = %self.party.address(),
            %hardware_id,
            block = %registered_at,
            "Provider registered"
        );

        Ok(Registered {
            party: self.party,
            params: self.params,
            keys: self.keys,
            hardware_id,
            registered_at,
        })
    }

    async fn send_registration<L>(
        &self,
        ledger: &L,
    ) -> Result<(HardwareId, BlockNumber), HandshakeError>
    where
        L: LedgerGateway + ?Sized,
    {
        let (dh_x, dh_y) = self.keys.public_key().coordinates();

        let call = Call::new(self.party.manager, manager::REGISTER_PROVIDER)
            .arg(self.params.rate)
            .arg(dh_x)
            .arg(dh_y)
            .arg(self.params.server_cert.clone())
            .arg(self.params.app_cert.clone());

        let receipt = self.party.submit(ledger, call).await?;

        let provider = self.party.address();
        let query = EventQuery::new(
            self.party.manager,
            manager::events::PROVIDER_REGISTERED,
            receipt.block_number,
        );

        let registered = self
            .party
            .await_exactly_one(ledger, query, move |e| {
                e.address_arg(args::PROVIDER).is_ok_and(|p| p == provider)
            })
            .await?;

        let hardware_id = HardwareId::new(*registered.fixed_bytes(args::HARDWARE_ID)?);
        Ok((hardware_id, receipt.block_number))
    }
}

#[derive(Debug)]
pub struct Registered {
    party: Party,
    params: ProviderParams,
    keys: KeyAgreementKeyPair,
    hardware_id: HardwareId,
    registered_at: BlockNumber,
}

/// A client's proposal as it appears on the ledger.
#[derive(Clone, Debug)]
struct ProposalInfo {
    client: Address,
    contract_id: ContractId,
    public_key: DhPublicKey,
}

impl Registered {
    pub fn hardware_id(&self) -> HardwareId {
        self.hardware_id
    }

    /// Waits for the one proposal addressed to this provider's hardware, and
    /// derives the shared secret from the client's public key.
    pub async fn await_proposal<L>(self, ledger: &L) -> Result<ProposalObserved, Aborted>
    where
        L: LedgerGateway + ?Sized,
    {
        let proposal = self
            .find_proposal(ledger)
            .await
            .abort_at(HandshakeStage::Registered)?;

        info!(
            client = %proposal.client,
            contract_id = %proposal.contract_id,
            "Observed proposal"
        );

        let provider_public_key = self.keys.public_key().clone();
        let secret = self.keys.derive_shared_secret(&proposal.public_key);

        let record = HandshakeRecord {
            contract_id: proposal.contract_id,
            client: proposal.client,
            provider: self.party.address(),
            client_public_key: proposal.public_key,
            provider_public_key,
            hardware_id: self.hardware_id,
            rate: self.params.rate,
        };

        Ok(ProposalObserved {
            party: self.party,
            payload: self.params.payload,
            record,
            secret,
        })
    }

    async fn find_proposal<L>(&self, ledger: &L) -> Result<ProposalInfo, HandshakeError>
    where
        L: LedgerGateway + ?Sized,
    {
        let query = EventQuery::new(
            self.party.manager,
            manager::events::SLA_PROPOSAL,
            self.registered_at,
        );

        let hardware_id = self.hardware_id;
        let proposal = self
            .party
            .await_exactly_one(ledger, query, move |e| {
                e.fixed_bytes(args::HARDWARE_ID)
                    .is_ok_and(|id| id == hardware_id.as_bytes())
            })
            .await?;

        let public_key = DhPublicKey::from_coordinates(
            proposal.fixed_bytes(args::CLT_DH_KEY_X)?,
            proposal.fixed_bytes(args::CLT_DH_KEY_Y)?,
        )?;

        Ok(ProposalInfo {
            client: proposal.address_arg(args::CLIENT)?,
            contract_id: ContractId::new(proposal.u64(args::CONTRACT_ID)?),
            public_key,
        })
    }
}

#[derive(Debug)]
pub struct ProposalObserved {
    party: Party,
    payload: ConnectionPayload,
    record: HandshakeRecord,
    secret: SharedSecret,
}

impl ProposalObserved {
    pub fn record(&self) -> &HandshakeRecord {
        &self.record
    }

    /// Seals the connection details for the client and accepts the proposal,
    /// staking the configured amount.
    pub async fn accept<L>(self, ledger: &L) -> Result<AcceptanceSent, Aborted>
    where
        L: LedgerGateway + ?Sized,
    {
        let accepted_at = self
            .send_acceptance(ledger)
            .await
            .abort_at(HandshakeStage::ProposalObserved)?;

        info!(
            contract_id = %self.record.contract_id,
            block = %accepted_at,
            stake = %self.party.stake,
            "Acceptance sent"
        );

        Ok(AcceptanceSent {
            party: self.party,
            record: self.record,
            secret: self.secret,
            accepted_at,
        })
    }

    fn seal_payload(&self) -> Result<Bytes, HandshakeError> {
        let plaintext = WireCodec.encode(&self.payload)?;
        let sealed = envelope::seal(&self.secret, &plaintext)?;
        let message = Codec::<SealedEnvelope>::encode(&WireCodec, &sealed)?;
        Ok(message)
    }

    async fn send_acceptance<L>(&self, ledger: &L) -> Result<BlockNumber, HandshakeError>
    where
        L: LedgerGateway + ?Sized,
    {
        let message = self.seal_payload()?;

        let call = Call::new(self.party.manager, manager::ACCEPT_PROPOSAL)
            .arg(self.record.contract_id)
            .arg(message)
            .value(self.party.stake);

        let receipt = self.party.submit(ledger, call).await?;
        Ok(receipt.block_number)
    }
}

#[derive(Debug)]
pub struct AcceptanceSent {
    party: Party,
    record: HandshakeRecord,
    secret: SharedSecret,
    accepted_at: BlockNumber,
}

impl AcceptanceSent {
    /// Waits for the ledger to confirm the acceptance and deploy the SLA.
    pub async fn await_confirmation<L>(self, ledger: &L) -> Result<SessionEstablished, Aborted>
    where
        L: LedgerGateway + ?Sized,
    {
        let sla_address = self
            .find_confirmation(ledger)
            .await
            .abort_at(HandshakeStage::AcceptanceSent)?;

        info!(contract_id = %self.record.contract_id, sla = %sla_address, "SLA established");

        Ok(SessionEstablished {
            record: self.record,
            secret: self.secret,
            sla_address,
        })
    }

    async fn find_confirmation<L>(&self, ledger: &L) -> Result<Address, HandshakeError>
    where
        L: LedgerGateway + ?Sized,
    {
        let query = EventQuery::new(
            self.party.manager,
            manager::events::SLA_PROPOSAL_ACCEPTED,
            self.accepted_at,
        );

        let contract_id = self.record.contract_id.as_u64();
        let accepted = self
            .party
            .await_exactly_one(ledger, query, move |e| {
                e.u64(args::CONTRACT_ID).is_ok_and(|id| id == contract_id)
            })
            .await?;

        Ok(accepted.address_arg(args::SLA_ADDR)?)
    }
}

/// A provider's view of an established SLA.
#[derive(Debug)]
pub struct SessionEstablished {
    pub record: HandshakeRecord,
    pub secret: SharedSecret,
    pub sla_address: Address,
}
