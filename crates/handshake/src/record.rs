use slalink_core_types::{Address, ContractId, HardwareId, Wei};
use slalink_crypto::DhPublicKey;

/// Everything both parties agreed on through the ledger.
///
/// Built once the proposal has been matched with a provider and never
/// modified afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HandshakeRecord {
    pub contract_id: ContractId,
    pub client: Address,
    pub provider: Address,
    pub client_public_key: DhPublicKey,
    pub provider_public_key: DhPublicKey,
    pub hardware_id: HardwareId,
    /// Price of one unit of work, as registered by the provider.
    pub rate: Wei,
}
