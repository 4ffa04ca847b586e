//! Names of the functions, views and events of the SLA contracts, and of
//! the event arguments the protocol reads.

/// The manager contract, through which clients and providers meet.
pub mod manager {
    pub const REGISTER_CLIENT: &str = "registerClient";
    pub const REGISTER_PROVIDER: &str = "registerProvider";
    pub const PROPOSE_CONTRACT: &str = "proposeContract";
    pub const ACCEPT_PROPOSAL: &str = "acceptProposal";

    pub mod events {
        pub const SERVICE_DEPLOYED: &str = "ServiceDeployed";
        pub const CLIENT_REGISTERED: &str = "ClientRegistered";
        pub const PROVIDER_REGISTERED: &str = "ProviderRegistered";
        pub const SLA_PROPOSAL: &str = "SlaProposal";
        pub const SLA_PROPOSAL_ACCEPTED: &str = "SlaProposalAccepted";
    }
}

/// A deployed SLA between one client and one provider.
pub mod sla {
    pub const HOST_CHECKPOINT_REPORT: &str = "hostCheckpointReport";

    pub const GET_PROVIDER_BALANCE: &str = "getProviderBalance";
    pub const GET_CLIENT_BALANCE: &str = "getClientBalance";
    pub const GET_CHECKPOINT_SEQ_NUM: &str = "getCheckpointSeqNum";

    pub mod events {
        pub const CHECKPOINT_REPORTED: &str = "CheckpointReported";
    }
}

/// Event argument names.
pub mod args {
    pub const SERVICE_ADDR: &str = "serviceAddr";
    pub const CLIENT: &str = "client";
    pub const PROVIDER: &str = "provider";
    pub const HARDWARE_ID: &str = "hardwareId";
    pub const DH_KEY_X: &str = "dhKeyX";
    pub const DH_KEY_Y: &str = "dhKeyY";
    pub const CLT_DH_KEY_X: &str = "cltDhKeyX";
    pub const CLT_DH_KEY_Y: &str = "cltDhKeyY";
    pub const RATE: &str = "rate";
    pub const CONTRACT_ID: &str = "contractId";
    pub const SLA_ADDR: &str = "slaAddr";
    pub const PROVIDER_MESSAGE: &str = "providerMessage";
    pub const SEQ_NUM: &str = "seqNum";
    pub const NUMBER_OF_REQUESTS: &str = "numberOfRequests";
}
