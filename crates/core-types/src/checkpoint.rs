use crate::Wei;

/// Progress of the checkpoint reports submitted for one SLA.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CheckpointState {
    /// Sequence number the next report will carry.
    pub sequence_number: u64,
    /// Provider balance as last read from the ledger.
    pub provider_balance: Wei,
    /// Client balance as last read from the ledger.
    pub client_balance: Wei,
}

impl CheckpointState {
    /// State before any report has been submitted.
    pub const fn new() -> Self {
        Self {
            sequence_number: 0,
            provider_balance: Wei::ZERO,
            client_balance: Wei::ZERO,
        }
    }
}
