use core::fmt;

use slalink_codec::CodecError;
use slalink_crypto::CryptoError;
use slalink_ledger::LedgerError;

#[derive(Debug, thiserror::Error)]
pub enum HandshakeError {
    /// Confirmations from the ledger are missing, ambiguous or contradictory.
    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    #[error("Cryptographic failure: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Invalid provider message: {0}")]
    Codec(#[from] CodecError),

    #[error("Ledger failure: {0}")]
    Ledger(LedgerError),
}

impl From<LedgerError> for HandshakeError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::ProtocolViolation { .. } => Self::ProtocolViolation(e.to_string()),
            e => Self::Ledger(e),
        }
    }
}

/// The last stage a handshake reached before it failed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HandshakeStage {
    Unstarted,
    Registered,
    /// Client only: the provider's registration has been observed.
    ProviderObserved,
    /// Client only.
    ProposalSent,
    /// Provider only: a proposal for this provider has been observed.
    ProposalObserved,
    /// Provider only.
    AcceptanceSent,
    /// Client only: the acceptance has been observed but not yet opened.
    Accepted,
}

impl fmt::Display for HandshakeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HandshakeStage::Unstarted => "unstarted",
            HandshakeStage::Registered => "registered",
            HandshakeStage::ProviderObserved => "provider observed",
            HandshakeStage::ProposalSent => "proposal sent",
            HandshakeStage::ProposalObserved => "proposal observed",
            HandshakeStage::AcceptanceSent => "acceptance sent",
            HandshakeStage::Accepted => "accepted",
        };

        f.write_str(name)
    }
}

/// Terminal failure state of a handshake.
///
/// Whatever key material the failed state held has been dropped, and
/// zeroised, by the time this value exists.
#[derive(Debug, thiserror::Error)]
#[error("Handshake aborted after stage '{stage}': {error}")]
pub struct Aborted {
    pub stage: HandshakeStage,
    #[source]
    pub error: HandshakeError,
}

impl Aborted {
    pub fn new(stage: HandshakeStage, error: impl Into<HandshakeError>) -> Self {
        Self {
            stage,
            error: error.into(),
        }
    }

    pub fn is_protocol_violation(&self) -> bool {
        matches!(self.error, HandshakeError::ProtocolViolation(_))
    }
}

pub(crate) trait AbortAt<T> {
    fn abort_at(self, stage: HandshakeStage) -> Result<T, Aborted>;
}

impl<T, E> AbortAt<T> for Result<T, E>
where
    E: Into<HandshakeError>,
{
    fn abort_at(self, stage: HandshakeStage) -> Result<T, Aborted> {
        self.map_err(|e| Aborted::new(stage, e))
    }
}
