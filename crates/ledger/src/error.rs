use slalink_core_types::Address;
use slalink_crypto::CryptoError;

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Transaction reverted: {reason}")]
    SubmissionRejected { reason: String },

    #[error("Expected exactly one `{event}` event, found {matches}")]
    ProtocolViolation { event: String, matches: usize },

    #[error("No contract deployed at {0}")]
    UnknownContract(Address),

    #[error("Contract has no function `{0}`")]
    UnknownFunction(String),

    #[error("Event `{event}` has no argument `{name}`")]
    MissingEventArgument { event: String, name: String },

    #[error("Expected a `{expected}` value, found `{found}`")]
    UnexpectedToken {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Invalid transaction signature: {0}")]
    InvalidSignature(#[from] CryptoError),

    #[error("Ledger unavailable: {0}")]
    Unavailable(String),
}

impl LedgerError {
    /// Whether the failed operation may succeed if simply tried again.
    ///
    /// Only reads are ever retried; a rejected submission is never resent.
    pub fn is_transient(&self) -> bool {
        matches!(self, LedgerError::Unavailable(_))
    }
}
