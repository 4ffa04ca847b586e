use slalink_codec::CodecError;
use slalink_crypto::CryptoError;
use slalink_ledger::LedgerError;

#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    /// The ledger expects another sequence number. Another submitter is
    /// reporting for the same SLA, or this report was already included.
    #[error("Sequence number {submitted} was refused, the ledger expects {expected}")]
    SequenceConflict { submitted: u64, expected: u64 },

    #[error("Checkpoint report rejected: {reason}")]
    SubmissionRejected { reason: String },

    #[error("Invalid usage report: {0}")]
    Codec(#[from] CodecError),

    #[error("Failed to sign checkpoint report: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Ledger failure: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Invalid usage source: {0}")]
    InvalidSource(&'static str),
}
