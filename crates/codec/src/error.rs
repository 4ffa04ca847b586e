use crate::RlpError;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Value out of range in entry {index}: {field} = {value} exceeds {max}")]
    ValueOutOfRange {
        index: usize,
        field: &'static str,
        value: u128,
        max: u128,
    },

    #[error("Malformed report: expected {expected} bytes, got {actual}")]
    MalformedReport { expected: usize, actual: usize },

    #[error("RLP decoding failed: {0}")]
    Rlp(#[from] RlpError),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}
