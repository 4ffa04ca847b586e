use sha3::{Digest, Keccak256};

/// Keccak-256, the ledger's native hash function.
pub fn keccak256(data: impl AsRef<[u8]>) -> [u8; 32] {
    Keccak256::digest(data.as_ref()).into()
}
