use core::fmt;

use bytes::Bytes;

/// Length of an envelope nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Length of an envelope authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Where the client can reach the provider once the SLA is in place.
///
/// The provider encrypts this for the client under the session's shared
/// secret; it never appears on the ledger in plaintext.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConnectionPayload {
    /// Host name or IP address of the provider's service.
    pub host_address: String,
    /// TCP port of the provider's service.
    pub host_port: u16,
}

impl ConnectionPayload {
    /// Creates a new payload.
    pub fn new(host_address: impl Into<String>, host_port: u16) -> Self {
        Self {
            host_address: host_address.into(),
            host_port,
        }
    }
}

impl fmt::Display for ConnectionPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host_address, self.host_port)
    }
}

/// An authenticated ciphertext together with the values needed to open it.
///
/// The ciphertext is exactly as long as the plaintext; the tag is kept
/// separate so that the wire framing can carry `[nonce, tag, ciphertext]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SealedEnvelope {
    /// Per-message random nonce.
    pub nonce: [u8; NONCE_LEN],
    /// Authentication tag over the ciphertext.
    pub tag: [u8; TAG_LEN],
    /// Encrypted payload.
    pub ciphertext: Bytes,
}
