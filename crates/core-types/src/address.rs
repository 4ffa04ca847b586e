use core::fmt;
use core::str::FromStr;

/// A 20-byte account or contract address on the ledger.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Address([u8; Self::LENGTH]);

impl Address {
    /// Length of an address in bytes.
    pub const LENGTH: usize = 20;

    /// Wraps the given bytes as an address.
    pub const fn new(bytes: [u8; Self::LENGTH]) -> Self {
        Self(bytes)
    }

    /// Takes the trailing 20 bytes of a 32-byte hash, the way account
    /// addresses are derived from public keys and contract creation data.
    pub fn from_hash_tail(hash: &[u8; 32]) -> Self {
        let mut bytes = [0; Self::LENGTH];
        bytes.copy_from_slice(&hash[32 - Self::LENGTH..]);
        Self(bytes)
    }

    /// Returns the raw address bytes.
    pub const fn as_bytes(&self) -> &[u8; Self::LENGTH] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

/// Error returned when parsing an [`Address`] from a hex string.
#[derive(Debug, thiserror::Error)]
pub enum ParseAddressError {
    /// The input is not valid hex.
    #[error("invalid hex in address: {0}")]
    Hex(#[from] hex::FromHexError),

    /// The input does not decode to 20 bytes.
    #[error("invalid address length, got {0} bytes expected 20")]
    Length(usize),
}

impl FromStr for Address {
    type Err = ParseAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s)?;

        let len = bytes.len();
        let bytes = <[u8; Self::LENGTH]>::try_from(bytes.as_slice())
            .map_err(|_| ParseAddressError::Length(len))?;

        Ok(Self(bytes))
    }
}
