use core::fmt;

/// Height of a block on the ledger.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockNumber(u64);

impl BlockNumber {
    /// The genesis block.
    pub const ZERO: Self = Self(0);

    /// Wraps a raw block number.
    pub const fn new(number: u64) -> Self {
        Self(number)
    }

    /// Returns the raw block number.
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// The block following this one.
    pub const fn increment(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for BlockNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier the manager contract assigns to an SLA proposal.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContractId(u64);

impl ContractId {
    /// Wraps a raw contract id.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw contract id.
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Registration tag of a provider's attested hardware platform.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HardwareId([u8; 32]);

impl HardwareId {
    /// Wraps the given bytes as a hardware id.
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the raw hardware id.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for HardwareId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for HardwareId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HardwareId({self})")
    }
}
