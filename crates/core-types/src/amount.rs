use core::fmt;

/// An amount of the ledger's native currency, in its smallest unit.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Wei(u128);

impl Wei {
    /// Zero wei.
    pub const ZERO: Self = Self(0);

    /// Number of wei in one ether.
    pub const PER_ETHER: u128 = 1_000_000_000_000_000_000;

    /// Wraps a raw amount.
    pub const fn new(amount: u128) -> Self {
        Self(amount)
    }

    /// The given number of whole ether, expressed in wei.
    pub const fn from_ether(ether: u64) -> Self {
        Self(ether as u128 * Self::PER_ETHER)
    }

    /// Returns the raw amount.
    pub const fn as_u128(&self) -> u128 {
        self.0
    }

    /// Adds two amounts, returning `None` on overflow.
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Multiplies the amount by a unit count, returning `None` on overflow.
    pub fn checked_mul(self, units: u64) -> Option<Self> {
        self.0.checked_mul(units as u128).map(Self)
    }

    /// Subtracts `other`, stopping at zero.
    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl From<u128> for Wei {
    fn from(amount: u128) -> Self {
        Self(amount)
    }
}

impl fmt::Display for Wei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} wei", self.0)
    }
}
