use bytes::Bytes;

use slalink_codec::rlp::Item;
use slalink_core_types::{Address, ContractId, HardwareId, Wei};

use crate::LedgerError;

/// A value passed to, or returned from, a contract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    /// Unsigned integer, up to 128 bits wide.
    Uint(u128),
    /// Dynamically sized byte string.
    Bytes(Bytes),
    /// Fixed-size 32-byte word.
    FixedBytes(Bytes32),
    /// Account or contract address.
    Address(Address),
    /// UTF-8 string.
    String(String),
}

/// A 32-byte word such as a hardware id or a key coordinate.
pub type Bytes32 = [u8; 32];

impl Token {
    pub fn kind(&self) -> &'static str {
        match self {
            Token::Uint(_) => "uint",
            Token::Bytes(_) => "bytes",
            Token::FixedBytes(_) => "bytes32",
            Token::Address(_) => "address",
            Token::String(_) => "string",
        }
    }

    pub fn as_uint(&self) -> Result<u128, LedgerError> {
        match self {
            Token::Uint(value) => Ok(*value),
            other => Err(other.unexpected("uint")),
        }
    }

    pub fn as_u64(&self) -> Result<u64, LedgerError> {
        let value = self.as_uint()?;
        u64::try_from(value).map_err(|_| LedgerError::UnexpectedToken {
            expected: "uint64",
            found: "uint",
        })
    }

    pub fn as_bytes(&self) -> Result<&Bytes, LedgerError> {
        match self {
            Token::Bytes(bytes) => Ok(bytes),
            other => Err(other.unexpected("bytes")),
        }
    }

    pub fn as_fixed_bytes(&self) -> Result<&Bytes32, LedgerError> {
        match self {
            Token::FixedBytes(bytes) => Ok(bytes),
            other => Err(other.unexpected("bytes32")),
        }
    }

    pub fn as_address(&self) -> Result<Address, LedgerError> {
        match self {
            Token::Address(address) => Ok(*address),
            other => Err(other.unexpected("address")),
        }
    }

    fn unexpected(&self, expected: &'static str) -> LedgerError {
        LedgerError::UnexpectedToken {
            expected,
            found: self.kind(),
        }
    }

    /// RLP form used when hashing a call for signing.
    ///
    /// Every token is tagged with its kind so that, for instance, an address
    /// and a byte string with the same contents hash differently.
    pub(crate) fn to_rlp(&self) -> Item {
        let value = match self {
            Token::Uint(value) => {
                let bytes = value.to_be_bytes();
                let skip = bytes.iter().take_while(|b| **b == 0).count();
                Item::bytes(Bytes::copy_from_slice(&bytes[skip..]))
            }
            Token::Bytes(bytes) => Item::bytes(bytes.clone()),
            Token::FixedBytes(bytes) => Item::bytes(Bytes::copy_from_slice(bytes)),
            Token::Address(address) => Item::bytes(Bytes::copy_from_slice(address.as_bytes())),
            Token::String(string) => Item::bytes(Bytes::copy_from_slice(string.as_bytes())),
        };

        Item::list([Item::bytes(Bytes::from_static(self.kind().as_bytes())), value])
    }
}

impl From<u64> for Token {
    fn from(value: u64) -> Self {
        Token::Uint(value as u128)
    }
}

impl From<u128> for Token {
    fn from(value: u128) -> Self {
        Token::Uint(value)
    }
}

impl From<Wei> for Token {
    fn from(value: Wei) -> Self {
        Token::Uint(value.as_u128())
    }
}

impl From<ContractId> for Token {
    fn from(id: ContractId) -> Self {
        Token::Uint(id.as_u64() as u128)
    }
}

impl From<HardwareId> for Token {
    fn from(id: HardwareId) -> Self {
        Token::FixedBytes(*id.as_bytes())
    }
}

impl From<Bytes32> for Token {
    fn from(bytes: Bytes32) -> Self {
        Token::FixedBytes(bytes)
    }
}

impl From<Bytes> for Token {
    fn from(bytes: Bytes) -> Self {
        Token::Bytes(bytes)
    }
}

impl From<Address> for Token {
    fn from(address: Address) -> Self {
        Token::Address(address)
    }
}

impl From<String> for Token {
    fn from(string: String) -> Self {
        Token::String(string)
    }
}
