use std::collections::BTreeMap;

use bytes::Bytes;

use slalink_core_types::{Address, BlockNumber};

use crate::token::Bytes32;
use crate::{LedgerError, Token};

/// An entry of a contract's event log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventRecord {
    pub block_number: BlockNumber,
    /// Contract that emitted the event.
    pub address: Address,
    pub event: String,
    pub args: BTreeMap<String, Token>,
}

impl EventRecord {
    pub fn new(block_number: BlockNumber, address: Address, event: impl Into<String>) -> Self {
        Self {
            block_number,
            address,
            event: event.into(),
            args: BTreeMap::new(),
        }
    }

    pub fn with_arg(mut self, name: impl Into<String>, token: impl Into<Token>) -> Self {
        self.args.insert(name.into(), token.into());
        self
    }

    pub fn arg(&self, name: &str) -> Result<&Token, LedgerError> {
        self.args
            .get(name)
            .ok_or_else(|| LedgerError::MissingEventArgument {
                event: self.event.clone(),
                name: name.to_string(),
            })
    }

    pub fn uint(&self, name: &str) -> Result<u128, LedgerError> {
        self.arg(name)?.as_uint()
    }

    pub fn u64(&self, name: &str) -> Result<u64, LedgerError> {
        self.arg(name)?.as_u64()
    }

    pub fn bytes(&self, name: &str) -> Result<&Bytes, LedgerError> {
        self.arg(name)?.as_bytes()
    }

    pub fn fixed_bytes(&self, name: &str) -> Result<&Bytes32, LedgerError> {
        self.arg(name)?.as_fixed_bytes()
    }

    pub fn address_arg(&self, name: &str) -> Result<Address, LedgerError> {
        self.arg(name)?.as_address()
    }
}
