use bytes::Bytes;

use slalink_codec::rlp::{self, Item};
use slalink_core_types::{Address, BlockNumber, Wei};
use slalink_crypto::{keccak256, CryptoError, Identity, RecoverableSignature};

use crate::Token;

/// A state-changing invocation of a contract function.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Call {
    pub contract: Address,
    pub function: String,
    pub args: Vec<Token>,
    /// Native currency transferred to the contract along with the call.
    pub value: Wei,
}

impl Call {
    pub fn new(contract: Address, function: impl Into<String>) -> Self {
        Self {
            contract,
            function: function.into(),
            args: Vec::new(),
            value: Wei::ZERO,
        }
    }

    pub fn arg(mut self, token: impl Into<Token>) -> Self {
        self.args.push(token.into());
        self
    }

    pub fn value(mut self, value: Wei) -> Self {
        self.value = value;
        self
    }

    /// Keccak-256 of the call's RLP encoding. This is what gets signed.
    pub fn digest(&self) -> [u8; 32] {
        let args = self.args.iter().map(Token::to_rlp);

        let item = Item::list([
            Item::bytes(Bytes::copy_from_slice(self.contract.as_bytes())),
            Item::bytes(Bytes::copy_from_slice(self.function.as_bytes())),
            Item::list(args),
            Token::from(self.value).to_rlp(),
        ]);

        keccak256(rlp::encode(&item))
    }

    /// Signs the call with the given identity.
    pub fn sign(self, signer: &Identity) -> Result<SignedCall, CryptoError> {
        let signature = signer.sign_prehash(&self.digest())?;
        Ok(SignedCall {
            call: self,
            signature,
        })
    }
}

/// A call together with the signature authorising it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedCall {
    pub call: Call,
    pub signature: RecoverableSignature,
}

impl SignedCall {
    /// Address of the account that signed the call.
    pub fn sender(&self) -> Result<Address, CryptoError> {
        self.signature.recover_signer(&self.call.digest())
    }
}

/// Outcome of a call that was included in a block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub block_number: BlockNumber,
    pub sender: Address,
    /// Address of the contract created by the call, if any.
    pub contract_address: Option<Address>,
}
