//! Key material and authenticated encryption for the SLA protocol.
//!
//! Every party owns two independent secp256k1 keys: a long-term [`Identity`]
//! that signs ledger transactions, and a fresh [`KeyAgreementKeyPair`] per
//! handshake whose only use is to derive a [`SharedSecret`] with the
//! counterparty. The shared secret keys the [`envelope`] used to deliver the
//! provider's connection details.

mod error;
pub use error::CryptoError;

mod hash;
pub use hash::keccak256;

mod identity;
pub use identity::{address_of, Identity, RecoverableSignature};

mod agreement;
pub use agreement::{DhPublicKey, KeyAgreementKeyPair, SharedSecret};

pub mod envelope;
