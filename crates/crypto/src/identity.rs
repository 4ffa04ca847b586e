use core::fmt;

use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use rand::rngs::OsRng;

use slalink_core_types::Address;

use crate::{keccak256, CryptoError};

/// Long-term chain identity of a party.
///
/// The signing key never leaves this type; everything else in the protocol
/// refers to the party by its [`Address`].
pub struct Identity {
    signing_key: SigningKey,
    address: Address,
}

impl Identity {
    /// Derives an identity from a big-endian secret scalar.
    ///
    /// Fails with [`CryptoError::InvalidKeyMaterial`] if the scalar is zero or
    /// not below the secp256k1 group order.
    pub fn from_secret_scalar(scalar: &[u8; 32]) -> Result<Self, CryptoError> {
        let signing_key =
            SigningKey::from_bytes(scalar.into()).map_err(|_| CryptoError::InvalidKeyMaterial)?;

        Ok(Self::from_signing_key(signing_key))
    }

    /// Derives an identity from a hex-encoded secret scalar, with or without `0x`.
    pub fn from_hex(scalar: &str) -> Result<Self, CryptoError> {
        let scalar = scalar.strip_prefix("0x").unwrap_or(scalar);

        let mut bytes = [0u8; 32];
        hex::decode_to_slice(scalar, &mut bytes).map_err(|_| CryptoError::InvalidKeyMaterial)?;

        Self::from_secret_scalar(&bytes)
    }

    /// Generates a fresh identity from the operating system's CSPRNG.
    pub fn random() -> Self {
        Self::from_signing_key(SigningKey::random(&mut OsRng))
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let address = address_of(signing_key.verifying_key());

        Self {
            signing_key,
            address,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn verifying_key(&self) -> &VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Signs a 32-byte prehash such that the signer's address can be recovered
    /// from the signature alone.
    pub fn sign_prehash(&self, prehash: &[u8; 32]) -> Result<RecoverableSignature, CryptoError> {
        let (signature, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(prehash)
            .map_err(|_| CryptoError::InvalidSignature)?;

        Ok(RecoverableSignature {
            signature,
            recovery_id,
        })
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// Ledger address of a public key: the last 20 bytes of the Keccak-256 hash
/// of its uncompressed encoding, without the leading `0x04` tag.
pub fn address_of(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    Address::from_hash_tail(&hash)
}

/// An ECDSA signature together with its public key recovery id.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RecoverableSignature {
    signature: Signature,
    recovery_id: RecoveryId,
}

impl RecoverableSignature {
    /// Recovers the address of the identity that signed `prehash`.
    pub fn recover_signer(&self, prehash: &[u8; 32]) -> Result<Address, CryptoError> {
        let key = VerifyingKey::recover_from_prehash(prehash, &self.signature, self.recovery_id)
            .map_err(|_| CryptoError::InvalidSignature)?;

        Ok(address_of(&key))
    }
}
