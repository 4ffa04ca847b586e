use core::fmt;

use k256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use k256::{EncodedPoint, FieldBytes, PublicKey, SecretKey};
use rand::rngs::OsRng;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::CryptoError;

/// Length of a single affine coordinate, as carried on the ledger.
const COORDINATE_LEN: usize = 32;

/// Ephemeral key pair used for exactly one handshake.
///
/// The private scalar is consumed by [`KeyAgreementKeyPair::derive_shared_secret`]
/// and zeroised when dropped, so it cannot outlive the derivation.
pub struct KeyAgreementKeyPair {
    secret: SecretKey,
    public: DhPublicKey,
}

impl KeyAgreementKeyPair {
    /// Generates a fresh pair from the operating system's CSPRNG.
    pub fn generate() -> Self {
        Self::from_secret(SecretKey::random(&mut OsRng))
    }

    /// Builds a pair from a big-endian secret scalar.
    #[cfg(test)]
    fn from_secret_scalar(scalar: &[u8; 32]) -> Result<Self, CryptoError> {
        let secret =
            SecretKey::from_bytes(scalar.into()).map_err(|_| CryptoError::InvalidKeyMaterial)?;

        Ok(Self::from_secret(secret))
    }

    fn from_secret(secret: SecretKey) -> Self {
        let public = DhPublicKey(secret.public_key());
        Self { secret, public }
    }

    pub fn public_key(&self) -> &DhPublicKey {
        &self.public
    }

    /// Elliptic-curve Diffie-Hellman with the counterparty's public point.
    ///
    /// Consumes the pair: the private scalar is dropped as soon as the secret
    /// has been derived.
    pub fn derive_shared_secret(self, counterpart: &DhPublicKey) -> SharedSecret {
        let shared =
            k256::ecdh::diffie_hellman(self.secret.to_nonzero_scalar(), counterpart.0.as_affine());

        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(shared.raw_secret_bytes());
        SharedSecret(bytes)
    }
}

impl fmt::Debug for KeyAgreementKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyAgreementKeyPair")
            .field("public", &self.public)
            .finish_non_exhaustive()
    }
}

/// A validated secp256k1 public point used for key agreement.
#[derive(Clone, PartialEq, Eq)]
pub struct DhPublicKey(PublicKey);

impl DhPublicKey {
    /// Builds a point from its big-endian affine coordinates.
    ///
    /// Fails with [`CryptoError::InvalidCounterpartKey`] unless both
    /// coordinates are 32 bytes long and describe a point on the curve.
    pub fn from_coordinates(x: &[u8], y: &[u8]) -> Result<Self, CryptoError> {
        if x.len() != COORDINATE_LEN || y.len() != COORDINATE_LEN {
            return Err(CryptoError::InvalidCounterpartKey(
                "coordinates must be 32 bytes",
            ));
        }

        let point = EncodedPoint::from_affine_coordinates(
            FieldBytes::from_slice(x),
            FieldBytes::from_slice(y),
            false,
        );

        Option::<PublicKey>::from(PublicKey::from_encoded_point(&point))
            .map(Self)
            .ok_or(CryptoError::InvalidCounterpartKey("point is not on the curve"))
    }

    /// Parses a SEC1-encoded point, compressed or not.
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        PublicKey::from_sec1_bytes(bytes)
            .map(Self)
            .map_err(|_| CryptoError::InvalidCounterpartKey("invalid SEC1 encoding"))
    }

    /// Big-endian affine coordinates `(x, y)`, each left-padded to 32 bytes.
    pub fn coordinates(&self) -> ([u8; 32], [u8; 32]) {
        let point = self.0.to_encoded_point(false);
        let bytes = point.as_bytes();

        let mut x = [0u8; 32];
        let mut y = [0u8; 32];
        x.copy_from_slice(&bytes[1..1 + COORDINATE_LEN]);
        y.copy_from_slice(&bytes[1 + COORDINATE_LEN..]);
        (x, y)
    }
}

impl fmt::Debug for DhPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let point = self.0.to_encoded_point(true);
        write!(f, "DhPublicKey({})", hex::encode(point.as_bytes()))
    }
}

/// Symmetric key material shared by the two parties of a session.
///
/// Only ever used as an AEAD key; never transmitted nor logged.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SharedSecret([u8; 32]);

impl SharedSecret {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(<redacted>)")
    }
}
