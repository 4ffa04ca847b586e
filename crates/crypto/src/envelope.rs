//! Authenticated encryption of short payloads under a [`SharedSecret`].
//!
//! AES-256-GCM with a 128-bit tag and no associated data. Nonces are always
//! drawn from the operating system's CSPRNG inside [`seal`]; callers cannot
//! supply one, which rules out nonce reuse under the same key.

use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce, Tag};
use bytes::Bytes;
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

use slalink_core_types::{SealedEnvelope, NONCE_LEN, TAG_LEN};

use crate::{CryptoError, SharedSecret};

/// Encrypts `plaintext` under a fresh random nonce.
pub fn seal(secret: &SharedSecret, plaintext: &[u8]) -> Result<SealedEnvelope, CryptoError> {
    let cipher = Aes256Gcm::new(secret.as_bytes().into());

    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);

    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(Nonce::from_slice(&nonce), &[], &mut buffer)
        .map_err(|_| CryptoError::Encryption)?;

    let mut tag_bytes = [0u8; TAG_LEN];
    tag_bytes.copy_from_slice(&tag);

    Ok(SealedEnvelope {
        nonce,
        tag: tag_bytes,
        ciphertext: Bytes::from(buffer),
    })
}

/// Verifies and decrypts an envelope.
///
/// Fails with [`CryptoError::AuthenticationFailed`] if the tag does not
/// verify; no plaintext is released in that case.
pub fn open(
    secret: &SharedSecret,
    envelope: &SealedEnvelope,
) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    let cipher = Aes256Gcm::new(secret.as_bytes().into());

    let mut buffer = Zeroizing::new(envelope.ciphertext.to_vec());
    cipher
        .decrypt_in_place_detached(
            Nonce::from_slice(&envelope.nonce),
            &[],
            buffer.as_mut_slice(),
            Tag::from_slice(&envelope.tag),
        )
        .map_err(|_| CryptoError::AuthenticationFailed)?;

    Ok(buffer)
}
