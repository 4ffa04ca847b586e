use bytes::Bytes;

use slalink_core_types::{ConnectionPayload, SealedEnvelope, NONCE_LEN, TAG_LEN};

use crate::rlp::{self, Item};
use crate::{Codec, CodecError};

/// Codec for the messages exchanged during the handshake.
///
/// - A [`SealedEnvelope`] travels as `rlp([nonce, tag, ciphertext])`.
/// - A [`ConnectionPayload`] is sealed as `rlp([host_utf8, port_be16])`.
#[derive(Copy, Clone, Debug, Default)]
pub struct WireCodec;

impl Codec<SealedEnvelope> for WireCodec {
    type Error = CodecError;

    fn decode(&self, bytes: Bytes) -> Result<SealedEnvelope, Self::Error> {
        let [nonce, tag, ciphertext] = decode_triple(&bytes)?;

        let nonce: [u8; NONCE_LEN] = nonce.as_ref().try_into().map_err(|_| {
            CodecError::InvalidPayload(format!(
                "nonce must be {NONCE_LEN} bytes, got {}",
                nonce.len()
            ))
        })?;

        let tag: [u8; TAG_LEN] = tag.as_ref().try_into().map_err(|_| {
            CodecError::InvalidPayload(format!("tag must be {TAG_LEN} bytes, got {}", tag.len()))
        })?;

        Ok(SealedEnvelope {
            nonce,
            tag,
            ciphertext,
        })
    }

    fn encode(&self, envelope: &SealedEnvelope) -> Result<Bytes, Self::Error> {
        Ok(rlp::encode(&Item::list([
            Item::bytes(Bytes::copy_from_slice(&envelope.nonce)),
            Item::bytes(Bytes::copy_from_slice(&envelope.tag)),
            Item::bytes(envelope.ciphertext.clone()),
        ])))
    }
}

fn decode_triple(bytes: &[u8]) -> Result<[Bytes; 3], CodecError> {
    let items = rlp::decode(bytes)?.into_list()?;

    let count = items.len();
    let [a, b, c]: [Item; 3] = items.try_into().map_err(|_| {
        CodecError::InvalidPayload(format!("expected 3 envelope fields, got {count}"))
    })?;

    Ok([
        a.as_bytes()?.clone(),
        b.as_bytes()?.clone(),
        c.as_bytes()?.clone(),
    ])
}

impl Codec<ConnectionPayload> for WireCodec {
    type Error = CodecError;

    fn decode(&self, bytes: Bytes) -> Result<ConnectionPayload, Self::Error> {
        let items = rlp::decode(&bytes)?.into_list()?;

        let [host, port] = items.as_slice() else {
            return Err(CodecError::InvalidPayload(format!(
                "expected 2 payload fields, got {}",
                items.len()
            )));
        };

        let host = std::str::from_utf8(host.as_bytes()?)
            .map_err(|e| CodecError::InvalidPayload(format!("host is not valid UTF-8: {e}")))?;

        let port: [u8; 2] = port.as_bytes()?.as_ref().try_into().map_err(|_| {
            CodecError::InvalidPayload("port must be exactly 2 bytes".to_string())
        })?;

        Ok(ConnectionPayload::new(host, u16::from_be_bytes(port)))
    }

    fn encode(&self, payload: &ConnectionPayload) -> Result<Bytes, Self::Error> {
        Ok(rlp::encode(&Item::list([
            Item::bytes(Bytes::copy_from_slice(payload.host_address.as_bytes())),
            Item::bytes(Bytes::copy_from_slice(&payload.host_port.to_be_bytes())),
        ])))
    }
}
