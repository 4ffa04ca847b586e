//! Recursive length-prefix encoding of byte strings and lists.
//!
//! ```text
//! +------------------+---------------------------+---------------------------+
//! |      Prefix      |          Length           |          Payload          |
//! +------------------+---------------------------+---------------------------+
//! | 0x00..=0x7f      | (none, byte is its value) |                           |
//! | 0x80 + len       | (none, len <= 55)         | string bytes              |
//! | 0xb7 + len_len   | len, big-endian           | string bytes (len > 55)   |
//! | 0xc0 + len       | (none, len <= 55)         | concatenated list items   |
//! | 0xf7 + len_len   | len, big-endian           | list items (len > 55)     |
//! +------------------+---------------------------+---------------------------+
//! ```
//!
//! Decoding is strict: every value must use its shortest encoding and the
//! input must contain exactly one item.

use bytes::{BufMut, Bytes, BytesMut};

const SHORT_STRING: u8 = 0x80;
const LONG_STRING: u8 = 0xb7;
const SHORT_LIST: u8 = 0xc0;
const LONG_LIST: u8 = 0xf7;

/// Longest payload whose length fits in the prefix byte.
const MAX_SHORT_LEN: usize = 55;

/// Deepest list nesting [`decode`] accepts.
pub const MAX_DEPTH: usize = 16;

/// A decoded RLP item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Item {
    Bytes(Bytes),
    List(Vec<Item>),
}

impl Item {
    pub fn bytes(bytes: impl Into<Bytes>) -> Self {
        Self::Bytes(bytes.into())
    }

    pub fn list(items: impl IntoIterator<Item = Item>) -> Self {
        Self::List(items.into_iter().collect())
    }

    pub fn as_bytes(&self) -> Result<&Bytes, RlpError> {
        match self {
            Item::Bytes(bytes) => Ok(bytes),
            Item::List(_) => Err(RlpError::ExpectedBytes),
        }
    }

    pub fn into_list(self) -> Result<Vec<Item>, RlpError> {
        match self {
            Item::List(items) => Ok(items),
            Item::Bytes(_) => Err(RlpError::ExpectedList),
        }
    }

    pub fn encode(&self) -> Bytes {
        encode(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RlpError {
    #[error("Input ended before the item was complete")]
    Truncated,

    #[error("Item does not use its shortest encoding")]
    NonCanonical,

    #[error("Length prefix does not fit in memory")]
    LengthOverflow,

    #[error("{0} trailing bytes after the item")]
    TrailingBytes(usize),

    #[error("Expected a byte string, found a list")]
    ExpectedBytes,

    #[error("Expected a list, found a byte string")]
    ExpectedList,

    #[error("Lists nested deeper than {MAX_DEPTH} levels")]
    TooDeep,
}

/// Encodes a single item.
pub fn encode(item: &Item) -> Bytes {
    let mut out = BytesMut::new();
    encode_into(item, &mut out);
    out.freeze()
}

fn encode_into(item: &Item, out: &mut BytesMut) {
    match item {
        Item::Bytes(bytes) if bytes.len() == 1 && bytes[0] < SHORT_STRING => {
            out.put_u8(bytes[0]);
        }
        Item::Bytes(bytes) => {
            put_header(out, SHORT_STRING, LONG_STRING, bytes.len());
            out.put_slice(bytes);
        }
        Item::List(items) => {
            let mut payload = BytesMut::new();
            for item in items {
                encode_into(item, &mut payload);
            }

            put_header(out, SHORT_LIST, LONG_LIST, payload.len());
            out.put_slice(&payload);
        }
    }
}

fn put_header(out: &mut BytesMut, short: u8, long: u8, len: usize) {
    if len <= MAX_SHORT_LEN {
        out.put_u8(short + len as u8);
    } else {
        let len_bytes = len.to_be_bytes();
        let skip = len_bytes.iter().take_while(|b| **b == 0).count();
        let len_bytes = &len_bytes[skip..];

        out.put_u8(long + len_bytes.len() as u8);
        out.put_slice(len_bytes);
    }
}

/// Decodes exactly one item spanning the whole input.
///
/// Lists nested more than [`MAX_DEPTH`] levels deep are rejected.
pub fn decode(input: &[u8]) -> Result<Item, RlpError> {
    let (item, rest) = decode_item(input, 0)?;

    if !rest.is_empty() {
        return Err(RlpError::TrailingBytes(rest.len()));
    }

    Ok(item)
}

/// Decodes the first item of `input`, returning it with the unread remainder.
fn decode_item(input: &[u8], depth: usize) -> Result<(Item, &[u8]), RlpError> {
    let (&prefix, rest) = input.split_first().ok_or(RlpError::Truncated)?;

    match prefix {
        0x00..SHORT_STRING => Ok((Item::bytes(vec![prefix]), rest)),

        SHORT_STRING..=LONG_STRING => {
            let len = (prefix - SHORT_STRING) as usize;
            let (payload, rest) = split(rest, len)?;

            if len == 1 && payload[0] < SHORT_STRING {
                return Err(RlpError::NonCanonical);
            }

            Ok((Item::bytes(Bytes::copy_from_slice(payload)), rest))
        }

        0xb8..SHORT_LIST => {
            let (len, rest) = read_long_length(rest, (prefix - LONG_STRING) as usize)?;
            let (payload, rest) = split(rest, len)?;
            Ok((Item::bytes(Bytes::copy_from_slice(payload)), rest))
        }

        SHORT_LIST..=LONG_LIST => {
            let len = (prefix - SHORT_LIST) as usize;
            let (payload, rest) = split(rest, len)?;
            Ok((Item::List(decode_list_payload(payload, depth + 1)?), rest))
        }

        0xf8..=0xff => {
            let (len, rest) = read_long_length(rest, (prefix - LONG_LIST) as usize)?;
            let (payload, rest) = split(rest, len)?;
            Ok((Item::List(decode_list_payload(payload, depth + 1)?), rest))
        }
    }
}

fn decode_list_payload(mut payload: &[u8], depth: usize) -> Result<Vec<Item>, RlpError> {
    if depth > MAX_DEPTH {
        return Err(RlpError::TooDeep);
    }

    let mut items = Vec::new();

    while !payload.is_empty() {
        let (item, rest) = decode_item(payload, depth)?;
        items.push(item);
        payload = rest;
    }

    Ok(items)
}

fn read_long_length(input: &[u8], len_len: usize) -> Result<(usize, &[u8]), RlpError> {
    let (len_bytes, rest) = split(input, len_len)?;

    if len_bytes[0] == 0 {
        return Err(RlpError::NonCanonical);
    }

    if len_len > size_of::<usize>() {
        return Err(RlpError::LengthOverflow);
    }

    let len = len_bytes
        .iter()
        .fold(0usize, |acc, byte| (acc << 8) | *byte as usize);

    if len <= MAX_SHORT_LEN {
        return Err(RlpError::NonCanonical);
    }

    Ok((len, rest))
}

fn split(input: &[u8], len: usize) -> Result<(&[u8], &[u8]), RlpError> {
    if input.len() < len {
        return Err(RlpError::Truncated);
    }

    Ok(input.split_at(len))
}
