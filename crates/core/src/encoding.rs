//! Canonical RLP encoding of the core types, on top of the `rlp` crate.
//!
//! Hashes, addresses and signatures encode as fixed-width byte strings.
//! Decoding a buffer is strict: it must hold exactly one item, and every list
//! must be made of whole items.

use crate::crypto::{Address, Signature};
use crate::hash::Hash;
use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use std::cmp::Ordering;
use thiserror::Error;

/// Errors raised while producing or reading canonical encodings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    #[error("malformed rlp: {0}")]
    Rlp(#[from] DecoderError),
    #[error("{0} trailing bytes after item")]
    TrailingBytes(usize),
}

pub type Result<T> = std::result::Result<T, EncodingError>;

fn decode_fixed<const N: usize>(rlp: &Rlp<'_>) -> std::result::Result<[u8; N], DecoderError> {
    rlp.decoder()
        .decode_value(|bytes| match bytes.len().cmp(&N) {
            Ordering::Less => Err(DecoderError::RlpIsTooShort),
            Ordering::Greater => Err(DecoderError::RlpIsTooBig),
            Ordering::Equal => {
                let mut out = [0u8; N];
                out.copy_from_slice(bytes);
                Ok(out)
            }
        })
}

impl Encodable for Hash {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.encoder().encode_value(self.as_bytes());
    }
}

impl Decodable for Hash {
    fn decode(rlp: &Rlp<'_>) -> std::result::Result<Self, DecoderError> {
        decode_fixed(rlp).map(Hash)
    }
}

impl Encodable for Address {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.encoder().encode_value(self.as_bytes());
    }
}

impl Decodable for Address {
    fn decode(rlp: &Rlp<'_>) -> std::result::Result<Self, DecoderError> {
        decode_fixed(rlp).map(Address)
    }
}

impl Encodable for Signature {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.encoder().encode_value(self.as_bytes());
    }
}

impl Decodable for Signature {
    fn decode(rlp: &Rlp<'_>) -> std::result::Result<Self, DecoderError> {
        decode_fixed(rlp).map(Signature)
    }
}

/// View `bytes` as exactly one RLP item.
pub fn single_item(bytes: &[u8]) -> Result<Rlp<'_>> {
    let rlp = Rlp::new(bytes);
    let total = rlp.payload_info()?.total();
    match total.cmp(&bytes.len()) {
        Ordering::Equal => Ok(rlp),
        Ordering::Less => Err(EncodingError::TrailingBytes(bytes.len() - total)),
        Ordering::Greater => Err(DecoderError::RlpIsTooShort.into()),
    }
}

/// The items of a list. A payload that does not split into whole items is
/// rejected rather than silently cut short.
pub fn list_items<'a>(rlp: &Rlp<'a>) -> std::result::Result<Vec<Rlp<'a>>, DecoderError> {
    if !rlp.is_list() {
        return Err(DecoderError::RlpExpectedToBeList);
    }
    let items: Vec<Rlp<'a>> = rlp.iter().collect();
    let consumed: usize = items.iter().map(|item| item.as_raw().len()).sum();
    if consumed != rlp.payload_info()?.value_len {
        return Err(DecoderError::RlpInconsistentLengthAndData);
    }
    Ok(items)
}

/// The items of a list that must have exactly `count` entries.
pub fn list_fields<'a>(
    rlp: &Rlp<'a>,
    count: usize,
) -> std::result::Result<Vec<Rlp<'a>>, DecoderError> {
    let items = list_items(rlp)?;
    if items.len() != count {
        return Err(DecoderError::RlpIncorrectListLen);
    }
    Ok(items)
}

/// Decode a buffer holding exactly one `T`.
pub fn decode_exact<T: Decodable>(bytes: &[u8]) -> Result<T> {
    Ok(single_item(bytes)?.as_val()?)
}
