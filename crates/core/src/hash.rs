//! Keccak-256, the `sha3` opcode of the root chain.
//!
//! Everything committed on chain is a Keccak digest: block hashes, transaction
//! hashes, merkle nodes and the public key hash behind an address.

use crate::constants::EMPTY_LEAF;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use std::fmt;

/// Raw 32-byte digest.
pub type H256 = [u8; 32];

/// A Keccak-256 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Hash(pub H256);

impl Hash {
    pub const ZERO: Self = Self([0u8; 32]);

    /// The value of an unused merkle leaf slot, `bytes32(0)` on chain.
    pub const EMPTY_LEAF: Self = Self(EMPTY_LEAF);

    pub fn from_bytes(bytes: H256) -> Self {
        Self(bytes)
    }

    /// `None` unless `bytes` is exactly 32 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        bytes.try_into().ok().map(Self)
    }

    pub fn as_bytes(&self) -> &H256 {
        &self.0
    }

    /// Lowercase hex without a prefix.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Accepts an optional `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s.strip_prefix("0x").unwrap_or(s))?;
        Self::from_slice(&bytes).ok_or(hex::FromHexError::InvalidStringLength)
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash(0x{}..)", &self.to_hex()[..8])
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// `keccak256(data)`.
pub fn hash(data: &[u8]) -> Hash {
    Hash(Keccak256::digest(data).into())
}

/// `keccak256(parts[0] || parts[1] || ...)`, without building the concatenation.
pub fn hash_concat(parts: &[&[u8]]) -> Hash {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    Hash(hasher.finalize().into())
}

/// A merkle node over its two children, `keccak256(left || right)`.
pub fn hash_pair(left: &Hash, right: &Hash) -> Hash {
    hash_concat(&[&left.0[..], &right.0[..]])
}
