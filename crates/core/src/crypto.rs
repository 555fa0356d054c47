//! secp256k1 recoverable signatures and Ethereum-style addresses.
//!
//! Signatures are 65 bytes laid out as `r || s || v` with `v` in `{27, 28}`,
//! the layout the root chain contract feeds into `ecrecover`. The signed
//! message is the raw 32-byte digest, without any message prefix.

use crate::constants::{NULL_ADDRESS, NULL_SIGNATURE, SIGNATURE_LENGTH};
use crate::hash::{hash, Hash};
use libsecp256k1::{Message, RecoveryId, SecretKey};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A 20-byte address derived from the public key hash.
pub type AddressBytes = [u8; 20];

/// An address on the root chain.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address(pub AddressBytes);

impl Address {
    /// The zero address (all zeros).
    pub const ZERO: Self = Self(NULL_ADDRESS);

    /// Create an address from raw bytes.
    pub fn from_bytes(bytes: AddressBytes) -> Self {
        Self(bytes)
    }

    /// Get the underlying bytes.
    pub fn as_bytes(&self) -> &AddressBytes {
        &self.0
    }

    /// Convert to a hex string (with 0x prefix).
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Parse from a hex string (with or without 0x prefix).
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|_| CryptoError::InvalidAddress)?;
        let arr: AddressBytes = bytes
            .as_slice()
            .try_into()
            .map_err(|_| CryptoError::InvalidAddress)?;
        Ok(Self(arr))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// A recoverable signature, `r || s || v`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature(pub [u8; SIGNATURE_LENGTH]);

mod signature_serde {
    use super::SIGNATURE_LENGTH;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8; SIGNATURE_LENGTH], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serde::Serialize::serialize(bytes.as_slice(), serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<[u8; SIGNATURE_LENGTH], D::Error>
    where
        D: Deserializer<'de>,
    {
        let bytes: Vec<u8> = Vec::deserialize(deserializer)?;
        bytes
            .as_slice()
            .try_into()
            .map_err(|_| serde::de::Error::custom("signature must be 65 bytes"))
    }
}

impl Serialize for Signature {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        signature_serde::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(Signature(signature_serde::deserialize(deserializer)?))
    }
}

impl Signature {
    /// The "unsigned" sentinel.
    pub const NULL: Self = Self(NULL_SIGNATURE);

    /// Create a signature from raw bytes.
    pub fn from_bytes(bytes: [u8; SIGNATURE_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Create a signature from a slice, which must be exactly 65 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let arr: [u8; SIGNATURE_LENGTH] =
            bytes.try_into().map_err(|_| CryptoError::InvalidSignature)?;
        Ok(Self(arr))
    }

    /// Get the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.0
    }

    /// Whether this is the null sentinel.
    pub fn is_null(&self) -> bool {
        self.0 == NULL_SIGNATURE
    }

    /// The recovery byte.
    pub fn v(&self) -> u8 {
        self.0[64]
    }

    /// Convert to a hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    fn recovery_id(&self) -> Result<RecoveryId, CryptoError> {
        let id = match self.v() {
            v @ (0 | 1) => v,
            v @ (27 | 28) => v - 27,
            _ => return Err(CryptoError::InvalidSignature),
        };
        RecoveryId::parse(id).map_err(|_| CryptoError::InvalidSignature)
    }
}

impl Default for Signature {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({}...)", &self.to_hex()[..16])
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Errors that can occur during cryptographic operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("invalid private key")]
    InvalidPrivateKey,
    #[error("invalid address format")]
    InvalidAddress,
}

/// An uncompressed secp256k1 public key.
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey(pub libsecp256k1::PublicKey);

impl PublicKey {
    /// Derive the address from this public key.
    /// Address is the last 20 bytes of the Keccak-256 hash of the 64-byte key.
    pub fn to_address(&self) -> Address {
        let serialized = self.0.serialize();
        let digest = hash(&serialized[1..]);
        let mut addr = [0u8; 20];
        addr.copy_from_slice(&digest.0[12..]);
        Address(addr)
    }

    /// Get the 65-byte uncompressed encoding (0x04 prefix).
    pub fn as_bytes(&self) -> [u8; 65] {
        self.0.serialize()
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", hex::encode(&self.0.serialize()[1..9]))
    }
}

/// A keypair for signing block and transaction digests.
pub struct Keypair {
    secret_key: SecretKey,
    pub public_key: PublicKey,
}

impl Keypair {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        loop {
            OsRng.fill_bytes(&mut bytes);
            // Rejects zero and values at or above the curve order.
            if let Ok(keypair) = Self::from_private_key(&bytes) {
                return keypair;
            }
        }
    }

    /// Create a keypair from a private key (32 bytes).
    pub fn from_private_key(bytes: &[u8; 32]) -> Result<Self, CryptoError> {
        let secret_key = SecretKey::parse(bytes).map_err(|_| CryptoError::InvalidPrivateKey)?;
        let public_key = PublicKey(libsecp256k1::PublicKey::from_secret_key(&secret_key));
        Ok(Self {
            secret_key,
            public_key,
        })
    }

    /// Get the private key bytes.
    pub fn private_key(&self) -> [u8; 32] {
        self.secret_key.serialize()
    }

    /// Get the address derived from the public key.
    pub fn address(&self) -> Address {
        self.public_key.to_address()
    }

    /// Sign a digest directly.
    pub fn sign_hash(&self, hash: &Hash) -> Signature {
        let message = Message::parse(hash.as_bytes());
        let (sig, recovery_id) = libsecp256k1::sign(&message, &self.secret_key);
        let mut bytes = [0u8; SIGNATURE_LENGTH];
        bytes[..64].copy_from_slice(&sig.serialize());
        bytes[64] = recovery_id.serialize() + 27;
        Signature(bytes)
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("address", &self.address())
            .finish()
    }
}

/// Sign `digest` with a raw private key.
pub fn sign(digest: &Hash, private_key: &[u8; 32]) -> Result<Signature, CryptoError> {
    Ok(Keypair::from_private_key(private_key)?.sign_hash(digest))
}

/// Recover the public key that produced `signature` over `digest`.
///
/// The null sentinel is rejected up front, so an unsigned value never
/// resolves to a key.
pub fn recover_public_key(digest: &Hash, signature: &Signature) -> Result<PublicKey, CryptoError> {
    if signature.is_null() {
        return Err(CryptoError::InvalidSignature);
    }
    let recovery_id = signature.recovery_id()?;
    let mut rs = [0u8; 64];
    rs.copy_from_slice(&signature.0[..64]);
    let sig = libsecp256k1::Signature::parse_standard(&rs)
        .map_err(|_| CryptoError::InvalidSignature)?;
    let message = Message::parse(digest.as_bytes());
    libsecp256k1::recover(&message, &sig, &recovery_id)
        .map(PublicKey)
        .map_err(|_| CryptoError::InvalidSignature)
}

/// Recover the address that produced `signature` over `digest`.
pub fn recover_signer(digest: &Hash, signature: &Signature) -> Result<Address, CryptoError> {
    recover_public_key(digest, signature).map(|key| key.to_address())
}
