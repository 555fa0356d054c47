//! Block commitment primitives for a Plasma child chain.
//!
//! This crate provides everything needed to turn a batch of transactions into
//! the commitment the root chain contract stores and verifies against:
//! - Keccak-256 hashing and secp256k1 recoverable signatures
//! - Canonical RLP encoding
//! - A fixed-depth merkle tree with contract-compatible inclusion proofs
//! - Transactions and blocks

pub mod block;
pub mod constants;
pub mod crypto;
pub mod encoding;
pub mod hash;
pub mod merkle;
pub mod transaction;

// Re-export commonly used types at the crate root
pub use block::{Block, BlockCommitment, BlockError};
pub use constants::{EMPTY_LEAF, MERKLE_DEPTH, NULL_SIGNATURE};
pub use crypto::{recover_signer, sign, Address, CryptoError, Keypair, PublicKey, Signature};
pub use encoding::{decode_exact, EncodingError};
pub use hash::{hash, hash_concat, hash_pair, Hash, H256};
pub use merkle::{check_membership, FixedMerkle, MerkleError, MerkleProof};
pub use transaction::{Input, Output, PlasmaTransaction, Transaction};
