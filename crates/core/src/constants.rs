//! Values shared bit-for-bit with the root chain contract.

/// Depth of the transaction merkle tree committed per block (2^16 leaf slots).
pub const MERKLE_DEPTH: usize = 16;

/// Byte length of a recoverable signature: `r || s || v`.
pub const SIGNATURE_LENGTH: usize = 65;

/// The "unsigned" signature sentinel.
pub const NULL_SIGNATURE: [u8; SIGNATURE_LENGTH] = [0u8; SIGNATURE_LENGTH];

/// Padding value for unused leaf slots, `bytes32(0)` on chain.
pub const EMPTY_LEAF: [u8; 32] = [0u8; 32];

/// The zero address, used for the ETH currency and for absent outputs.
pub const NULL_ADDRESS: [u8; 20] = [0u8; 20];
