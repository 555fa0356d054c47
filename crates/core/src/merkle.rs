//! Fixed-depth merkle tree over pre-hashed transaction leaves.
//!
//! The tree always has `2^depth` leaf slots. Slots past the supplied leaves are
//! filled with [`Hash::EMPTY_LEAF`] (`bytes32(0)`), and every internal node is
//! `keccak256(left || right)`. Proofs are the sibling hashes from the leaf level
//! upwards, concatenated into `32 * depth` bytes: the layout the root chain's
//! `checkMembership` walks.

use crate::constants::MERKLE_DEPTH;
use crate::hash::{hash, hash_pair, Hash};
use rayon::prelude::*;
use thiserror::Error;

/// Largest depth a tree may be built with.
pub const MAX_DEPTH: usize = 24;

/// Levels at least this wide are combined in parallel.
pub const PARALLEL_THRESHOLD: usize = 1 << 12;

/// Errors that can occur while building or proving against a tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MerkleError {
    #[error("{leaves} leaves exceed the tree capacity of {capacity}")]
    TreeDepthExceeded { capacity: usize, leaves: usize },
    #[error("depth {0} exceeds the maximum of {max}", max = MAX_DEPTH)]
    DepthTooLarge(usize),
    #[error("leaf index {index} out of range for {capacity} slots")]
    IndexOutOfRange { index: usize, capacity: usize },
    #[error("leaf is not a member of the tree")]
    MemberNotFound,
    #[error("proof length must be a non-zero multiple of 32 (got {0})")]
    InvalidProofLength(usize),
}

pub type Result<T> = std::result::Result<T, MerkleError>;

/// Number of leaf slots addressable by `depth` levels of siblings.
fn slots(depth: usize) -> usize {
    u32::try_from(depth)
        .ok()
        .and_then(|d| 1usize.checked_shl(d))
        .unwrap_or(usize::MAX)
}

/// Whether `index` names a slot of a tree `depth` levels deep.
fn index_fits(index: usize, depth: usize) -> bool {
    u32::try_from(depth)
        .ok()
        .and_then(|d| index.checked_shr(d))
        .unwrap_or(0)
        == 0
}

fn next_level(level: &[Hash]) -> Vec<Hash> {
    if level.len() >= PARALLEL_THRESHOLD {
        level
            .par_chunks(2)
            .map(|pair| hash_pair(&pair[0], &pair[1]))
            .collect()
    } else {
        level
            .chunks(2)
            .map(|pair| hash_pair(&pair[0], &pair[1]))
            .collect()
    }
}

/// A binary merkle tree with a fixed number of leaf slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedMerkle {
    depth: usize,
    /// Number of leaves supplied by the caller (the rest is padding).
    leaf_count: usize,
    /// All nodes, level by level (padded leaves first, root last).
    levels: Vec<Vec<Hash>>,
}

/// Inclusion proof for a single leaf slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleProof {
    /// Slot index of the leaf.
    pub index: usize,
    /// The leaf being proven.
    pub leaf: Hash,
    /// Sibling hashes from the leaf level up to just below the root.
    pub siblings: Vec<Hash>,
}

impl FixedMerkle {
    /// Build a tree of `depth` over leaves that are already hashed.
    pub fn new(depth: usize, leaves: &[Hash]) -> Result<Self> {
        if depth > MAX_DEPTH {
            return Err(MerkleError::DepthTooLarge(depth));
        }
        let capacity = 1usize << depth;
        if leaves.len() > capacity {
            return Err(MerkleError::TreeDepthExceeded {
                capacity,
                leaves: leaves.len(),
            });
        }

        let mut padded = Vec::with_capacity(capacity);
        padded.extend_from_slice(leaves);
        padded.resize(capacity, Hash::EMPTY_LEAF);

        let mut levels = Vec::with_capacity(depth + 1);
        levels.push(padded);
        for _ in 0..depth {
            let next = next_level(levels[levels.len() - 1].as_slice());
            levels.push(next);
        }

        Ok(Self {
            depth,
            leaf_count: leaves.len(),
            levels,
        })
    }

    /// Build a tree of `depth` over raw leaves, hashing each one first.
    pub fn from_data<D: AsRef<[u8]>>(depth: usize, data: &[D]) -> Result<Self> {
        let leaves: Vec<Hash> = data.iter().map(|d| hash(d.as_ref())).collect();
        Self::new(depth, &leaves)
    }

    /// Build a tree with the block depth.
    pub fn with_block_depth(leaves: &[Hash]) -> Result<Self> {
        Self::new(MERKLE_DEPTH, leaves)
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Total leaf slots, `2^depth`.
    pub fn capacity(&self) -> usize {
        self.levels[0].len()
    }

    /// Number of leaves supplied at construction.
    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    /// All leaf slots, padding included.
    pub fn leaves(&self) -> &[Hash] {
        &self.levels[0]
    }

    /// Get the root of the merkle tree.
    pub fn root(&self) -> Hash {
        self.levels[self.depth][0]
    }

    /// Build the inclusion proof for the slot at `index`.
    pub fn create_membership_proof(&self, index: usize) -> Result<MerkleProof> {
        let capacity = self.capacity();
        if index >= capacity {
            return Err(MerkleError::IndexOutOfRange { index, capacity });
        }

        let mut siblings = Vec::with_capacity(self.depth);
        let mut idx = index;
        for level in &self.levels[..self.depth] {
            siblings.push(level[idx ^ 1]);
            idx /= 2;
        }

        Ok(MerkleProof {
            index,
            leaf: self.levels[0][index],
            siblings,
        })
    }

    /// Build the inclusion proof for the first supplied leaf equal to `leaf`.
    pub fn prove_leaf(&self, leaf: &Hash) -> Result<MerkleProof> {
        let index = self.levels[0][..self.leaf_count]
            .iter()
            .position(|l| l == leaf)
            .ok_or(MerkleError::MemberNotFound)?;
        self.create_membership_proof(index)
    }

    /// Whether `proof` is valid against this tree's root.
    pub fn verify_proof(&self, proof: &MerkleProof) -> bool {
        proof.siblings.len() == self.depth && proof.verify(&self.root())
    }
}

impl MerkleProof {
    /// Concatenated sibling hashes, the on-chain proof format.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.siblings.iter().flat_map(|s| s.0).collect()
    }

    /// Recompute the root from the leaf and siblings.
    pub fn compute_root(&self) -> Hash {
        let mut node = self.leaf;
        let mut idx = self.index;
        for sibling in &self.siblings {
            node = if idx % 2 == 0 {
                hash_pair(&node, sibling)
            } else {
                hash_pair(sibling, &node)
            };
            idx /= 2;
        }
        node
    }

    /// Verify this proof against a given root.
    ///
    /// An index with bits above the proof depth never verifies, since those
    /// bits would otherwise be ignored and alias a lower slot.
    pub fn verify(&self, root: &Hash) -> bool {
        index_fits(self.index, self.siblings.len()) && self.compute_root() == *root
    }
}

/// Check a raw proof the way the root chain contract does.
///
/// `proof` is `32 * depth` bytes of siblings, leaf level first. An empty proof
/// is rejected, as is an index outside the `2^depth` slots the proof covers.
pub fn check_membership(leaf: &Hash, index: usize, root: &Hash, proof: &[u8]) -> Result<bool> {
    if proof.is_empty() || proof.len() % 32 != 0 {
        return Err(MerkleError::InvalidProofLength(proof.len()));
    }
    let depth = proof.len() / 32;
    if !index_fits(index, depth) {
        return Err(MerkleError::IndexOutOfRange {
            index,
            capacity: slots(depth),
        });
    }
    let siblings = proof
        .chunks_exact(32)
        .filter_map(Hash::from_slice)
        .collect();
    let proof = MerkleProof {
        index,
        leaf: *leaf,
        siblings,
    };
    Ok(proof.verify(root))
}
