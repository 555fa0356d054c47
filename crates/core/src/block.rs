//! Child chain blocks and the commitment published to the root chain.

use crate::crypto::{recover_signer, Address, CryptoError, Keypair, Signature};
use crate::encoding::{list_fields, list_items, single_item, EncodingError};
use crate::hash::{hash, Hash};
use crate::merkle::{FixedMerkle, MerkleError};
use crate::transaction::{PlasmaTransaction, Transaction};
use rlp::{Decodable, RlpStream};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while deriving or signing a block.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockError {
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("encoding error: {0}")]
    Encoding(#[from] EncodingError),

    #[error("merkle error: {0}")]
    Merkle(#[from] MerkleError),
}

pub type Result<T> = std::result::Result<T, BlockError>;

/// What gets handed to the root chain submitter for one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockCommitment {
    pub number: u64,
    pub hash: Hash,
    pub root: Hash,
    pub sig: Signature,
}

/// An ordered batch of transactions with a block number and operator signature.
///
/// Everything except the three stored fields is derived on demand. The
/// encoding, and so the hash, never covers `sig`; adding transactions after
/// signing leaves a stale signature behind and the block must be re-signed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block<T = Transaction> {
    /// Transactions in leaf order.
    pub transaction_set: Vec<T>,
    /// Block number assigned by the operator.
    pub number: u64,
    /// Operator signature over `hash()`, or the null signature.
    pub sig: Signature,
}

impl<T> Default for Block<T> {
    fn default() -> Self {
        Self {
            transaction_set: Vec::new(),
            number: 0,
            sig: Signature::NULL,
        }
    }
}

impl<T: PlasmaTransaction> Block<T> {
    /// Create an empty, unsigned block numbered 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an unsigned block.
    pub fn with_transactions(transaction_set: Vec<T>, number: u64) -> Self {
        Self {
            transaction_set,
            number,
            sig: Signature::NULL,
        }
    }

    /// Append a transaction. Invalidates any existing signature.
    pub fn add_transaction(&mut self, tx: T) {
        self.transaction_set.push(tx);
    }

    /// Get the number of transactions in this block.
    pub fn tx_count(&self) -> usize {
        self.transaction_set.len()
    }

    fn encoded_transactions(&self) -> Result<Vec<Vec<u8>>> {
        let mut txs = Vec::with_capacity(self.transaction_set.len());
        for tx in &self.transaction_set {
            let item = tx.encode()?;
            // Anything other than exactly one item would shift every later field.
            single_item(&item)?;
            txs.push(item);
        }
        Ok(txs)
    }

    fn append_unsigned(&self, s: &mut RlpStream, txs: &[Vec<u8>]) {
        s.begin_list(txs.len());
        for item in txs {
            s.append_raw(item, 1);
        }
        s.append(&self.number);
    }

    /// Canonical encoding of `[transaction_set, number]`.
    pub fn encoded(&self) -> Result<Vec<u8>> {
        let txs = self.encoded_transactions()?;
        let mut s = RlpStream::new_list(2);
        self.append_unsigned(&mut s, &txs);
        Ok(s.out().to_vec())
    }

    /// Canonical encoding of `[transaction_set, number, sig]`, for watchers.
    pub fn encode_signed(&self) -> Result<Vec<u8>> {
        let txs = self.encoded_transactions()?;
        let mut s = RlpStream::new_list(3);
        self.append_unsigned(&mut s, &txs);
        s.append(&self.sig);
        Ok(s.out().to_vec())
    }

    /// Keccak-256 of the canonical encoding.
    pub fn hash(&self) -> Result<Hash> {
        Ok(hash(&self.encoded()?))
    }

    /// Sign the block with the operator's keypair.
    pub fn sign(&mut self, keypair: &Keypair) -> Result<Signature> {
        let hash = self.hash()?;
        self.sig = keypair.sign_hash(&hash);
        debug!(
            number = self.number,
            txs = self.transaction_set.len(),
            %hash,
            "signed block"
        );
        Ok(self.sig)
    }

    /// Create a signed block.
    pub fn signed(mut self, keypair: &Keypair) -> Result<Self> {
        self.sign(keypair)?;
        Ok(self)
    }

    /// Whether a signature other than the null sentinel is attached.
    pub fn is_signed(&self) -> bool {
        !self.sig.is_null()
    }

    /// The address that signed this block.
    ///
    /// An unsigned block fails with [`CryptoError::InvalidSignature`].
    pub fn signer(&self) -> Result<Address> {
        Ok(recover_signer(&self.hash()?, &self.sig)?)
    }

    /// Merkle tree over the transactions' leaf hashes.
    pub fn merklized_transaction_set(&self) -> Result<FixedMerkle> {
        let leaves: Vec<Hash> = self
            .transaction_set
            .iter()
            .map(|tx| tx.merkle_hash())
            .collect();
        Ok(FixedMerkle::with_block_depth(&leaves)?)
    }

    /// Root of the transaction tree.
    pub fn root(&self) -> Result<Hash> {
        Ok(self.merklized_transaction_set()?.root())
    }

    /// A block holding exactly one deposit transaction.
    pub fn is_deposit_block(&self) -> bool {
        matches!(self.transaction_set.as_slice(), [tx] if tx.is_deposit())
    }

    /// The values published for this block.
    pub fn commitment(&self) -> Result<BlockCommitment> {
        Ok(BlockCommitment {
            number: self.number,
            hash: self.hash()?,
            root: self.root()?,
            sig: self.sig,
        })
    }
}

impl<T: PlasmaTransaction + Decodable> Block<T> {
    fn decode_fields(bytes: &[u8], count: usize) -> std::result::Result<Self, EncodingError> {
        let fields = list_fields(&single_item(bytes)?, count)?;
        let transaction_set = list_items(&fields[0])?
            .iter()
            .map(|tx| tx.as_val())
            .collect::<std::result::Result<Vec<T>, _>>()?;
        Ok(Self {
            transaction_set,
            number: fields[1].as_val()?,
            sig: match fields.get(2) {
                Some(sig) => sig.as_val()?,
                None => Signature::NULL,
            },
        })
    }

    /// Read back the output of [`Block::encoded`]. The result is unsigned.
    pub fn decode_unsigned(bytes: &[u8]) -> Result<Self> {
        Ok(Self::decode_fields(bytes, 2)?)
    }

    /// Read back the output of [`Block::encode_signed`].
    pub fn decode_signed(bytes: &[u8]) -> Result<Self> {
        Ok(Self::decode_fields(bytes, 3)?)
    }
}
