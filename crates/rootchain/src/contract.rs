//! The root chain contract surface, one method per contract function.

use plasma_core::{Address, BlockError, CryptoError, Hash, MerkleError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Root chain errors. A failed call leaves the contract state untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RootChainError {
    #[error("sender {0} is not the operator")]
    NotOperator(Address),

    #[error("deposit window full before child block {0}")]
    DepositWindowFull(u64),

    #[error("deposit value must be positive")]
    ZeroDeposit,

    #[error("unknown child block {0}")]
    UnknownBlock(u64),

    #[error("commitment for block {got} does not match next child block {expected}")]
    NumberMismatch { expected: u64, got: u64 },

    #[error("commitment signed by {got} instead of operator {expected}")]
    WrongSigner { expected: Address, got: Address },

    #[error("child block interval must be positive")]
    ZeroInterval,

    #[error("block error: {0}")]
    Block(#[from] BlockError),

    #[error("merkle error: {0}")]
    Merkle(#[from] MerkleError),

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),
}

pub type Result<T> = std::result::Result<T, RootChainError>;

/// Root chain deployment parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootChainConfig {
    /// Address allowed to call `submit_block`.
    pub operator: Address,
    /// Gap between child block numbers; deposits take the numbers in between.
    pub child_block_interval: u64,
}

impl Default for RootChainConfig {
    fn default() -> Self {
        Self {
            operator: Address::ZERO,
            child_block_interval: 1000,
        }
    }
}

impl RootChainConfig {
    pub fn new(operator: Address) -> Self {
        Self {
            operator,
            ..Self::default()
        }
    }
}

/// A stored commitment, `childChain[blknum]` on chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildBlock {
    pub root: Hash,
    /// Unix timestamp in seconds at which the commitment was recorded.
    pub timestamp: u64,
}

/// Outcome of a state-changing contract call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Child chain block number the call wrote.
    pub block_number: u64,
    /// Root stored at that number.
    pub root: Hash,
    pub sender: Address,
}

/// Calls exposed by the root chain contract.
pub trait RootChain {
    /// `submitBlock(root)`: operator-only, stores `root` at the current child block.
    fn submit_block(&mut self, sender: Address, root: Hash) -> Result<Receipt>;

    /// `deposit()`: records a deposit block for `amount` owned by `sender`.
    fn deposit(&mut self, sender: Address, amount: u128) -> Result<Receipt>;

    /// `currentChildBlock()`: number the next submitted block will take.
    fn current_child_block(&self) -> u64;

    /// `currentDepositBlock()`: offset of the next deposit within the interval.
    fn current_deposit_block(&self) -> u64;

    /// `getChildChain(blknum)`.
    fn child_chain(&self, blknum: u64) -> Option<ChildBlock>;

    /// `checkMembership` of `leaf` at `txindex` against the root stored at `blknum`.
    fn check_inclusion(&self, blknum: u64, txindex: usize, leaf: &Hash, proof: &[u8])
        -> Result<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RootChainConfig::default();
        assert_eq!(config.operator, Address::ZERO);
        assert_eq!(config.child_block_interval, 1000);
    }

    #[test]
    fn test_config_serde() {
        let config = RootChainConfig {
            operator: Address::from_bytes([0x42; 20]),
            child_block_interval: 50,
        };
        let json = serde_json::to_string(&config).unwrap();
        let parsed: RootChainConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_receipt_serde() {
        let receipt = Receipt {
            block_number: 1000,
            root: Hash::from_bytes([7u8; 32]),
            sender: Address::from_bytes([1u8; 20]),
        };
        let json = serde_json::to_string(&receipt).unwrap();
        assert_eq!(serde_json::from_str::<Receipt>(&json).unwrap(), receipt);
    }
}
