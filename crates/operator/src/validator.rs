//! Block validation rules.
//!
//! These are the structural checks a consumer applies before accepting a block
//! from the operator; signature checks live in [`crate::authority`].

use plasma_core::{Block, Hash, PlasmaTransaction, MERKLE_DEPTH};
use std::collections::HashSet;
use thiserror::Error;

/// Errors that can occur during validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("block holds {got} transactions (maximum {maximum})")]
    TooManyTransactions { maximum: usize, got: usize },

    #[error("deposit transaction in a block of {0} transactions")]
    DepositInMultiTransactionBlock(usize),

    #[error("duplicate transaction in block")]
    DuplicateTransaction,

    #[error("child block number {number} is not a positive multiple of {interval}")]
    InvalidChildBlockNumber { number: u64, interval: u64 },

    #[error("deposit block number {number} falls on a child block slot (interval {interval})")]
    InvalidDepositBlockNumber { number: u64, interval: u64 },

    #[error("child block interval must be positive")]
    ZeroInterval,
}

pub type Result<T> = std::result::Result<T, ValidationError>;

/// Block validator.
pub struct BlockValidator;

impl BlockValidator {
    /// The block must fit in the fixed-depth transaction tree.
    pub fn validate_capacity<T: PlasmaTransaction>(block: &Block<T>) -> Result<()> {
        let maximum = 1usize << MERKLE_DEPTH;
        if block.tx_count() > maximum {
            return Err(ValidationError::TooManyTransactions {
                maximum,
                got: block.tx_count(),
            });
        }
        Ok(())
    }

    /// Deposits travel alone: any block carrying a deposit must be a deposit block.
    pub fn validate_deposit_policy<T: PlasmaTransaction>(block: &Block<T>) -> Result<()> {
        let has_deposit = block.transaction_set.iter().any(|tx| tx.is_deposit());
        if has_deposit && !block.is_deposit_block() {
            return Err(ValidationError::DepositInMultiTransactionBlock(
                block.tx_count(),
            ));
        }
        Ok(())
    }

    /// No leaf may appear twice.
    pub fn validate_unique_transactions<T: PlasmaTransaction>(block: &Block<T>) -> Result<()> {
        let mut seen: HashSet<Hash> = HashSet::with_capacity(block.tx_count());
        for tx in &block.transaction_set {
            if !seen.insert(tx.merkle_hash()) {
                return Err(ValidationError::DuplicateTransaction);
            }
        }
        Ok(())
    }

    /// Child blocks sit on multiples of `interval`, deposit blocks in between.
    pub fn validate_number<T: PlasmaTransaction>(block: &Block<T>, interval: u64) -> Result<()> {
        if interval == 0 {
            return Err(ValidationError::ZeroInterval);
        }
        let on_child_slot = block.number % interval == 0;
        if block.is_deposit_block() {
            if on_child_slot {
                return Err(ValidationError::InvalidDepositBlockNumber {
                    number: block.number,
                    interval,
                });
            }
        } else if !on_child_slot || block.number == 0 {
            return Err(ValidationError::InvalidChildBlockNumber {
                number: block.number,
                interval,
            });
        }
        Ok(())
    }

    /// Full structural validation.
    pub fn validate_full<T: PlasmaTransaction>(block: &Block<T>, interval: u64) -> Result<()> {
        Self::validate_capacity(block)?;
        Self::validate_deposit_policy(block)?;
        Self::validate_unique_transactions(block)?;
        Self::validate_number(block, interval)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plasma_core::{Address, Input, Keypair, Output, Transaction};

    fn spend(keypair: &Keypair, amount: u128) -> Transaction {
        Transaction::new(
            [Input::new(1000, 0, 0), Input::null()],
            Address::ZERO,
            [Output::new(keypair.address(), amount), Output::null()],
        )
        .signed1(keypair)
    }

    #[test]
    fn test_valid_child_block() {
        let kp = Keypair::generate();
        let block = Block::with_transactions(vec![spend(&kp, 1), spend(&kp, 2)], 2000);
        assert!(BlockValidator::validate_full(&block, 1000).is_ok());
    }

    #[test]
    fn test_valid_deposit_block() {
        let deposit = Transaction::deposit(Address::from_bytes([1u8; 20]), 10);
        let block = Block::with_transactions(vec![deposit], 1001);
        assert!(BlockValidator::validate_full(&block, 1000).is_ok());
    }

    #[test]
    fn test_empty_child_block_allowed() {
        let block: Block = Block::with_transactions(vec![], 3000);
        assert!(BlockValidator::validate_full(&block, 1000).is_ok());
    }

    #[test]
    fn test_deposit_with_other_transactions_rejected() {
        let kp = Keypair::generate();
        let deposit = Transaction::deposit(kp.address(), 10);
        let block = Block::with_transactions(vec![deposit, spend(&kp, 1)], 2000);
        assert_eq!(
            BlockValidator::validate_deposit_policy(&block),
            Err(ValidationError::DepositInMultiTransactionBlock(2))
        );
    }

    #[test]
    fn test_duplicate_transaction_rejected() {
        let kp = Keypair::generate();
        let tx = spend(&kp, 1);
        let block = Block::with_transactions(vec![tx.clone(), tx], 1000);
        assert_eq!(
            BlockValidator::validate_unique_transactions(&block),
            Err(ValidationError::DuplicateTransaction)
        );
    }

    #[test]
    fn test_child_block_off_slot_rejected() {
        let block: Block = Block::with_transactions(vec![], 1500);
        assert_eq!(
            BlockValidator::validate_number(&block, 1000),
            Err(ValidationError::InvalidChildBlockNumber {
                number: 1500,
                interval: 1000
            })
        );

        let genesis: Block = Block::new();
        assert!(BlockValidator::validate_number(&genesis, 1000).is_err());
    }

    #[test]
    fn test_deposit_block_on_child_slot_rejected() {
        let deposit = Transaction::deposit(Address::ZERO, 1);
        let block = Block::with_transactions(vec![deposit], 2000);
        assert_eq!(
            BlockValidator::validate_number(&block, 1000),
            Err(ValidationError::InvalidDepositBlockNumber {
                number: 2000,
                interval: 1000
            })
        );
    }

    #[test]
    fn test_zero_interval_rejected() {
        let block: Block = Block::with_transactions(vec![], 1000);
        assert_eq!(
            BlockValidator::validate_number(&block, 0),
            Err(ValidationError::ZeroInterval)
        );
    }

    #[test]
    fn test_capacity_limit() {
        let tx = Transaction::deposit(Address::ZERO, 1);
        let block = Block::with_transactions(vec![tx; (1 << MERKLE_DEPTH) + 1], 1000);
        assert!(matches!(
            BlockValidator::validate_capacity(&block),
            Err(ValidationError::TooManyTransactions { .. })
        ));
    }
}
