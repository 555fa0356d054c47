//! Operator authority: who may sign child chain blocks, and how they are produced.
//!
//! A child chain has a single operator. Consumers accept a block only if it
//! recovers to the configured operator address; the operator itself uses a
//! [`BlockProposer`] to number, sign and commit blocks.

use crate::validator::{BlockValidator, ValidationError};
use plasma_core::{Address, Block, BlockCommitment, BlockError, Keypair, PlasmaTransaction};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Errors that can occur during authority checks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthorityError {
    #[error("block {0} is not signed")]
    UnsignedBlock(u64),

    #[error("block signed by {got} instead of operator {expected}")]
    WrongSigner { expected: Address, got: Address },

    #[error("proposer {got} is not the configured operator {expected}")]
    NotOperator { expected: Address, got: Address },

    #[error("transaction is not a deposit")]
    NotADeposit,

    #[error("block error: {0}")]
    Block(#[from] BlockError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

pub type Result<T> = std::result::Result<T, AuthorityError>;

/// Operator configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorConfig {
    /// The only address allowed to sign blocks.
    pub operator: Address,
    /// Gap between consecutive child block numbers; deposit blocks fill the gap.
    pub child_block_interval: u64,
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self {
            operator: Address::ZERO,
            child_block_interval: 1000,
        }
    }
}

impl OperatorConfig {
    /// Create a new configuration for the given operator.
    pub fn new(operator: Address) -> Self {
        Self {
            operator,
            ..Self::default()
        }
    }

    /// Check if an address is the operator.
    pub fn is_operator(&self, address: &Address) -> bool {
        self.operator == *address
    }
}

/// Verifies blocks against the configured operator.
pub struct Authority {
    config: OperatorConfig,
}

impl Authority {
    /// Create a new Authority with the given configuration.
    pub fn new(config: OperatorConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &OperatorConfig {
        &self.config
    }

    /// Verify the block was signed by the operator.
    pub fn verify_block_signature<T: PlasmaTransaction>(&self, block: &Block<T>) -> Result<()> {
        if !block.is_signed() {
            warn!(number = block.number, "rejecting unsigned block");
            return Err(AuthorityError::UnsignedBlock(block.number));
        }

        let signer = block.signer().map_err(|e| {
            warn!(number = block.number, error = %e, "rejecting block with unrecoverable signature");
            e
        })?;

        if !self.config.is_operator(&signer) {
            warn!(number = block.number, %signer, "rejecting block from non-operator");
            return Err(AuthorityError::WrongSigner {
                expected: self.config.operator,
                got: signer,
            });
        }

        Ok(())
    }

    /// Verify all operator rules for a block.
    pub fn verify_block<T: PlasmaTransaction>(&self, block: &Block<T>) -> Result<()> {
        BlockValidator::validate_full(block, self.config.child_block_interval)?;
        self.verify_block_signature(block)?;
        Ok(())
    }
}

/// Block producer for the operator.
pub struct BlockProposer {
    /// Operator keypair for signing blocks.
    keypair: Keypair,
    /// Operator configuration.
    config: OperatorConfig,
    /// Number the next child block will carry.
    next_child_block: u64,
}

impl BlockProposer {
    /// Create a new block proposer. The keypair must belong to the configured operator.
    pub fn new(keypair: Keypair, config: OperatorConfig) -> Result<Self> {
        if !config.is_operator(&keypair.address()) {
            return Err(AuthorityError::NotOperator {
                expected: config.operator,
                got: keypair.address(),
            });
        }
        if config.child_block_interval == 0 {
            return Err(ValidationError::ZeroInterval.into());
        }
        let next_child_block = config.child_block_interval;
        Ok(Self {
            keypair,
            config,
            next_child_block,
        })
    }

    /// Get the proposer's address.
    pub fn address(&self) -> Address {
        self.keypair.address()
    }

    /// Number the next proposed child block will carry.
    pub fn next_child_block(&self) -> u64 {
        self.next_child_block
    }

    fn finish<T: PlasmaTransaction>(&self, block: Block<T>) -> Result<Block<T>> {
        BlockValidator::validate_full(&block, self.config.child_block_interval)?;
        Ok(block.signed(&self.keypair)?)
    }

    /// Propose the next child block (creates, validates and signs it).
    pub fn propose_block<T: PlasmaTransaction>(
        &mut self,
        transactions: Vec<T>,
    ) -> Result<Block<T>> {
        let block = self.finish(Block::with_transactions(
            transactions,
            self.next_child_block,
        ))?;
        info!(
            number = block.number,
            txs = block.tx_count(),
            "proposed child block"
        );
        self.next_child_block += self.config.child_block_interval;
        Ok(block)
    }

    /// Wrap a deposit observed on the root chain at `number` into a signed block.
    pub fn deposit_block<T: PlasmaTransaction>(&self, deposit: T, number: u64) -> Result<Block<T>> {
        if !deposit.is_deposit() {
            return Err(AuthorityError::NotADeposit);
        }
        let block = self.finish(Block::with_transactions(vec![deposit], number))?;
        info!(number, "created deposit block");
        Ok(block)
    }

    /// Propose the next child block and return its published commitment.
    pub fn commit<T: PlasmaTransaction>(
        &mut self,
        transactions: Vec<T>,
    ) -> Result<(Block<T>, BlockCommitment)> {
        let block = self.propose_block(transactions)?;
        let commitment = block.commitment()?;
        Ok((block, commitment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plasma_core::{CryptoError, Input, Output, Transaction};

    fn spend(keypair: &Keypair, amount: u128) -> Transaction {
        Transaction::new(
            [Input::new(1000, 0, 0), Input::null()],
            Address::ZERO,
            [Output::new(keypair.address(), amount), Output::null()],
        )
        .signed1(keypair)
    }

    fn operator() -> (Keypair, OperatorConfig) {
        let keypair = Keypair::generate();
        let config = OperatorConfig::new(keypair.address());
        (keypair, config)
    }

    #[test]
    fn test_config_defaults() {
        let config = OperatorConfig::default();
        assert_eq!(config.child_block_interval, 1000);
        assert_eq!(config.operator, Address::ZERO);
    }

    #[test]
    fn test_config_serde() {
        let config = OperatorConfig::new(Address::from_bytes([3u8; 20]));
        let json = serde_json::to_string(&config).unwrap();
        let parsed: OperatorConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_operator_signed_block_accepted() {
        let (keypair, config) = operator();
        let authority = Authority::new(config);
        let block = Block::with_transactions(vec![spend(&keypair, 1)], 1000)
            .signed(&keypair)
            .unwrap();
        assert!(authority.verify_block(&block).is_ok());
    }

    #[test]
    fn test_unsigned_block_rejected() {
        let (_, config) = operator();
        let authority = Authority::new(config);
        let block: Block = Block::with_transactions(vec![], 1000);
        assert_eq!(
            authority.verify_block_signature(&block),
            Err(AuthorityError::UnsignedBlock(1000))
        );
    }

    #[test]
    fn test_wrong_signer_rejected() {
        let (_, config) = operator();
        let intruder = Keypair::generate();
        let authority = Authority::new(config.clone());
        let block = Block::<Transaction>::with_transactions(vec![], 1000)
            .signed(&intruder)
            .unwrap();
        assert_eq!(
            authority.verify_block_signature(&block),
            Err(AuthorityError::WrongSigner {
                expected: config.operator,
                got: intruder.address()
            })
        );
    }

    #[test]
    fn test_malformed_signature_rejected() {
        let (keypair, config) = operator();
        let authority = Authority::new(config);
        let mut block = Block::<Transaction>::with_transactions(vec![], 1000)
            .signed(&keypair)
            .unwrap();
        block.sig.0[64] = 5;
        assert_eq!(
            authority.verify_block_signature(&block),
            Err(AuthorityError::Block(BlockError::Crypto(
                CryptoError::InvalidSignature
            )))
        );
    }

    #[test]
    fn test_proposer_must_be_operator() {
        let (_, config) = operator();
        assert!(matches!(
            BlockProposer::new(Keypair::generate(), config),
            Err(AuthorityError::NotOperator { .. })
        ));
    }

    #[test]
    fn test_proposer_numbers_blocks() {
        let (keypair, config) = operator();
        let user = Keypair::generate();
        let mut proposer = BlockProposer::new(keypair, config.clone()).unwrap();

        let first = proposer.propose_block(vec![spend(&user, 1)]).unwrap();
        let second = proposer.propose_block(Vec::<Transaction>::new()).unwrap();

        assert_eq!(first.number, 1000);
        assert_eq!(second.number, 2000);
        assert_eq!(proposer.next_child_block(), 3000);
        assert_eq!(first.signer().unwrap(), config.operator);

        let authority = Authority::new(config);
        assert!(authority.verify_block(&first).is_ok());
        assert!(authority.verify_block(&second).is_ok());
    }

    #[test]
    fn test_rejected_proposal_keeps_number() {
        let (keypair, config) = operator();
        let mut proposer = BlockProposer::new(keypair, config).unwrap();
        let deposit = Transaction::deposit(Address::ZERO, 1);
        let result = proposer.propose_block(vec![deposit.clone(), deposit]);
        assert!(matches!(
            result,
            Err(AuthorityError::Validation(
                ValidationError::DepositInMultiTransactionBlock(2)
            ))
        ));
        assert_eq!(proposer.next_child_block(), 1000);
    }

    #[test]
    fn test_deposit_block() {
        let (keypair, config) = operator();
        let proposer = BlockProposer::new(keypair, config).unwrap();
        let deposit = Transaction::deposit(Address::from_bytes([4u8; 20]), 50);

        let block = proposer.deposit_block(deposit, 1001).unwrap();
        assert!(block.is_deposit_block());
        assert_eq!(block.signer().unwrap(), proposer.address());

        let user = Keypair::generate();
        assert_eq!(
            proposer.deposit_block(spend(&user, 1), 1002).unwrap_err(),
            AuthorityError::NotADeposit
        );
    }

    #[test]
    fn test_commit() {
        let (keypair, config) = operator();
        let user = Keypair::generate();
        let mut proposer = BlockProposer::new(keypair, config).unwrap();
        let (block, commitment) = proposer.commit(vec![spend(&user, 3)]).unwrap();
        assert_eq!(commitment.number, 1000);
        assert_eq!(commitment.root, block.root().unwrap());
        assert_eq!(commitment.hash, block.hash().unwrap());
    }
}
