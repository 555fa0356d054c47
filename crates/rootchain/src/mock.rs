//! In-memory root chain following the contract's bookkeeping.

use crate::contract::{ChildBlock, Receipt, Result, RootChain, RootChainConfig, RootChainError};
use plasma_core::{check_membership, Address, Block, Hash, MerkleError, Transaction, MERKLE_DEPTH};
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// A root chain living in memory, for tests and local child chains.
///
/// Child blocks are stored at `interval, 2 * interval, ...`. Between two child
/// blocks there is room for `interval - 1` deposit blocks, numbered from
/// `current_child_block - interval + 1` upwards.
#[derive(Debug, Clone)]
pub struct MockRootChain {
    config: RootChainConfig,
    current_child_block: u64,
    current_deposit_block: u64,
    child_chain: HashMap<u64, ChildBlock>,
}

impl MockRootChain {
    pub fn new(config: RootChainConfig) -> Result<Self> {
        if config.child_block_interval == 0 {
            return Err(RootChainError::ZeroInterval);
        }
        Ok(Self {
            current_child_block: config.child_block_interval,
            current_deposit_block: 1,
            child_chain: HashMap::new(),
            config,
        })
    }

    pub fn config(&self) -> &RootChainConfig {
        &self.config
    }

    /// Number the next deposit will be recorded at.
    pub fn next_deposit_block(&self) -> u64 {
        self.current_child_block - self.config.child_block_interval + self.current_deposit_block
    }
}

impl RootChain for MockRootChain {
    fn submit_block(&mut self, sender: Address, root: Hash) -> Result<Receipt> {
        if sender != self.config.operator {
            return Err(RootChainError::NotOperator(sender));
        }

        let block_number = self.current_child_block;
        self.child_chain.insert(
            block_number,
            ChildBlock {
                root,
                timestamp: current_timestamp(),
            },
        );
        self.current_child_block += self.config.child_block_interval;
        self.current_deposit_block = 1;

        info!(block_number, %root, "child block submitted");
        Ok(Receipt {
            block_number,
            root,
            sender,
        })
    }

    fn deposit(&mut self, sender: Address, amount: u128) -> Result<Receipt> {
        if amount == 0 {
            return Err(RootChainError::ZeroDeposit);
        }
        if self.current_deposit_block >= self.config.child_block_interval {
            return Err(RootChainError::DepositWindowFull(self.current_child_block));
        }

        let block_number = self.next_deposit_block();
        let deposit = Transaction::deposit(sender, amount);
        let root = Block::with_transactions(vec![deposit], block_number).root()?;
        self.child_chain.insert(
            block_number,
            ChildBlock {
                root,
                timestamp: current_timestamp(),
            },
        );
        self.current_deposit_block += 1;

        debug!(block_number, %sender, amount, "deposit recorded");
        Ok(Receipt {
            block_number,
            root,
            sender,
        })
    }

    fn current_child_block(&self) -> u64 {
        self.current_child_block
    }

    fn current_deposit_block(&self) -> u64 {
        self.current_deposit_block
    }

    fn child_chain(&self, blknum: u64) -> Option<ChildBlock> {
        self.child_chain.get(&blknum).copied()
    }

    fn check_inclusion(
        &self,
        blknum: u64,
        txindex: usize,
        leaf: &Hash,
        proof: &[u8],
    ) -> Result<bool> {
        let child = self
            .child_chain
            .get(&blknum)
            .ok_or(RootChainError::UnknownBlock(blknum))?;
        if proof.len() != 32 * MERKLE_DEPTH {
            return Err(MerkleError::InvalidProofLength(proof.len()).into());
        }
        Ok(check_membership(leaf, txindex, &child.root, proof)?)
    }
}
