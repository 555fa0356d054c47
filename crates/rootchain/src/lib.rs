//! Root chain contract interface for a Plasma child chain.
//!
//! This crate models the on-chain side a child chain commits to:
//! - [`RootChain`]: the contract calls, as an explicit typed trait
//! - [`MockRootChain`]: an in-memory contract with the same bookkeeping
//! - [`Submitter`]: checks and publishes operator-signed block commitments
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │            Operator (plasma-operator)         │
//! │   BlockProposer → Block → BlockCommitment     │
//! └──────────────────────┬───────────────────────┘
//!                        │ number, hash, root, sig
//! ┌──────────────────────▼───────────────────────┐
//! │                  Submitter                    │
//! │  - sequence check   - operator signature      │
//! └──────────────────────┬───────────────────────┘
//!                        │ submit_block(root)
//! ┌──────────────────────▼───────────────────────┐
//! │           RootChain (contract calls)          │
//! │  childChain[blknum] = { root, timestamp }     │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use plasma_core::{Block, Keypair, Transaction};
//! use plasma_rootchain::{MockRootChain, RootChainConfig, Submitter};
//!
//! let operator = Keypair::generate();
//! let chain = MockRootChain::new(RootChainConfig::new(operator.address())).unwrap();
//! let mut submitter = Submitter::new(chain, operator.address());
//!
//! let block: Block<Transaction> = Block::with_transactions(vec![], 1000)
//!     .signed(&operator)
//!     .unwrap();
//! let receipt = submitter.submit(&block.commitment().unwrap()).unwrap();
//! assert_eq!(receipt.block_number, 1000);
//! ```

pub mod contract;
pub mod mock;
pub mod submitter;

// Re-export commonly used types
pub use contract::{
    ChildBlock, Receipt, Result, RootChain, RootChainConfig, RootChainError,
};
pub use mock::MockRootChain;
pub use submitter::Submitter;
