//! Operator rules for a Plasma child chain.
//!
//! This crate provides:
//! - Verification that a block was signed by the configured operator
//! - Structural block validation (deposit blocks, capacity, numbering)
//! - Block proposing and signing
//!
//! # Example
//!
//! ```rust,no_run
//! use plasma_operator::{Authority, BlockProposer, OperatorConfig};
//! use plasma_core::{Keypair, Transaction};
//!
//! let keypair = Keypair::generate();
//! let config = OperatorConfig::new(keypair.address());
//!
//! // Propose a block
//! let mut proposer = BlockProposer::new(keypair, config.clone()).unwrap();
//! let block = proposer.propose_block(Vec::<Transaction>::new()).unwrap();
//!
//! // Verify the block
//! let authority = Authority::new(config);
//! authority.verify_block(&block).unwrap();
//! ```

pub mod authority;
pub mod validator;

// Re-export commonly used types
pub use authority::{Authority, AuthorityError, BlockProposer, OperatorConfig};
pub use validator::{BlockValidator, ValidationError};
