//! Publishing signed block commitments to the root chain.

use crate::contract::{Receipt, Result, RootChain, RootChainError};
use plasma_core::{recover_signer, Address, BlockCommitment};
use tracing::{info, warn};

/// Submits the operator's commitments, refusing anything it would regret publishing.
pub struct Submitter<R: RootChain> {
    chain: R,
    operator: Address,
}

impl<R: RootChain> Submitter<R> {
    pub fn new(chain: R, operator: Address) -> Self {
        Self { chain, operator }
    }

    pub fn chain(&self) -> &R {
        &self.chain
    }

    pub fn chain_mut(&mut self) -> &mut R {
        &mut self.chain
    }

    /// Publish `commitment.root` as the next child block.
    ///
    /// The commitment must carry the number the contract will assign and an
    /// operator signature over its hash.
    pub fn submit(&mut self, commitment: &BlockCommitment) -> Result<Receipt> {
        let expected = self.chain.current_child_block();
        if commitment.number != expected {
            warn!(expected, got = commitment.number, "commitment out of sequence");
            return Err(RootChainError::NumberMismatch {
                expected,
                got: commitment.number,
            });
        }

        let signer = recover_signer(&commitment.hash, &commitment.sig)?;
        if signer != self.operator {
            warn!(number = commitment.number, %signer, "commitment not signed by operator");
            return Err(RootChainError::WrongSigner {
                expected: self.operator,
                got: signer,
            });
        }

        let receipt = self.chain.submit_block(self.operator, commitment.root)?;
        info!(
            number = receipt.block_number,
            hash = %commitment.hash,
            "commitment published"
        );
        Ok(receipt)
    }
}
