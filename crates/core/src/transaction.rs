//! Transactions as seen by a block: a leaf hash, a deposit flag and an encoding.

use crate::constants::NULL_ADDRESS;
use crate::crypto::{recover_signer, Address, CryptoError, Keypair, Signature};
use crate::hash::{hash, hash_concat, Hash};
use crate::encoding::{list_fields, EncodingError};
use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use serde::{Deserialize, Serialize};

/// Inputs (three integers each), currency, outputs (owner and amount each).
const UNSIGNED_FIELDS: usize = 11;

/// What a block needs from a transaction.
pub trait PlasmaTransaction {
    /// The leaf committed into the block's merkle tree.
    fn merkle_hash(&self) -> Hash;

    /// Whether this transaction moves funds in from the root chain.
    fn is_deposit(&self) -> bool;

    /// The canonical encoding of the full transaction, as one RLP item.
    fn encode(&self) -> Result<Vec<u8>, EncodingError>;
}

/// Reference to an output of an earlier transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Input {
    pub blknum: u64,
    pub txindex: u64,
    pub oindex: u64,
}

impl Input {
    pub fn new(blknum: u64, txindex: u64, oindex: u64) -> Self {
        Self {
            blknum,
            txindex,
            oindex,
        }
    }

    /// An input spending nothing. Deposits use two of these.
    pub fn null() -> Self {
        Self::default()
    }
}

/// A new output: `amount` of the transaction's currency paid to `owner`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Output {
    pub owner: Address,
    pub amount: u128,
}

impl Output {
    pub fn new(owner: Address, amount: u128) -> Self {
        Self { owner, amount }
    }

    pub fn null() -> Self {
        Self::default()
    }
}

/// A two-input, two-output child chain transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub inputs: [Input; 2],
    /// Currency of every input and output; the zero address is ETH.
    pub cur12: Address,
    pub outputs: [Output; 2],
    /// Signature of the owner of the first input.
    pub sig1: Signature,
    /// Signature of the owner of the second input.
    pub sig2: Signature,
}

impl Transaction {
    /// Create a new unsigned transaction.
    pub fn new(inputs: [Input; 2], cur12: Address, outputs: [Output; 2]) -> Self {
        Self {
            inputs,
            cur12,
            outputs,
            sig1: Signature::NULL,
            sig2: Signature::NULL,
        }
    }

    /// Create a deposit of `amount` ETH to `owner`.
    pub fn deposit(owner: Address, amount: u128) -> Self {
        Self::new(
            [Input::null(), Input::null()],
            Address(NULL_ADDRESS),
            [Output::new(owner, amount), Output::null()],
        )
    }

    fn append_unsigned_fields(&self, s: &mut RlpStream) {
        for input in &self.inputs {
            s.append(&input.blknum)
                .append(&input.txindex)
                .append(&input.oindex);
        }
        s.append(&self.cur12);
        for output in &self.outputs {
            s.append(&output.owner).append(&output.amount);
        }
    }

    /// Encoding without the signatures.
    pub fn encoded_unsigned(&self) -> Vec<u8> {
        let mut s = RlpStream::new_list(UNSIGNED_FIELDS);
        self.append_unsigned_fields(&mut s);
        s.out().to_vec()
    }

    /// Hash of the unsigned encoding; what input owners sign.
    pub fn hash(&self) -> Hash {
        hash(&self.encoded_unsigned())
    }

    /// Sign the first input with the given keypair.
    pub fn sign1(&mut self, keypair: &Keypair) {
        self.sig1 = keypair.sign_hash(&self.hash());
    }

    /// Sign the second input with the given keypair.
    pub fn sign2(&mut self, keypair: &Keypair) {
        self.sig2 = keypair.sign_hash(&self.hash());
    }

    /// Create a transaction with its first input signed.
    pub fn signed1(mut self, keypair: &Keypair) -> Self {
        self.sign1(keypair);
        self
    }

    /// Create a transaction with its second input signed.
    pub fn signed2(mut self, keypair: &Keypair) -> Self {
        self.sign2(keypair);
        self
    }

    /// Address that signed the first input.
    pub fn sender1(&self) -> Result<Address, CryptoError> {
        recover_signer(&self.hash(), &self.sig1)
    }

    /// Address that signed the second input.
    pub fn sender2(&self) -> Result<Address, CryptoError> {
        recover_signer(&self.hash(), &self.sig2)
    }
}

impl PlasmaTransaction for Transaction {
    fn merkle_hash(&self) -> Hash {
        hash_concat(&[self.hash().as_ref(), self.sig1.as_ref(), self.sig2.as_ref()])
    }

    fn is_deposit(&self) -> bool {
        self.inputs.iter().all(|input| input.blknum == 0)
    }

    fn encode(&self) -> Result<Vec<u8>, EncodingError> {
        Ok(rlp::encode(self).to_vec())
    }
}

impl Encodable for Transaction {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(UNSIGNED_FIELDS + 2);
        self.append_unsigned_fields(s);
        s.append(&self.sig1).append(&self.sig2);
    }
}

impl Decodable for Transaction {
    fn decode(rlp: &Rlp<'_>) -> Result<Self, DecoderError> {
        let f = list_fields(rlp, UNSIGNED_FIELDS + 2)?;
        let input = |i: usize| -> Result<Input, DecoderError> {
            Ok(Input::new(f[i].as_val()?, f[i + 1].as_val()?, f[i + 2].as_val()?))
        };
        let output = |i: usize| -> Result<Output, DecoderError> {
            Ok(Output::new(f[i].as_val()?, f[i + 1].as_val()?))
        };
        Ok(Self {
            inputs: [input(0)?, input(3)?],
            cur12: f[6].as_val()?,
            outputs: [output(7)?, output(9)?],
            sig1: f[11].as_val()?,
            sig2: f[12].as_val()?,
        })
    }
}
