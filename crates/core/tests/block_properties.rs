use plasma_core::{
    check_membership, recover_signer, Address, Block, BlockError, CryptoError, FixedMerkle, Hash,
    Input, Keypair, Output, PlasmaTransaction, Transaction, EMPTY_LEAF, MERKLE_DEPTH,
};
use proptest::prelude::*;

fn tx_strategy() -> impl Strategy<Value = Transaction> {
    (
        0u64..5_000,
        0u64..100,
        0u64..2,
        any::<[u8; 20]>(),
        any::<u64>(),
    )
        .prop_map(|(blknum, txindex, oindex, owner, amount)| {
            Transaction::new(
                [Input::new(blknum, txindex, oindex), Input::null()],
                Address::ZERO,
                [
                    Output::new(Address::from_bytes(owner), amount as u128),
                    Output::null(),
                ],
            )
        })
}

fn key_strategy() -> impl Strategy<Value = [u8; 32]> {
    // Comfortably below the curve order and never zero.
    any::<[u8; 31]>().prop_map(|bytes| {
        let mut key = [0u8; 32];
        key[1..].copy_from_slice(&bytes);
        key[0] = 1;
        key
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn encoding_is_deterministic(
        txs in prop::collection::vec(tx_strategy(), 0..6),
        number in any::<u64>(),
    ) {
        let a = Block::with_transactions(txs.clone(), number);
        let b = Block::with_transactions(txs, number);
        prop_assert_eq!(a.encoded().unwrap(), b.encoded().unwrap());
        prop_assert_eq!(a.hash().unwrap(), b.hash().unwrap());
    }

    #[test]
    fn signature_round_trip(key in key_strategy(), number in any::<u64>()) {
        let keypair = Keypair::from_private_key(&key).unwrap();
        let block = Block::<Transaction>::with_transactions(vec![], number).signed(&keypair).unwrap();
        let hash = block.hash().unwrap();
        prop_assert_eq!(recover_signer(&hash, &block.sig).unwrap(), keypair.address());
        prop_assert_eq!(block.signer().unwrap(), keypair.address());
    }

    #[test]
    fn deposit_predicate(
        deposits in prop::collection::vec(any::<bool>(), 0..4),
    ) {
        let txs: Vec<Transaction> = deposits
            .iter()
            .map(|deposit| {
                let mut tx = Transaction::deposit(Address::from_bytes([7u8; 20]), 1);
                if !deposit {
                    tx.inputs[0] = Input::new(1000, 0, 0);
                }
                tx
            })
            .collect();
        let expected = deposits.len() == 1 && deposits[0];
        prop_assert_eq!(Block::with_transactions(txs, 1).is_deposit_block(), expected);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn root_sensitive_to_changes_and_order(
        txs in prop::collection::vec(tx_strategy(), 2..5),
        replacement in tx_strategy(),
    ) {
        let block = Block::with_transactions(txs.clone(), 1);
        let root = block.root().unwrap();
        prop_assert_eq!(root, Block::with_transactions(txs.clone(), 99).root().unwrap());

        if replacement.merkle_hash() != txs[0].merkle_hash() {
            let mut changed = txs.clone();
            changed[0] = replacement;
            prop_assert_ne!(root, Block::with_transactions(changed, 1).root().unwrap());
        }

        if txs[0].merkle_hash() != txs[1].merkle_hash() {
            let mut swapped = txs.clone();
            swapped.swap(0, 1);
            prop_assert_ne!(root, Block::with_transactions(swapped, 1).root().unwrap());
        }
    }
}

#[test]
fn null_signature_never_yields_an_address() {
    let block: Block = Block::with_transactions(vec![Transaction::deposit(Address::ZERO, 5)], 1);
    assert!(matches!(
        block.signer(),
        Err(BlockError::Crypto(CryptoError::InvalidSignature))
    ));
}

#[test]
fn padding_matches_explicitly_padded_tree() {
    let txs: Vec<Transaction> = (1..=3)
        .map(|i| Transaction::deposit(Address::from_bytes([i; 20]), i as u128))
        .collect();
    let block = Block::with_transactions(txs.clone(), 1);

    let mut leaves: Vec<Hash> = txs.iter().map(|tx| tx.merkle_hash()).collect();
    leaves.resize(1 << MERKLE_DEPTH, Hash(EMPTY_LEAF));
    let explicit = FixedMerkle::new(MERKLE_DEPTH, &leaves).unwrap();

    assert_eq!(block.root().unwrap(), explicit.root());
}

#[test]
fn too_many_transactions_fail_loudly() {
    let leaf = Transaction::deposit(Address::ZERO, 1);
    let block = Block::with_transactions(vec![leaf; (1 << MERKLE_DEPTH) + 1], 1);
    assert!(matches!(
        block.root(),
        Err(BlockError::Merkle(plasma_core::MerkleError::TreeDepthExceeded { .. }))
    ));
}

#[test]
fn end_to_end_two_transaction_block() {
    let operator = Keypair::generate();
    let alice = Keypair::generate();
    let bob = Keypair::generate();

    let tx_a = Transaction::new(
        [Input::new(1, 0, 0), Input::null()],
        Address::ZERO,
        [Output::new(bob.address(), 40), Output::new(alice.address(), 60)],
    )
    .signed1(&alice);
    let tx_b = Transaction::new(
        [Input::new(2, 0, 0), Input::null()],
        Address::ZERO,
        [Output::new(alice.address(), 10), Output::null()],
    )
    .signed1(&bob);
    let (h_a, h_b) = (tx_a.merkle_hash(), tx_b.merkle_hash());

    let mut block = Block::with_transactions(vec![tx_a, tx_b], 7);
    let encoded = block.encoded().unwrap();
    assert_eq!(block.hash().unwrap(), plasma_core::hash(&encoded));

    let expected_root = FixedMerkle::new(MERKLE_DEPTH, &[h_a, h_b]).unwrap().root();
    assert_eq!(block.root().unwrap(), expected_root);

    block.sign(&operator).unwrap();
    assert_eq!(block.encoded().unwrap(), encoded);
    assert_eq!(
        recover_signer(&block.hash().unwrap(), &block.sig).unwrap(),
        operator.address()
    );

    let tree = block.merklized_transaction_set().unwrap();
    let proof = tree.create_membership_proof(1).unwrap();
    assert!(check_membership(&h_b, 1, &expected_root, &proof.to_bytes()).unwrap());
}
