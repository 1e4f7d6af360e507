//! Property tests for the codec and the lazy decoder.

use eth_wire::{
    lazy::LazyListDecoder,
    rlp::{RlpItem, RlpView},
    status::Status,
    test_utilities::mocks::{make_mock_block, make_mock_transaction},
    transaction::Transaction,
    Dispatcher, Error, EthMessage, TransientBlock, U256,
};
use proptest::prelude::*;

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(future)
}

proptest! {
    #[test]
    fn status_roundtrips(
        eth_version in any::<u64>(),
        network_id in any::<u64>(),
        chain_difficulty in any::<[u8; 32]>(),
        chain_head_hash in proptest::collection::vec(any::<u8>(), 0..64),
        genesis_hash in proptest::collection::vec(any::<u8>(), 0..64),
    ) {
        let message = EthMessage::Status(Status {
            eth_version,
            network_id,
            chain_difficulty: U256::from_be_bytes(chain_difficulty),
            chain_head_hash,
            genesis_hash,
        });
        let payload = message.serialize().unwrap();
        let decoded = block_on(Dispatcher::default().dispatch(0, &payload)).unwrap();
        prop_assert_eq!(decoded, message);
    }

    #[test]
    fn transactions_keep_their_order(nonces in proptest::collection::vec(any::<u64>(), 0..80)) {
        let transactions: Vec<Transaction> =
            nonces.iter().copied().map(make_mock_transaction).collect();
        let payload = EthMessage::Transactions(transactions.clone()).serialize().unwrap();
        let decoded = block_on(Dispatcher::default().dispatch(2, &payload)).unwrap();
        prop_assert_eq!(decoded, EthMessage::Transactions(transactions));
    }

    #[test]
    fn yield_cadence(count in 0u128..300) {
        let payload = RlpItem::List((0..count).map(RlpItem::uint).collect()).serialize();
        let mut decoder =
            LazyListDecoder::new(&payload, |view: RlpView<'_>| Ok(view.as_uint()?)).unwrap();
        let values = block_on(decoder.decode_all()).unwrap();
        prop_assert_eq!(values.len() as u128, count);
        if count <= 10 {
            prop_assert_eq!(decoder.yields(), 0);
        } else {
            prop_assert!(decoder.yields() as u128 >= count / 10);
        }
    }

    #[test]
    fn newblock_needs_exactly_two_elements(extra in 0usize..5) {
        prop_assume!(extra != 2);
        let block = make_mock_block(1, 1, 0);
        let mut items = vec![block.to_rlp_item(), RlpItem::uint(10)];
        items.resize(extra, RlpItem::uint(1));
        let payload = RlpItem::List(items).serialize();
        let result = block_on(Dispatcher::default().dispatch(7, &payload));
        prop_assert!(matches!(result, Err(Error::MalformedPayload(_))));
    }

    #[test]
    fn transient_block_hash_is_header_hash(
        number in any::<u64>(),
        tx_count in 0u64..8,
        uncle_count in 0u64..3,
    ) {
        let block = make_mock_block(number, tx_count, uncle_count);
        let encoded = block.serialize();
        let decoded = TransientBlock::deserialize(RlpView::new(&encoded).unwrap()).unwrap();
        prop_assert_eq!(decoded.hex_hash(), block.header().hex_hash());
        prop_assert_eq!(decoded.hash(), eth_wire::crypto::hash(&block.header().serialize()));
    }
}
