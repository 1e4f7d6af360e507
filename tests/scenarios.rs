use eth_wire::{
    commands::{MAX_GETBLOCKHASHES_COUNT, MAX_GETBLOCKS_COUNT},
    lazy::LazyListDecoder,
    rlp::{RlpItem, RlpView},
    status::{Status, StatusHandshake},
    test_utilities::{
        mocks::{make_mock_block, make_mock_header, make_mock_transaction},
        test_manager::{Received, TestManager},
    },
    transaction::Transaction,
    Dispatcher, Error, EthMessage, ProtocolConfig, TransientBlock, U256,
};

#[tokio::test]
async fn status_roundtrip() {
    let dispatcher = Dispatcher::default();
    let status = StatusHandshake::new().create(
        &ProtocolConfig::default(),
        U256::from(1000u64),
        &[0xaa; 32],
        &[0xbb; 32],
    );
    let payload = EthMessage::Status(status).serialize().unwrap();
    let decoded = dispatcher.dispatch(0, &payload).await.unwrap();
    assert_eq!(
        decoded,
        EthMessage::Status(Status {
            eth_version: 60,
            network_id: 99107,
            chain_difficulty: U256::from(1000u64),
            chain_head_hash: vec![0xaa; 32],
            genesis_hash: vec![0xbb; 32],
        })
    );
}

#[tokio::test]
async fn transactions_decode_in_order_with_yields() {
    let transactions: Vec<Transaction> = (0..25).map(make_mock_transaction).collect();
    let payload = EthMessage::Transactions(transactions.clone())
        .serialize()
        .unwrap();

    let mut decoder = LazyListDecoder::new(&payload, Transaction::deserialize).unwrap();
    let mut decoded = vec![];
    let mut yields_before = vec![];
    while let Some(transaction) = decoder.next().await {
        yields_before.push(decoder.yields());
        decoded.push(transaction.unwrap());
    }
    assert_eq!(decoded, transactions);
    // the yield count steps up right before elements 10 and 20
    let steps: Vec<usize> = (1..yields_before.len())
        .filter(|index| yields_before[*index] != yields_before[index - 1])
        .collect();
    assert_eq!(steps, vec![10, 20]);

    let dispatched = Dispatcher::default().dispatch(2, &payload).await.unwrap();
    assert_eq!(dispatched, EthMessage::Transactions(transactions));
}

#[tokio::test]
async fn getblocks_beyond_advisory_cap() {
    let hashes: Vec<Vec<u8>> = (0..300u32)
        .map(|n| {
            let mut hash = vec![0; 28];
            hash.extend_from_slice(&n.to_be_bytes());
            hash
        })
        .collect();
    assert!(hashes.len() > MAX_GETBLOCKS_COUNT);
    let payload = EthMessage::GetBlocks(hashes.clone()).serialize().unwrap();
    let decoded = Dispatcher::default().dispatch(5, &payload).await.unwrap();
    assert_eq!(decoded, EthMessage::GetBlocks(hashes));
}

#[tokio::test]
async fn blockhashes_beyond_advisory_cap() {
    let hashes = vec![vec![0x42; 32]; MAX_GETBLOCKHASHES_COUNT + 1];
    let payload = EthMessage::BlockHashes(hashes.clone()).serialize().unwrap();
    let decoded = Dispatcher::default().dispatch(4, &payload).await.unwrap();
    assert_eq!(decoded, EthMessage::BlockHashes(hashes));
}

#[tokio::test]
async fn newblock_with_three_elements_is_malformed() {
    let block = make_mock_block(12, 2, 1);
    let payload = RlpItem::List(vec![
        block.to_rlp_item(),
        RlpItem::uint(131_072),
        RlpItem::bytes(vec![0xff]),
    ])
    .serialize();
    let err = Dispatcher::default().dispatch(7, &payload).await.unwrap_err();
    assert!(matches!(err, Error::MalformedPayload(_)));

    let one = RlpItem::List(vec![block.to_rlp_item()]).serialize();
    let err = Dispatcher::default().dispatch(7, &one).await.unwrap_err();
    assert!(matches!(err, Error::MalformedPayload(_)));
}

#[test]
fn transient_block_from_triplet() {
    let header = make_mock_header(100);
    let triplet = RlpItem::List(vec![
        header.to_rlp_item(),
        RlpItem::List(vec![
            make_mock_transaction(0).to_rlp_item(),
            make_mock_transaction(1).to_rlp_item(),
        ]),
        RlpItem::List(vec![make_mock_header(99).to_rlp_item()]),
    ])
    .serialize();
    let block = TransientBlock::deserialize(RlpView::new(&triplet).unwrap()).unwrap();
    assert_eq!(block.transaction_list().len(), 2);
    assert_eq!(block.uncles().len(), 1);
    assert_eq!(
        block.hex_hash(),
        hex::encode(eth_wire::crypto::hash(&header.serialize()))
    );
    assert_eq!(block.number(), 100);
}

#[tokio::test]
async fn unknown_command_id() {
    let err = Dispatcher::default().dispatch(99, &[0xc0]).await.unwrap_err();
    assert_eq!(err, Error::UnknownCommand(99));
}

#[tokio::test]
async fn sessions_exchange_status_and_blocks() {
    let mut manager = TestManager::new(ProtocolConfig::default(), 16);
    manager
        .handshake(U256::from(1000u64), &[0xaa; 32], &[0xbb; 32])
        .await
        .unwrap();
    assert!(manager.local.remote_status().is_some());
    assert!(manager.remote.remote_status().is_some());

    let block = make_mock_block(7, 3, 0);
    let announce = EthMessage::NewBlock {
        block: block.clone(),
        chain_difficulty: U256::from(2000u64),
    };
    manager.deliver(&announce).await.unwrap();
    let received = manager.received_by_remote();
    assert_eq!(received.len(), 2);
    assert_eq!(received[1], Received::new("local", announce));
}
