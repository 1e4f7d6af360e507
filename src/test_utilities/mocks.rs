use alloy_primitives::U256;

use crate::header::BlockHeader;
use crate::transaction::Transaction;
use crate::transient_block::TransientBlock;

pub fn make_mock_header(number: u64) -> BlockHeader {
    let step: u64 = 15;
    BlockHeader {
        prevhash: [(number % 251) as u8; 32],
        uncles_hash: [0x1d; 32],
        coinbase: vec![0xcb; 20],
        state_root: [2; 32],
        tx_list_root: [3; 32],
        receipts_root: [4; 32],
        bloom: vec![0; 256],
        difficulty: U256::from(131_072u64) + U256::from(number),
        number,
        gas_limit: 3_141_592,
        gas_used: 21_000,
        timestamp: number.saturating_mul(step).saturating_add(1_428_000_000),
        extra_data: b"eth_wire".to_vec(),
        mixhash: [5; 32],
        nonce: [0x42; 8],
    }
}

/// Distinct transactions for distinct `nonce` values.
pub fn make_mock_transaction(nonce: u64) -> Transaction {
    let mut r = [0u8; 32];
    r[0] = 0x1c;
    r[24..].copy_from_slice(&nonce.to_be_bytes());
    Transaction {
        nonce,
        gasprice: 50_000_000_000,
        startgas: 21_000,
        to: vec![0xaa; 20],
        value: 1_000_000_000_000_000_000,
        data: vec![],
        v: 27,
        r: U256::from_be_bytes(r),
        s: U256::from_be_bytes([0x5e; 32]),
    }
}

pub fn make_mock_block(number: u64, tx_count: u64, uncle_count: u64) -> TransientBlock {
    TransientBlock::new(
        make_mock_header(number),
        (0..tx_count).map(make_mock_transaction).collect(),
        (0..uncle_count)
            .map(|i| make_mock_header(number.saturating_sub(i + 1)))
            .collect(),
    )
}
