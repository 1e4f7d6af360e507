use std::fmt::{Debug, Formatter};

use alloy_primitives::U256;

use crate::crypto::{hash, Hash32};
use crate::error::{Error, Result};
use crate::rlp::{RlpItem, RlpView};
use crate::sedes::{deserialize_record, Field, Sedes};

///
/// Wire layout of a block header, in order.
///
pub const HEADER_FIELDS: [Field; 15] = [
    Field::new("prevhash", Sedes::FixedBinary(32)),
    Field::new("uncles_hash", Sedes::FixedBinary(32)),
    Field::new("coinbase", Sedes::Address),
    Field::new("state_root", Sedes::FixedBinary(32)),
    Field::new("tx_list_root", Sedes::FixedBinary(32)),
    Field::new("receipts_root", Sedes::FixedBinary(32)),
    Field::new("bloom", Sedes::Binary),
    Field::new("difficulty", Sedes::Uint256),
    Field::new("number", Sedes::BigEndianInt),
    Field::new("gas_limit", Sedes::BigEndianInt),
    Field::new("gas_used", Sedes::BigEndianInt),
    Field::new("timestamp", Sedes::BigEndianInt),
    Field::new("extra_data", Sedes::Binary),
    Field::new("mixhash", Sedes::FixedBinary(32)),
    Field::new("nonce", Sedes::FixedBinary(8)),
];

///
/// Block header as it travels between peers. Nothing here is checked
/// against chain state; the header only has to be structurally sound.
///
#[derive(Clone, PartialEq, Eq)]
pub struct BlockHeader {
    pub prevhash: Hash32,
    pub uncles_hash: Hash32,
    pub coinbase: Vec<u8>,
    pub state_root: Hash32,
    pub tx_list_root: Hash32,
    pub receipts_root: Hash32,
    pub bloom: Vec<u8>,
    pub difficulty: U256,
    pub number: u64,
    pub gas_limit: u128,
    pub gas_used: u128,
    pub timestamp: u64,
    pub extra_data: Vec<u8>,
    pub mixhash: Hash32,
    pub nonce: [u8; 8],
}

impl Default for BlockHeader {
    fn default() -> Self {
        BlockHeader {
            prevhash: [0; 32],
            uncles_hash: [0; 32],
            coinbase: vec![0; 20],
            state_root: [0; 32],
            tx_list_root: [0; 32],
            receipts_root: [0; 32],
            bloom: vec![],
            difficulty: U256::ZERO,
            number: 0,
            gas_limit: 0,
            gas_used: 0,
            timestamp: 0,
            extra_data: vec![],
            mixhash: [0; 32],
            nonce: [0; 8],
        }
    }
}

impl BlockHeader {
    pub fn deserialize(view: RlpView<'_>) -> Result<BlockHeader> {
        let mut record = deserialize_record(&HEADER_FIELDS, view)?;
        let nonce = record.take_bytes("nonce")?;
        let nonce: [u8; 8] = nonce
            .as_slice()
            .try_into()
            .map_err(|_| Error::malformed("nonce: expected 8 bytes"))?;
        Ok(BlockHeader {
            prevhash: record.take_hash("prevhash")?,
            uncles_hash: record.take_hash("uncles_hash")?,
            coinbase: record.take_bytes("coinbase")?,
            state_root: record.take_hash("state_root")?,
            tx_list_root: record.take_hash("tx_list_root")?,
            receipts_root: record.take_hash("receipts_root")?,
            bloom: record.take_bytes("bloom")?,
            difficulty: record.take_uint256("difficulty")?,
            number: record.take_u64("number")?,
            gas_limit: record.take_int("gas_limit")?,
            gas_used: record.take_int("gas_used")?,
            timestamp: record.take_u64("timestamp")?,
            extra_data: record.take_bytes("extra_data")?,
            mixhash: record.take_hash("mixhash")?,
            nonce,
        })
    }

    pub fn to_rlp_item(&self) -> RlpItem {
        RlpItem::List(vec![
            RlpItem::bytes(self.prevhash.to_vec()),
            RlpItem::bytes(self.uncles_hash.to_vec()),
            RlpItem::bytes(self.coinbase.clone()),
            RlpItem::bytes(self.state_root.to_vec()),
            RlpItem::bytes(self.tx_list_root.to_vec()),
            RlpItem::bytes(self.receipts_root.to_vec()),
            RlpItem::bytes(self.bloom.clone()),
            RlpItem::uint256(self.difficulty),
            RlpItem::uint(u128::from(self.number)),
            RlpItem::uint(self.gas_limit),
            RlpItem::uint(self.gas_used),
            RlpItem::uint(u128::from(self.timestamp)),
            RlpItem::bytes(self.extra_data.clone()),
            RlpItem::bytes(self.mixhash.to_vec()),
            RlpItem::bytes(self.nonce.to_vec()),
        ])
    }

    /// Canonical encoding, the preimage of [`BlockHeader::hash`].
    pub fn serialize(&self) -> Vec<u8> {
        self.to_rlp_item().serialize()
    }

    pub fn hash(&self) -> Hash32 {
        hash(&self.serialize())
    }

    pub fn hex_hash(&self) -> String {
        hex::encode(self.hash())
    }
}

impl Debug for BlockHeader {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "<BlockHeader(#{} {})>", self.number, &self.hex_hash()[..8])
    }
}
