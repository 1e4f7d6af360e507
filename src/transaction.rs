use alloy_primitives::U256;

use crate::crypto::{hash, Hash32};
use crate::error::Result;
use crate::rlp::{RlpItem, RlpView};
use crate::sedes::{deserialize_record, Field, Sedes};

pub const TRANSACTION_FIELDS: [Field; 9] = [
    Field::new("nonce", Sedes::BigEndianInt),
    Field::new("gasprice", Sedes::BigEndianInt),
    Field::new("startgas", Sedes::BigEndianInt),
    Field::new("to", Sedes::Address),
    Field::new("value", Sedes::BigEndianInt),
    Field::new("data", Sedes::Binary),
    Field::new("v", Sedes::BigEndianInt),
    Field::new("r", Sedes::Uint256),
    Field::new("s", Sedes::Uint256),
];

///
/// A signed transaction as framed on the wire. The signature is carried but
/// never checked here; validity belongs to the ledger.
///
/// `to` is empty for contract creation.
///
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transaction {
    pub nonce: u64,
    pub gasprice: u128,
    pub startgas: u128,
    pub to: Vec<u8>,
    pub value: u128,
    pub data: Vec<u8>,
    pub v: u64,
    pub r: U256,
    pub s: U256,
}

impl Transaction {
    pub fn deserialize(view: RlpView<'_>) -> Result<Transaction> {
        let mut record = deserialize_record(&TRANSACTION_FIELDS, view)?;
        Ok(Transaction {
            nonce: record.take_u64("nonce")?,
            gasprice: record.take_int("gasprice")?,
            startgas: record.take_int("startgas")?,
            to: record.take_bytes("to")?,
            value: record.take_int("value")?,
            data: record.take_bytes("data")?,
            v: record.take_u64("v")?,
            r: record.take_uint256("r")?,
            s: record.take_uint256("s")?,
        })
    }

    pub fn to_rlp_item(&self) -> RlpItem {
        RlpItem::List(vec![
            RlpItem::uint(u128::from(self.nonce)),
            RlpItem::uint(self.gasprice),
            RlpItem::uint(self.startgas),
            RlpItem::bytes(self.to.clone()),
            RlpItem::uint(self.value),
            RlpItem::bytes(self.data.clone()),
            RlpItem::uint(u128::from(self.v)),
            RlpItem::uint256(self.r),
            RlpItem::uint256(self.s),
        ])
    }

    pub fn serialize(&self) -> Vec<u8> {
        self.to_rlp_item().serialize()
    }

    pub fn hash(&self) -> Hash32 {
        hash(&self.serialize())
    }

    pub fn is_contract_creation(&self) -> bool {
        self.to.is_empty()
    }
}
