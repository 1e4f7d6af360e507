/*!
# Structured Record Codec

Maps named, ordered field lists to and from RLP lists. Only values cross the
wire; names exist locally to look up each position's type and to hand decoded
values back by name.

A [`Sedes`] (serializer/deserializer) describes how one field is represented.
Composite field types ([`Sedes::BlockHeader`], [`Sedes::Transaction`],
[`Sedes::Block`]) decode through their own record layouts, so a field can hold
a full nested structure (the `block` field of `newblock`).
*/
use alloy_primitives::U256;

use crate::error::{Error, Result};
use crate::header::BlockHeader;
use crate::rlp::{RlpError, RlpItem, RlpView};
use crate::transaction::Transaction;
use crate::transient_block::TransientBlock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sedes {
    /// unsigned integer up to 128 bits, minimal big-endian
    BigEndianInt,
    /// unsigned integer up to 256 bits, minimal big-endian, as a [`U256`]
    Uint256,
    /// opaque byte string of any length
    Binary,
    /// byte string of exactly this many bytes
    FixedBinary(usize),
    /// 20 byte account address, or empty
    Address,
    BlockHeader,
    Transaction,
    /// header, transaction list and uncle list, decoded as a [`TransientBlock`]
    Block,
    /// homogeneous list whose length is carried by the encoding itself
    CountableList(&'static Sedes),
}

/// One named position in a record layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub sedes: Sedes,
}

impl Field {
    pub const fn new(name: &'static str, sedes: Sedes) -> Field {
        Field { name, sedes }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(u128),
    Uint256(U256),
    Bytes(Vec<u8>),
    Header(Box<BlockHeader>),
    Transaction(Box<Transaction>),
    Block(Box<TransientBlock>),
    List(Vec<Value>),
}

impl Value {
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Uint256(_) => "uint256",
            Value::Bytes(_) => "bytes",
            Value::Header(_) => "header",
            Value::Transaction(_) => "transaction",
            Value::Block(_) => "block",
            Value::List(_) => "list",
        }
    }

    fn mismatch(&self, expected: &str) -> Error {
        Error::malformed(format!("expected {}, found {}", expected, self.kind()))
    }

    pub fn into_int(self) -> Result<u128> {
        match self {
            Value::Int(value) => Ok(value),
            other => Err(other.mismatch("int")),
        }
    }

    pub fn into_uint256(self) -> Result<U256> {
        match self {
            Value::Uint256(value) => Ok(value),
            other => Err(other.mismatch("uint256")),
        }
    }

    pub fn into_bytes(self) -> Result<Vec<u8>> {
        match self {
            Value::Bytes(value) => Ok(value),
            other => Err(other.mismatch("bytes")),
        }
    }

    pub fn into_header(self) -> Result<BlockHeader> {
        match self {
            Value::Header(header) => Ok(*header),
            other => Err(other.mismatch("header")),
        }
    }

    pub fn into_transaction(self) -> Result<Transaction> {
        match self {
            Value::Transaction(tx) => Ok(*tx),
            other => Err(other.mismatch("transaction")),
        }
    }

    pub fn into_block(self) -> Result<TransientBlock> {
        match self {
            Value::Block(block) => Ok(*block),
            other => Err(other.mismatch("block")),
        }
    }

    pub fn into_list(self) -> Result<Vec<Value>> {
        match self {
            Value::List(values) => Ok(values),
            other => Err(other.mismatch("list")),
        }
    }
}

impl Sedes {
    pub fn name(&self) -> &'static str {
        match self {
            Sedes::BigEndianInt => "big_endian_int",
            Sedes::Uint256 => "uint256",
            Sedes::Binary => "binary",
            Sedes::FixedBinary(_) => "fixed_binary",
            Sedes::Address => "address",
            Sedes::BlockHeader => "block_header",
            Sedes::Transaction => "transaction",
            Sedes::Block => "block",
            Sedes::CountableList(_) => "countable_list",
        }
    }

    pub fn serialize(&self, value: &Value) -> Result<RlpItem> {
        match (self, value) {
            (Sedes::BigEndianInt, Value::Int(int)) => Ok(RlpItem::uint(*int)),
            (Sedes::Uint256, Value::Uint256(int)) => Ok(RlpItem::uint256(*int)),
            (Sedes::Binary, Value::Bytes(data)) => Ok(RlpItem::bytes(data.clone())),
            (Sedes::FixedBinary(len), Value::Bytes(data)) if data.len() == *len => {
                Ok(RlpItem::bytes(data.clone()))
            }
            (Sedes::Address, Value::Bytes(data)) if data.is_empty() || data.len() == 20 => {
                Ok(RlpItem::bytes(data.clone()))
            }
            (Sedes::BlockHeader, Value::Header(header)) => Ok(header.to_rlp_item()),
            (Sedes::Transaction, Value::Transaction(tx)) => Ok(tx.to_rlp_item()),
            (Sedes::Block, Value::Block(block)) => Ok(block.to_rlp_item()),
            (Sedes::CountableList(inner), Value::List(values)) => values
                .iter()
                .map(|value| inner.serialize(value))
                .collect::<Result<Vec<_>>>()
                .map(RlpItem::List),
            (sedes, value) => Err(Error::Serialization(format!(
                "{} cannot encode a {} value",
                sedes.name(),
                value.kind()
            ))),
        }
    }

    pub fn deserialize(&self, view: RlpView<'_>) -> Result<Value> {
        match self {
            Sedes::BigEndianInt => Ok(Value::Int(view.as_uint()?)),
            Sedes::Uint256 => Ok(Value::Uint256(view.as_uint256()?)),
            Sedes::Binary => Ok(Value::Bytes(view.data()?.to_vec())),
            Sedes::FixedBinary(len) => {
                let data = view.data()?;
                if data.len() != *len {
                    return Err(Error::malformed(format!(
                        "expected {} bytes, found {}",
                        len,
                        data.len()
                    )));
                }
                Ok(Value::Bytes(data.to_vec()))
            }
            Sedes::Address => {
                let data = view.data()?;
                if !data.is_empty() && data.len() != 20 {
                    return Err(Error::malformed(format!(
                        "address must be empty or 20 bytes, found {}",
                        data.len()
                    )));
                }
                Ok(Value::Bytes(data.to_vec()))
            }
            Sedes::BlockHeader => Ok(Value::Header(Box::new(BlockHeader::deserialize(view)?))),
            Sedes::Transaction => Ok(Value::Transaction(Box::new(Transaction::deserialize(
                view,
            )?))),
            Sedes::Block => Ok(Value::Block(Box::new(TransientBlock::deserialize(view)?))),
            Sedes::CountableList(inner) => view
                .iter()?
                .map(|item| inner.deserialize(item?))
                .collect::<Result<Vec<_>>>()
                .map(Value::List),
        }
    }
}

///
/// Decoded record: values in declaration order, each tagged with its field
/// name.
///
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    fields: Vec<(&'static str, Value)>,
}

impl Record {
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|(name, _)| *name)
    }

    pub fn into_values(self) -> Vec<Value> {
        self.fields.into_iter().map(|(_, value)| value).collect()
    }

    /// Remove a field by name.
    pub fn take(&mut self, name: &str) -> Result<Value> {
        let position = self
            .fields
            .iter()
            .position(|(field, _)| *field == name)
            .ok_or_else(|| Error::malformed(format!("missing field {}", name)))?;
        Ok(self.fields.remove(position).1)
    }

    pub fn take_int(&mut self, name: &str) -> Result<u128> {
        self.take(name)?.into_int().map_err(|err| err.in_field(name))
    }

    pub fn take_u64(&mut self, name: &str) -> Result<u64> {
        let value = self.take_int(name)?;
        u64::try_from(value).map_err(|_| {
            Error::malformed(format!("{}: {} does not fit in 64 bits", name, value))
        })
    }

    pub fn take_uint256(&mut self, name: &str) -> Result<U256> {
        self.take(name)?
            .into_uint256()
            .map_err(|err| err.in_field(name))
    }

    pub fn take_bytes(&mut self, name: &str) -> Result<Vec<u8>> {
        self.take(name)?.into_bytes().map_err(|err| err.in_field(name))
    }

    pub fn take_hash(&mut self, name: &str) -> Result<[u8; 32]> {
        let data = self.take_bytes(name)?;
        data.as_slice().try_into().map_err(|_| {
            Error::malformed(format!("{}: expected 32 bytes, found {}", name, data.len()))
        })
    }

    pub fn take_block(&mut self, name: &str) -> Result<TransientBlock> {
        self.take(name)?.into_block().map_err(|err| err.in_field(name))
    }
}

/// Encode `values` positionally against `fields`.
pub fn serialize_record(fields: &[Field], values: &[Value]) -> Result<RlpItem> {
    if fields.len() != values.len() {
        return Err(Error::Serialization(format!(
            "expected {} values, found {}",
            fields.len(),
            values.len()
        )));
    }
    fields
        .iter()
        .zip(values)
        .map(|(field, value)| field.sedes.serialize(value))
        .collect::<Result<Vec<_>>>()
        .map(RlpItem::List)
}

/// Decode a list whose arity and element types must match `fields` exactly.
pub fn deserialize_record(fields: &[Field], view: RlpView<'_>) -> Result<Record> {
    let items = view
        .iter()?
        .collect::<std::result::Result<Vec<_>, RlpError>>()?;
    if items.len() != fields.len() {
        return Err(Error::malformed(format!(
            "expected {} fields, found {}",
            fields.len(),
            items.len()
        )));
    }
    let mut record = Record::default();
    for (field, item) in fields.iter().zip(items) {
        let value = field
            .sedes
            .deserialize(item)
            .map_err(|err| err.in_field(field.name))?;
        record.fields.push((field.name, value));
    }
    Ok(record)
}
