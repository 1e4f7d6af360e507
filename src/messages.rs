use alloy_primitives::U256;

use crate::commands::{CommandId, GET_BLOCK_HASHES_FIELDS, NEW_BLOCK_FIELDS};
use crate::dispatch::Decoded;
use crate::error::{Error, Result};
use crate::rlp::{self, RlpItem, RlpView};
use crate::sedes::{serialize_record, Value};
use crate::status::{Status, STATUS_FIELDS};
use crate::transaction::Transaction;
use crate::transient_block::TransientBlock;

/// A decoded eth command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EthMessage {
    Status(Status),
    GetTransactions,
    Transactions(Vec<Transaction>),
    GetBlockHashes {
        child_block_hash: Vec<u8>,
        count: u64,
    },
    BlockHashes(Vec<Vec<u8>>),
    GetBlocks(Vec<Vec<u8>>),
    Blocks(Vec<TransientBlock>),
    NewBlock {
        block: TransientBlock,
        chain_difficulty: U256,
    },
}

impl EthMessage {
    pub fn command_id(&self) -> CommandId {
        match self {
            EthMessage::Status(_) => CommandId::Status,
            EthMessage::GetTransactions => CommandId::GetTransactions,
            EthMessage::Transactions(_) => CommandId::Transactions,
            EthMessage::GetBlockHashes { .. } => CommandId::GetBlockHashes,
            EthMessage::BlockHashes(_) => CommandId::BlockHashes,
            EthMessage::GetBlocks(_) => CommandId::GetBlocks,
            EthMessage::Blocks(_) => CommandId::Blocks,
            EthMessage::NewBlock { .. } => CommandId::NewBlock,
        }
    }

    /// Payload bytes, ready to be framed behind the command id.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let item = match self {
            EthMessage::Status(status) => {
                serialize_record(&STATUS_FIELDS, &status.to_values())?
            }
            EthMessage::GetTransactions => RlpItem::List(vec![]),
            EthMessage::Transactions(transactions) => {
                RlpItem::List(transactions.iter().map(Transaction::to_rlp_item).collect())
            }
            EthMessage::GetBlockHashes {
                child_block_hash,
                count,
            } => serialize_record(
                &GET_BLOCK_HASHES_FIELDS,
                &[
                    Value::Bytes(child_block_hash.clone()),
                    Value::Int(u128::from(*count)),
                ],
            )?,
            EthMessage::BlockHashes(hashes) | EthMessage::GetBlocks(hashes) => {
                RlpItem::List(hashes.iter().cloned().map(RlpItem::Bytes).collect())
            }
            EthMessage::Blocks(blocks) => {
                RlpItem::List(blocks.iter().map(TransientBlock::to_rlp_item).collect())
            }
            EthMessage::NewBlock {
                block,
                chain_difficulty,
            } => serialize_record(
                &NEW_BLOCK_FIELDS,
                &[
                    Value::Block(Box::new(block.clone())),
                    Value::Uint256(*chain_difficulty),
                ],
            )?,
        };
        Ok(item.serialize())
    }

    pub fn from_decoded(id: CommandId, decoded: Decoded) -> Result<EthMessage> {
        let message = match (id, decoded) {
            (CommandId::GetTransactions, Decoded::Empty) => EthMessage::GetTransactions,
            (CommandId::Status, Decoded::Record(record)) => {
                EthMessage::Status(Status::from_record(record)?)
            }
            (CommandId::GetBlockHashes, Decoded::Record(mut record)) => {
                EthMessage::GetBlockHashes {
                    child_block_hash: record.take_bytes("child_block_hash")?,
                    count: record.take_u64("count")?,
                }
            }
            (CommandId::NewBlock, Decoded::Record(mut record)) => EthMessage::NewBlock {
                block: record.take_block("block")?,
                chain_difficulty: record.take_uint256("chain_difficulty")?,
            },
            (CommandId::Transactions, Decoded::List(values)) => EthMessage::Transactions(
                values
                    .into_iter()
                    .map(Value::into_transaction)
                    .collect::<Result<_>>()?,
            ),
            (CommandId::BlockHashes, Decoded::List(values)) => {
                EthMessage::BlockHashes(into_byte_strings(values)?)
            }
            (CommandId::GetBlocks, Decoded::List(values)) => {
                EthMessage::GetBlocks(into_byte_strings(values)?)
            }
            (CommandId::Blocks, Decoded::List(values)) => EthMessage::Blocks(
                values
                    .into_iter()
                    .map(Value::into_block)
                    .collect::<Result<_>>()?,
            ),
            (id, _) => {
                return Err(Error::malformed(format!(
                    "payload does not match the structure of {}",
                    id.name()
                )))
            }
        };
        Ok(message)
    }
}

fn into_byte_strings(values: Vec<Value>) -> Result<Vec<Vec<u8>>> {
    values.into_iter().map(Value::into_bytes).collect()
}

///
/// Encode a `blocks` payload from blocks that are already RLP encoded. Each
/// block is embedded as is, without being decoded and re-encoded.
///
pub fn encode_blocks(raw_blocks: &[Vec<u8>]) -> Result<Vec<u8>> {
    let mut payload = vec![];
    for (index, raw) in raw_blocks.iter().enumerate() {
        let view = RlpView::new(raw)
            .map_err(|err| Error::Serialization(format!("block {}: {}", index, err)))?;
        if !view.is_list() {
            return Err(Error::Serialization(format!(
                "block {}: expected an encoded list",
                index
            )));
        }
        payload.extend_from_slice(raw);
    }
    Ok(rlp::encode_list_payload(&payload))
}
