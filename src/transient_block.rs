use std::fmt::{Debug, Display, Formatter};

use crate::crypto::Hash32;
use crate::error::{Error, Result};
use crate::header::BlockHeader;
use crate::rlp::{RlpError, RlpItem, RlpView};
use crate::transaction::Transaction;

///
/// The chain side of a block conversion. Implemented by whatever owns chain
/// state; it receives the decoded parts together with its storage handle and
/// the parent (if known) and does all of the validation.
///
pub trait BlockFactory {
    type Db;
    type Block;
    type Error;

    fn make_block(
        &self,
        header: BlockHeader,
        transaction_list: Vec<Transaction>,
        uncles: Vec<BlockHeader>,
        db: &Self::Db,
        parent: Option<&Self::Block>,
    ) -> std::result::Result<Self::Block, Self::Error>;
}

///
/// A partially decoded, unvalidated block.
///
/// Built from exactly three wire elements: header, transaction list and uncle
/// list. Each part is structurally decoded but nothing is checked against
/// chain state.
///
#[derive(Clone, PartialEq, Eq)]
pub struct TransientBlock {
    header: BlockHeader,
    transaction_list: Vec<Transaction>,
    uncles: Vec<BlockHeader>,
}

impl TransientBlock {
    pub fn new(
        header: BlockHeader,
        transaction_list: Vec<Transaction>,
        uncles: Vec<BlockHeader>,
    ) -> TransientBlock {
        TransientBlock {
            header,
            transaction_list,
            uncles,
        }
    }

    pub fn deserialize(view: RlpView<'_>) -> Result<TransientBlock> {
        let parts = view
            .iter()?
            .collect::<std::result::Result<Vec<_>, RlpError>>()?;
        let [header, transactions, uncles]: [RlpView<'_>; 3] =
            parts.try_into().map_err(|parts: Vec<_>| {
                Error::malformed(format!(
                    "block must have 3 elements, found {}",
                    parts.len()
                ))
            })?;

        let header = BlockHeader::deserialize(header).map_err(|err| err.in_field("header"))?;
        let transaction_list = transactions
            .iter()?
            .map(|item| Transaction::deserialize(item?))
            .collect::<Result<Vec<_>>>()
            .map_err(|err| err.in_field("transaction_list"))?;
        let uncles = uncles
            .iter()?
            .map(|item| BlockHeader::deserialize(item?))
            .collect::<Result<Vec<_>>>()
            .map_err(|err| err.in_field("uncles"))?;

        Ok(TransientBlock::new(header, transaction_list, uncles))
    }

    pub fn to_rlp_item(&self) -> RlpItem {
        RlpItem::List(vec![
            self.header.to_rlp_item(),
            RlpItem::List(
                self.transaction_list
                    .iter()
                    .map(Transaction::to_rlp_item)
                    .collect(),
            ),
            RlpItem::List(self.uncles.iter().map(BlockHeader::to_rlp_item).collect()),
        ])
    }

    pub fn serialize(&self) -> Vec<u8> {
        self.to_rlp_item().serialize()
    }

    pub fn header(&self) -> &BlockHeader {
        &self.header
    }

    pub fn transaction_list(&self) -> &[Transaction] {
        &self.transaction_list
    }

    pub fn uncles(&self) -> &[BlockHeader] {
        &self.uncles
    }

    pub fn number(&self) -> u64 {
        self.header.number
    }

    /// Identical to the header's own hash.
    pub fn hash(&self) -> Hash32 {
        self.header.hash()
    }

    pub fn hex_hash(&self) -> String {
        self.header.hex_hash()
    }

    /// Hand the parts over to the chain. Consumes the transient block.
    pub fn to_block<F: BlockFactory>(
        self,
        factory: &F,
        db: &F::Db,
        parent: Option<&F::Block>,
    ) -> std::result::Result<F::Block, F::Error> {
        factory.make_block(self.header, self.transaction_list, self.uncles, db, parent)
    }
}

impl Display for TransientBlock {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "<TransientBlock(#{} {})>",
            self.header.number,
            &self.hex_hash()[..8]
        )
    }
}

impl Debug for TransientBlock {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}
