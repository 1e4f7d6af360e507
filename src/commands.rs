/*!
# Command Schema

The fixed catalogue of eth commands. Ids are stable across protocol version 60
and must never be renumbered; slots 8 through 15 are reserved.

| id | name | structure |
|----|------|-----------|
| 0 | status | record: eth_version, network_id, chain_difficulty, chain_head_hash, genesis_hash |
| 1 | gettransactions | empty |
| 2 | transactions | countable list of transactions |
| 3 | getblockhashes | record: child_block_hash, count |
| 4 | blockhashes | countable list of hashes |
| 5 | getblocks | countable list of hashes |
| 6 | blocks | countable list of blocks |
| 7 | newblock | record: block, chain_difficulty |
*/
use std::collections::HashMap;

use macros::TryFromByte;

use crate::error::{Error, Result};
use crate::sedes::{Field, Sedes};
use crate::status::STATUS_FIELDS;

pub const PROTOCOL_NAME: &str = "eth";
/// Position of eth within the devp2p sub-protocol id space.
pub const PROTOCOL_ID: u8 = 1;
/// Highest command id the protocol reserves, so it occupies 16 wire slots.
pub const MAX_CMD_ID: u8 = 15;
pub const ETH_VERSION: u64 = 60;
pub const NETWORK_ID: u64 = 99107;

/// Advisory cap on hashes in one outgoing getblocks.
pub const MAX_GETBLOCKS_COUNT: usize = 256;
/// Advisory cap on the count asked for by one outgoing getblockhashes.
pub const MAX_GETBLOCKHASHES_COUNT: usize = 2048;

pub const GET_BLOCK_HASHES_FIELDS: [Field; 2] = [
    Field::new("child_block_hash", Sedes::Binary),
    Field::new("count", Sedes::BigEndianInt),
];

pub const NEW_BLOCK_FIELDS: [Field; 2] = [
    Field::new("block", Sedes::Block),
    Field::new("chain_difficulty", Sedes::Uint256),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromByte)]
#[repr(u8)]
pub enum CommandId {
    Status = 0,
    GetTransactions = 1,
    Transactions = 2,
    GetBlockHashes = 3,
    BlockHashes = 4,
    GetBlocks = 5,
    Blocks = 6,
    NewBlock = 7,
}

impl CommandId {
    pub fn from_id(id: u8) -> Result<CommandId> {
        CommandId::try_from(id).map_err(Error::UnknownCommand)
    }

    ///
    /// Resolve an id as seen on the wire, where eth's commands start at `base`
    /// within the multiplexed id space.
    ///
    pub fn from_wire(wire_id: u8, base: u8) -> Result<CommandId> {
        let id = wire_id
            .checked_sub(base)
            .filter(|id| *id <= MAX_CMD_ID)
            .ok_or(Error::UnknownCommand(wire_id))?;
        CommandId::from_id(id)
    }

    /// Inverse of [`CommandId::from_wire`]. Fails if the id overflows a byte.
    pub fn to_wire(self, base: u8) -> Result<u8> {
        base.checked_add(self as u8).ok_or(Error::UnknownCommand(self as u8))
    }

    pub fn from_name(name: &str) -> Option<CommandId> {
        COMMANDS_BY_NAME.get(name).copied()
    }

    pub fn command(self) -> &'static Command {
        &COMMANDS[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.command().name
    }
}

/// Shape of a command payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Structure {
    /// no payload worth decoding
    Empty,
    /// fixed arity record
    Record(&'static [Field]),
    /// homogeneous list of this element type, decoded lazily
    CountableList(Sedes),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    pub id: CommandId,
    pub name: &'static str,
    pub structure: Structure,
}

/// Indexed by command id.
pub const COMMANDS: [Command; 8] = [
    Command {
        id: CommandId::Status,
        name: "status",
        structure: Structure::Record(&STATUS_FIELDS),
    },
    Command {
        id: CommandId::GetTransactions,
        name: "gettransactions",
        structure: Structure::Empty,
    },
    Command {
        id: CommandId::Transactions,
        name: "transactions",
        structure: Structure::CountableList(Sedes::Transaction),
    },
    Command {
        id: CommandId::GetBlockHashes,
        name: "getblockhashes",
        structure: Structure::Record(&GET_BLOCK_HASHES_FIELDS),
    },
    Command {
        id: CommandId::BlockHashes,
        name: "blockhashes",
        structure: Structure::CountableList(Sedes::Binary),
    },
    Command {
        id: CommandId::GetBlocks,
        name: "getblocks",
        structure: Structure::CountableList(Sedes::Binary),
    },
    Command {
        id: CommandId::Blocks,
        name: "blocks",
        structure: Structure::CountableList(Sedes::Block),
    },
    Command {
        id: CommandId::NewBlock,
        name: "newblock",
        structure: Structure::Record(&NEW_BLOCK_FIELDS),
    },
];

lazy_static! {
    static ref COMMANDS_BY_NAME: HashMap<&'static str, CommandId> = COMMANDS
        .iter()
        .map(|command| (command.name, command.id))
        .collect();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_indexed_by_id() {
        for (index, command) in COMMANDS.iter().enumerate() {
            assert_eq!(command.id as usize, index);
            assert_eq!(CommandId::from_id(index as u8).unwrap(), command.id);
            assert_eq!(CommandId::from_name(command.name), Some(command.id));
        }
    }

    #[test]
    fn test_unknown_ids() {
        assert_eq!(CommandId::from_id(8), Err(Error::UnknownCommand(8)));
        assert_eq!(CommandId::from_id(99), Err(Error::UnknownCommand(99)));
        assert_eq!(CommandId::from_name("hello"), None);
    }

    #[test]
    fn test_wire_offsets() {
        let base = 16;
        assert_eq!(CommandId::NewBlock.to_wire(base), Ok(23));
        assert_eq!(CommandId::from_wire(23, base).unwrap(), CommandId::NewBlock);
        assert_eq!(CommandId::from_wire(3, base), Err(Error::UnknownCommand(3)));
        // reserved slot inside eth's range
        assert_eq!(CommandId::from_wire(30, base), Err(Error::UnknownCommand(14)));
        // beyond eth's range altogether
        assert_eq!(CommandId::from_wire(40, base), Err(Error::UnknownCommand(40)));
    }

    #[test]
    fn test_wire_id_overflow() {
        assert_eq!(CommandId::NewBlock.to_wire(250), Err(Error::UnknownCommand(7)));
        assert_eq!(CommandId::NewBlock.to_wire(248), Ok(255));
        assert_eq!(CommandId::Status.to_wire(255), Ok(255));
    }

    #[test]
    fn test_structures() {
        assert_eq!(
            CommandId::Status.command().structure,
            Structure::Record(&STATUS_FIELDS)
        );
        assert_eq!(CommandId::GetTransactions.command().structure, Structure::Empty);
        assert_eq!(
            CommandId::Blocks.command().structure,
            Structure::CountableList(Sedes::Block)
        );
        assert_eq!(CommandId::NewBlock.name(), "newblock");
    }
}
