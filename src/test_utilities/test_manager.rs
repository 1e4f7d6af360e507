use alloy_primitives::U256;

use crate::error::Result;
use crate::messages::EthMessage;
use crate::session::{EthSession, ProtocolHandler};
use crate::settings::ProtocolConfig;
use crate::status::Status;
use crate::transaction::Transaction;
use crate::transient_block::TransientBlock;

/// A message as it reached the handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Received {
    pub peer: String,
    pub message: EthMessage,
}

impl Received {
    pub fn new(peer: &str, message: EthMessage) -> Self {
        Received {
            peer: peer.to_string(),
            message,
        }
    }
}

/// Records every callback, in order.
#[derive(Debug, Default)]
pub struct RecordingHandler {
    pub received: Vec<Received>,
}

impl RecordingHandler {
    fn record(&mut self, peer: &str, message: EthMessage) {
        self.received.push(Received::new(peer, message));
    }
}

impl ProtocolHandler for RecordingHandler {
    fn on_status(&mut self, peer: &str, status: Status) {
        self.record(peer, EthMessage::Status(status));
    }

    fn on_get_transactions(&mut self, peer: &str) {
        self.record(peer, EthMessage::GetTransactions);
    }

    fn on_transactions(&mut self, peer: &str, transactions: Vec<Transaction>) {
        self.record(peer, EthMessage::Transactions(transactions));
    }

    fn on_get_block_hashes(&mut self, peer: &str, child_block_hash: Vec<u8>, count: u64) {
        self.record(
            peer,
            EthMessage::GetBlockHashes {
                child_block_hash,
                count,
            },
        );
    }

    fn on_block_hashes(&mut self, peer: &str, block_hashes: Vec<Vec<u8>>) {
        self.record(peer, EthMessage::BlockHashes(block_hashes));
    }

    fn on_get_blocks(&mut self, peer: &str, block_hashes: Vec<Vec<u8>>) {
        self.record(peer, EthMessage::GetBlocks(block_hashes));
    }

    fn on_blocks(&mut self, peer: &str, blocks: Vec<TransientBlock>) {
        self.record(peer, EthMessage::Blocks(blocks));
    }

    fn on_new_block(&mut self, peer: &str, block: TransientBlock, chain_difficulty: U256) {
        self.record(
            peer,
            EthMessage::NewBlock {
                block,
                chain_difficulty,
            },
        );
    }
}

///
/// Two ends of a connection. Whatever one side sends is fed straight into the
/// other side's session.
///
pub struct TestManager {
    pub local: EthSession<RecordingHandler>,
    pub remote: EthSession<RecordingHandler>,
}

impl TestManager {
    pub fn new(protocol_config: ProtocolConfig, base: u8) -> Self {
        TestManager {
            local: EthSession::new(
                "remote",
                protocol_config.clone(),
                base,
                RecordingHandler::default(),
            ),
            remote: EthSession::new("local", protocol_config, base, RecordingHandler::default()),
        }
    }

    /// Send `message` from the local end and let the remote end receive it.
    pub async fn deliver(&mut self, message: &EthMessage) -> Result<()> {
        let (wire_id, payload) = self.local.send(message)?;
        self.remote.receive(wire_id, &payload).await
    }

    /// Both ends exchange status, as on a new connection.
    pub async fn handshake(
        &mut self,
        chain_difficulty: U256,
        head: &[u8],
        genesis: &[u8],
    ) -> Result<()> {
        let sent = self.local.send_status(chain_difficulty, head, genesis)?;
        if let Some((wire_id, payload)) = sent {
            self.remote.receive(wire_id, &payload).await?;
        }
        let sent = self.remote.send_status(chain_difficulty, head, genesis)?;
        if let Some((wire_id, payload)) = sent {
            self.local.receive(wire_id, &payload).await?;
        }
        Ok(())
    }

    pub fn received_by_remote(&self) -> &[Received] {
        &self.remote.handler().received
    }
}
