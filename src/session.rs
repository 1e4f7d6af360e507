/*!
# Session

Per-peer glue between the transport and the application. The transport hands
over `(wire id, payload)` in arrival order; [`EthSession::receive`] decodes
each message fully before it returns, so callbacks see messages in exactly the
order they arrived.

Outbound messages are produced as `(wire id, payload)` pairs for the transport
to frame.
*/
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use alloy_primitives::U256;
use tokio::sync::broadcast;
use tracing::{event, Level};

use crate::commands::{CommandId, PROTOCOL_NAME};
use crate::dispatch::Dispatcher;
use crate::error::{Error, Result};
use crate::messages::EthMessage;
use crate::settings::ProtocolConfig;
use crate::status::{Status, StatusHandshake};
use crate::transaction::Transaction;
use crate::transient_block::TransientBlock;

///
/// Application callbacks, one per command. Every method defaults to doing
/// nothing so a handler only implements what it cares about.
///
#[allow(unused_variables)]
pub trait ProtocolHandler {
    fn on_status(&mut self, peer: &str, status: Status) {}

    fn on_get_transactions(&mut self, peer: &str) {}

    fn on_transactions(&mut self, peer: &str, transactions: Vec<Transaction>) {}

    fn on_get_block_hashes(&mut self, peer: &str, child_block_hash: Vec<u8>, count: u64) {}

    fn on_block_hashes(&mut self, peer: &str, block_hashes: Vec<Vec<u8>>) {}

    fn on_get_blocks(&mut self, peer: &str, block_hashes: Vec<Vec<u8>>) {}

    fn on_blocks(&mut self, peer: &str, blocks: Vec<TransientBlock>) {}

    fn on_new_block(&mut self, peer: &str, block: TransientBlock, chain_difficulty: U256) {}
}

/// Tears a session down from outside, even while it is mid-decode.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    sender: broadcast::Sender<()>,
    closed: Arc<AtomicBool>,
}

impl ShutdownHandle {
    fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        ShutdownHandle {
            sender,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn shutdown(&self) {
        self.closed.store(true, Ordering::SeqCst);
        // no receivers just means nothing is being decoded right now
        let _ = self.sender.send(());
    }

    pub fn is_shut_down(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn subscribe(&self) -> broadcast::Receiver<()> {
        self.sender.subscribe()
    }
}

pub struct EthSession<H: ProtocolHandler> {
    peer: String,
    dispatcher: Dispatcher,
    handler: H,
    status: StatusHandshake,
    remote_status: Option<Status>,
    base: u8,
    shutdown: ShutdownHandle,
}

impl<H: ProtocolHandler> EthSession<H> {
    ///
    /// `base` is the wire id of eth's first command within the peer
    /// connection's multiplexed id space.
    ///
    pub fn new(
        peer: impl Into<String>,
        protocol_config: ProtocolConfig,
        base: u8,
        handler: H,
    ) -> Self {
        EthSession {
            peer: peer.into(),
            dispatcher: Dispatcher::new(protocol_config),
            handler,
            status: StatusHandshake::new(),
            remote_status: None,
            base,
            shutdown: ShutdownHandle::new(),
        }
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn remote_status(&self) -> Option<&Status> {
        self.remote_status.as_ref()
    }

    pub fn status_sent(&self) -> bool {
        self.status.sent()
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    pub fn teardown(&self) {
        event!(Level::DEBUG, "{} session with {} torn down", PROTOCOL_NAME, self.peer);
        self.shutdown.shutdown();
    }

    ///
    /// Decode one inbound message and hand it to the handler.
    ///
    /// Protocol violations are returned so the transport can disconnect the
    /// peer. A decode cut short by teardown is dropped and returns `Ok`.
    ///
    pub async fn receive(&mut self, wire_id: u8, payload: &[u8]) -> Result<()> {
        // subscribe before checking, so a teardown in between is still seen
        let shutdown = self.shutdown.subscribe();
        if self.shutdown.is_shut_down() {
            event!(
                Level::DEBUG,
                "dropping message {} from {} after teardown",
                wire_id,
                self.peer
            );
            return Ok(());
        }
        let message = match CommandId::from_wire(wire_id, self.base) {
            Ok(id) => {
                event!(
                    Level::DEBUG,
                    "received {} from {} ({} bytes)",
                    id.name(),
                    self.peer,
                    payload.len()
                );
                self.dispatcher
                    .dispatch_with_shutdown(id as u8, payload, Some(shutdown))
                    .await
            }
            Err(err) => Err(err),
        };
        let message = match message {
            Ok(message) => message,
            Err(Error::DecodeAborted) => {
                event!(
                    Level::DEBUG,
                    "decode of message {} from {} aborted",
                    wire_id,
                    self.peer
                );
                return Ok(());
            }
            Err(err) => {
                event!(Level::WARN, "protocol violation from {}: {}", self.peer, err);
                return Err(err);
            }
        };
        if let Some(count) = element_count(&message) {
            if count > self.dispatcher.protocol_config().yield_every {
                event!(
                    Level::TRACE,
                    "decoded {} elements from {} across yields",
                    count,
                    self.peer
                );
            }
        }
        self.deliver(message);
        Ok(())
    }

    fn deliver(&mut self, message: EthMessage) {
        let peer = self.peer.as_str();
        match message {
            EthMessage::Status(status) => {
                if !status.is_compatible(self.dispatcher.protocol_config()) {
                    event!(
                        Level::WARN,
                        "{} announced eth version {} on network {}",
                        peer,
                        status.eth_version,
                        status.network_id
                    );
                }
                self.remote_status = Some(status.clone());
                self.handler.on_status(peer, status);
            }
            EthMessage::GetTransactions => self.handler.on_get_transactions(peer),
            EthMessage::Transactions(transactions) => {
                self.handler.on_transactions(peer, transactions)
            }
            EthMessage::GetBlockHashes {
                child_block_hash,
                count,
            } => self
                .handler
                .on_get_block_hashes(peer, child_block_hash, count),
            EthMessage::BlockHashes(hashes) => self.handler.on_block_hashes(peer, hashes),
            EthMessage::GetBlocks(hashes) => self.handler.on_get_blocks(peer, hashes),
            EthMessage::Blocks(blocks) => self.handler.on_blocks(peer, blocks),
            EthMessage::NewBlock {
                block,
                chain_difficulty,
            } => self.handler.on_new_block(peer, block, chain_difficulty),
        }
    }

    ///
    /// Build the local status. Returns `None` if it has already been sent on
    /// this session.
    ///
    pub fn send_status(
        &mut self,
        chain_difficulty: U256,
        chain_head_hash: &[u8],
        genesis_hash: &[u8],
    ) -> Result<Option<(u8, Vec<u8>)>> {
        if self.status.sent() {
            event!(Level::DEBUG, "status already sent to {}", self.peer);
            return Ok(None);
        }
        let status = self.status.create(
            self.dispatcher.protocol_config(),
            chain_difficulty,
            chain_head_hash,
            genesis_hash,
        );
        self.send(&EthMessage::Status(status)).map(Some)
    }

    pub fn send(&self, message: &EthMessage) -> Result<(u8, Vec<u8>)> {
        let (id, payload) = self.dispatcher.encode(message)?;
        event!(Level::DEBUG, "sending {} to {}", id.name(), self.peer);
        Ok((id.to_wire(self.base)?, payload))
    }

    /// One getblocks per `max_getblocks_count` hashes.
    pub fn request_blocks(&self, block_hashes: &[Vec<u8>]) -> Result<Vec<(u8, Vec<u8>)>> {
        block_hashes
            .chunks(self.dispatcher.protocol_config().max_getblocks_count)
            .map(|chunk| self.send(&EthMessage::GetBlocks(chunk.to_vec())))
            .collect()
    }

    pub fn request_block_hashes(
        &self,
        child_block_hash: &[u8],
        count: u64,
    ) -> Result<(u8, Vec<u8>)> {
        let cap = self.dispatcher.protocol_config().max_getblockhashes_count as u64;
        self.send(&EthMessage::GetBlockHashes {
            child_block_hash: child_block_hash.to_vec(),
            count: count.min(cap),
        })
    }
}

fn element_count(message: &EthMessage) -> Option<usize> {
    match message {
        EthMessage::Transactions(transactions) => Some(transactions.len()),
        EthMessage::BlockHashes(hashes) | EthMessage::GetBlocks(hashes) => Some(hashes.len()),
        EthMessage::Blocks(blocks) => Some(blocks.len()),
        _ => None,
    }
}
