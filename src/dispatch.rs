/*!
# Command Dispatcher

Routes `(command id, payload)` to the codec the command's [`Structure`]
names:

- records are decoded in one synchronous pass
- countable lists go through the [`LazyListDecoder`], yielding to the
  scheduler as they go
- `gettransactions` carries nothing and its payload is not looked at

Nothing is logged here; callers decide what a failure means.
*/
use tokio::sync::broadcast;

use crate::commands::{Command, CommandId, Structure};
use crate::error::Result;
use crate::lazy::LazyListDecoder;
use crate::messages::EthMessage;
use crate::rlp::RlpView;
use crate::sedes::{deserialize_record, Record, Value};
use crate::settings::ProtocolConfig;

/// Output of the generic decode, before it is given a message type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    Empty,
    Record(Record),
    List(Vec<Value>),
}

///
/// Decode `payload` according to `command`'s structure. Lists are decoded
/// lazily with the given cadence and abort as soon as `shutdown` fires.
///
pub async fn decode_payload(
    command: &Command,
    payload: &[u8],
    yield_every: usize,
    shutdown: Option<broadcast::Receiver<()>>,
) -> Result<Decoded> {
    match command.structure {
        Structure::Empty => Ok(Decoded::Empty),
        Structure::Record(fields) => {
            let record = deserialize_record(fields, RlpView::new(payload)?)?;
            Ok(Decoded::Record(record))
        }
        Structure::CountableList(sedes) => {
            let mut decoder = LazyListDecoder::new(payload, |view| sedes.deserialize(view))?
                .with_yield_every(yield_every);
            if let Some(shutdown) = shutdown {
                decoder = decoder.with_shutdown(shutdown);
            }
            Ok(Decoded::List(decoder.decode_all().await?))
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    protocol_config: ProtocolConfig,
}

impl Dispatcher {
    pub fn new(protocol_config: ProtocolConfig) -> Self {
        Dispatcher { protocol_config }
    }

    pub fn protocol_config(&self) -> &ProtocolConfig {
        &self.protocol_config
    }

    /// Decode one inbound message. `id` is relative to eth's own id space.
    pub async fn dispatch(&self, id: u8, payload: &[u8]) -> Result<EthMessage> {
        self.dispatch_with_shutdown(id, payload, None).await
    }

    pub async fn dispatch_with_shutdown(
        &self,
        id: u8,
        payload: &[u8],
        shutdown: Option<broadcast::Receiver<()>>,
    ) -> Result<EthMessage> {
        let id = CommandId::from_id(id)?;
        let decoded = decode_payload(
            id.command(),
            payload,
            self.protocol_config.yield_every,
            shutdown,
        )
        .await?;
        EthMessage::from_decoded(id, decoded)
    }

    /// Returns the eth relative command id together with the payload.
    pub fn encode(&self, message: &EthMessage) -> Result<(CommandId, Vec<u8>)> {
        Ok((message.command_id(), message.serialize()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use alloy_primitives::U256;
    use crate::rlp::RlpItem;
    use crate::status::StatusHandshake;
    use crate::test_utilities::mocks::{make_mock_block, make_mock_transaction};

    #[tokio::test]
    async fn test_unknown_command() {
        let dispatcher = Dispatcher::default();
        assert_eq!(
            dispatcher.dispatch(99, &[0xc0]).await,
            Err(Error::UnknownCommand(99))
        );
        assert_eq!(
            dispatcher.dispatch(8, &[0xc0]).await,
            Err(Error::UnknownCommand(8))
        );
    }

    #[tokio::test]
    async fn test_status_roundtrip() {
        let dispatcher = Dispatcher::default();
        let status = StatusHandshake::new().create(
            dispatcher.protocol_config(),
            U256::from(1000u64),
            &[0xaa; 32],
            &[0xbb; 32],
        );
        let message = EthMessage::Status(status);
        let (id, payload) = dispatcher.encode(&message).unwrap();
        assert_eq!(id, CommandId::Status);
        assert_eq!(dispatcher.dispatch(id as u8, &payload).await.unwrap(), message);
    }

    #[tokio::test]
    async fn test_status_wrong_arity() {
        let payload = RlpItem::List(vec![RlpItem::uint(60), RlpItem::uint(1)]).serialize();
        let err = Dispatcher::default().dispatch(0, &payload).await.unwrap_err();
        assert!(matches!(err, Error::MalformedPayload(_)));
    }

    #[tokio::test]
    async fn test_gettransactions_is_a_no_op() {
        let dispatcher = Dispatcher::default();
        assert_eq!(
            dispatcher.dispatch(1, &[]).await.unwrap(),
            EthMessage::GetTransactions
        );
    }

    #[tokio::test]
    async fn test_getblockhashes() {
        let dispatcher = Dispatcher::default();
        let message = EthMessage::GetBlockHashes {
            child_block_hash: vec![0x11; 32],
            count: 2048,
        };
        let payload = message.serialize().unwrap();
        assert_eq!(dispatcher.dispatch(3, &payload).await.unwrap(), message);
    }

    #[tokio::test]
    async fn test_transactions_and_blocks() {
        let dispatcher = Dispatcher::default();
        let transactions: Vec<_> = (0..12).map(make_mock_transaction).collect();
        let message = EthMessage::Transactions(transactions);
        let payload = message.serialize().unwrap();
        assert_eq!(dispatcher.dispatch(2, &payload).await.unwrap(), message);

        let blocks =
            EthMessage::Blocks(vec![make_mock_block(3, 2, 1), make_mock_block(4, 0, 0)]);
        let payload = blocks.serialize().unwrap();
        assert_eq!(dispatcher.dispatch(6, &payload).await.unwrap(), blocks);
    }

    #[tokio::test]
    async fn test_newblock_arity() {
        let dispatcher = Dispatcher::default();
        let block = make_mock_block(8, 1, 0);
        let message = EthMessage::NewBlock {
            block: block.clone(),
            chain_difficulty: U256::from(5_000_000u64),
        };
        let payload = message.serialize().unwrap();
        assert_eq!(dispatcher.dispatch(7, &payload).await.unwrap(), message);

        let three = RlpItem::List(vec![
            block.to_rlp_item(),
            RlpItem::uint(5_000_000),
            RlpItem::uint(1),
        ])
        .serialize();
        let err = dispatcher.dispatch(7, &three).await.unwrap_err();
        assert!(matches!(err, Error::MalformedPayload(_)));
    }

    #[tokio::test]
    async fn test_shutdown_aborts_list_decode() {
        let dispatcher = Dispatcher::default();
        let payload = EthMessage::GetBlocks(vec![vec![1; 32]; 40])
            .serialize()
            .unwrap();
        let (shutdown_sender, shutdown_receiver) = broadcast::channel(1);
        shutdown_sender.send(()).unwrap();
        let result = dispatcher
            .dispatch_with_shutdown(5, &payload, Some(shutdown_receiver))
            .await;
        assert_eq!(result, Err(Error::DecodeAborted));
    }
}
