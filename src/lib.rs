/*!
# eth wire

The command layer of the eth sub-protocol, version 60: the catalogue of
messages peers exchange, how each one is laid out in RLP, and the transient
block a peer's block lives in until the chain has had a look at it.

Large lists (transactions, hashes, blocks) are decoded lazily and yield to
the tokio scheduler every few elements so one big message cannot hold up every
other peer sharing the runtime.

# Usage

```rust,ignore
let mut session = EthSession::new("peer", ProtocolConfig::load(None)?, 16, handler);
let difficulty = U256::from(131_072u64);
let (wire_id, payload) = session.send_status(difficulty, &head, &genesis)?.unwrap();
// ... hand (wire_id, payload) to the transport, and feed inbound messages in:
session.receive(wire_id, &payload).await?;
```

The transport, chain state and validation all live outside this crate.
*/
#[macro_use]
extern crate lazy_static;

pub mod commands;
pub mod crypto;
pub mod dispatch;
pub mod error;
pub mod header;
pub mod lazy;
pub mod messages;
pub mod rlp;
pub mod sedes;
pub mod session;
pub mod settings;
pub mod status;
pub mod test_utilities;
pub mod transaction;
pub mod transient_block;

pub use alloy_primitives::U256;
pub use commands::CommandId;
pub use dispatch::Dispatcher;
pub use error::{Error, Result};
pub use messages::EthMessage;
pub use session::{EthSession, ProtocolHandler};
pub use settings::ProtocolConfig;
pub use transient_block::{BlockFactory, TransientBlock};
