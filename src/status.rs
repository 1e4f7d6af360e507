use alloy_primitives::U256;

use crate::error::Result;
use crate::sedes::{Field, Record, Sedes, Value};
use crate::settings::ProtocolConfig;

pub const STATUS_FIELDS: [Field; 5] = [
    Field::new("eth_version", Sedes::BigEndianInt),
    Field::new("network_id", Sedes::BigEndianInt),
    Field::new("chain_difficulty", Sedes::Uint256),
    Field::new("chain_head_hash", Sedes::Binary),
    Field::new("genesis_hash", Sedes::Binary),
];

///
/// The handshake every peer sends first. Hashes are opaque here; their
/// length is not checked.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub eth_version: u64,
    pub network_id: u64,
    pub chain_difficulty: U256,
    pub chain_head_hash: Vec<u8>,
    pub genesis_hash: Vec<u8>,
}

impl Status {
    pub fn from_record(mut record: Record) -> Result<Status> {
        Ok(Status {
            eth_version: record.take_u64("eth_version")?,
            network_id: record.take_u64("network_id")?,
            chain_difficulty: record.take_uint256("chain_difficulty")?,
            chain_head_hash: record.take_bytes("chain_head_hash")?,
            genesis_hash: record.take_bytes("genesis_hash")?,
        })
    }

    /// Values in the order of [`STATUS_FIELDS`].
    pub fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Int(u128::from(self.eth_version)),
            Value::Int(u128::from(self.network_id)),
            Value::Uint256(self.chain_difficulty),
            Value::Bytes(self.chain_head_hash.clone()),
            Value::Bytes(self.genesis_hash.clone()),
        ]
    }

    /// Whether a remote status belongs to the same network and protocol.
    pub fn is_compatible(&self, protocol_config: &ProtocolConfig) -> bool {
        self.eth_version == protocol_config.eth_version
            && self.network_id == protocol_config.network_id
    }
}

///
/// Builds the local status for one session and remembers that it did.
///
/// Nothing stops `create` from being called twice; the session checks
/// [`StatusHandshake::sent`] before sending.
///
#[derive(Debug, Default)]
pub struct StatusHandshake {
    sent: bool,
}

impl StatusHandshake {
    pub fn new() -> Self {
        StatusHandshake { sent: false }
    }

    pub fn sent(&self) -> bool {
        self.sent
    }

    pub fn create(
        &mut self,
        protocol_config: &ProtocolConfig,
        chain_difficulty: U256,
        chain_head_hash: &[u8],
        genesis_hash: &[u8],
    ) -> Status {
        self.sent = true;
        Status {
            eth_version: protocol_config.eth_version,
            network_id: protocol_config.network_id,
            chain_difficulty,
            chain_head_hash: chain_head_hash.to_vec(),
            genesis_hash: genesis_hash.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rlp::RlpView;
    use crate::sedes::{deserialize_record, serialize_record};

    #[test]
    fn test_create_marks_sent() {
        let mut handshake = StatusHandshake::new();
        assert!(!handshake.sent());
        let status = handshake.create(
            &ProtocolConfig::default(),
            U256::from(1000u64),
            &[0xaa; 32],
            &[0xbb; 32],
        );
        assert!(handshake.sent());
        assert_eq!(status.eth_version, 60);
        assert_eq!(status.network_id, 99107);
        assert!(status.is_compatible(&ProtocolConfig::default()));
    }

    #[test]
    fn test_status_record_roundtrip() {
        for chain_difficulty in [U256::ZERO, U256::MAX] {
            let status = StatusHandshake::new().create(
                &ProtocolConfig::default(),
                chain_difficulty,
                &[],
                &[7; 3],
            );
            let encoded = serialize_record(&STATUS_FIELDS, &status.to_values())
                .unwrap()
                .serialize();
            let view = RlpView::new(&encoded).unwrap();
            let record = deserialize_record(&STATUS_FIELDS, view).unwrap();
            assert_eq!(Status::from_record(record).unwrap(), status);
        }
    }

    #[test]
    fn test_other_network_is_incompatible() {
        let protocol_config = ProtocolConfig {
            network_id: 1,
            ..ProtocolConfig::default()
        };
        let status = StatusHandshake::new().create(&protocol_config, U256::from(1u64), &[], &[]);
        assert!(!status.is_compatible(&ProtocolConfig::default()));
    }
}
