use thiserror::Error;

use crate::rlp::RlpError;

pub type Result<T> = std::result::Result<T, Error>;

///
/// Failures surfaced by the command layer. Every variant is fatal for the
/// message that produced it; nothing here is retried or partially recovered.
///
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// command id outside the catalogue (or a reserved slot)
    #[error("unknown command id {0}")]
    UnknownCommand(u8),

    /// structural mismatch between the payload and the command structure
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// a lazy decode was abandoned because its session was torn down
    #[error("decode aborted by session teardown")]
    DecodeAborted,

    /// a value handed to an encoder does not fit the declared field type
    #[error("cannot serialize: {0}")]
    Serialization(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn malformed(reason: impl Into<String>) -> Error {
        Error::MalformedPayload(reason.into())
    }

    /// Prefix a malformed-payload reason with the field it was found in.
    pub fn in_field(self, field: &str) -> Error {
        match self {
            Error::MalformedPayload(reason) => {
                Error::MalformedPayload(format!("{}: {}", field, reason))
            }
            other => other,
        }
    }

    /// Protocol violations should get the peer disconnected. An aborted
    /// decode is simply dropped.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(self, Error::UnknownCommand(_) | Error::MalformedPayload(_))
    }
}

impl From<RlpError> for Error {
    fn from(err: RlpError) -> Self {
        Error::MalformedPayload(err.to_string())
    }
}
