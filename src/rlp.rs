/*!
# Primitive Codec

Recursive length prefix items as spoken by eth peers, on top of `alloy-rlp`.

`alloy-rlp` does the header and integer work and is strict about it:
non-canonical length prefixes, single bytes wrapped in a string header and
integers with leading zeros are all rejected. This module adds the pieces the
command layer needs on top:

- [`RlpItem`], an owned item tree for building payloads
- [`RlpView`], a borrowed view of one encoded item that refuses trailing bytes
- [`RlpListIter`], which walks a list one child header at a time so a consumer
  can start on the first element before the rest has been looked at
*/
use alloy_primitives::U256;
use alloy_rlp::{BufMut, Decodable, Encodable, Header};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RlpError {
    #[error("{0}")]
    Codec(#[from] alloy_rlp::Error),
    #[error("trailing bytes after item")]
    TrailingBytes,
    #[error("expected a list, found a byte string")]
    ExpectedList,
    #[error("expected a byte string, found a list")]
    ExpectedBytes,
}

/// An item tree to be encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RlpItem {
    Bytes(Vec<u8>),
    List(Vec<RlpItem>),
    /// an item that is already encoded, embedded as is
    Encoded(Vec<u8>),
}

impl RlpItem {
    pub fn bytes(data: impl Into<Vec<u8>>) -> RlpItem {
        RlpItem::Bytes(data.into())
    }

    /// Minimal big-endian integer, zero being the empty string.
    pub fn uint(value: u128) -> RlpItem {
        RlpItem::Encoded(alloy_rlp::encode(value))
    }

    pub fn uint256(value: U256) -> RlpItem {
        RlpItem::Encoded(alloy_rlp::encode(value))
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.length());
        self.encode(&mut out);
        out
    }

    fn payload_length(items: &[RlpItem]) -> usize {
        items.iter().map(Encodable::length).sum()
    }
}

impl Encodable for RlpItem {
    fn encode(&self, out: &mut dyn BufMut) {
        match self {
            RlpItem::Bytes(data) => data.as_slice().encode(out),
            RlpItem::List(items) => {
                Header {
                    list: true,
                    payload_length: RlpItem::payload_length(items),
                }
                .encode(out);
                for item in items {
                    item.encode(out);
                }
            }
            RlpItem::Encoded(raw) => out.put_slice(raw),
        }
    }

    fn length(&self) -> usize {
        match self {
            RlpItem::Bytes(data) => data.as_slice().length(),
            RlpItem::List(items) => {
                let payload_length = RlpItem::payload_length(items);
                payload_length + alloy_rlp::length_of_length(payload_length)
            }
            RlpItem::Encoded(raw) => raw.len(),
        }
    }
}

pub fn encode(item: &RlpItem) -> Vec<u8> {
    item.serialize()
}

/// Decode a complete item tree. The input must hold exactly one item.
pub fn decode(bytes: &[u8]) -> Result<RlpItem, RlpError> {
    RlpView::new(bytes)?.to_item()
}

/// Wrap a concatenation of already-encoded items in a list header.
pub fn encode_list_payload(payload: &[u8]) -> Vec<u8> {
    let header = Header {
        list: true,
        payload_length: payload.len(),
    };
    let mut out = Vec::with_capacity(header.length() + payload.len());
    header.encode(&mut out);
    out.extend_from_slice(payload);
    out
}

///
/// A borrowed view of a single encoded item.
///
/// Only the item's own header is decoded on construction. Children of a list
/// are decoded when they are iterated.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RlpView<'a> {
    raw: &'a [u8],
    list: bool,
    header_len: usize,
}

impl<'a> RlpView<'a> {
    /// View over `bytes`, which must contain exactly one item.
    pub fn new(bytes: &'a [u8]) -> Result<RlpView<'a>, RlpError> {
        let (view, rest) = RlpView::split_first(bytes)?;
        if !rest.is_empty() {
            return Err(RlpError::TrailingBytes);
        }
        Ok(view)
    }

    fn split_first(bytes: &'a [u8]) -> Result<(RlpView<'a>, &'a [u8]), RlpError> {
        let mut payload = bytes;
        let header = Header::decode(&mut payload)?;
        let header_len = bytes.len() - payload.len();
        let total = header_len
            .checked_add(header.payload_length)
            .filter(|total| *total <= bytes.len())
            .ok_or(alloy_rlp::Error::InputTooShort)?;
        let (raw, rest) = bytes.split_at(total);
        Ok((
            RlpView {
                raw,
                list: header.list,
                header_len,
            },
            rest,
        ))
    }

    pub fn is_list(&self) -> bool {
        self.list
    }

    /// The complete encoding of this item, header included.
    pub fn as_raw(&self) -> &'a [u8] {
        self.raw
    }

    pub fn data(&self) -> Result<&'a [u8], RlpError> {
        if self.list {
            return Err(RlpError::ExpectedBytes);
        }
        Ok(&self.raw[self.header_len..])
    }

    pub fn as_uint(&self) -> Result<u128, RlpError> {
        self.decode_as::<u128>()
    }

    pub fn as_uint256(&self) -> Result<U256, RlpError> {
        self.decode_as::<U256>()
    }

    fn decode_as<T: Decodable>(&self) -> Result<T, RlpError> {
        self.data()?;
        let mut raw = self.raw;
        Ok(T::decode(&mut raw)?)
    }

    pub fn iter(&self) -> Result<RlpListIter<'a>, RlpError> {
        if !self.list {
            return Err(RlpError::ExpectedList);
        }
        Ok(RlpListIter {
            rest: &self.raw[self.header_len..],
        })
    }

    /// Number of direct children. Walks the child headers only.
    pub fn item_count(&self) -> Result<usize, RlpError> {
        self.iter()?
            .try_fold(0usize, |count, item| item.map(|_| count + 1))
    }

    pub fn to_item(&self) -> Result<RlpItem, RlpError> {
        if self.list {
            let items = self
                .iter()?
                .map(|child| child.and_then(|view| view.to_item()))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(RlpItem::List(items))
        } else {
            Ok(RlpItem::Bytes(self.data()?.to_vec()))
        }
    }
}

/// Walks the children of a list one header at a time.
#[derive(Debug, Clone)]
pub struct RlpListIter<'a> {
    rest: &'a [u8],
}

impl<'a> RlpListIter<'a> {
    /// True once every child has been handed out.
    pub fn is_empty(&self) -> bool {
        self.rest.is_empty()
    }
}

impl<'a> Iterator for RlpListIter<'a> {
    type Item = Result<RlpView<'a>, RlpError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        match RlpView::split_first(self.rest) {
            Ok((view, rest)) => {
                self.rest = rest;
                Some(Ok(view))
            }
            Err(err) => {
                self.rest = &[];
                Some(Err(err))
            }
        }
    }
}
