/*!
# Lazy List Decoder

Decodes a countable list element by element, straight off the wire bytes.
Nothing past the current element has been parsed when it is handed out.

Every `yield_every` elements the decoder gives the scheduler a turn
(`tokio::task::yield_now`) so one peer sending a ten thousand transaction list
cannot starve the other sessions sharing the runtime. A list that fits in a
single batch never yields.

A decoder can be given a shutdown receiver. It is polled at each yield point
that still has elements ahead of it; once the owning session has been torn
down the decode stops with [`Error::DecodeAborted`] and never resumes.
*/
use std::marker::PhantomData;

use futures::stream::{self, Stream};
use tokio::sync::broadcast::{self, error::TryRecvError};

use crate::error::{Error, Result};
use crate::rlp::{RlpListIter, RlpView};

/// Default number of elements decoded between two yields.
pub const YIELD_EVERY: usize = 10;

pub struct LazyListDecoder<'a, T, F>
where
    F: FnMut(RlpView<'a>) -> Result<T>,
{
    items: RlpListIter<'a>,
    decode: F,
    yield_every: usize,
    consumed: usize,
    yields: usize,
    pending_yield: bool,
    shutdown: Option<broadcast::Receiver<()>>,
    done: bool,
    _element: PhantomData<fn() -> T>,
}

impl<'a, T, F> LazyListDecoder<'a, T, F>
where
    F: FnMut(RlpView<'a>) -> Result<T>,
{
    /// `payload` must be exactly one encoded list.
    pub fn new(payload: &'a [u8], decode: F) -> Result<Self> {
        let items = RlpView::new(payload)?.iter()?;
        Ok(LazyListDecoder::from_items(items, decode))
    }

    pub fn from_items(items: RlpListIter<'a>, decode: F) -> Self {
        LazyListDecoder {
            items,
            decode,
            yield_every: YIELD_EVERY,
            consumed: 0,
            yields: 0,
            pending_yield: false,
            shutdown: None,
            done: false,
            _element: PhantomData,
        }
    }

    /// Values below 1 are treated as 1.
    pub fn with_yield_every(mut self, yield_every: usize) -> Self {
        self.yield_every = yield_every.max(1);
        self
    }

    pub fn with_shutdown(mut self, shutdown: broadcast::Receiver<()>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Elements decoded so far.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Times the decoder has suspended so far.
    pub fn yields(&self) -> usize {
        self.yields
    }

    ///
    /// Decode the next element. `None` once the list is exhausted or after any
    /// error has been returned.
    ///
    pub async fn next(&mut self) -> Option<Result<T>> {
        if self.done {
            return None;
        }
        if self.pending_yield {
            self.pending_yield = false;
            tokio::task::yield_now().await;
            self.yields += 1;
            if !self.items.is_empty() && self.is_shut_down() {
                return self.fail(Error::DecodeAborted);
            }
        }
        let view = match self.items.next() {
            None => {
                self.done = true;
                return None;
            }
            Some(Err(err)) => return self.fail(err.into()),
            Some(Ok(view)) => view,
        };
        match (self.decode)(view) {
            Ok(value) => {
                self.consumed += 1;
                // the last batch of a list that fits in one batch never yields
                if self.consumed % self.yield_every == 0
                    && (self.consumed > self.yield_every || !self.items.is_empty())
                {
                    self.pending_yield = true;
                }
                Some(Ok(value))
            }
            Err(err) => {
                let index = self.consumed;
                self.fail(err.in_field(&format!("element {}", index)))
            }
        }
    }

    ///
    /// Decode every remaining element. The first failure discards everything
    /// decoded up to that point.
    ///
    pub async fn decode_all(&mut self) -> Result<Vec<T>> {
        let mut values = vec![];
        while let Some(value) = self.next().await {
            values.push(value?);
        }
        Ok(values)
    }

    pub fn into_stream(self) -> impl Stream<Item = Result<T>> + 'a
    where
        T: 'a,
        F: 'a,
    {
        stream::unfold(self, |mut decoder| async move {
            let value = decoder.next().await?;
            Some((value, decoder))
        })
    }

    fn fail(&mut self, err: Error) -> Option<Result<T>> {
        self.done = true;
        self.pending_yield = false;
        Some(Err(err))
    }

    fn is_shut_down(&mut self) -> bool {
        match self.shutdown.as_mut() {
            // a closed or lagged channel means the session is already gone
            Some(shutdown) => !matches!(shutdown.try_recv(), Err(TryRecvError::Empty)),
            None => false,
        }
    }
}

/// Decode a whole countable list with the default cadence.
pub async fn decode_lazy<'a, T, F>(payload: &'a [u8], decode: F) -> Result<Vec<T>>
where
    F: FnMut(RlpView<'a>) -> Result<T>,
{
    LazyListDecoder::new(payload, decode)?.decode_all().await
}
