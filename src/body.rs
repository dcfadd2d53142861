//! Response-body streams and the duplicate-at-fork-point primitive.
//!
//! A network body can be consumed only once. Whenever a response is handed
//! to two consumers — the caller and the cache writer — the stream is split
//! with [`tee`] at the fork point, and each half sees every chunk.
//!
//! # Usage
//!
//! Applied by [`FetchResponse::fork`](crate::fetch::FetchResponse::fork)
//! whenever a strategy snapshots a live response before returning it.

use std::pin::Pin;

use bytes::{Bytes, BytesMut};
use futures_util::{Stream, StreamExt};
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::{Result, VordrError};

/// A body as a stream of chunks.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Wrap already-buffered bytes as a single-chunk stream.
pub fn once(bytes: Bytes) -> ByteStream {
    Box::pin(futures_util::stream::iter([Ok(bytes)]))
}

/// Drain a stream into a contiguous buffer.
pub async fn collect(mut stream: ByteStream) -> Result<Bytes> {
    let mut buf = BytesMut::new();
    while let Some(chunk) = stream.next().await {
        buf.extend_from_slice(&chunk?);
    }
    Ok(buf.freeze())
}

/// Duplicate a stream into two independent halves.
///
/// Spawns a driver task that reads from `inner` and forwards every chunk
/// to both halves. `Bytes` chunks clone by reference count, so no payload
/// is copied. The channels are unbounded: a consumer that fully collects
/// one half before reading the other must not stall the driver. Dropping
/// one half stops delivery to that half only; the driver keeps feeding the
/// survivor until the source ends.
///
/// Stream errors are duplicated by message, since the underlying error is
/// not `Clone`.
///
/// # Panics
///
/// Requires a tokio runtime context (called within an async fn).
pub fn tee(inner: ByteStream) -> (ByteStream, ByteStream) {
    let (tx_a, rx_a) = tokio::sync::mpsc::unbounded_channel();
    let (tx_b, rx_b) = tokio::sync::mpsc::unbounded_channel();

    tokio::spawn(async move {
        let mut inner = inner;
        let mut a_open = true;
        let mut b_open = true;
        while let Some(item) = inner.next().await {
            let (for_a, for_b) = duplicate(item);
            if a_open && tx_a.send(for_a).is_err() {
                a_open = false;
            }
            if b_open && tx_b.send(for_b).is_err() {
                b_open = false;
            }
            if !a_open && !b_open {
                break;
            }
        }
    });

    (
        Box::pin(UnboundedReceiverStream::new(rx_a)),
        Box::pin(UnboundedReceiverStream::new(rx_b)),
    )
}

fn duplicate(item: Result<Bytes>) -> (Result<Bytes>, Result<Bytes>) {
    match item {
        Ok(bytes) => (Ok(bytes.clone()), Ok(bytes)),
        Err(err) => {
            let msg = err.to_string();
            (
                Err(VordrError::Network(msg.clone())),
                Err(VordrError::Network(msg)),
            )
        }
    }
}
