//! Network seam: the [`Fetcher`] trait and the live [`FetchResponse`].
//!
//! Strategies talk to the network only through [`Fetcher`], so tests can
//! substitute programmable fetchers and the worker stays host-agnostic.
//! [`HttpFetcher`] is the default implementation over a shared
//! [`reqwest::Client`].

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;

use crate::body::{self, ByteStream};
use crate::types::{FetchRequest, Method, ResponseSnapshot};
use crate::{Result, VordrError};

/// A live response whose body may still be in flight.
///
/// Unlike a [`ResponseSnapshot`], the body is single-consumption: reading
/// it consumes the response. [`FetchResponse::fork`] duplicates it at the
/// fork point when two consumers need it.
pub struct FetchResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    body: ByteStream,
}

impl FetchResponse {
    /// Wrap a streaming network body.
    pub fn streaming(status: u16, headers: Vec<(String, String)>, body: ByteStream) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Build a response with an already-buffered body.
    pub fn buffered(status: u16, headers: Vec<(String, String)>, body: Bytes) -> Self {
        Self::streaming(status, headers, body::once(body))
    }

    /// Replay a cached snapshot as a live response.
    pub fn from_snapshot(snapshot: ResponseSnapshot) -> Self {
        Self::buffered(snapshot.status, snapshot.headers, snapshot.body)
    }

    /// Whether the status is in the 2xx range.
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Consume the response, draining the body into a buffer.
    pub async fn bytes(self) -> Result<Bytes> {
        body::collect(self.body).await
    }

    /// Consume the response into an immutable, replayable snapshot.
    pub async fn into_snapshot(self) -> Result<ResponseSnapshot> {
        let status = self.status;
        let headers = self.headers;
        let body = body::collect(self.body).await?;
        Ok(ResponseSnapshot {
            status,
            headers,
            body,
        })
    }

    /// Duplicate this response into two independently-consumable copies.
    ///
    /// Status and headers are cloned; the body stream is split with
    /// [`body::tee`] so each copy sees every chunk.
    pub fn fork(self) -> (Self, Self) {
        let (left, right) = body::tee(self.body);
        (
            Self::streaming(self.status, self.headers.clone(), left),
            Self::streaming(self.status, self.headers, right),
        )
    }
}

impl std::fmt::Debug for FetchResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchResponse")
            .field("status", &self.status)
            .field("headers", &self.headers.len())
            .finish()
    }
}

/// The network as seen by the strategy engine.
///
/// One call per intercepted request attempt; implementations must not
/// retry internally. Timeout behaviour is whatever the underlying client
/// provides — no additional wrapper is applied here.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse>;
}

/// Default [`Fetcher`] over a shared [`reqwest::Client`].
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    /// Reuse an existing client (connection pool sharing).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Head => reqwest::Method::HEAD,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
            Method::Options => reqwest::Method::OPTIONS,
            Method::Patch => reqwest::Method::PATCH,
        };

        let response = self
            .client
            .request(method, request.url.clone())
            .send()
            .await?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| VordrError::Network(e.to_string())));

        Ok(FetchResponse::streaming(status, headers, Box::pin(body)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn snapshot_round_trips_through_live_response() {
        let snapshot = ResponseSnapshot {
            status: 200,
            headers: vec![("content-type".into(), "text/css".into())],
            body: Bytes::from("body{margin:0}"),
        };
        let replayed = FetchResponse::from_snapshot(snapshot.clone());
        assert!(replayed.ok());
        let captured = replayed.into_snapshot().await.unwrap();
        assert_eq!(captured.status, snapshot.status);
        assert_eq!(captured.body, snapshot.body);
    }

    #[tokio::test]
    async fn fork_yields_two_identical_copies() {
        let response = FetchResponse::buffered(200, vec![], Bytes::from("payload"));
        let (live, copy) = response.fork();
        assert_eq!(live.bytes().await.unwrap(), Bytes::from("payload"));
        assert_eq!(copy.bytes().await.unwrap(), Bytes::from("payload"));
    }
}
