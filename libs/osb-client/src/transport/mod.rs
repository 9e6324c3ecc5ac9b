//! The "send a request, get a response" seam between the protocol layer
//! and the HTTP stack.

mod http_client;

use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};

use crate::error::TransportError;

pub use http_client::ReqwestTransport;

/// A fully shaped broker request. Headers are final; the transport adds
/// nothing but what the wire protocol needs.
#[derive(Debug, Clone)]
pub struct BrokerRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

/// A buffered broker response.
#[derive(Debug, Clone)]
pub struct BrokerResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl BrokerResponse {
    #[must_use]
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }
}

/// Executes broker requests.
///
/// Implementations own connection pooling, TLS and timeouts. They must not
/// interpret status codes; any response the broker produced is `Ok`.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// # Errors
    /// Returns [`TransportError`] when no HTTP response was received.
    async fn send(&self, request: BrokerRequest) -> Result<BrokerResponse, TransportError>;
}
