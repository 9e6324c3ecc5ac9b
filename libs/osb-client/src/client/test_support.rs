//! Recording transport double for handler tests.

use std::collections::HashMap;
use std::sync::Arc;

use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use parking_lot::Mutex;
use serde_json::Value;

use super::OsbClient;
use crate::config::ClientConfiguration;
use crate::error::TransportError;
use crate::transport::{BrokerRequest, BrokerResponse, Transport};
use crate::version::ApiVersion;

pub(crate) const TEST_URL: &str = "https://broker.example.com";

/// Replies with a fixed reaction and keeps every request it was handed.
pub(crate) struct RecordingTransport {
    reaction: Result<BrokerResponse, TransportError>,
    requests: Mutex<Vec<BrokerRequest>>,
}

impl RecordingTransport {
    pub(crate) fn respond(status: u16, body: &'static str) -> Arc<Self> {
        Self::respond_with_headers(status, body, &[])
    }

    pub(crate) fn respond_with_headers(
        status: u16,
        body: &'static str,
        headers: &[(&'static str, &'static str)],
    ) -> Arc<Self> {
        let mut map = HeaderMap::new();
        for &(name, value) in headers {
            map.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
        }
        let status = StatusCode::from_u16(status).unwrap();
        Arc::new(Self {
            reaction: Ok(BrokerResponse {
                status,
                headers: map,
                body: body.into(),
            }),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn fail(err: TransportError) -> Arc<Self> {
        Arc::new(Self {
            reaction: Err(err),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    pub(crate) fn last_request(&self) -> BrokerRequest {
        self.requests
            .lock()
            .last()
            .cloned()
            .expect("no request was sent")
    }
}

#[async_trait::async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: BrokerRequest) -> Result<BrokerResponse, TransportError> {
        self.requests.lock().push(request);
        self.reaction.clone()
    }
}

pub(crate) fn client(
    version: ApiVersion,
    alpha: bool,
    transport: &Arc<RecordingTransport>,
) -> OsbClient {
    let config = ClientConfiguration::new("test-broker", TEST_URL)
        .with_api_version(version)
        .with_alpha_features(alpha);
    OsbClient::with_transport(config, transport.clone()).unwrap()
}

pub(crate) fn body_json(request: &BrokerRequest) -> Value {
    let body = request.body.as_ref().expect("request has no body");
    serde_json::from_slice(body).unwrap()
}

pub(crate) fn query(request: &BrokerRequest) -> HashMap<String, String> {
    request.query.iter().cloned().collect()
}
