use std::time::Duration;

use crate::config::TlsConfig;
use crate::error::{ClientError, TransportError};

use super::{BrokerRequest, BrokerResponse, Transport};

/// Reqwest-backed transport used by [`crate::OsbClient::new`].
pub struct ReqwestTransport {
    http_client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport with the given request timeout and TLS options.
    ///
    /// # Errors
    /// Returns `ClientError::BuildError` for an unparsable CA certificate or
    /// when the underlying client cannot be initialized.
    pub fn new(timeout: Duration, tls: &TlsConfig) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(tls.insecure);

        if let Some(pem) = &tls.ca_cert_pem {
            let cert = reqwest::Certificate::from_pem(pem)
                .map_err(|e| ClientError::BuildError(format!("invalid CA certificate: {e}")))?;
            builder = builder.add_root_certificate(cert);
        }

        let http_client = builder
            .build()
            .map_err(|e| ClientError::BuildError(e.to_string()))?;

        Ok(Self { http_client })
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: BrokerRequest) -> Result<BrokerResponse, TransportError> {
        let mut req_builder = self
            .http_client
            .request(request.method, &request.url)
            .headers(request.headers);

        if !request.query.is_empty() {
            req_builder = req_builder.query(&request.query);
        }
        if let Some(body) = request.body {
            req_builder = req_builder.body(body);
        }

        let resp = req_builder.send().await.map_err(classify)?;

        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.bytes().await.map_err(classify)?;

        Ok(BrokerResponse {
            status,
            headers,
            body,
        })
    }
}

fn classify(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout(e.to_string())
    } else if e.is_connect() {
        TransportError::Connection(e.to_string())
    } else {
        TransportError::Other(e.to_string())
    }
}
