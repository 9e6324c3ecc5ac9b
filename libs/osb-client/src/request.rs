use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde::Serialize;

use crate::config::AuthConfig;
use crate::error::ClientError;
use crate::identity::{self, OriginatingIdentity};
use crate::transport::BrokerRequest;
use crate::version::ApiVersion;

/// API version header (display form)
pub const API_VERSION_HEADER: &str = "X-Broker-Api-Version";

/// Originating identity header (display form)
pub const ORIGINATING_IDENTITY_HEADER: &str = "X-Broker-API-Originating-Identity";

/// Header carrying the broker's suggested polling delay, in seconds
pub const POLLING_DELAY_HEADER: &str = "Retry-After";

const API_VERSION_HEADER_LOWER: &str = "x-broker-api-version";
const ORIGINATING_IDENTITY_HEADER_LOWER: &str = "x-broker-api-originating-identity";

/// Builder for a [`BrokerRequest`]. Owns every protocol header.
#[derive(Debug)]
pub(crate) struct RequestBuilder {
    method: Method,
    url: String,
    query: Vec<(String, String)>,
    headers: HeaderMap,
    body: Option<Bytes>,
}

impl RequestBuilder {
    pub(crate) fn new(method: Method, url: String) -> Self {
        Self {
            method,
            url,
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Add a query parameter. Empty values are skipped.
    pub(crate) fn query(mut self, key: &str, value: &str) -> Self {
        if !value.is_empty() {
            self.query.push((key.to_owned(), value.to_owned()));
        }
        self
    }

    pub(crate) fn query_opt(self, key: &str, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.query(key, v),
            None => self,
        }
    }

    /// Set the `X-Broker-Api-Version` header
    pub(crate) fn api_version(mut self, version: ApiVersion) -> Self {
        self.headers.insert(
            HeaderName::from_static(API_VERSION_HEADER_LOWER),
            HeaderValue::from_static(version.label()),
        );
        self
    }

    /// Add the `Authorization` header for the configured credentials
    pub(crate) fn auth(mut self, auth: Option<&AuthConfig>) -> Result<Self, ClientError> {
        if let Some(AuthConfig::Basic(basic)) = auth {
            let token = STANDARD.encode(format!("{}:{}", basic.username, basic.password));
            let mut value = header_value(&format!("Basic {token}"))?;
            value.set_sensitive(true);
            self.headers.insert(AUTHORIZATION, value);
        }
        Ok(self)
    }

    /// Add the originating identity header.
    ///
    /// Skipped without evaluating the identity when `version` predates 2.13.
    pub(crate) fn originating_identity(
        mut self,
        identity: Option<&dyn OriginatingIdentity>,
        version: ApiVersion,
    ) -> Result<Self, ClientError> {
        let Some(identity) = identity else {
            return Ok(self);
        };
        if version.is_less_than(ApiVersion::V2_13) {
            return Ok(self);
        }
        let value = identity::build_header_value(identity)?;
        self.headers.insert(
            HeaderName::from_static(ORIGINATING_IDENTITY_HEADER_LOWER),
            header_value(&value)?,
        );
        Ok(self)
    }

    /// Set the body to a JSON-serialized value and add Content-Type header
    pub(crate) fn json<T: Serialize>(mut self, value: &T) -> Result<Self, ClientError> {
        self.body = Some(Bytes::from(serde_json::to_vec(value)?));
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(self)
    }

    pub(crate) fn build(self) -> BrokerRequest {
        BrokerRequest {
            method: self.method,
            url: self.url,
            query: self.query,
            headers: self.headers,
            body: self.body,
        }
    }
}

fn header_value(value: &str) -> Result<HeaderValue, ClientError> {
    HeaderValue::from_str(value)
        .map_err(|e| ClientError::BuildError(format!("Invalid header value: {e}")))
}
