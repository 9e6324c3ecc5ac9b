use std::time::Duration;

use http::HeaderMap;
use http::header::RETRY_AFTER;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::{ClientError, HttpStatusCodeError};
use crate::transport::BrokerResponse;

/// The conventional broker failure envelope. Both fields are optional.
#[derive(Debug, Deserialize)]
struct FailureBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// Body of a `202 Accepted` response.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct AsyncBody {
    #[serde(default)]
    pub(crate) operation: Option<String>,
}

/// Decode a success body. A decode failure becomes an
/// [`HttpStatusCodeError`] carrying the response status.
pub(crate) fn decode<T: DeserializeOwned>(response: &BrokerResponse) -> Result<T, ClientError> {
    serde_json::from_slice(&response.body)
        .map_err(|e| HttpStatusCodeError::decode_failure(response.status, &e).into())
}

/// Map a non-success response to an [`HttpStatusCodeError`].
pub(crate) fn failure(response: &BrokerResponse) -> ClientError {
    let err = match serde_json::from_slice::<FailureBody>(&response.body) {
        Ok(body) => {
            HttpStatusCodeError::with_envelope(response.status, body.error, body.description)
        }
        Err(e) => HttpStatusCodeError::decode_failure(response.status, &e),
    };
    ClientError::HttpStatus(err)
}

/// Integer-seconds polling delay from `Retry-After`, if the broker sent one.
pub(crate) fn poll_delay(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
