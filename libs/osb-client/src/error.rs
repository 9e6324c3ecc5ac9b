use std::fmt;

use http::StatusCode;
use thiserror::Error;

use crate::version::ApiVersion;

const ASYNC_REQUIRED_ERROR: &str = "AsyncRequired";
const ASYNC_REQUIRED_DESCRIPTION: &str =
    "This service plan requires client support for asynchronous service operations.";

const APP_GUID_REQUIRED_ERROR: &str = "RequiresApp";
const APP_GUID_REQUIRED_DESCRIPTION: &str =
    "This service supports generation of credentials through binding an application only.";

const CONCURRENCY_ERROR: &str = "ConcurrencyError";

/// A request failed a local precondition; nothing was sent to the broker.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),

    /// The originating identity could not produce its header value.
    #[error("{0}")]
    Identity(String),
}

/// Why a version gate refused an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NotAllowedReason {
    #[error("must have API version >= {required}. Current: {current}")]
    ApiVersion {
        required: ApiVersion,
        current: ApiVersion,
    },
}

/// Transport-level failure: the broker never produced an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Transport error: {0}")]
    Other(String),
}

/// A broker answered with a status code the operation does not accept, or
/// with a body that could not be decoded.
///
/// Carries the conventional `{"error": ..., "description": ...}` envelope
/// fields when the broker supplied them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpStatusCodeError {
    pub status: StatusCode,
    pub error_message: Option<String>,
    pub description: Option<String>,
    /// Decode failure of the response body, if any.
    pub response_error: Option<String>,
}

impl HttpStatusCodeError {
    #[must_use]
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            error_message: None,
            description: None,
            response_error: None,
        }
    }

    #[must_use]
    pub fn with_envelope(
        status: StatusCode,
        error_message: Option<String>,
        description: Option<String>,
    ) -> Self {
        Self {
            status,
            error_message,
            description,
            response_error: None,
        }
    }

    #[must_use]
    pub fn decode_failure(status: StatusCode, err: &serde_json::Error) -> Self {
        Self {
            response_error: Some(err.to_string()),
            ..Self::new(status)
        }
    }

    #[must_use]
    pub fn is_conflict(&self) -> bool {
        self.status == StatusCode::CONFLICT
    }

    #[must_use]
    pub fn is_gone(&self) -> bool {
        self.status == StatusCode::GONE
    }

    /// 422 with the conventional `AsyncRequired` error and description.
    #[must_use]
    pub fn is_async_required(&self) -> bool {
        self.matches_422(ASYNC_REQUIRED_ERROR, Some(ASYNC_REQUIRED_DESCRIPTION))
    }

    /// 422 with the conventional `RequiresApp` error and description.
    #[must_use]
    pub fn is_app_guid_required(&self) -> bool {
        self.matches_422(APP_GUID_REQUIRED_ERROR, Some(APP_GUID_REQUIRED_DESCRIPTION))
    }

    /// 422 `ConcurrencyError`; brokers word the description freely.
    #[must_use]
    pub fn is_concurrency(&self) -> bool {
        self.matches_422(CONCURRENCY_ERROR, None)
    }

    fn matches_422(&self, error: &str, description: Option<&str>) -> bool {
        if self.status != StatusCode::UNPROCESSABLE_ENTITY {
            return false;
        }
        if self.error_message.as_deref() != Some(error) {
            return false;
        }
        description.is_none_or(|d| self.description.as_deref() == Some(d))
    }
}

impl fmt::Display for HttpStatusCodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NONE: &str = "<none>";
        write!(
            f,
            "Status: {}; ErrorMessage: {}; Description: {}; ResponseError: {}",
            self.status.as_u16(),
            self.error_message.as_deref().unwrap_or(NONE),
            self.description.as_deref().unwrap_or(NONE),
            self.response_error.as_deref().unwrap_or(NONE),
        )
    }
}

impl std::error::Error for HttpStatusCodeError {}

/// Error returned by every broker operation.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{context}: operation not allowed: {reason}")]
    NotAllowed {
        context: &'static str,
        reason: NotAllowedReason,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    HttpStatus(#[from] HttpStatusCodeError),

    #[error("Request build error: {0}")]
    BuildError(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ClientError {
    pub(crate) fn not_allowed(context: &'static str, reason: NotAllowedReason) -> Self {
        Self::NotAllowed { context, reason }
    }

    /// The structured status error, if this is one.
    #[must_use]
    pub fn as_http_status(&self) -> Option<&HttpStatusCodeError> {
        match self {
            Self::HttpStatus(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Serialization(err.to_string())
    }
}

/// Whether the broker reported a conflict (409).
#[must_use]
pub fn is_conflict_error(err: &ClientError) -> bool {
    err.as_http_status().is_some_and(HttpStatusCodeError::is_conflict)
}

/// Whether the broker reported the resource as gone (410).
#[must_use]
pub fn is_gone_error(err: &ClientError) -> bool {
    err.as_http_status().is_some_and(HttpStatusCodeError::is_gone)
}

/// Whether the broker requires `accepts_incomplete=true` for this plan.
#[must_use]
pub fn is_async_required_error(err: &ClientError) -> bool {
    err.as_http_status()
        .is_some_and(HttpStatusCodeError::is_async_required)
}

/// Whether the broker only supports bindings to an application.
#[must_use]
pub fn is_app_guid_required_error(err: &ClientError) -> bool {
    err.as_http_status()
        .is_some_and(HttpStatusCodeError::is_app_guid_required)
}

/// Whether the broker rejected the request because another operation is in flight.
#[must_use]
pub fn is_concurrency_error(err: &ClientError) -> bool {
    err.as_http_status()
        .is_some_and(HttpStatusCodeError::is_concurrency)
}
