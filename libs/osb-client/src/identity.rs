//! Originating identity: the platform user on whose behalf a request is made.
//!
//! Sent as `X-Broker-API-Originating-Identity: <platform> <base64(json)>` on
//! clients speaking API version 2.13 or newer.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Map, Value};

use crate::error::ValidationError;

/// A platform-asserted caller identity.
///
/// Implementations return the platform tag and the JSON document describing
/// the user. `value` may fail when a required property is missing; that
/// failure aborts the request before anything is sent.
pub trait OriginatingIdentity: fmt::Debug + Send + Sync {
    fn platform(&self) -> &str;

    /// The JSON document, serialized.
    ///
    /// # Errors
    /// Returns a [`ValidationError`] when the identity is incomplete.
    fn value(&self) -> Result<String, ValidationError>;
}

/// Build the header value for `identity`.
///
/// # Errors
/// Propagates the identity's own validation failure.
pub fn build_header_value(identity: &dyn OriginatingIdentity) -> Result<String, ValidationError> {
    let value = identity.value()?;
    Ok(format!("{} {}", identity.platform(), STANDARD.encode(value)))
}

/// Identity of a Kubernetes user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KubernetesOriginatingIdentity {
    pub username: String,
    pub uid: String,
    pub groups: Vec<String>,
    /// Extra properties; these overwrite base properties of the same name.
    pub extra: Map<String, Value>,
}

impl OriginatingIdentity for KubernetesOriginatingIdentity {
    fn platform(&self) -> &str {
        "kubernetes"
    }

    fn value(&self) -> Result<String, ValidationError> {
        if self.username.is_empty() {
            return Err(ValidationError::Identity("Username is required".into()));
        }
        if self.uid.is_empty() {
            return Err(ValidationError::Identity("Uid is required".into()));
        }

        let mut base = Map::new();
        base.insert("username".into(), Value::String(self.username.clone()));
        base.insert("uid".into(), Value::String(self.uid.clone()));
        if !self.groups.is_empty() {
            base.insert(
                "groups".into(),
                Value::Array(self.groups.iter().cloned().map(Value::String).collect()),
            );
        }
        marshal_value(base, &self.extra)
    }
}

/// Identity of a Cloud Foundry user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CloudFoundryOriginatingIdentity {
    pub user_id: String,
    pub extra: Map<String, Value>,
}

impl OriginatingIdentity for CloudFoundryOriginatingIdentity {
    fn platform(&self) -> &str {
        "cloudfoundry"
    }

    fn value(&self) -> Result<String, ValidationError> {
        if self.user_id.is_empty() {
            return Err(ValidationError::Identity("UserId is required".into()));
        }

        let mut base = Map::new();
        base.insert("user_id".into(), Value::String(self.user_id.clone()));
        marshal_value(base, &self.extra)
    }
}

// Extra keys win on collision.
fn marshal_value(
    mut base: Map<String, Value>,
    extra: &Map<String, Value>,
) -> Result<String, ValidationError> {
    for (k, v) in extra {
        base.insert(k.clone(), v.clone());
    }
    serde_json::to_string(&Value::Object(base))
        .map_err(|e| ValidationError::Identity(format!("failed to encode identity: {e}")))
}
