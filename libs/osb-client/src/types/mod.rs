//! Request and response models for each broker operation.

mod binding;
mod catalog;
mod instance;
mod last_operation;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::identity::OriginatingIdentity;

pub use binding::{
    BindRequest, BindResource, BindResponse, Endpoint, EndpointProtocol, GetBindingRequest,
    GetBindingResponse, UnbindRequest, UnbindResponse,
};
pub(crate) use binding::lenient_endpoints;
pub use catalog::{
    CatalogResponse, DashboardClient, InputParametersSchema, MaintenanceInfo, Plan, Schemas,
    Service, ServiceBindingSchema, ServiceInstanceSchema,
};
pub use instance::{
    DeprovisionRequest, DeprovisionResponse, GetInstanceRequest, GetInstanceResponse,
    ProvisionRequest, ProvisionResponse, UpdateInstanceRequest, UpdateInstanceResponse,
};
pub use last_operation::{
    BindingLastOperationRequest, LastOperationRequest, LastOperationResponse, LastOperationState,
};

/// Broker-defined JSON object (parameters, context, credentials, metadata).
pub type JsonObject = serde_json::Map<String, serde_json::Value>;

/// Shared handle to an originating identity carried on a request.
pub type Identity = Arc<dyn OriginatingIdentity>;

/// Opaque continuation token returned by an asynchronous operation and
/// echoed back when polling it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationKey(String);

impl OperationKey {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OperationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OperationKey {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for OperationKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}
