use serde::Deserialize;

use super::{Identity, JsonObject, OperationKey};

/// Provision a new service instance.
#[derive(Debug, Clone, Default)]
pub struct ProvisionRequest {
    pub instance_id: String,
    /// The caller can handle a `202 Accepted` asynchronous response.
    pub accepts_incomplete: bool,
    pub service_id: String,
    pub plan_id: String,
    pub organization_guid: String,
    pub space_guid: String,
    pub parameters: Option<JsonObject>,
    /// Platform context; sent on API version 2.12 and newer.
    pub context: Option<JsonObject>,
    pub originating_identity: Option<Identity>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionResponse {
    pub is_async: bool,
    pub dashboard_url: Option<String>,
    pub operation_key: Option<OperationKey>,
}

/// Change the plan or parameters of an existing instance.
#[derive(Debug, Clone, Default)]
pub struct UpdateInstanceRequest {
    pub instance_id: String,
    pub accepts_incomplete: bool,
    pub service_id: String,
    /// New plan, if changing plans.
    pub plan_id: Option<String>,
    pub parameters: Option<JsonObject>,
    /// Platform context; sent on API version 2.12 and newer.
    pub context: Option<JsonObject>,
    pub originating_identity: Option<Identity>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateInstanceResponse {
    pub is_async: bool,
    pub operation_key: Option<OperationKey>,
}

#[derive(Debug, Clone, Default)]
pub struct DeprovisionRequest {
    pub instance_id: String,
    pub accepts_incomplete: bool,
    pub service_id: String,
    pub plan_id: String,
    pub originating_identity: Option<Identity>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeprovisionResponse {
    pub is_async: bool,
    pub operation_key: Option<OperationKey>,
}

/// Fetch an instance. Requires API version 2.14.
#[derive(Debug, Clone, Default)]
pub struct GetInstanceRequest {
    pub instance_id: String,
    pub originating_identity: Option<Identity>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GetInstanceResponse {
    #[serde(default)]
    pub service_id: String,
    #[serde(default)]
    pub plan_id: String,
    #[serde(default)]
    pub dashboard_url: Option<String>,
    #[serde(default)]
    pub parameters: Option<JsonObject>,
}
