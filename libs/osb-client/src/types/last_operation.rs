use std::time::Duration;

use serde::Deserialize;

use super::{Identity, OperationKey};

/// Poll the last operation on an instance.
#[derive(Debug, Clone, Default)]
pub struct LastOperationRequest {
    pub instance_id: String,
    pub service_id: Option<String>,
    pub plan_id: Option<String>,
    pub operation_key: Option<OperationKey>,
    pub originating_identity: Option<Identity>,
}

/// Poll the last operation on a binding. Requires API version 2.14.
#[derive(Debug, Clone, Default)]
pub struct BindingLastOperationRequest {
    pub instance_id: String,
    pub binding_id: String,
    pub service_id: Option<String>,
    pub plan_id: Option<String>,
    pub operation_key: Option<OperationKey>,
    pub originating_identity: Option<Identity>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum LastOperationState {
    #[serde(rename = "in progress")]
    InProgress,
    #[serde(rename = "succeeded")]
    Succeeded,
    #[serde(rename = "failed")]
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LastOperationResponse {
    pub state: LastOperationState,
    #[serde(default)]
    pub description: Option<String>,
    /// Alpha. Broker-suggested wait before the next poll, from `Retry-After`.
    #[serde(skip)]
    pub poll_delay: Option<Duration>,
}
