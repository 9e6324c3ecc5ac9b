use serde::{Deserialize, Deserializer, Serialize};

use super::{Identity, JsonObject, OperationKey};

/// Create a binding to an instance.
#[derive(Debug, Clone, Default)]
pub struct BindRequest {
    pub binding_id: String,
    pub instance_id: String,
    /// Asynchronous binding; requires API version 2.14.
    pub accepts_incomplete: bool,
    pub service_id: String,
    pub plan_id: String,
    pub parameters: Option<JsonObject>,
    pub bind_resource: Option<BindResource>,
    /// Platform context; sent on API version 2.13 and newer.
    pub context: Option<JsonObject>,
    pub originating_identity: Option<Identity>,
}

/// The resource a binding is for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BindResource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_guid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
}

impl BindResource {
    pub(crate) fn is_empty(&self) -> bool {
        self.app_guid.is_none() && self.route.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BindResponse {
    pub is_async: bool,
    pub credentials: Option<JsonObject>,
    pub syslog_drain_url: Option<String>,
    pub route_service_url: Option<String>,
    pub volume_mounts: Option<Vec<serde_json::Value>>,
    /// Alpha.
    pub endpoints: Option<Vec<Endpoint>>,
    pub operation_key: Option<OperationKey>,
}

/// A network endpoint an application can use to reach the instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub host: String,
    /// Single ports or ranges, e.g. `"443"` or `"9000-9010"`.
    pub ports: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<EndpointProtocol>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointProtocol {
    Tcp,
    Udp,
    All,
}

#[derive(Debug, Clone, Default)]
pub struct UnbindRequest {
    pub instance_id: String,
    pub binding_id: String,
    /// Asynchronous unbind; requires API version 2.14.
    pub accepts_incomplete: bool,
    pub service_id: String,
    pub plan_id: String,
    pub originating_identity: Option<Identity>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnbindResponse {
    pub is_async: bool,
    pub operation_key: Option<OperationKey>,
}

/// Fetch a binding. Requires API version 2.14.
#[derive(Debug, Clone, Default)]
pub struct GetBindingRequest {
    pub instance_id: String,
    pub binding_id: String,
    pub originating_identity: Option<Identity>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GetBindingResponse {
    #[serde(default)]
    pub credentials: Option<JsonObject>,
    #[serde(default)]
    pub syslog_drain_url: Option<String>,
    #[serde(default)]
    pub route_service_url: Option<String>,
    #[serde(default)]
    pub volume_mounts: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub parameters: Option<JsonObject>,
    /// Alpha.
    #[serde(default, deserialize_with = "lenient_endpoints")]
    pub endpoints: Option<Vec<Endpoint>>,
}

/// Endpoints are an alpha field: a list that does not match [`Endpoint`]
/// decodes as absent instead of failing the whole response.
pub(crate) fn lenient_endpoints<'de, D>(
    deserializer: D,
) -> Result<Option<Vec<Endpoint>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_ports_are_strings() {
        let binding: GetBindingResponse = serde_json::from_str(
            r#"{"endpoints":[{"host":"h","ports":["443","9000-9010"],"protocol":"udp"}]}"#,
        )
        .unwrap();
        assert_eq!(
            binding.endpoints,
            Some(vec![Endpoint {
                host: "h".into(),
                ports: vec!["443".into(), "9000-9010".into()],
                protocol: Some(EndpointProtocol::Udp),
            }])
        );
    }

    #[test]
    fn test_malformed_endpoints_decode_as_absent() {
        let binding: GetBindingResponse = serde_json::from_str(
            r#"{"credentials":{"user":"u"},"endpoints":[{"host":"h","ports":[3306]}]}"#,
        )
        .unwrap();
        assert!(binding.endpoints.is_none());
        assert_eq!(binding.credentials.unwrap()["user"], "u");
    }
}
