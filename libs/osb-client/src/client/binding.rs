use http::{Method, StatusCode};
use serde::{Deserialize, Serialize};

use super::{ACCEPTS_INCOMPLETE, OsbClient, PLAN_ID, SERVICE_ID, non_empty};
use crate::error::ClientError;
use crate::response::{self, AsyncBody};
use crate::types::{
    BindRequest, BindResource, BindResponse, Endpoint, GetBindingRequest, GetBindingResponse,
    JsonObject, OperationKey, UnbindRequest, UnbindResponse, lenient_endpoints,
};
use crate::validate;
use crate::version::ApiVersion;

pub(super) const ASYNC_BINDING_NOT_ALLOWED: &str =
    "Asynchronous binding operations are not allowed";

#[derive(Debug, Serialize)]
struct BindRequestBody<'a> {
    service_id: &'a str,
    plan_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameters: Option<&'a JsonObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bind_resource: Option<&'a BindResource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<&'a JsonObject>,
}

#[derive(Debug, Default, Deserialize)]
struct BindResponseBody {
    #[serde(default)]
    credentials: Option<JsonObject>,
    #[serde(default)]
    syslog_drain_url: Option<String>,
    #[serde(default)]
    route_service_url: Option<String>,
    #[serde(default)]
    volume_mounts: Option<Vec<serde_json::Value>>,
    #[serde(default, deserialize_with = "lenient_endpoints")]
    endpoints: Option<Vec<Endpoint>>,
}

impl OsbClient {
    /// Async binding and unbinding are 2.14 features.
    fn require_async_bindings(&self, accepts_incomplete: bool) -> Result<(), ClientError> {
        if accepts_incomplete {
            self.require_version(ApiVersion::V2_14, ASYNC_BINDING_NOT_ALLOWED)?;
        }
        Ok(())
    }

    /// Create a binding.
    ///
    /// # Errors
    /// `NotAllowed` for an asynchronous bind below 2.14, validation
    /// failures, transport failures, or an [`crate::HttpStatusCodeError`]
    /// for any status other than 200/201 (and 202 when `accepts_incomplete`
    /// is set).
    pub async fn bind(&self, r: &BindRequest) -> Result<BindResponse, ClientError> {
        self.require_async_bindings(r.accepts_incomplete)?;
        validate::bind(r)?;

        let context = if self.api_version.at_least(ApiVersion::V2_13) {
            non_empty(r.context.as_ref())
        } else {
            None
        };
        let body = BindRequestBody {
            service_id: &r.service_id,
            plan_id: &r.plan_id,
            parameters: non_empty(r.parameters.as_ref()),
            bind_resource: r.bind_resource.as_ref().filter(|b| !b.is_empty()),
            context,
        };

        let mut builder = self.builder(
            Method::PUT,
            self.binding_url(&r.instance_id, &r.binding_id),
        )?;
        if r.accepts_incomplete {
            builder = builder.query(ACCEPTS_INCOMPLETE, "true");
        }
        let request = builder
            .originating_identity(r.originating_identity.as_deref(), self.api_version)?
            .json(&body)?
            .build();

        let response = self.execute(request).await?;

        match response.status {
            StatusCode::OK | StatusCode::CREATED => {
                let body: BindResponseBody = response::decode(&response)?;
                Ok(BindResponse {
                    is_async: false,
                    credentials: body.credentials,
                    syslog_drain_url: body.syslog_drain_url,
                    route_service_url: body.route_service_url,
                    volume_mounts: body.volume_mounts,
                    endpoints: body.endpoints.filter(|_| self.enable_alpha_features),
                    operation_key: None,
                })
            }
            StatusCode::ACCEPTED if r.accepts_incomplete => {
                let body: AsyncBody = response::decode(&response)?;
                self.log_async("bind");
                Ok(BindResponse {
                    is_async: true,
                    operation_key: body.operation.map(OperationKey::from),
                    ..Default::default()
                })
            }
            StatusCode::ACCEPTED => Err(self.unexpected_async(&response)),
            _ => Err(response::failure(&response)),
        }
    }

    /// Delete a binding. A `410 Gone` counts as success.
    ///
    /// # Errors
    /// `NotAllowed` for an asynchronous unbind below 2.14, validation
    /// failures, transport failures, or an [`crate::HttpStatusCodeError`]
    /// for any status other than 200/410 (and 202 when `accepts_incomplete`
    /// is set).
    pub async fn unbind(&self, r: &UnbindRequest) -> Result<UnbindResponse, ClientError> {
        self.require_async_bindings(r.accepts_incomplete)?;
        validate::unbind(r)?;

        let mut builder = self
            .builder(
                Method::DELETE,
                self.binding_url(&r.instance_id, &r.binding_id),
            )?
            .query(SERVICE_ID, &r.service_id)
            .query(PLAN_ID, &r.plan_id);
        if r.accepts_incomplete {
            builder = builder.query(ACCEPTS_INCOMPLETE, "true");
        }
        let request = builder
            .originating_identity(r.originating_identity.as_deref(), self.api_version)?
            .build();

        let response = self.execute(request).await?;

        match response.status {
            StatusCode::OK | StatusCode::GONE => Ok(UnbindResponse::default()),
            StatusCode::ACCEPTED if r.accepts_incomplete => {
                let body: AsyncBody = response::decode(&response)?;
                self.log_async("unbind");
                Ok(UnbindResponse {
                    is_async: true,
                    operation_key: body.operation.map(OperationKey::from),
                })
            }
            StatusCode::ACCEPTED => Err(self.unexpected_async(&response)),
            _ => Err(response::failure(&response)),
        }
    }

    /// Fetch a binding. Requires API version 2.14.
    ///
    /// # Errors
    /// `NotAllowed` below 2.14, validation failures, transport failures, or
    /// an [`crate::HttpStatusCodeError`] for any status other than 200.
    pub async fn get_binding(
        &self,
        r: &GetBindingRequest,
    ) -> Result<GetBindingResponse, ClientError> {
        self.require_version(ApiVersion::V2_14, "GetBinding not allowed")?;
        validate::get_binding(r)?;

        let request = self
            .builder(
                Method::GET,
                self.binding_url(&r.instance_id, &r.binding_id),
            )?
            .originating_identity(r.originating_identity.as_deref(), self.api_version)?
            .build();

        let response = self.execute(request).await?;

        match response.status {
            StatusCode::OK => {
                let mut binding: GetBindingResponse = response::decode(&response)?;
                if !self.enable_alpha_features {
                    binding.endpoints = None;
                }
                Ok(binding)
            }
            _ => Err(response::failure(&response)),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::super::test_support::{RecordingTransport, body_json, client, query};
    use super::*;
    use crate::error::{NotAllowedReason, is_app_guid_required_error};
    use crate::types::EndpointProtocol;

    const BINDING_URL: &str = "https://broker.example.com/v2/service_instances/test-instance-id/service_bindings/test-binding-id";

    const BIND_BODY: &str = r#"{
        "credentials": {"uri": "mysql://u:p@host:3306/db", "username": "u"},
        "syslog_drain_url": "syslog://logs.example.com:1234",
        "endpoints": [{"host": "10.0.0.1", "ports": ["3306"], "protocol": "tcp"}]
    }"#;

    fn bind_request(accepts_incomplete: bool) -> BindRequest {
        BindRequest {
            binding_id: "test-binding-id".into(),
            instance_id: "test-instance-id".into(),
            accepts_incomplete,
            service_id: "test-service-id".into(),
            plan_id: "test-plan-id".into(),
            ..Default::default()
        }
    }

    fn unbind_request(accepts_incomplete: bool) -> UnbindRequest {
        UnbindRequest {
            instance_id: "test-instance-id".into(),
            binding_id: "test-binding-id".into(),
            accepts_incomplete,
            service_id: "test-service-id".into(),
            plan_id: "test-plan-id".into(),
            originating_identity: None,
        }
    }

    fn get_binding_request() -> GetBindingRequest {
        GetBindingRequest {
            instance_id: "test-instance-id".into(),
            binding_id: "test-binding-id".into(),
            originating_identity: None,
        }
    }

    fn assert_async_binding_not_allowed(err: &ClientError, current: ApiVersion) {
        match err {
            ClientError::NotAllowed { context, reason } => {
                assert_eq!(*context, ASYNC_BINDING_NOT_ALLOWED);
                assert_eq!(
                    *reason,
                    NotAllowedReason::ApiVersion {
                        required: ApiVersion::V2_14,
                        current,
                    }
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_bind_sync_ok() {
        let transport = RecordingTransport::respond(201, BIND_BODY);
        let response = client(ApiVersion::V2_13, false, &transport)
            .bind(&bind_request(false))
            .await
            .unwrap();

        assert!(!response.is_async);
        assert_eq!(response.credentials.unwrap()["username"], "u");
        assert_eq!(
            response.syslog_drain_url.as_deref(),
            Some("syslog://logs.example.com:1234")
        );
        // alpha disabled
        assert!(response.endpoints.is_none());

        let request = transport.last_request();
        assert_eq!(request.method, Method::PUT);
        assert_eq!(request.url, BINDING_URL);
        assert!(request.query.is_empty());
        assert_eq!(
            body_json(&request),
            json!({"service_id": "test-service-id", "plan_id": "test-plan-id"})
        );
    }

    #[tokio::test]
    async fn test_bind_alpha_keeps_endpoints() {
        let transport = RecordingTransport::respond(200, BIND_BODY);
        let response = client(ApiVersion::V2_14, true, &transport)
            .bind(&bind_request(false))
            .await
            .unwrap();

        assert_eq!(
            response.endpoints,
            Some(vec![Endpoint {
                host: "10.0.0.1".into(),
                ports: vec!["3306".into()],
                protocol: Some(EndpointProtocol::Tcp),
            }])
        );
    }

    #[tokio::test]
    async fn test_bind_port_ranges_without_alpha() {
        let transport = RecordingTransport::respond(
            201,
            r#"{"credentials":{"uri":"tcp://h"},"endpoints":[{"host":"h","ports":["9000-9010"]}]}"#,
        );
        let response = client(ApiVersion::V2_14, false, &transport)
            .bind(&bind_request(false))
            .await
            .unwrap();

        assert_eq!(response.credentials.unwrap()["uri"], "tcp://h");
        assert!(response.endpoints.is_none());
    }

    #[tokio::test]
    async fn test_bind_malformed_endpoints_do_not_fail() {
        let transport = RecordingTransport::respond(
            201,
            r#"{"credentials":{"uri":"tcp://h"},"endpoints":[{"host":"h","ports":[3306]}]}"#,
        );
        let response = client(ApiVersion::V2_14, true, &transport)
            .bind(&bind_request(false))
            .await
            .unwrap();

        assert!(response.credentials.is_some());
        assert!(response.endpoints.is_none());
    }

    #[tokio::test]
    async fn test_bind_resource_carries_route() {
        let transport = RecordingTransport::respond(201, "{}");
        let mut request = bind_request(false);
        request.bind_resource = Some(BindResource {
            app_guid: Some("app-guid".into()),
            route: Some("route.example.com".into()),
        });

        client(ApiVersion::V2_13, false, &transport)
            .bind(&request)
            .await
            .unwrap();

        assert_eq!(
            body_json(&transport.last_request())["bind_resource"],
            json!({"app_guid": "app-guid", "route": "route.example.com"})
        );
    }

    #[tokio::test]
    async fn test_bind_empty_resource_omitted() {
        let transport = RecordingTransport::respond(201, "{}");
        let mut request = bind_request(false);
        request.bind_resource = Some(BindResource::default());

        client(ApiVersion::V2_13, false, &transport)
            .bind(&request)
            .await
            .unwrap();

        assert!(body_json(&transport.last_request()).get("bind_resource").is_none());
    }

    #[tokio::test]
    async fn test_bind_context_gated_on_2_13() {
        for version in ApiVersion::ALL {
            let transport = RecordingTransport::respond(201, "{}");
            let mut request = bind_request(false);
            request.context = Some(
                json!({"platform": "cloudfoundry"})
                    .as_object()
                    .cloned()
                    .unwrap(),
            );

            client(version, false, &transport).bind(&request).await.unwrap();

            let body = body_json(&transport.last_request());
            assert_eq!(
                body.get("context").is_some(),
                version.at_least(ApiVersion::V2_13),
                "version {version}"
            );
        }
    }

    #[tokio::test]
    async fn test_bind_async_requires_2_14() {
        let transport = RecordingTransport::respond(202, "{}");
        let err = client(ApiVersion::V2_13, true, &transport)
            .bind(&bind_request(true))
            .await
            .unwrap_err();

        assert_async_binding_not_allowed(&err, ApiVersion::V2_13);
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_bind_async_accepted() {
        let transport = RecordingTransport::respond(202, r#"{"operation":"bind-op"}"#);
        let response = client(ApiVersion::V2_14, false, &transport)
            .bind(&bind_request(true))
            .await
            .unwrap();

        assert!(response.is_async);
        assert_eq!(response.operation_key, Some(OperationKey::from("bind-op")));
        assert!(response.credentials.is_none());
        assert_eq!(
            query(&transport.last_request()).get(ACCEPTS_INCOMPLETE).unwrap(),
            "true"
        );
    }

    #[tokio::test]
    async fn test_bind_unexpected_accepted() {
        let transport = RecordingTransport::respond(202, "{}");
        let err = client(ApiVersion::V2_14, false, &transport)
            .bind(&bind_request(false))
            .await
            .unwrap_err();
        assert_eq!(err.as_http_status().unwrap().status, StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn test_bind_app_guid_required() {
        let transport = RecordingTransport::respond(
            422,
            r#"{"error":"RequiresApp","description":"This service supports generation of credentials through binding an application only."}"#,
        );
        let err = client(ApiVersion::V2_13, false, &transport)
            .bind(&bind_request(false))
            .await
            .unwrap_err();
        assert!(is_app_guid_required_error(&err));
    }

    #[tokio::test]
    async fn test_unbind_sends_ids_as_query() {
        let transport = RecordingTransport::respond(200, "{}");
        let response = client(ApiVersion::V2_13, false, &transport)
            .unbind(&unbind_request(false))
            .await
            .unwrap();
        assert_eq!(response, UnbindResponse::default());

        let request = transport.last_request();
        assert_eq!(request.method, Method::DELETE);
        assert_eq!(request.url, BINDING_URL);
        assert!(request.body.is_none());

        let query = query(&request);
        assert_eq!(query.get(SERVICE_ID).unwrap(), "test-service-id");
        assert_eq!(query.get(PLAN_ID).unwrap(), "test-plan-id");
    }

    #[tokio::test]
    async fn test_unbind_gone_is_success() {
        let transport = RecordingTransport::respond(410, "{}");
        client(ApiVersion::V2_13, false, &transport)
            .unbind(&unbind_request(false))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_unbind_async() {
        let transport = RecordingTransport::respond(202, r#"{"operation":"unbind-op"}"#);
        let response = client(ApiVersion::V2_14, false, &transport)
            .unbind(&unbind_request(true))
            .await
            .unwrap();
        assert!(response.is_async);
        assert_eq!(response.operation_key.unwrap().as_str(), "unbind-op");

        let transport = RecordingTransport::respond(202, "{}");
        let err = client(ApiVersion::V2_13, false, &transport)
            .unbind(&unbind_request(true))
            .await
            .unwrap_err();
        assert_async_binding_not_allowed(&err, ApiVersion::V2_13);
    }

    #[tokio::test]
    async fn test_get_binding_requires_2_14_regardless_of_request() {
        for version in [ApiVersion::V2_11, ApiVersion::V2_12, ApiVersion::V2_13] {
            let transport = RecordingTransport::respond(200, "{}");
            let err = client(version, true, &transport)
                .get_binding(&GetBindingRequest::default())
                .await
                .unwrap_err();

            assert!(
                matches!(err, ClientError::NotAllowed { context: "GetBinding not allowed", .. }),
                "version {version}: {err}"
            );
            assert_eq!(transport.request_count(), 0);
        }
    }

    #[tokio::test]
    async fn test_get_binding_ok() {
        let transport = RecordingTransport::respond(
            200,
            r#"{"credentials":{"password":"secret"},"parameters":{"foo":"bar"},"endpoints":[{"host":"h","ports":["9000-9010"]}]}"#,
        );
        let response = client(ApiVersion::V2_14, false, &transport)
            .get_binding(&get_binding_request())
            .await
            .unwrap();

        assert_eq!(response.credentials.unwrap()["password"], "secret");
        assert_eq!(response.parameters.unwrap()["foo"], "bar");
        assert!(response.endpoints.is_none());

        let request = transport.last_request();
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.url, BINDING_URL);
    }

    #[tokio::test]
    async fn test_get_binding_not_found() {
        let transport = RecordingTransport::respond(404, "{}");
        let err = client(ApiVersion::V2_14, false, &transport)
            .get_binding(&get_binding_request())
            .await
            .unwrap_err();

        let status_err = err.as_http_status().unwrap();
        assert_eq!(status_err.status, StatusCode::NOT_FOUND);
        assert!(status_err.error_message.is_none());
    }
}
