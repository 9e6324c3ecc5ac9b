//! Open Service Broker API client
//!
//! Typed client for the OSB API v2: catalog, instance lifecycle, bindings
//! and last-operation polling. Requests are shaped by the configured API
//! version (2.11 through 2.14) and the alpha-features flag:
//!
//! - `context` is sent on provision/update from 2.12 and on bind from 2.13
//! - the originating identity header is sent from 2.13
//! - asynchronous bindings, `GetInstance` and `GetBinding` need 2.14
//! - catalog plan schemas are returned from 2.13; maintenance info, maximum
//!   polling duration, per-plan `plan_updateable`, binding endpoints and
//!   the poll delay only with alpha features enabled
//!
//! Errors fall in four groups, all under [`ClientError`]: local validation,
//! a refused version gate, transport failures, and unexpected
//! HTTP statuses ([`HttpStatusCodeError`]).
//!
//! # Example
//!
//! ```no_run
//! use osb_client::{ApiVersion, ClientConfiguration, OsbClient, ProvisionRequest};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfiguration::new("my-broker", "https://broker.example.com")
//!     .with_api_version(ApiVersion::V2_13)
//!     .with_basic_auth("admin", "secret");
//! let client = OsbClient::new(config)?;
//!
//! let catalog = client.get_catalog().await?;
//! let service = &catalog.services[0];
//!
//! let response = client
//!     .provision_instance(&ProvisionRequest {
//!         instance_id: "instance-1".into(),
//!         accepts_incomplete: true,
//!         service_id: service.id.clone(),
//!         plan_id: service.plans[0].id.clone(),
//!         organization_guid: "org".into(),
//!         space_guid: "space".into(),
//!         ..Default::default()
//!     })
//!     .await?;
//!
//! if let Some(key) = response.operation_key {
//!     println!("provisioning asynchronously, operation {key}");
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod identity;
mod observer;
mod request;
mod response;
mod transport;
mod types;
mod validate;
mod version;

pub use client::{BrokerClient, OsbClient};
pub use config::{AuthConfig, BasicAuthConfig, ClientConfiguration, DEFAULT_TIMEOUT, TlsConfig};
pub use error::{
    ClientError, HttpStatusCodeError, NotAllowedReason, TransportError, ValidationError,
    is_app_guid_required_error, is_async_required_error, is_concurrency_error, is_conflict_error,
    is_gone_error,
};
pub use identity::{
    CloudFoundryOriginatingIdentity, KubernetesOriginatingIdentity, OriginatingIdentity,
    build_header_value,
};
pub use observer::{RequestCounters, RequestObserver, RequestOutcome};
pub use request::{API_VERSION_HEADER, ORIGINATING_IDENTITY_HEADER, POLLING_DELAY_HEADER};
pub use transport::{BrokerRequest, BrokerResponse, ReqwestTransport, Transport};
pub use types::{
    BindRequest, BindResource, BindResponse, BindingLastOperationRequest, CatalogResponse,
    DashboardClient, DeprovisionRequest, DeprovisionResponse, Endpoint, EndpointProtocol,
    GetBindingRequest, GetBindingResponse, GetInstanceRequest, GetInstanceResponse, Identity,
    InputParametersSchema, JsonObject, LastOperationRequest, LastOperationResponse,
    LastOperationState, MaintenanceInfo, OperationKey, Plan, ProvisionRequest, ProvisionResponse,
    Schemas, Service, ServiceBindingSchema, ServiceInstanceSchema, UnbindRequest, UnbindResponse,
    UpdateInstanceRequest, UpdateInstanceResponse,
};
pub use version::ApiVersion;

// Re-export commonly used types from http crate
pub use http::{Method, StatusCode};

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tracing_test::traced_test;

    use super::*;
    use crate::client::test_support::{RecordingTransport, TEST_URL};

    #[test]
    fn test_client_rejects_empty_url() {
        let transport = RecordingTransport::respond(200, "{}");
        let err = OsbClient::with_transport(ClientConfiguration::new("b", ""), transport)
            .unwrap_err();
        assert!(matches!(err, ClientError::BuildError(_)));
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let transport = RecordingTransport::respond(200, "{}");
        let client = OsbClient::with_transport(
            ClientConfiguration::new("b", format!("{TEST_URL}/")),
            transport,
        )
        .unwrap();
        assert!(format!("{client:?}").contains(&format!("\"{TEST_URL}\"")));
    }

    #[test]
    fn test_client_accessors() {
        let config = ClientConfiguration::new("my-broker", TEST_URL)
            .with_api_version(ApiVersion::V2_12)
            .with_alpha_features(true);
        let client = OsbClient::new(config).unwrap();

        assert_eq!(client.name(), "my-broker");
        assert_eq!(client.api_version(), ApiVersion::V2_12);
        assert!(client.alpha_features_enabled());
    }

    #[tokio::test]
    async fn test_observer_counts_outcomes() {
        let counters = Arc::new(RequestCounters::new());

        let ok = RecordingTransport::respond(200, r#"{"services":[]}"#);
        let client = OsbClient::with_transport(ClientConfiguration::new("b", TEST_URL), ok)
            .unwrap()
            .with_observer(counters.clone());
        client.get_catalog().await.unwrap();

        let failing = RecordingTransport::fail(TransportError::Timeout("deadline".into()));
        let client = OsbClient::with_transport(ClientConfiguration::new("b", TEST_URL), failing)
            .unwrap()
            .with_observer(counters.clone());
        client.get_catalog().await.unwrap_err();

        assert_eq!(counters.requests("b"), 2);
        assert_eq!(counters.responses("b", "200"), 1);
        assert_eq!(counters.responses("b", "client-error"), 1);
    }

    #[tokio::test]
    async fn test_broker_client_trait_object() {
        let transport = RecordingTransport::respond(200, r#"{"state":"succeeded"}"#);
        let client: Box<dyn BrokerClient> = Box::new(
            OsbClient::with_transport(ClientConfiguration::new("b", TEST_URL), transport).unwrap(),
        );

        let response = client
            .poll_last_operation(&LastOperationRequest {
                instance_id: "i".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(response.state, LastOperationState::Succeeded);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_unexpected_accepted_is_logged() {
        let transport = RecordingTransport::respond(202, "{}");
        let client =
            OsbClient::with_transport(ClientConfiguration::new("b", TEST_URL), transport).unwrap();

        let err = client
            .update_instance(&UpdateInstanceRequest {
                instance_id: "i".into(),
                service_id: "s".into(),
                ..Default::default()
            })
            .await
            .unwrap_err();

        assert_eq!(err.as_http_status().unwrap().status, StatusCode::ACCEPTED);
        assert!(logs_contain("without accepts_incomplete"));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_async_response_is_logged() {
        let transport = RecordingTransport::respond(202, r#"{"operation":"op"}"#);
        let client =
            OsbClient::with_transport(ClientConfiguration::new("b", TEST_URL), transport).unwrap();

        client
            .deprovision_instance(&DeprovisionRequest {
                instance_id: "i".into(),
                accepts_incomplete: true,
                service_id: "s".into(),
                plan_id: "p".into(),
                originating_identity: None,
            })
            .await
            .unwrap();

        assert!(logs_contain("received asynchronous response"));
    }
}
