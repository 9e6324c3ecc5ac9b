mod binding;
mod catalog;
mod instance;
mod last_operation;
#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;

use http::Method;

use crate::config::{AuthConfig, ClientConfiguration};
use crate::error::ClientError;
use crate::observer::{RequestObserver, RequestOutcome};
use crate::request::RequestBuilder;
use crate::response;
use crate::transport::{BrokerRequest, BrokerResponse, ReqwestTransport, Transport};
use crate::types::{
    BindRequest, BindResponse, BindingLastOperationRequest, CatalogResponse, DeprovisionRequest,
    DeprovisionResponse, GetBindingRequest, GetBindingResponse, GetInstanceRequest,
    GetInstanceResponse, JsonObject, LastOperationRequest, LastOperationResponse,
    ProvisionRequest, ProvisionResponse, UnbindRequest, UnbindResponse, UpdateInstanceRequest,
    UpdateInstanceResponse,
};
use crate::version::ApiVersion;

const ACCEPTS_INCOMPLETE: &str = "accepts_incomplete";
const SERVICE_ID: &str = "service_id";
const PLAN_ID: &str = "plan_id";
const OPERATION: &str = "operation";

/// The Open Service Broker API operations.
///
/// Lifecycle of an instance: fetch the catalog, provision, optionally update,
/// deprovision. Bindable services additionally support bind and unbind.
/// Asynchronous operations are followed up with the poll methods at a
/// cadence the caller chooses.
///
/// Implemented by [`OsbClient`]; callers needing a test double implement it
/// themselves.
#[async_trait::async_trait]
pub trait BrokerClient: Send + Sync {
    /// `GET /v2/catalog`
    async fn get_catalog(&self) -> Result<CatalogResponse, ClientError>;

    async fn provision_instance(
        &self,
        r: &ProvisionRequest,
    ) -> Result<ProvisionResponse, ClientError>;

    async fn update_instance(
        &self,
        r: &UpdateInstanceRequest,
    ) -> Result<UpdateInstanceResponse, ClientError>;

    async fn deprovision_instance(
        &self,
        r: &DeprovisionRequest,
    ) -> Result<DeprovisionResponse, ClientError>;

    async fn get_instance(&self, r: &GetInstanceRequest)
    -> Result<GetInstanceResponse, ClientError>;

    async fn poll_last_operation(
        &self,
        r: &LastOperationRequest,
    ) -> Result<LastOperationResponse, ClientError>;

    async fn poll_binding_last_operation(
        &self,
        r: &BindingLastOperationRequest,
    ) -> Result<LastOperationResponse, ClientError>;

    async fn bind(&self, r: &BindRequest) -> Result<BindResponse, ClientError>;

    async fn unbind(&self, r: &UnbindRequest) -> Result<UnbindResponse, ClientError>;

    async fn get_binding(&self, r: &GetBindingRequest) -> Result<GetBindingResponse, ClientError>;
}

/// Client for a single broker.
///
/// Holds only immutable configuration and a shared transport, so one
/// instance can serve concurrent callers.
pub struct OsbClient {
    name: String,
    url: String,
    api_version: ApiVersion,
    auth: Option<AuthConfig>,
    enable_alpha_features: bool,
    verbose: bool,
    transport: Arc<dyn Transport>,
    observer: Option<Arc<dyn RequestObserver>>,
}

impl std::fmt::Debug for OsbClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OsbClient")
            .field("name", &self.name)
            .field("url", &self.url)
            .field("api_version", &self.api_version)
            .field("enable_alpha_features", &self.enable_alpha_features)
            .finish_non_exhaustive()
    }
}

impl OsbClient {
    /// Create a client talking HTTP through reqwest.
    ///
    /// # Errors
    /// Returns `ClientError::BuildError` for an empty URL or an invalid TLS setup.
    pub fn new(config: ClientConfiguration) -> Result<Self, ClientError> {
        let transport = ReqwestTransport::new(config.timeout, &config.tls)?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a client over a caller-supplied transport.
    ///
    /// # Errors
    /// Returns `ClientError::BuildError` for an empty URL.
    pub fn with_transport(
        config: ClientConfiguration,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ClientError> {
        let url = config.url.trim_end_matches('/');
        if url.is_empty() {
            return Err(ClientError::BuildError("broker URL is required".into()));
        }

        Ok(Self {
            url: url.to_owned(),
            name: config.name,
            api_version: config.api_version,
            auth: config.auth,
            enable_alpha_features: config.enable_alpha_features,
            verbose: config.verbose,
            transport,
            observer: None,
        })
    }

    /// Report every request outcome to `observer`.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn RequestObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn api_version(&self) -> ApiVersion {
        self.api_version
    }

    #[must_use]
    pub fn alpha_features_enabled(&self) -> bool {
        self.enable_alpha_features
    }

    fn catalog_url(&self) -> String {
        format!("{}/v2/catalog", self.url)
    }

    fn instance_url(&self, instance_id: &str) -> String {
        format!("{}/v2/service_instances/{instance_id}", self.url)
    }

    fn last_operation_url(&self, instance_id: &str) -> String {
        format!("{}/v2/service_instances/{instance_id}/last_operation", self.url)
    }

    fn binding_url(&self, instance_id: &str, binding_id: &str) -> String {
        format!(
            "{}/v2/service_instances/{instance_id}/service_bindings/{binding_id}",
            self.url
        )
    }

    fn binding_last_operation_url(&self, instance_id: &str, binding_id: &str) -> String {
        format!(
            "{}/v2/service_instances/{instance_id}/service_bindings/{binding_id}/last_operation",
            self.url
        )
    }

    /// Gate on a minimum API version, naming the refused operation.
    fn require_version(
        &self,
        minimum: ApiVersion,
        context: &'static str,
    ) -> Result<(), ClientError> {
        self.api_version
            .require_at_least(minimum)
            .map_err(|reason| ClientError::not_allowed(context, reason))
    }

    /// Start a request carrying the version and auth headers.
    fn builder(&self, method: Method, url: String) -> Result<RequestBuilder, ClientError> {
        RequestBuilder::new(method, url)
            .api_version(self.api_version)
            .auth(self.auth.as_ref())
    }

    /// Send `request`, reporting the outcome to the observer.
    ///
    /// Transport failures come back unchanged; status codes are left for
    /// the caller to interpret.
    async fn execute(&self, request: BrokerRequest) -> Result<BrokerResponse, ClientError> {
        tracing::debug!(
            broker = %self.name,
            method = %request.method,
            url = %request.url,
            "sending broker request"
        );

        let result = self.transport.send(request).await;

        if let Some(observer) = &self.observer {
            let outcome = match &result {
                Ok(response) => RequestOutcome::Response(response.status),
                Err(_) => RequestOutcome::TransportError,
            };
            observer.observe(&self.name, outcome);
        }

        let response = result.inspect_err(|e| {
            tracing::debug!(broker = %self.name, error = %e, "broker request failed");
        })?;

        tracing::debug!(broker = %self.name, status = %response.status, "broker responded");
        if self.verbose {
            tracing::trace!(
                broker = %self.name,
                body = %String::from_utf8_lossy(&response.body),
                "broker response body"
            );
        }

        Ok(response)
    }

    /// A 202 the caller did not opt into is a protocol violation.
    fn unexpected_async(&self, response: &BrokerResponse) -> ClientError {
        tracing::warn!(
            broker = %self.name,
            "broker returned 202 Accepted without accepts_incomplete"
        );
        response::failure(response)
    }

    fn log_async(&self, operation: &str) {
        tracing::info!(broker = %self.name, operation, "received asynchronous response");
    }
}

/// `Some` only for a non-empty object.
fn non_empty(map: Option<&JsonObject>) -> Option<&JsonObject> {
    map.filter(|m| !m.is_empty())
}

#[async_trait::async_trait]
impl BrokerClient for OsbClient {
    async fn get_catalog(&self) -> Result<CatalogResponse, ClientError> {
        OsbClient::get_catalog(self).await
    }

    async fn provision_instance(
        &self,
        r: &ProvisionRequest,
    ) -> Result<ProvisionResponse, ClientError> {
        OsbClient::provision_instance(self, r).await
    }

    async fn update_instance(
        &self,
        r: &UpdateInstanceRequest,
    ) -> Result<UpdateInstanceResponse, ClientError> {
        OsbClient::update_instance(self, r).await
    }

    async fn deprovision_instance(
        &self,
        r: &DeprovisionRequest,
    ) -> Result<DeprovisionResponse, ClientError> {
        OsbClient::deprovision_instance(self, r).await
    }

    async fn get_instance(
        &self,
        r: &GetInstanceRequest,
    ) -> Result<GetInstanceResponse, ClientError> {
        OsbClient::get_instance(self, r).await
    }

    async fn poll_last_operation(
        &self,
        r: &LastOperationRequest,
    ) -> Result<LastOperationResponse, ClientError> {
        OsbClient::poll_last_operation(self, r).await
    }

    async fn poll_binding_last_operation(
        &self,
        r: &BindingLastOperationRequest,
    ) -> Result<LastOperationResponse, ClientError> {
        OsbClient::poll_binding_last_operation(self, r).await
    }

    async fn bind(&self, r: &BindRequest) -> Result<BindResponse, ClientError> {
        OsbClient::bind(self, r).await
    }

    async fn unbind(&self, r: &UnbindRequest) -> Result<UnbindResponse, ClientError> {
        OsbClient::unbind(self, r).await
    }

    async fn get_binding(&self, r: &GetBindingRequest) -> Result<GetBindingResponse, ClientError> {
        OsbClient::get_binding(self, r).await
    }
}
