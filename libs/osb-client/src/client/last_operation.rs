use http::{Method, StatusCode};

use super::binding::ASYNC_BINDING_NOT_ALLOWED;
use super::{OPERATION, OsbClient, PLAN_ID, SERVICE_ID};
use crate::error::ClientError;
use crate::request::RequestBuilder;
use crate::response;
use crate::transport::BrokerResponse;
use crate::types::{
    BindingLastOperationRequest, LastOperationRequest, LastOperationResponse, OperationKey,
};
use crate::validate;
use crate::version::ApiVersion;

fn poll_query(
    builder: RequestBuilder,
    service_id: Option<&str>,
    plan_id: Option<&str>,
    operation_key: Option<&OperationKey>,
) -> RequestBuilder {
    builder
        .query_opt(SERVICE_ID, service_id)
        .query_opt(PLAN_ID, plan_id)
        .query_opt(OPERATION, operation_key.map(OperationKey::as_str))
}

impl OsbClient {
    /// Poll the state of the last asynchronous operation on an instance.
    ///
    /// # Errors
    /// Validation failures, transport failures, or an
    /// [`crate::HttpStatusCodeError`] for any status other than 200. A
    /// `410 Gone` while polling a deprovision is reported as an error;
    /// check it with [`crate::is_gone_error`].
    pub async fn poll_last_operation(
        &self,
        r: &LastOperationRequest,
    ) -> Result<LastOperationResponse, ClientError> {
        validate::last_operation(r)?;

        let builder = self.builder(Method::GET, self.last_operation_url(&r.instance_id))?;
        let request = poll_query(
            builder,
            r.service_id.as_deref(),
            r.plan_id.as_deref(),
            r.operation_key.as_ref(),
        )
        .originating_identity(r.originating_identity.as_deref(), self.api_version)?
        .build();

        let response = self.execute(request).await?;
        self.last_operation_response(&response)
    }

    /// Poll the state of the last asynchronous operation on a binding.
    /// Requires API version 2.14.
    ///
    /// # Errors
    /// `NotAllowed` below 2.14, validation failures, transport failures, or
    /// an [`crate::HttpStatusCodeError`] for any status other than 200.
    pub async fn poll_binding_last_operation(
        &self,
        r: &BindingLastOperationRequest,
    ) -> Result<LastOperationResponse, ClientError> {
        self.require_version(ApiVersion::V2_14, ASYNC_BINDING_NOT_ALLOWED)?;
        validate::binding_last_operation(r)?;

        let builder = self.builder(
            Method::GET,
            self.binding_last_operation_url(&r.instance_id, &r.binding_id),
        )?;
        let request = poll_query(
            builder,
            r.service_id.as_deref(),
            r.plan_id.as_deref(),
            r.operation_key.as_ref(),
        )
        .originating_identity(r.originating_identity.as_deref(), self.api_version)?
        .build();

        let response = self.execute(request).await?;
        self.last_operation_response(&response)
    }

    fn last_operation_response(
        &self,
        response: &BrokerResponse,
    ) -> Result<LastOperationResponse, ClientError> {
        match response.status {
            StatusCode::OK => {
                let mut last_operation: LastOperationResponse = response::decode(response)?;
                if self.enable_alpha_features {
                    last_operation.poll_delay = response::poll_delay(&response.headers);
                }
                Ok(last_operation)
            }
            _ => Err(response::failure(response)),
        }
    }
}
