use http::{Method, StatusCode};
use serde::{Deserialize, Serialize};

use super::{ACCEPTS_INCOMPLETE, OsbClient, PLAN_ID, SERVICE_ID, non_empty};
use crate::error::ClientError;
use crate::response::{self, AsyncBody};
use crate::types::{
    DeprovisionRequest, DeprovisionResponse, GetInstanceRequest, GetInstanceResponse, JsonObject,
    OperationKey, ProvisionRequest, ProvisionResponse, UpdateInstanceRequest,
    UpdateInstanceResponse,
};
use crate::validate;
use crate::version::ApiVersion;

#[derive(Debug, Serialize)]
struct ProvisionRequestBody<'a> {
    service_id: &'a str,
    plan_id: &'a str,
    organization_guid: &'a str,
    space_guid: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameters: Option<&'a JsonObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<&'a JsonObject>,
}

#[derive(Debug, Default, Deserialize)]
struct ProvisionResponseBody {
    #[serde(default)]
    dashboard_url: Option<String>,
    #[serde(default)]
    operation: Option<String>,
}

#[derive(Debug, Serialize)]
struct UpdateInstanceRequestBody<'a> {
    service_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    plan_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameters: Option<&'a JsonObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<&'a JsonObject>,
}

impl OsbClient {
    /// Provision a new service instance.
    ///
    /// # Errors
    /// Validation failures, transport failures, or an
    /// [`crate::HttpStatusCodeError`] for any status other than 200/201
    /// (and 202 when `accepts_incomplete` is set).
    pub async fn provision_instance(
        &self,
        r: &ProvisionRequest,
    ) -> Result<ProvisionResponse, ClientError> {
        validate::provision(r)?;

        let context = if self.api_version.at_least(ApiVersion::V2_12) {
            non_empty(r.context.as_ref())
        } else {
            None
        };
        let body = ProvisionRequestBody {
            service_id: &r.service_id,
            plan_id: &r.plan_id,
            organization_guid: &r.organization_guid,
            space_guid: &r.space_guid,
            parameters: non_empty(r.parameters.as_ref()),
            context,
        };

        let mut builder = self.builder(Method::PUT, self.instance_url(&r.instance_id))?;
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
                let body: ProvisionResponseBody = response::decode(&response)?;
                Ok(ProvisionResponse {
                    is_async: false,
                    dashboard_url: body.dashboard_url,
                    operation_key: None,
                })
            }
            StatusCode::ACCEPTED if r.accepts_incomplete => {
                let body: ProvisionResponseBody = response::decode(&response)?;
                self.log_async("provision");
                Ok(ProvisionResponse {
                    is_async: true,
                    dashboard_url: body.dashboard_url,
                    operation_key: body.operation.map(OperationKey::from),
                })
            }
            StatusCode::ACCEPTED => Err(self.unexpected_async(&response)),
            _ => Err(response::failure(&response)),
        }
    }

    /// Change the plan or parameters of an instance.
    ///
    /// # Errors
    /// Validation failures, transport failures, or an
    /// [`crate::HttpStatusCodeError`] for any status other than 200
    /// (and 202 when `accepts_incomplete` is set).
    pub async fn update_instance(
        &self,
        r: &UpdateInstanceRequest,
    ) -> Result<UpdateInstanceResponse, ClientError> {
        validate::update_instance(r)?;

        let context = if self.api_version.at_least(ApiVersion::V2_12) {
            non_empty(r.context.as_ref())
        } else {
            None
        };
        let body = UpdateInstanceRequestBody {
            service_id: &r.service_id,
            plan_id: r.plan_id.as_deref(),
            parameters: non_empty(r.parameters.as_ref()),
            context,
        };

        let mut builder = self.builder(Method::PATCH, self.instance_url(&r.instance_id))?;
        if r.accepts_incomplete {
            builder = builder.query(ACCEPTS_INCOMPLETE, "true");
        }
        let request = builder
            .originating_identity(r.originating_identity.as_deref(), self.api_version)?
            .json(&body)?
            .build();

        let response = self.execute(request).await?;

        match response.status {
            StatusCode::OK => Ok(UpdateInstanceResponse::default()),
            StatusCode::ACCEPTED if r.accepts_incomplete => {
                let body: AsyncBody = response::decode(&response)?;
                self.log_async("update");
                Ok(UpdateInstanceResponse {
                    is_async: true,
                    operation_key: body.operation.map(OperationKey::from),
                })
            }
            StatusCode::ACCEPTED => Err(self.unexpected_async(&response)),
            _ => Err(response::failure(&response)),
        }
    }

    /// Delete an instance. A `410 Gone` counts as success.
    ///
    /// # Errors
    /// Validation failures, transport failures, or an
    /// [`crate::HttpStatusCodeError`] for any status other than 200/410
    /// (and 202 when `accepts_incomplete` is set).
    pub async fn deprovision_instance(
        &self,
        r: &DeprovisionRequest,
    ) -> Result<DeprovisionResponse, ClientError> {
        validate::deprovision(r)?;

        let mut builder = self
            .builder(Method::DELETE, self.instance_url(&r.instance_id))?
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
            StatusCode::OK | StatusCode::GONE => Ok(DeprovisionResponse::default()),
            StatusCode::ACCEPTED if r.accepts_incomplete => {
                let body: AsyncBody = response::decode(&response)?;
                self.log_async("deprovision");
                Ok(DeprovisionResponse {
                    is_async: true,
                    operation_key: body.operation.map(OperationKey::from),
                })
            }
            StatusCode::ACCEPTED => Err(self.unexpected_async(&response)),
            _ => Err(response::failure(&response)),
        }
    }

    /// Fetch an instance. Requires API version 2.14.
    ///
    /// # Errors
    /// `NotAllowed` below 2.14, validation failures, transport failures, or
    /// an [`crate::HttpStatusCodeError`] for any status other than 200.
    pub async fn get_instance(
        &self,
        r: &GetInstanceRequest,
    ) -> Result<GetInstanceResponse, ClientError> {
        self.require_version(ApiVersion::V2_14, "GetInstance not allowed")?;
        validate::get_instance(r)?;

        let request = self
            .builder(Method::GET, self.instance_url(&r.instance_id))?
            .originating_identity(r.originating_identity.as_deref(), self.api_version)?
            .build();

        let response = self.execute(request).await?;

        match response.status {
            StatusCode::OK => response::decode(&response),
            _ => Err(response::failure(&response)),
        }
    }
}
