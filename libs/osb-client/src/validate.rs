//! Precondition checks run before any request is built.

use crate::error::ValidationError;
use crate::types::{
    BindRequest, BindingLastOperationRequest, DeprovisionRequest, GetBindingRequest,
    GetInstanceRequest, LastOperationRequest, ProvisionRequest, UnbindRequest,
    UpdateInstanceRequest,
};

fn required(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.is_empty() {
        Err(ValidationError::Required(field))
    } else {
        Ok(())
    }
}

pub(crate) fn provision(r: &ProvisionRequest) -> Result<(), ValidationError> {
    required(&r.instance_id, "instance_id")?;
    required(&r.service_id, "service_id")?;
    required(&r.plan_id, "plan_id")?;
    required(&r.organization_guid, "organization_guid")?;
    required(&r.space_guid, "space_guid")
}

pub(crate) fn update_instance(r: &UpdateInstanceRequest) -> Result<(), ValidationError> {
    required(&r.instance_id, "instance_id")?;
    required(&r.service_id, "service_id")?;
    if let Some(plan_id) = &r.plan_id {
        required(plan_id, "plan_id")?;
    }
    Ok(())
}

pub(crate) fn deprovision(r: &DeprovisionRequest) -> Result<(), ValidationError> {
    required(&r.instance_id, "instance_id")?;
    required(&r.service_id, "service_id")?;
    required(&r.plan_id, "plan_id")
}

pub(crate) fn get_instance(r: &GetInstanceRequest) -> Result<(), ValidationError> {
    required(&r.instance_id, "instance_id")
}

pub(crate) fn last_operation(r: &LastOperationRequest) -> Result<(), ValidationError> {
    required(&r.instance_id, "instance_id")
}

pub(crate) fn binding_last_operation(
    r: &BindingLastOperationRequest,
) -> Result<(), ValidationError> {
    required(&r.instance_id, "instance_id")?;
    required(&r.binding_id, "binding_id")
}

pub(crate) fn bind(r: &BindRequest) -> Result<(), ValidationError> {
    required(&r.binding_id, "binding_id")?;
    required(&r.instance_id, "instance_id")?;
    required(&r.service_id, "service_id")?;
    required(&r.plan_id, "plan_id")
}

pub(crate) fn unbind(r: &UnbindRequest) -> Result<(), ValidationError> {
    required(&r.instance_id, "instance_id")?;
    required(&r.binding_id, "binding_id")?;
    required(&r.service_id, "service_id")?;
    required(&r.plan_id, "plan_id")
}

pub(crate) fn get_binding(r: &GetBindingRequest) -> Result<(), ValidationError> {
    required(&r.instance_id, "instance_id")?;
    required(&r.binding_id, "binding_id")
}
