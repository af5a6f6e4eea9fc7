use axum::extract::{Extension, Path};
use serde::Serialize;
use uuid::Uuid;

use crate::database::models::{Company, ServiceInstance};
use crate::error::ApiError;
use crate::gate::{evaluate_service_access, ServiceAccess};
use crate::middleware::auth::AuthUser;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::{RegistryError, ServiceRegistry};
use crate::types::UserRole;

#[derive(Debug, Serialize)]
pub struct ServiceAccessResponse {
    pub instance_id: Uuid,
    #[serde(flatten)]
    pub access: ServiceAccess,
}

/// GET /api/services/:id/access - dual-scope access decision for the caller.
///
/// A registry read failure is not evidence the service is in maintenance,
/// so infrastructure errors fail open; a genuinely unknown instance is
/// still a 404.
pub async fn service_access(
    Extension(auth_user): Extension<AuthUser>,
    Path(instance_id): Path<Uuid>,
) -> ApiResult<ServiceAccessResponse> {
    let registry = match ServiceRegistry::new().await {
        Ok(registry) => registry,
        Err(err) => {
            tracing::error!(
                instance_id = %instance_id,
                role = %auth_user.role,
                error = %err,
                "service registry unreachable; failing open"
            );
            return Ok(ApiResponse::success(ServiceAccessResponse {
                instance_id,
                access: ServiceAccess::Allow,
            }));
        }
    };

    let access = match registry.instance_with_type(instance_id).await {
        Ok((instance, service_type)) => evaluate_service_access(
            instance.status,
            service_type.status,
            instance.maintenance_reason(),
            service_type.maintenance_message.as_deref(),
            auth_user.role,
        ),
        Err(RegistryError::InstanceNotFound(id)) => {
            return Err(ApiError::not_found(format!("Service instance not found: {}", id)));
        }
        Err(err) => {
            tracing::error!(
                instance_id = %instance_id,
                role = %auth_user.role,
                error = %err,
                "service status read failed; failing open"
            );
            ServiceAccess::Allow
        }
    };

    Ok(ApiResponse::success(ServiceAccessResponse { instance_id, access }))
}

#[derive(Debug, Serialize)]
pub struct CompanyServicesResponse {
    pub company: Company,
    pub instances: Vec<ServiceInstance>,
}

/// GET /api/companies/:id/services - one company's service instances.
///
/// Super admins see any company; company admins only their own.
pub async fn company_services(
    Extension(auth_user): Extension<AuthUser>,
    Path(company_id): Path<Uuid>,
) -> ApiResult<CompanyServicesResponse> {
    let scoped = match auth_user.role {
        UserRole::SuperAdmin => true,
        UserRole::CompanyAdmin => auth_user.company_id == Some(company_id),
        UserRole::User => false,
    };
    if !scoped {
        return Err(ApiError::forbidden("Not authorized for this company"));
    }

    let registry = ServiceRegistry::new().await?;
    let company = registry.company(company_id).await?;
    let instances = registry.instances_for_company(company_id).await?;

    Ok(ApiResponse::success(CompanyServicesResponse { company, instances }))
}
