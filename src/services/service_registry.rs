use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{Company, ServiceInstance, ServiceType};

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Service instance not found: {0}")]
    InstanceNotFound(Uuid),

    #[error("Company not found: {0}")]
    CompanyNotFound(Uuid),

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    DatabaseManager(#[from] DatabaseError),
}

/// Read side of the service catalog: per-company instances and the shared
/// service types they instantiate. The gate reads both status scopes from
/// here.
pub struct ServiceRegistry {
    pool: PgPool,
}

impl ServiceRegistry {
    pub async fn new() -> Result<Self, RegistryError> {
        let pool = DatabaseManager::main_pool().await?;
        Ok(Self { pool })
    }

    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch an instance together with its service type
    pub async fn instance_with_type(
        &self,
        instance_id: Uuid,
    ) -> Result<(ServiceInstance, ServiceType), RegistryError> {
        let instance = sqlx::query_as::<_, ServiceInstance>(
            "SELECT id, company_id, service_type_id, status, metadata, created_at, updated_at \
             FROM service_instances WHERE id = $1",
        )
        .bind(instance_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RegistryError::InstanceNotFound(instance_id))?;

        let service_type = sqlx::query_as::<_, ServiceType>(
            "SELECT id, slug, name, status, maintenance_message \
             FROM service_types WHERE id = $1",
        )
        .bind(instance.service_type_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((instance, service_type))
    }

    pub async fn company(&self, company_id: Uuid) -> Result<Company, RegistryError> {
        let company = sqlx::query_as::<_, Company>(
            "SELECT id, name, is_active, created_at FROM companies WHERE id = $1",
        )
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RegistryError::CompanyNotFound(company_id))?;

        Ok(company)
    }

    /// All instances for one company, for the scoped dashboard views
    pub async fn instances_for_company(
        &self,
        company_id: Uuid,
    ) -> Result<Vec<ServiceInstance>, RegistryError> {
        let instances = sqlx::query_as::<_, ServiceInstance>(
            "SELECT id, company_id, service_type_id, status, metadata, created_at, updated_at \
             FROM service_instances WHERE company_id = $1 ORDER BY created_at",
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(instances)
    }
}
