use sqlx::{postgres::PgPoolOptions, PgPool};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

/// Errors from DatabaseManager
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Centralized connection pool manager for the system database
pub struct DatabaseManager {
    pools: Arc<RwLock<HashMap<String, PgPool>>>,
}

impl DatabaseManager {
    fn instance() -> &'static DatabaseManager {
        use std::sync::OnceLock;
        static INSTANCE: OnceLock<DatabaseManager> = OnceLock::new();
        INSTANCE.get_or_init(|| DatabaseManager {
            pools: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    /// Name of the system database. Currently fixed as "atlas_main".
    /// Future work: make this configurable via env, e.g., ATLAS_SYSTEM_DB_NAME.
    const SYSTEM_DB_NAME: &'static str = "atlas_main";

    /// Get main system database pool
    pub async fn main_pool() -> Result<PgPool, DatabaseError> {
        Self::instance().get_pool(Self::SYSTEM_DB_NAME).await
    }

    /// Get existing pool or create a new one lazily
    async fn get_pool(&self, database_name: &str) -> Result<PgPool, DatabaseError> {
        // Fast path: try read lock
        {
            let pools = self.pools.read().await;
            if let Some(pool) = pools.get(database_name) {
                return Ok(pool.clone());
            }
        }

        // Build connection string by swapping DB name in DATABASE_URL path
        let connection_string = Self::build_connection_string(database_name)?;

        let max_connections = crate::config::config().database.max_connections;
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(&connection_string)
            .await?;

        // Store in cache
        {
            let mut pools = self.pools.write().await;
            pools.insert(database_name.to_string(), pool.clone());
        }

        info!("Created database pool for: {}", database_name);
        Ok(pool)
    }

    fn build_connection_string(database_name: &str) -> Result<String, DatabaseError> {
        let base = std::env::var("DATABASE_URL")
            .map_err(|_| DatabaseError::ConfigMissing("DATABASE_URL"))?;

        let mut url = url::Url::parse(&base).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        // Replace the path to the database name (ensure leading slash)
        url.set_path(&format!("/{}", database_name));
        Ok(url.into())
    }

    /// Pings the main pool to ensure connectivity
    pub async fn health_check() -> Result<(), DatabaseError> {
        let pool = Self::main_pool().await?;
        sqlx::query("SELECT 1").execute(&pool).await?;
        Ok(())
    }

    /// Create the system tables when they do not exist yet.
    /// Safe to run on every startup.
    pub async fn ensure_schema(pool: &PgPool) -> Result<(), DatabaseError> {
        for ddl in SCHEMA_DDL {
            sqlx::query(ddl).execute(pool).await?;
        }
        info!("System schema verified");
        Ok(())
    }
}

const SCHEMA_DDL: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS companies (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        name TEXT NOT NULL,
        is_active BOOLEAN NOT NULL DEFAULT true,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        email TEXT NOT NULL UNIQUE,
        role TEXT NOT NULL DEFAULT 'user',
        company_id UUID REFERENCES companies(id),
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS service_types (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        slug TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'active',
        maintenance_message TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS service_instances (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        company_id UUID NOT NULL REFERENCES companies(id),
        service_type_id UUID NOT NULL REFERENCES service_types(id),
        status TEXT NOT NULL DEFAULT 'active',
        metadata JSONB NOT NULL DEFAULT '{}'::jsonb,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS maintenance_windows (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        start_time TIMESTAMPTZ NOT NULL,
        end_time TIMESTAMPTZ NOT NULL,
        message_tr TEXT NOT NULL,
        message_en TEXT NOT NULL,
        affected_services TEXT[],
        is_active BOOLEAN NOT NULL DEFAULT true,
        scheduled_by UUID NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        CONSTRAINT window_ends_after_start CHECK (end_time > start_time)
    )
    "#,
];
