use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub maintenance: MaintenanceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub enable_query_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enable_request_logging: bool,
    pub history_default_limit: i64,
    pub history_max_limit: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
}

/// Settings for the maintenance gate and its polling watcher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceConfig {
    /// Watcher re-check cadence while the server is running
    pub poll_interval_secs: u64,
    /// Grace delay clients should wait before reloading once a window ends
    pub reload_grace_secs: u64,
    /// Route that hosts the maintenance landing state; never gated itself
    pub page_path: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_ENABLE_QUERY_LOGGING") {
            self.database.enable_query_logging = v.parse().unwrap_or(self.database.enable_query_logging);
        }

        // API overrides
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_HISTORY_DEFAULT_LIMIT") {
            self.api.history_default_limit = v.parse().unwrap_or(self.api.history_default_limit);
        }
        if let Ok(v) = env::var("API_HISTORY_MAX_LIMIT") {
            self.api.history_max_limit = v.parse().unwrap_or(self.api.history_max_limit);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }

        // Maintenance gate overrides
        if let Ok(v) = env::var("MAINTENANCE_POLL_INTERVAL_SECS") {
            self.maintenance.poll_interval_secs = v.parse().unwrap_or(self.maintenance.poll_interval_secs);
        }
        if let Ok(v) = env::var("MAINTENANCE_RELOAD_GRACE_SECS") {
            self.maintenance.reload_grace_secs = v.parse().unwrap_or(self.maintenance.reload_grace_secs);
        }
        if let Ok(v) = env::var("MAINTENANCE_PAGE_PATH") {
            self.maintenance.page_path = v;
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                max_connections: 10,
                connection_timeout: 30,
                enable_query_logging: true,
            },
            api: ApiConfig {
                enable_request_logging: true,
                history_default_limit: 20,
                history_max_limit: 100,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                jwt_secret: "dev-secret-do-not-use".to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
            },
            maintenance: MaintenanceConfig {
                poll_interval_secs: 30,
                reload_grace_secs: 5,
                page_path: "/maintenance".to_string(),
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                max_connections: 20,
                connection_timeout: 10,
                enable_query_logging: true,
            },
            api: ApiConfig {
                enable_request_logging: true,
                history_default_limit: 20,
                history_max_limit: 100,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
                jwt_secret: String::new(), // must come from JWT_SECRET
                jwt_expiry_hours: 24,
            },
            maintenance: MaintenanceConfig {
                poll_interval_secs: 30,
                reload_grace_secs: 5,
                page_path: "/maintenance".to_string(),
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                max_connections: 50,
                connection_timeout: 5,
                enable_query_logging: false,
            },
            api: ApiConfig {
                enable_request_logging: false,
                history_default_limit: 20,
                history_max_limit: 100,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
                jwt_secret: String::new(), // must come from JWT_SECRET
                jwt_expiry_hours: 4,
            },
            maintenance: MaintenanceConfig {
                poll_interval_secs: 30,
                reload_grace_secs: 5,
                page_path: "/maintenance".to_string(),
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.maintenance.poll_interval_secs, 30);
        assert_eq!(config.maintenance.reload_grace_secs, 5);
        assert_eq!(config.maintenance.page_path, "/maintenance");
        assert!(!config.security.jwt_secret.is_empty());
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(!config.api.enable_request_logging);
        // Production refuses to ship a baked-in secret
        assert!(config.security.jwt_secret.is_empty());
        assert_eq!(config.api.history_max_limit, 100);
    }
}
