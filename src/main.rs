use std::sync::Arc;
use std::time::Duration;

use axum::{middleware as layers, routing::get, routing::post, Router};
use serde_json::{json, Value};
use tokio::sync::watch;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use atlas_admin_api::database::manager::DatabaseManager;
use atlas_admin_api::gate::{GateStatus, MaintenanceWatcher};
use atlas_admin_api::handlers;
use atlas_admin_api::middleware::auth::jwt_auth_middleware;
use atlas_admin_api::middleware::gate::maintenance_gate_middleware;
use atlas_admin_api::store::PgMaintenanceStore;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    // Initialize configuration (this loads the config singleton)
    let config = atlas_admin_api::config::config();
    tracing::info!("Starting Atlas Admin API in {:?} mode", config.environment);

    tracing_subscriber::fmt::init();

    // The watcher needs a working store; without one the gate middleware
    // still runs and fails open on its own
    let watcher = match DatabaseManager::main_pool().await {
        Ok(pool) => {
            if let Err(e) = DatabaseManager::ensure_schema(&pool).await {
                tracing::error!("Schema bootstrap failed: {}", e);
            }
            Some(Arc::new(MaintenanceWatcher::new(Arc::new(
                PgMaintenanceStore::new(pool),
            ))))
        }
        Err(e) => {
            tracing::warn!("Database unavailable at startup, maintenance watcher not started: {}", e);
            None
        }
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let watcher_handle = watcher.as_ref().map(|w| {
        w.clone().spawn(
            Duration::from_secs(config.maintenance.poll_interval_secs),
            shutdown_rx,
        )
    });

    let app = app(watcher.as_ref().map(|w| w.subscribe()));

    // Allow tests or deployments to override port via env
    let port = std::env::var("ATLAS_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    println!("🚀 Atlas Admin API server listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .expect("server");

    // Stop the watcher before exiting; an in-flight poll is discarded
    let _ = shutdown_tx.send(true);
    if let Some(handle) = watcher_handle {
        let _ = handle.await;
    }
}

fn app(gate_status: Option<watch::Receiver<GateStatus>>) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(move || health(gate_status.clone())))
        .route("/maintenance", get(handlers::maintenance::maintenance_landing))
        .route("/auth/login", post(handlers::auth::login))
        // Protected API
        .merge(api_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn api_routes() -> Router {
    use axum::routing::delete;
    use atlas_admin_api::handlers::maintenance;

    Router::new()
        .route("/api/services/:id/access", get(handlers::services::service_access))
        .route("/api/companies/:id/services", get(handlers::services::company_services))
        // Maintenance window management (super admin)
        .route("/api/admin/maintenance", post(maintenance::create_window))
        .route("/api/admin/maintenance/active", get(maintenance::active_window))
        .route("/api/admin/maintenance/upcoming", get(maintenance::upcoming_windows))
        .route("/api/admin/maintenance/history", get(maintenance::maintenance_history))
        .route("/api/admin/maintenance/:id/cancel", post(maintenance::cancel_window))
        .route("/api/admin/maintenance/:id", delete(maintenance::delete_window))
        // Gate runs after auth so the caller's role is known; layers run
        // bottom-up, so auth is added last
        .layer(layers::from_fn(maintenance_gate_middleware))
        .layer(layers::from_fn(jwt_auth_middleware))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Atlas Admin API",
            "version": version,
            "description": "Multi-tenant SaaS administration API with maintenance-window gating",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "maintenance": "/maintenance (public - landing state)",
                "login": "/auth/login (public - token acquisition)",
                "services": "/api/services/:id/access (protected)",
                "admin": "/api/admin/maintenance[/*] (protected, super admin)",
            }
        }
    }))
}

async fn health(gate_status: Option<watch::Receiver<GateStatus>>) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();
    let gate = gate_status
        .map(|rx| rx.borrow().label())
        .unwrap_or("checking");

    match DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok",
                    "gate": gate
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string(),
                    "gate": gate
                }
            })),
        ),
    }
}
