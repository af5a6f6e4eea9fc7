use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    response::{IntoResponse, Json, Redirect, Response},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::config;
use crate::database::manager::DatabaseManager;
use crate::error::ApiError;
use crate::gate::TimeRemaining;
use crate::middleware::auth::AuthUser;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::database::models::MaintenanceWindow;
use crate::services::MaintenanceService;
use crate::store::{NewMaintenanceWindow, PgMaintenanceStore};

async fn maintenance_service() -> Result<MaintenanceService, ApiError> {
    let pool = DatabaseManager::main_pool().await?;
    Ok(MaintenanceService::new(Arc::new(PgMaintenanceStore::new(pool))))
}

fn require_super_admin(auth_user: &AuthUser) -> Result<(), ApiError> {
    if !auth_user.role.is_super_admin() {
        return Err(ApiError::forbidden("Maintenance management requires super admin access"));
    }
    Ok(())
}

/// GET /maintenance - public landing state.
///
/// With a window in effect the client gets the bilingual notice and a live
/// countdown; `ending: true` plus the grace delay once the end time passes.
/// With no window in effect (or the store unreachable, which fails open)
/// the caller is sent home.
pub async fn maintenance_landing() -> Response {
    let active = match maintenance_service().await {
        Ok(service) => service.active_window().await,
        Err(err) => {
            // Pool acquisition failed; same fail-open path as a query error
            tracing::error!(error = %err, path = "/maintenance", "store unreachable; failing open");
            return Redirect::to("/").into_response();
        }
    };

    let window = match active {
        Ok(Some(window)) => window,
        Ok(None) => return Redirect::to("/").into_response(),
        Err(err) => {
            tracing::error!(error = %err, path = "/maintenance", "landing state query failed; failing open");
            return Redirect::to("/").into_response();
        }
    };

    let now = Utc::now();
    let remaining = TimeRemaining::until(window.end_time, now);
    let grace = config::config().maintenance.reload_grace_secs;

    let body = json!({
        "success": true,
        "data": {
            "window": {
                "id": window.id,
                "start_time": window.start_time,
                "end_time": window.end_time,
                "message_tr": window.message_tr,
                "message_en": window.message_en,
                "affected_services": window.affected_services,
            },
            "remaining": remaining.map(|r| r.to_string()),
            "ending": remaining.is_none(),
            "retry_after_secs": grace,
        }
    });

    Json(body).into_response()
}

/// GET /api/admin/maintenance/active
pub async fn active_window(
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Option<MaintenanceWindow>> {
    require_super_admin(&auth_user)?;

    let service = maintenance_service().await?;
    let window = service.active_window().await?;
    Ok(ApiResponse::success(window))
}

/// GET /api/admin/maintenance/upcoming
pub async fn upcoming_windows(
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Vec<MaintenanceWindow>> {
    require_super_admin(&auth_user)?;

    let service = maintenance_service().await?;
    let windows = service.upcoming().await?;
    Ok(ApiResponse::success(windows))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

/// GET /api/admin/maintenance/history?limit=N
pub async fn maintenance_history(
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Vec<MaintenanceWindow>> {
    require_super_admin(&auth_user)?;

    let service = maintenance_service().await?;
    let windows = service.history(query.limit).await?;
    Ok(ApiResponse::success(windows))
}

#[derive(Debug, Deserialize)]
pub struct CreateWindowRequest {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub message_tr: String,
    pub message_en: String,
    pub affected_services: Option<Vec<String>>,
}

/// POST /api/admin/maintenance - schedule a window
pub async fn create_window(
    Extension(auth_user): Extension<AuthUser>,
    Json(payload): Json<CreateWindowRequest>,
) -> ApiResult<MaintenanceWindow> {
    require_super_admin(&auth_user)?;

    let service = maintenance_service().await?;
    let created = service
        .schedule(NewMaintenanceWindow {
            start_time: payload.start_time,
            end_time: payload.end_time,
            message_tr: payload.message_tr,
            message_en: payload.message_en,
            affected_services: payload.affected_services,
            scheduled_by: auth_user.user_id,
        })
        .await?;

    Ok(ApiResponse::created(created))
}

/// POST /api/admin/maintenance/:id/cancel - idempotent cancel
pub async fn cancel_window(
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<serde_json::Value> {
    require_super_admin(&auth_user)?;

    let service = maintenance_service().await?;
    service.cancel(id).await?;
    Ok(ApiResponse::success(json!({ "id": id, "is_active": false })))
}

/// DELETE /api/admin/maintenance/:id - hard delete
pub async fn delete_window(
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    require_super_admin(&auth_user)?;

    let service = maintenance_service().await?;
    service.delete(id).await?;
    Ok(ApiResponse::<()>::no_content())
}
