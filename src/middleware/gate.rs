use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Redirect, Response},
};
use chrono::Utc;

use crate::database::manager::DatabaseManager;
use crate::error::ApiError;
use crate::gate::{self, Decision};
use crate::store::PgMaintenanceStore;
use super::auth::AuthUser;

/// Route guard: re-evaluates the maintenance gate on every request to the
/// protected surface. Runs after JWT auth so the caller's role is known.
///
/// A blocked caller is redirected to the maintenance page with a 307 so the
/// client replaces the attempted location. Any failure to even reach the
/// store fails open.
pub async fn maintenance_gate_middleware(
    request: Request,
    next: Next,
) -> Result<Response, Response> {
    let auth_user = request.extensions().get::<AuthUser>()
        .ok_or_else(|| {
            let api_error = ApiError::unauthorized("JWT authentication required before maintenance gate");
            (
                StatusCode::from_u16(api_error.status_code()).unwrap(),
                Json(api_error.to_json()),
            )
                .into_response()
        })?
        .clone();

    let current_path = request.uri().path().to_string();

    let decision = match DatabaseManager::main_pool().await {
        Ok(pool) => {
            let store = PgMaintenanceStore::new(pool);
            gate::check_global_access(&store, &current_path, auth_user.role, Utc::now()).await
        }
        Err(err) => {
            // Fail open: no pool is the same as no answer from the store
            tracing::error!(
                path = %current_path,
                role = %auth_user.role,
                error = %err,
                "maintenance gate could not reach the store; failing open"
            );
            Decision::Allow
        }
    };

    match decision {
        Decision::Allow => Ok(next.run(request).await),
        Decision::Block { redirect_to } => {
            tracing::debug!(
                path = %current_path,
                role = %auth_user.role,
                "maintenance window in effect; redirecting"
            );
            Err(Redirect::temporary(&redirect_to).into_response())
        }
        Decision::RedirectHome => Err(Redirect::to("/").into_response()),
    }
}
