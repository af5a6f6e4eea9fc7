use axum::Json;
use serde::{Deserialize, Serialize};
use sqlx::Row;
use uuid::Uuid;

use crate::auth::{generate_jwt, Claims};
use crate::database::manager::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::types::UserRole;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: UserRole,
    pub company_id: Option<Uuid>,
}

/// POST /auth/login - issue a JWT for a known user.
///
/// Credential verification is out of scope for this service; the claim set
/// (role, company scope) is what the maintenance gate consumes.
pub async fn login(Json(payload): Json<LoginRequest>) -> ApiResult<LoginResponse> {
    let email = payload.email.trim().to_lowercase();
    if email.is_empty() {
        return Err(ApiError::bad_request("email is required"));
    }

    let pool = DatabaseManager::main_pool().await?;

    let row = sqlx::query("SELECT id, email, role, company_id FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(&pool)
        .await
        .map_err(|e| {
            tracing::error!("User lookup failed: {}", e);
            ApiError::service_unavailable("Database temporarily unavailable")
        })?
        .ok_or_else(|| ApiError::unauthorized("Unknown user"))?;

    let user_id: Uuid = row.get("id");
    let company_id: Option<Uuid> = row.get("company_id");
    let role = match row.get::<String, _>("role").as_str() {
        "super_admin" => UserRole::SuperAdmin,
        "company_admin" => UserRole::CompanyAdmin,
        _ => UserRole::User,
    };

    let claims = Claims::new(email, user_id, role, company_id);
    let token = generate_jwt(claims).map_err(|e| {
        tracing::error!("JWT generation failed: {}", e);
        ApiError::internal_server_error("Failed to issue token")
    })?;

    Ok(ApiResponse::success(LoginResponse { token, role, company_id }))
}
