use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::services::access::{self, Caller};
use crate::state::AppState;

/// Header naming the user a request acts as.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Works out who is calling.
///
/// `Authorization: Bearer <admin token>` is the built-in admin. Otherwise the
/// `X-User-Id` header must name a stored user, whose role then applies.
pub fn caller_from_headers(state: &AppState, headers: &HeaderMap) -> Result<Caller, AppError> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if let Some(token) = auth.strip_prefix("Bearer ") {
        if token == state.config.admin_token {
            return Ok(Caller::admin("Administrator"));
        }
        return Err(AppError::Unauthorized);
    }

    let user_id = headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<i64>().ok())
        .ok_or(AppError::Unauthorized)?;

    state
        .store
        .with_conn(|conn| access::caller_for_user_id(conn, user_id))
}

// POST /api/login
#[derive(Deserialize)]
pub struct LoginRequest {
    pub login: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub user_id: Option<i64>,
    pub name: String,
    pub role: String,
    pub is_admin: bool,
    /// Bearer token for the built-in admin; other callers send `X-User-Id`.
    pub token: Option<String>,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let caller = state
        .store
        .with_conn(|conn| access::authenticate(conn, &state.config, &body.login, &body.password))?;

    let token = match caller.user_id {
        None if caller.is_admin() => Some(state.config.admin_token.clone()),
        _ => None,
    };

    Ok(Json(LoginResponse {
        user_id: caller.user_id,
        is_admin: caller.is_admin(),
        name: caller.name,
        role: caller.role,
        token,
    }))
}
