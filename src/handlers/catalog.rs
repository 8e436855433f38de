use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Deserialize;

use crate::errors::AppError;
use crate::handlers::auth::caller_from_headers;
use crate::models::{
    CinemaHall, CinemaHallInput, HallType, HallTypeInput, Movie, MovieInput, Role, User,
    UserInput,
};
use crate::services::{access, catalog};
use crate::state::AppState;

fn created(id: i64) -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::CREATED, Json(serde_json::json!({"id": id})))
}

fn ok() -> Json<serde_json::Value> {
    Json(serde_json::json!({"ok": true}))
}

// ── Movies ──

// GET /api/movies
pub async fn list_movies(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Movie>>, AppError> {
    caller_from_headers(&state, &headers)?;
    let movies = state.store.with_conn(catalog::list_movies)?;
    Ok(Json(movies))
}

// GET /api/movies/:id
pub async fn get_movie(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<Movie>, AppError> {
    caller_from_headers(&state, &headers)?;
    let movie = state.store.with_conn(|conn| catalog::get_movie(conn, id))?;
    Ok(Json(movie))
}

// POST /api/movies
pub async fn add_movie(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<MovieInput>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    access::require_admin(&caller_from_headers(&state, &headers)?)?;
    let id = state.store.with_conn(|conn| catalog::add_movie(conn, &body))?;
    Ok(created(id))
}

// PUT /api/movies/:id
pub async fn update_movie(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<MovieInput>,
) -> Result<Json<serde_json::Value>, AppError> {
    access::require_admin(&caller_from_headers(&state, &headers)?)?;
    state
        .store
        .with_conn(|conn| catalog::update_movie(conn, id, &body))?;
    Ok(ok())
}

// DELETE /api/movies/:id
pub async fn delete_movie(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    access::require_admin(&caller_from_headers(&state, &headers)?)?;
    state.store.with_conn(|conn| catalog::delete_movie(conn, id))?;
    Ok(ok())
}

// ── Halls ──

// GET /api/hall-types
pub async fn list_hall_types(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<HallType>>, AppError> {
    caller_from_headers(&state, &headers)?;
    let types = state.store.with_conn(catalog::list_hall_types)?;
    Ok(Json(types))
}

// POST /api/hall-types
pub async fn add_hall_type(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<HallTypeInput>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    access::require_admin(&caller_from_headers(&state, &headers)?)?;
    let id = state
        .store
        .with_conn(|conn| catalog::add_hall_type(conn, &body))?;
    Ok(created(id))
}

// GET /api/halls
pub async fn list_halls(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<CinemaHall>>, AppError> {
    caller_from_headers(&state, &headers)?;
    let halls = state.store.with_conn(catalog::list_halls)?;
    Ok(Json(halls))
}

// POST /api/halls
pub async fn add_hall(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CinemaHallInput>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    access::require_admin(&caller_from_headers(&state, &headers)?)?;
    let id = state.store.with_conn(|conn| catalog::add_hall(conn, &body))?;
    Ok(created(id))
}

// ── Users & Roles ──

// GET /api/users
#[derive(Deserialize)]
pub struct UsersQuery {
    pub role: Option<String>,
}

pub async fn list_users(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<UsersQuery>,
) -> Result<Json<Vec<User>>, AppError> {
    access::require_admin(&caller_from_headers(&state, &headers)?)?;
    let users = state.store.with_conn(|conn| match &params.role {
        Some(role) => catalog::list_users_by_role(conn, role),
        None => catalog::list_users(conn),
    })?;
    Ok(Json(users))
}

// POST /api/users
pub async fn add_user(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<UserInput>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    access::require_admin(&caller_from_headers(&state, &headers)?)?;
    let id = state.store.with_conn(|conn| catalog::add_user(conn, &body))?;
    Ok(created(id))
}

// PUT /api/users/:id
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<UserInput>,
) -> Result<Json<serde_json::Value>, AppError> {
    access::require_admin(&caller_from_headers(&state, &headers)?)?;
    state
        .store
        .with_conn(|conn| catalog::update_user(conn, id, &body))?;
    Ok(ok())
}

// DELETE /api/users/:id
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    access::require_admin(&caller_from_headers(&state, &headers)?)?;
    state.store.with_conn(|conn| catalog::delete_user(conn, id))?;
    Ok(ok())
}

// PUT /api/users/:id/role
#[derive(Deserialize)]
pub struct RoleChange {
    pub role_id: i64,
}

pub async fn change_user_role(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<RoleChange>,
) -> Result<Json<serde_json::Value>, AppError> {
    access::require_admin(&caller_from_headers(&state, &headers)?)?;
    state
        .store
        .with_conn(|conn| catalog::change_user_role(conn, id, body.role_id))?;
    Ok(ok())
}

// GET /api/roles
pub async fn list_roles(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Role>>, AppError> {
    access::require_admin(&caller_from_headers(&state, &headers)?)?;
    let roles = state.store.with_conn(catalog::list_roles)?;
    Ok(Json(roles))
}
