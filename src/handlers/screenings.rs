use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;

use crate::errors::AppError;
use crate::handlers::auth::caller_from_headers;
use crate::models::{CinemaHall, ScreeningDetails, ScreeningInput, SeatHolder};
use crate::services::booking::{self, SeatMap};
use crate::services::{access, scheduling};
use crate::state::AppState;

// GET /api/screenings
#[derive(Deserialize)]
pub struct ScreeningsQuery {
    pub date: Option<NaiveDate>,
}

pub async fn list_screenings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<ScreeningsQuery>,
) -> Result<Json<Vec<ScreeningDetails>>, AppError> {
    caller_from_headers(&state, &headers)?;
    let screenings = state.store.with_conn(|conn| match params.date {
        Some(date) => scheduling::list_screenings_on(conn, date),
        None => scheduling::list_screenings(conn),
    })?;
    Ok(Json(screenings))
}

// GET /api/screenings/:id
pub async fn get_screening(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<ScreeningDetails>, AppError> {
    caller_from_headers(&state, &headers)?;
    let screening = state
        .store
        .with_conn(|conn| scheduling::get_screening(conn, id))?;
    Ok(Json(screening))
}

// POST /api/screenings
pub async fn create_screening(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<ScreeningInput>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    access::require_admin(&caller_from_headers(&state, &headers)?)?;
    let id = state
        .store
        .with_conn(|conn| scheduling::create_screening(conn, &body))?;
    Ok((StatusCode::CREATED, Json(serde_json::json!({"id": id}))))
}

// PUT /api/screenings/:id
pub async fn update_screening(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<ScreeningInput>,
) -> Result<Json<serde_json::Value>, AppError> {
    access::require_admin(&caller_from_headers(&state, &headers)?)?;
    state
        .store
        .with_conn(|conn| scheduling::update_screening(conn, id, &body))?;
    Ok(Json(serde_json::json!({"ok": true})))
}

// DELETE /api/screenings/:id
pub async fn delete_screening(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    access::require_admin(&caller_from_headers(&state, &headers)?)?;
    state
        .store
        .with_conn(|conn| scheduling::delete_screening(conn, id))?;
    Ok(Json(serde_json::json!({"ok": true})))
}

// GET /api/halls/available?start=..&end=..
#[derive(Deserialize)]
pub struct SlotQuery {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

pub async fn available_halls(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(slot): Query<SlotQuery>,
) -> Result<Json<Vec<CinemaHall>>, AppError> {
    access::require_admin(&caller_from_headers(&state, &headers)?)?;
    let halls = state
        .store
        .with_conn(|conn| scheduling::available_halls(conn, &slot.start, &slot.end))?;
    Ok(Json(halls))
}

// GET /api/screenings/:id/seats
pub async fn seat_map(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<SeatMap>, AppError> {
    caller_from_headers(&state, &headers)?;
    let base_price = state.config.base_ticket_price;
    let seats = state
        .store
        .with_conn(|conn| booking::seat_map(conn, base_price, id))?;
    Ok(Json(seats))
}

// GET /api/screenings/:id/tickets
pub async fn screening_tickets(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<Vec<SeatHolder>>, AppError> {
    access::require_admin(&caller_from_headers(&state, &headers)?)?;
    let tickets = state.store.with_conn(|conn| {
        scheduling::get_screening(conn, id)?;
        booking::get_tickets_for_screening(conn, id)
    })?;
    Ok(Json(tickets))
}
