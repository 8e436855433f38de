use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::handlers::auth::caller_from_headers;
use crate::models::{Booking, TicketDetails};
use crate::services::access::{self, Caller};
use crate::services::booking;
use crate::state::AppState;

#[derive(Serialize)]
pub struct BookingView {
    #[serde(flatten)]
    pub booking: Booking,
    pub tickets: Vec<TicketDetails>,
}

/// Loads a booking the caller is allowed to see.
fn owned_booking(state: &AppState, caller: &Caller, id: i64) -> Result<Booking, AppError> {
    let found = state.store.with_conn(|conn| booking::get_booking(conn, id))?;
    access::require_booking_access(caller, &found)?;
    Ok(found)
}

fn booking_view(state: &AppState, found: Booking) -> Result<BookingView, AppError> {
    let tickets = state
        .store
        .with_conn(|conn| booking::get_tickets_for_booking(conn, found.id))?;
    Ok(BookingView {
        booking: found,
        tickets,
    })
}

// GET /api/bookings
pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Booking>>, AppError> {
    let caller = caller_from_headers(&state, &headers)?;
    let bookings = state.store.with_conn(|conn| match caller.user_id {
        _ if caller.is_admin() => booking::list_bookings(conn),
        Some(user_id) => booking::list_bookings_for_user(conn, user_id),
        None => Ok(vec![]),
    })?;
    Ok(Json(bookings))
}

// POST /api/bookings
#[derive(Deserialize)]
pub struct CreateBookingRequest {
    /// Defaults to the caller. Only admins may book for someone else.
    pub user_id: Option<i64>,
    pub screening_id: i64,
    pub seats: Vec<String>,
}

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingView>), AppError> {
    let caller = caller_from_headers(&state, &headers)?;
    let user_id = body
        .user_id
        .or(caller.user_id)
        .ok_or_else(|| AppError::Validation("user_id is required".to_string()))?;
    access::require_self_or_admin(&caller, user_id)?;

    let base_price = state.config.base_ticket_price;
    let id = state.store.with_conn(|conn| {
        booking::create_booking(conn, base_price, user_id, body.screening_id, &body.seats)
    })?;

    let created = state.store.with_conn(|conn| booking::get_booking(conn, id))?;
    Ok((StatusCode::CREATED, Json(booking_view(&state, created)?)))
}

// GET /api/bookings/:id
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<BookingView>, AppError> {
    let caller = caller_from_headers(&state, &headers)?;
    let found = owned_booking(&state, &caller, id)?;
    Ok(Json(booking_view(&state, found)?))
}

// POST /api/bookings/:id/cancel
pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    let caller = caller_from_headers(&state, &headers)?;
    owned_booking(&state, &caller, id)?;
    state
        .store
        .with_conn(|conn| booking::cancel_booking(conn, id))?;
    Ok(Json(serde_json::json!({"ok": true})))
}

// POST /api/bookings/:id/tickets/cancel
#[derive(Deserialize)]
pub struct CancelTicketsRequest {
    pub ticket_ids: Vec<i64>,
}

pub async fn cancel_tickets(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<CancelTicketsRequest>,
) -> Result<Json<BookingView>, AppError> {
    let caller = caller_from_headers(&state, &headers)?;
    owned_booking(&state, &caller, id)?;
    let updated = state
        .store
        .with_conn(|conn| booking::cancel_tickets(conn, id, &body.ticket_ids))?;
    Ok(Json(booking_view(&state, updated)?))
}

// DELETE /api/bookings/:id
pub async fn delete_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    access::require_admin(&caller_from_headers(&state, &headers)?)?;
    state
        .store
        .with_conn(|conn| booking::delete_booking(conn, id))?;
    Ok(Json(serde_json::json!({"ok": true})))
}
