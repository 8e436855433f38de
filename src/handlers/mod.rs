pub mod auth;
pub mod bookings;
pub mod catalog;
pub mod health;
pub mod screenings;

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/login", post(auth::login))
        .route(
            "/api/movies",
            get(catalog::list_movies).post(catalog::add_movie),
        )
        .route(
            "/api/movies/:id",
            get(catalog::get_movie)
                .put(catalog::update_movie)
                .delete(catalog::delete_movie),
        )
        .route(
            "/api/hall-types",
            get(catalog::list_hall_types).post(catalog::add_hall_type),
        )
        .route("/api/halls", get(catalog::list_halls).post(catalog::add_hall))
        .route("/api/halls/available", get(screenings::available_halls))
        .route(
            "/api/screenings",
            get(screenings::list_screenings).post(screenings::create_screening),
        )
        .route(
            "/api/screenings/:id",
            get(screenings::get_screening)
                .put(screenings::update_screening)
                .delete(screenings::delete_screening),
        )
        .route("/api/screenings/:id/seats", get(screenings::seat_map))
        .route(
            "/api/screenings/:id/tickets",
            get(screenings::screening_tickets),
        )
        .route("/api/users", get(catalog::list_users).post(catalog::add_user))
        .route(
            "/api/users/:id",
            put(catalog::update_user).delete(catalog::delete_user),
        )
        .route("/api/users/:id/role", put(catalog::change_user_role))
        .route("/api/roles", get(catalog::list_roles))
        .route(
            "/api/bookings",
            get(bookings::list_bookings).post(bookings::create_booking),
        )
        .route(
            "/api/bookings/:id",
            get(bookings::get_booking).delete(bookings::delete_booking),
        )
        .route("/api/bookings/:id/cancel", post(bookings::cancel_booking))
        .route(
            "/api/bookings/:id/tickets/cancel",
            post(bookings::cancel_tickets),
        )
        .with_state(state)
}
