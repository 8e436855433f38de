use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::user::USER_ROLE;
use crate::models::{
    CinemaHall, CinemaHallInput, HallType, HallTypeInput, Movie, MovieInput, Role, User,
    UserInput,
};

// ── Movies ──

fn validate_movie(movie: &MovieInput) -> Result<(), AppError> {
    if movie.title.trim().is_empty() {
        return Err(AppError::Validation("movie title must not be empty".to_string()));
    }
    if movie.duration_minutes <= 0 {
        return Err(AppError::Validation(
            "movie duration must be positive".to_string(),
        ));
    }
    Ok(())
}

pub fn add_movie(conn: &Connection, movie: &MovieInput) -> Result<i64, AppError> {
    validate_movie(movie)?;
    let id = queries::insert_movie(conn, movie)?;
    tracing::info!(movie_id = id, "added movie {}", movie.title);
    Ok(id)
}

pub fn update_movie(conn: &Connection, id: i64, movie: &MovieInput) -> Result<(), AppError> {
    validate_movie(movie)?;
    if !queries::update_movie(conn, id, movie)? {
        return Err(AppError::NotFound(format!("movie {id}")));
    }
    Ok(())
}

/// Removes a movie that no screening refers to.
pub fn delete_movie(conn: &Connection, id: i64) -> Result<(), AppError> {
    if queries::count_screenings_for_movie(conn, id)? > 0 {
        return Err(AppError::Conflict(format!(
            "movie {id} is still scheduled for screenings"
        )));
    }
    if !queries::delete_movie(conn, id)? {
        return Err(AppError::NotFound(format!("movie {id}")));
    }
    tracing::info!(movie_id = id, "deleted movie");
    Ok(())
}

pub fn list_movies(conn: &Connection) -> Result<Vec<Movie>, AppError> {
    Ok(queries::list_movies(conn)?)
}

pub fn get_movie(conn: &Connection, id: i64) -> Result<Movie, AppError> {
    queries::get_movie(conn, id)?.ok_or_else(|| AppError::NotFound(format!("movie {id}")))
}

// ── Hall Types & Halls ──

pub fn add_hall_type(conn: &Connection, hall_type: &HallTypeInput) -> Result<i64, AppError> {
    if hall_type.name.trim().is_empty() {
        return Err(AppError::Validation("hall type name must not be empty".to_string()));
    }
    if hall_type.price_multiplier < Decimal::ZERO {
        return Err(AppError::Validation(
            "price multiplier must not be negative".to_string(),
        ));
    }
    Ok(queries::insert_hall_type(conn, hall_type)?)
}

pub fn list_hall_types(conn: &Connection) -> Result<Vec<HallType>, AppError> {
    Ok(queries::list_hall_types(conn)?)
}

pub fn get_hall_type(conn: &Connection, id: i64) -> Result<HallType, AppError> {
    queries::get_hall_type(conn, id)?
        .ok_or_else(|| AppError::NotFound(format!("hall type {id}")))
}

pub fn add_hall(conn: &Connection, hall: &CinemaHallInput) -> Result<i64, AppError> {
    if hall.name.trim().is_empty() {
        return Err(AppError::Validation("hall name must not be empty".to_string()));
    }
    if hall.capacity <= 0 {
        return Err(AppError::Validation("hall capacity must be positive".to_string()));
    }
    get_hall_type(conn, hall.type_id)?;
    Ok(queries::insert_hall(conn, hall)?)
}

pub fn list_halls(conn: &Connection) -> Result<Vec<CinemaHall>, AppError> {
    Ok(queries::list_halls(conn)?)
}

pub fn get_hall(conn: &Connection, id: i64) -> Result<CinemaHall, AppError> {
    queries::get_hall(conn, id)?.ok_or_else(|| AppError::NotFound(format!("hall {id}")))
}

// ── Users & Roles ──

fn validate_user(user: &UserInput) -> Result<(), AppError> {
    if user.name.trim().is_empty() {
        return Err(AppError::Validation("user name must not be empty".to_string()));
    }
    if user.email.trim().is_empty() {
        return Err(AppError::Validation("user email must not be empty".to_string()));
    }
    Ok(())
}

fn ensure_email_free(conn: &Connection, email: &str, owner: Option<i64>) -> Result<(), AppError> {
    match queries::get_user_by_email(conn, email)? {
        Some(existing) if Some(existing.id) != owner => Err(AppError::Conflict(format!(
            "email {email} is already registered"
        ))),
        _ => Ok(()),
    }
}

/// Adds a user. Without an explicit role the user gets the `User` role.
pub fn add_user(conn: &Connection, user: &UserInput) -> Result<i64, AppError> {
    validate_user(user)?;
    ensure_email_free(conn, &user.email, None)?;

    let role_id = match user.role_id {
        Some(role_id) => get_role(conn, role_id)?.id,
        None => get_role_by_name(conn, USER_ROLE)?.id,
    };

    let id = queries::insert_user(conn, user, role_id)?;
    tracing::info!(user_id = id, role_id, "added user");
    Ok(id)
}

/// Updates name, email and phone. Roles change through [`change_user_role`].
pub fn update_user(conn: &Connection, id: i64, user: &UserInput) -> Result<(), AppError> {
    validate_user(user)?;
    ensure_email_free(conn, &user.email, Some(id))?;
    if !queries::update_user(conn, id, user)? {
        return Err(AppError::NotFound(format!("user {id}")));
    }
    Ok(())
}

pub fn delete_user(conn: &Connection, id: i64) -> Result<(), AppError> {
    if queries::count_bookings_for_user(conn, id)? > 0 {
        return Err(AppError::Conflict(format!("user {id} still owns bookings")));
    }
    if !queries::delete_user(conn, id)? {
        return Err(AppError::NotFound(format!("user {id}")));
    }
    tracing::info!(user_id = id, "deleted user");
    Ok(())
}

pub fn change_user_role(conn: &Connection, id: i64, role_id: i64) -> Result<(), AppError> {
    get_role(conn, role_id)?;
    if !queries::change_user_role(conn, id, role_id)? {
        return Err(AppError::NotFound(format!("user {id}")));
    }
    tracing::info!(user_id = id, role_id, "changed user role");
    Ok(())
}

pub fn list_users(conn: &Connection) -> Result<Vec<User>, AppError> {
    Ok(queries::list_users(conn)?)
}

pub fn list_users_by_role(conn: &Connection, role_name: &str) -> Result<Vec<User>, AppError> {
    Ok(queries::list_users_by_role(conn, role_name)?)
}

pub fn get_user(conn: &Connection, id: i64) -> Result<User, AppError> {
    queries::get_user(conn, id)?.ok_or_else(|| AppError::NotFound(format!("user {id}")))
}

pub fn get_user_by_email(conn: &Connection, email: &str) -> Result<User, AppError> {
    queries::get_user_by_email(conn, email)?
        .ok_or_else(|| AppError::NotFound(format!("user with email {email}")))
}

pub fn list_roles(conn: &Connection) -> Result<Vec<Role>, AppError> {
    Ok(queries::list_roles(conn)?)
}

pub fn get_role(conn: &Connection, id: i64) -> Result<Role, AppError> {
    queries::get_role(conn, id)?.ok_or_else(|| AppError::NotFound(format!("role {id}")))
}

pub fn get_role_by_name(conn: &Connection, name: &str) -> Result<Role, AppError> {
    queries::get_role_by_name(conn, name)?
        .ok_or_else(|| AppError::NotFound(format!("role {name}")))
}
