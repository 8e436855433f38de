use rusqlite::Connection;
use serde::Serialize;

use crate::config::AppConfig;
use crate::db::queries;
use crate::errors::AppError;
use crate::models::user::ADMIN_ROLE;
use crate::models::{Booking, User};

/// Role names are compared exactly: `admin` is not `Admin`.
pub fn is_admin(role_name: &str) -> bool {
    role_name == ADMIN_ROLE
}

/// Who is making a request.
///
/// The built-in admin account has no user row, so `user_id` is `None` for it.
/// Every other caller maps to a stored user and inherits that user's role.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Caller {
    pub user_id: Option<i64>,
    pub name: String,
    pub role: String,
}

impl Caller {
    pub fn admin(name: impl Into<String>) -> Self {
        Self {
            user_id: None,
            name: name.into(),
            role: ADMIN_ROLE.to_string(),
        }
    }

    pub fn for_user(user: &User) -> Self {
        Self {
            user_id: Some(user.id),
            name: user.name.clone(),
            role: user.role_name.clone(),
        }
    }

    pub fn is_admin(&self) -> bool {
        is_admin(&self.role)
    }

    /// Whether this caller owns records keyed by `user_id`.
    pub fn is_user(&self, user_id: i64) -> bool {
        self.user_id == Some(user_id)
    }
}

pub fn require_admin(caller: &Caller) -> Result<(), AppError> {
    if caller.is_admin() {
        Ok(())
    } else {
        Err(AppError::AccessDenied)
    }
}

/// Admins may act for anyone; everyone else only for themselves.
pub fn require_self_or_admin(caller: &Caller, user_id: i64) -> Result<(), AppError> {
    if caller.is_admin() || caller.is_user(user_id) {
        Ok(())
    } else {
        Err(AppError::AccessDenied)
    }
}

pub fn can_access_booking(caller: &Caller, booking: &Booking) -> bool {
    caller.is_admin() || caller.is_user(booking.user_id)
}

pub fn require_booking_access(caller: &Caller, booking: &Booking) -> Result<(), AppError> {
    if can_access_booking(caller, booking) {
        Ok(())
    } else {
        Err(AppError::AccessDenied)
    }
}

/// Resolves a login to a caller.
///
/// The configured admin login (any case) with the exact configured password
/// is the built-in admin. Any other login is matched against user emails,
/// then against user names by case-insensitive substring; such users are
/// not asked for a password.
pub fn authenticate(
    conn: &Connection,
    config: &AppConfig,
    login: &str,
    password: &str,
) -> Result<Caller, AppError> {
    let login = login.trim();
    if login.is_empty() {
        return Err(AppError::Validation("login must not be empty".to_string()));
    }

    if login.eq_ignore_ascii_case(&config.admin_login) {
        if password == config.admin_password {
            tracing::info!("admin logged in");
            return Ok(Caller::admin("Administrator"));
        }
        tracing::warn!("rejected admin login with wrong password");
        return Err(AppError::AccessDenied);
    }

    let user = match queries::get_user_by_email(conn, login)? {
        Some(user) => Some(user),
        None => {
            let needle = login.to_lowercase();
            queries::list_users(conn)?
                .into_iter()
                .find(|u| u.name.to_lowercase().contains(&needle))
        }
    };

    match user {
        Some(user) => {
            tracing::info!(user_id = user.id, role = %user.role_name, "user logged in");
            Ok(Caller::for_user(&user))
        }
        None => Err(AppError::AccessDenied),
    }
}

/// Resolves the caller for a stored user id, e.g. from a request header.
pub fn caller_for_user_id(conn: &Connection, user_id: i64) -> Result<Caller, AppError> {
    queries::get_user(conn, user_id)?
        .map(|user| Caller::for_user(&user))
        .ok_or(AppError::Unauthorized)
}
