use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),

    #[error("invalid interval: screening must end after it starts")]
    InvalidInterval,

    #[error("hall {hall_id} already has a screening in that time slot")]
    HallConflict { hall_id: i64 },

    #[error("no seats selected")]
    NoSeatsSelected,

    #[error("seat {0} is already taken")]
    SeatUnavailable(String),

    #[error("invalid seat: {0}")]
    InvalidSeat(String),

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("access denied")]
    AccessDenied,

    #[error("unauthorized")]
    Unauthorized,

    #[error("ticket cancellation failed: {0}")]
    CancellationFailed(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::CancellationFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InvalidInterval => StatusCode::BAD_REQUEST,
            AppError::NoSeatsSelected => StatusCode::BAD_REQUEST,
            AppError::InvalidSeat(_) => StatusCode::BAD_REQUEST,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::HallConflict { .. } => StatusCode::CONFLICT,
            AppError::SeatUnavailable(_) => StatusCode::CONFLICT,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::AccessDenied => StatusCode::FORBIDDEN,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("request failed: {self}");
        }

        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
