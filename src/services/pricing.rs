use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::db::queries;
use crate::errors::AppError;

/// Applies a hall type multiplier to a base price. Without a multiplier the
/// base price is charged unchanged. Returns `None` if the product overflows.
pub fn apply_multiplier(base_price: Decimal, multiplier: Option<Decimal>) -> Option<Decimal> {
    match multiplier {
        Some(m) => base_price.checked_mul(m),
        None => Some(base_price),
    }
}

/// Final price of one ticket in a hall of type `hall_type_id`.
///
/// An unknown hall type does not fail the sale: the base price is returned
/// and a warning is logged. A multiplier too large to price with fails with
/// `Validation`.
pub fn compute_final_price(
    conn: &Connection,
    base_price: Decimal,
    hall_type_id: i64,
) -> Result<Decimal, AppError> {
    let multiplier = queries::get_price_multiplier(conn, hall_type_id)?;
    if multiplier.is_none() {
        tracing::warn!(
            hall_type_id,
            "no price multiplier for hall type, charging base price {base_price}"
        );
    }
    apply_multiplier(base_price, multiplier).ok_or_else(|| {
        AppError::Validation(format!(
            "ticket price for hall type {hall_type_id} is out of range"
        ))
    })
}
