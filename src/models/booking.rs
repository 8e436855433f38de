use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub order_date: NaiveDateTime,
    pub total_amount: Decimal,
    pub status: BookingStatus,
    pub user_id: i64,
    pub customer_name: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    /// Parses a stored status. Older rows may carry `CANCELLED` in upper
    /// case, so matching ignores case.
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "confirmed" => BookingStatus::Confirmed,
            "cancelled" => BookingStatus::Cancelled,
            _ => BookingStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ticket {
    pub id: i64,
    pub seat_number: String,
    pub base_price: Decimal,
    pub final_price: Decimal,
    pub booking_id: i64,
    pub screening_id: i64,
}

/// A ticket joined with what a customer sees on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketDetails {
    pub id: i64,
    pub seat_number: String,
    pub base_price: Decimal,
    pub final_price: Decimal,
    pub screening_id: i64,
    pub movie_title: String,
    pub start_time: NaiveDateTime,
    pub hall_name: String,
}

/// An occupied seat of a screening and who holds it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatHolder {
    pub seat_number: String,
    pub final_price: Decimal,
    pub customer_name: String,
}
