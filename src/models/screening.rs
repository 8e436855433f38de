use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Screening {
    pub id: i64,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub movie_id: i64,
    pub hall_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningInput {
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub movie_id: i64,
    pub hall_id: i64,
}

/// A screening joined with the movie and hall data the booking flow needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningDetails {
    pub id: i64,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub movie_id: i64,
    pub movie_title: String,
    pub duration_minutes: i32,
    pub hall_id: i64,
    pub hall_name: String,
    pub hall_capacity: i32,
    pub hall_type_id: i64,
    pub hall_type_name: String,
    pub price_multiplier: Decimal,
}
