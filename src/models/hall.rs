use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HallType {
    pub id: i64,
    pub name: String,
    pub price_multiplier: Decimal,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HallTypeInput {
    pub name: String,
    pub price_multiplier: Decimal,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CinemaHall {
    pub id: i64,
    pub name: String,
    pub capacity: i32,
    pub type_id: i64,
    pub type_name: String,
    pub price_multiplier: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CinemaHallInput {
    pub name: String,
    pub capacity: i32,
    pub type_id: i64,
}
