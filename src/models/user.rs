use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub const ADMIN_ROLE: &str = "Admin";
/// Role given to new users unless another one is requested.
pub const USER_ROLE: &str = "User";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role_id: i64,
    pub role_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInput {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_date: NaiveDateTime,
}
