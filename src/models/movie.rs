use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub genre: String,
    pub duration_minutes: i32,
    pub description: Option<String>,
}

/// Editable fields of a movie, used for both insert and update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieInput {
    pub title: String,
    pub genre: String,
    pub duration_minutes: i32,
    pub description: Option<String>,
}
