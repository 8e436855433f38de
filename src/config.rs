use std::env;

use rust_decimal::Decimal;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub admin_login: String,
    pub admin_password: String,
    pub admin_token: String,
    /// Price of one ticket before the hall type multiplier is applied.
    pub base_ticket_price: Decimal,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "cinema.db".to_string()),
            admin_login: env::var("ADMIN_LOGIN").unwrap_or_else(|_| "admin".to_string()),
            admin_password: env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "changeme".to_string()),
            admin_token: env::var("ADMIN_TOKEN").unwrap_or_else(|_| "changeme".to_string()),
            base_ticket_price: env::var("BASE_TICKET_PRICE")
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or_else(|| Decimal::from(300)),
        }
    }
}
