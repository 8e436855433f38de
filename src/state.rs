use crate::config::AppConfig;
use crate::db::Store;

pub struct AppState {
    pub store: Store,
    pub config: AppConfig,
}
