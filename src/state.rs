use crate::{config::AppConfig, store::SharedStore};

/// Shared by every actix worker through `web::Data<AppState>`
pub struct AppState {
    pub store: SharedStore,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(store: SharedStore, config: AppConfig) -> Self {
        Self { store, config }
    }
}
