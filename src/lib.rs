pub mod api;
pub mod config;
pub mod db;
pub mod engine;

pub use db::DbPool;

use api::auth::TokenKeys;
use config::Config;

pub struct AppState {
    pub config: Config,
    pub db: DbPool,
    pub tokens: TokenKeys,
}

impl AppState {
    pub fn new(config: Config, db: DbPool) -> Self {
        let tokens = TokenKeys::from_config(&config.auth);
        Self { config, db, tokens }
    }
}
