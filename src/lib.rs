pub mod api;
pub mod config;
pub mod database;
pub mod mail;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;
pub mod store;
pub mod utils;

/// Shared `env_logger` setup for the server and the scripts.
pub fn init_logging() {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
}
