pub mod config;
pub mod database;
pub mod dispatcher;
pub mod models;
pub mod price_sync;
pub mod reconciler;
pub mod scheduler;
pub mod scrapers;
pub mod server;
pub mod traits;
