pub mod config;
pub mod database;
pub mod menu;
pub mod platform;
pub mod utils;

pub use config::Settings;
pub use utils::error::SyncError;
