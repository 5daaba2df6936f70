pub mod settings;

pub use settings::{DatabaseConfig, PlatformConfig, Settings};
