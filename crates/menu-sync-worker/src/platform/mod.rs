pub mod client;
pub mod types;

pub use client::{MenuPlatform, PlatformClient};
pub use types::*;
