use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub platform: PlatformConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_max_size: u32,
    pub pool_timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PlatformConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    // Tokens are refreshed this many seconds before the platform expires them
    #[serde(default = "default_token_margin")]
    pub token_refresh_margin_seconds: i64,
}

fn default_base_url() -> String {
    "https://api.weixin.qq.com".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_token_margin() -> i64 {
    60
}

impl Settings {
    pub fn load() -> Result<Self> {
        // Load from environment first
        dotenvy::dotenv().ok();

        let config = Config::builder()
            // Load from config file
            .add_source(File::with_name("config/settings").required(false))
            // Override with environment variables (prefix: APP)
            // Example: APP_DATABASE__URL=postgres://...
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;

        settings.validate()?;

        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.database.pool_max_size == 0 {
            anyhow::bail!("database.pool_max_size must be at least 1");
        }

        if !self.platform.base_url.starts_with("http") {
            anyhow::bail!(
                "platform.base_url is not a valid URL: {}",
                self.platform.base_url
            );
        }

        Ok(())
    }
}
