use super::{Credentials, MenuPayload, RawSelfMenu};
use crate::config::PlatformConfig;
use crate::utils::error::SyncError;
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};

#[cfg(test)]
use mockall::automock;

/// Remote menu adapter: the two platform operations the sync engine consumes.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MenuPlatform: Send + Sync {
    /// Fetch the account's currently published menu.
    async fn fetch_current(&self, credentials: &Credentials) -> Result<RawSelfMenu, SyncError>;

    /// Replace the account's published menu with `payload`.
    async fn replace(
        &self,
        credentials: &Credentials,
        payload: &MenuPayload,
    ) -> Result<(), SyncError>;
}

/// Error envelope the platform embeds in HTTP 200 responses.
#[derive(Debug, Deserialize)]
struct PlatformEnvelope {
    errcode: Option<i64>,
    errmsg: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<i64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

pub struct PlatformClient {
    config: PlatformConfig,
    client: Client,
    // Access tokens keyed by app_id
    tokens: RwLock<HashMap<String, CachedToken>>,
}

impl PlatformClient {
    pub fn new(config: PlatformConfig) -> Result<Self, SyncError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        Ok(Self {
            config,
            client,
            tokens: RwLock::new(HashMap::new()),
        })
    }

    /// Get a valid access token for the credentials, fetching a fresh one
    /// when the cached token is missing or close to expiry.
    async fn access_token(&self, credentials: &Credentials) -> Result<String, SyncError> {
        {
            let tokens = self.tokens.read().await;
            if let Some(cached) = tokens.get(&credentials.app_id) {
                if cached.expires_at > Utc::now() {
                    return Ok(cached.value.clone());
                }
            }
        }

        debug!("Fetching access token for app {}", credentials.app_id);

        let url = format!("{}/cgi-bin/token", self.config.base_url);
        let body = self
            .client
            .get(&url)
            .query(&[
                ("grant_type", "client_credential"),
                ("appid", credentials.app_id.as_str()),
                ("secret", credentials.app_secret.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        check_envelope(&body)?;

        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| SyncError::MalformedResponse(e.to_string()))?;

        let value = token.access_token.ok_or_else(|| {
            SyncError::MalformedResponse("token response missing access_token".to_string())
        })?;

        let lifetime = token.expires_in.unwrap_or(7200);
        let expires_at = Utc::now()
            + ChronoDuration::seconds(
                (lifetime - self.config.token_refresh_margin_seconds).max(0),
            );

        let mut tokens = self.tokens.write().await;
        tokens.insert(
            credentials.app_id.clone(),
            CachedToken {
                value: value.clone(),
                expires_at,
            },
        );

        Ok(value)
    }
}

#[async_trait]
impl MenuPlatform for PlatformClient {
    async fn fetch_current(&self, credentials: &Credentials) -> Result<RawSelfMenu, SyncError> {
        let token = self.access_token(credentials).await?;

        let url = format!(
            "{}/cgi-bin/get_current_selfmenu_info",
            self.config.base_url
        );
        let body = self
            .client
            .get(&url)
            .query(&[("access_token", token.as_str())])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        check_envelope(&body)?;

        let menu: RawSelfMenu = serde_json::from_str(&body)
            .map_err(|e| SyncError::MalformedResponse(e.to_string()))?;

        debug!(
            "Fetched {} top-level buttons for app {}",
            menu.selfmenu_info.button.len(),
            credentials.app_id
        );

        Ok(menu)
    }

    async fn replace(
        &self,
        credentials: &Credentials,
        payload: &MenuPayload,
    ) -> Result<(), SyncError> {
        let token = self.access_token(credentials).await?;

        let url = format!("{}/cgi-bin/menu/create", self.config.base_url);
        let body = self
            .client
            .post(&url)
            .query(&[("access_token", token.as_str())])
            .json(payload)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        check_envelope(&body)?;

        info!("Published menu for app {}", credentials.app_id);

        Ok(())
    }
}

/// A non-zero errcode means the platform rejected the call even though the
/// HTTP status was 200.
fn check_envelope(body: &str) -> Result<(), SyncError> {
    let envelope: PlatformEnvelope = serde_json::from_str(body)
        .map_err(|e| SyncError::MalformedResponse(e.to_string()))?;

    match envelope.errcode {
        Some(code) if code != 0 => Err(SyncError::Platform {
            code,
            message: envelope.errmsg.unwrap_or_default(),
        }),
        _ => Ok(()),
    }
}
