use crate::database::{EventPayload, EventRecord, EventStore};
use crate::utils::error::SyncError;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Namespace prefix marking event keys this application owns. Keys without
/// it are foreign: created by some other integration and never touched here.
pub const EVENT_KEY_PREFIX: &str = "XN_EVENT_";

/// Owns the lifecycle of event keys binding menu buttons to stored content.
pub struct EventService {
    store: Arc<dyn EventStore>,
}

impl EventService {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    /// Bind a freshly generated key to static text content.
    pub async fn create_text_event(
        &self,
        account_id: i64,
        text: &str,
    ) -> Result<EventRecord, SyncError> {
        let record = EventRecord {
            key: generate_key(),
            account_id,
            payload: EventPayload::Text(text.to_string()),
        };

        self.store.insert(&record).await?;
        debug!("Created text event {} for account {}", record.key, account_id);

        Ok(record)
    }

    /// Bind a freshly generated key to a stored material id.
    pub async fn create_media_event(
        &self,
        account_id: i64,
        material_id: i64,
    ) -> Result<EventRecord, SyncError> {
        let record = EventRecord {
            key: generate_key(),
            account_id,
            payload: EventPayload::Material(material_id),
        };

        self.store.insert(&record).await?;
        debug!(
            "Created media event {} -> material {} for account {}",
            record.key, material_id, account_id
        );

        Ok(record)
    }

    pub fn is_owned(&self, key: &str) -> bool {
        key.starts_with(EVENT_KEY_PREFIX)
    }

    /// Remove the content bound to `key`. Foreign and unknown keys are a
    /// no-op: teardown must never fail on leftovers from other integrations
    /// or on keys already removed.
    pub async fn destroy_by_key(&self, key: &str) -> Result<(), SyncError> {
        if !self.is_owned(key) {
            debug!("Skipping foreign event key {}", key);
            return Ok(());
        }

        let removed = self.store.delete_by_key(key).await?;
        if removed == 0 {
            debug!("Event key {} was already gone", key);
        }

        Ok(())
    }
}

/// Prefix + uppercase random suffix; unique across the whole registry since
/// the platform treats keys as globally opaque strings.
fn generate_key() -> String {
    format!(
        "{}{}",
        EVENT_KEY_PREFIX,
        Uuid::new_v4().simple().to_string().to_uppercase()
    )
}
