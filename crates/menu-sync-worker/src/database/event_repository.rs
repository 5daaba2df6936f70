use super::{DbPool, EventPayload, EventRecord, EventRow};
use anyhow::{bail, Result};
use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

/// Durable key/value store behind the event registry.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait EventStore: Send + Sync {
    async fn insert(&self, record: &EventRecord) -> Result<()>;
    async fn find_by_key(&self, key: &str) -> Result<Option<EventRecord>>;
    /// Returns the number of rows removed; deleting a missing key is Ok(0).
    async fn delete_by_key(&self, key: &str) -> Result<u64>;
}

pub struct EventRepository {
    pool: DbPool,
}

impl EventRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventStore for EventRepository {
    async fn insert(&self, record: &EventRecord) -> Result<()> {
        let (kind, content, material_id) = match &record.payload {
            EventPayload::Text(text) => ("text", Some(text.as_str()), None),
            EventPayload::Material(id) => ("material", None, Some(*id)),
        };

        sqlx::query(
            r#"INSERT INTO events (event_key, account_id, kind, content, material_id)
               VALUES ($1, $2, $3, $4, $5)"#,
        )
        .bind(&record.key)
        .bind(record.account_id)
        .bind(kind)
        .bind(content)
        .bind(material_id)
        .execute(self.pool.get_pool())
        .await?;

        Ok(())
    }

    async fn find_by_key(&self, key: &str) -> Result<Option<EventRecord>> {
        let row = sqlx::query_as::<_, EventRow>(
            r#"SELECT event_key, account_id, kind, content, material_id
               FROM events
               WHERE event_key = $1"#,
        )
        .bind(key)
        .fetch_optional(self.pool.get_pool())
        .await?;

        row.map(record_from_row).transpose()
    }

    async fn delete_by_key(&self, key: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM events WHERE event_key = $1")
            .bind(key)
            .execute(self.pool.get_pool())
            .await?;

        Ok(result.rows_affected())
    }
}

fn record_from_row(row: EventRow) -> Result<EventRecord> {
    let payload = match row.kind.as_str() {
        "text" => EventPayload::Text(row.content.unwrap_or_default()),
        "material" => match row.material_id {
            Some(id) => EventPayload::Material(id),
            None => bail!("material event {} has no material_id", row.event_key),
        },
        other => bail!("event {} has unknown kind {}", row.event_key, other),
    };

    Ok(EventRecord {
        key: row.event_key,
        account_id: row.account_id,
        payload,
    })
}
