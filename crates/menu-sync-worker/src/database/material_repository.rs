use super::DbPool;
use crate::platform::RawArticle;
use anyhow::Result;
use async_trait::async_trait;
use sqlx::types::Json;
use tracing::debug;

#[cfg(test)]
use mockall::automock;

/// Content collaborator consumed by the news resolver: persists inline
/// article payloads pulled down from the platform.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MaterialStore: Send + Sync {
    /// Store an inline article list as platform-created, non-editable
    /// material and return its id.
    async fn save_article(&self, account_id: i64, articles: &[RawArticle]) -> Result<i64>;
}

pub struct MaterialRepository {
    pool: DbPool,
}

impl MaterialRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MaterialStore for MaterialRepository {
    async fn save_article(&self, account_id: i64, articles: &[RawArticle]) -> Result<i64> {
        let id: i64 = sqlx::query_scalar(
            r#"INSERT INTO materials (account_id, kind, articles, created_from, can_edit)
               VALUES ($1, 'article', $2, 'platform', FALSE)
               RETURNING id"#,
        )
        .bind(account_id)
        .bind(Json(articles))
        .fetch_one(self.pool.get_pool())
        .await?;

        debug!(
            "Stored {} pulled articles as material {} for account {}",
            articles.len(),
            id,
            account_id
        );

        Ok(id)
    }
}
