use super::{Account, DbPool};
use anyhow::Result;

pub struct AccountRepository {
    pool: DbPool,
}

impl AccountRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, account_id: i64) -> Result<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(
            r#"SELECT id, name, app_id, app_secret
               FROM accounts
               WHERE id = $1"#,
        )
        .bind(account_id)
        .fetch_optional(self.pool.get_pool())
        .await?;

        Ok(account)
    }

    pub async fn list(&self) -> Result<Vec<Account>> {
        let accounts = sqlx::query_as::<_, Account>(
            r#"SELECT id, name, app_id, app_secret
               FROM accounts
               ORDER BY id DESC"#,
        )
        .fetch_all(self.pool.get_pool())
        .await?;

        Ok(accounts)
    }
}
