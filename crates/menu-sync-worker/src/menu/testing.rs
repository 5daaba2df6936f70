//! In-memory store fakes shared by the menu module tests.

use crate::database::{EventRecord, EventStore, MaterialStore};
use crate::platform::RawArticle;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

#[derive(Default)]
pub struct InMemoryEventStore {
    pub records: Mutex<HashMap<String, EventRecord>>,
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn insert(&self, record: &EventRecord) -> Result<()> {
        self.records
            .lock()
            .unwrap()
            .insert(record.key.clone(), record.clone());
        Ok(())
    }

    async fn find_by_key(&self, key: &str) -> Result<Option<EventRecord>> {
        Ok(self.records.lock().unwrap().get(key).cloned())
    }

    async fn delete_by_key(&self, key: &str) -> Result<u64> {
        Ok(self.records.lock().unwrap().remove(key).map_or(0, |_| 1))
    }
}

#[derive(Default)]
pub struct InMemoryMaterialStore {
    pub saved: Mutex<Vec<(i64, Vec<RawArticle>)>>,
    next_id: AtomicI64,
}

#[async_trait]
impl MaterialStore for InMemoryMaterialStore {
    async fn save_article(&self, account_id: i64, articles: &[RawArticle]) -> Result<i64> {
        self.saved
            .lock()
            .unwrap()
            .push((account_id, articles.to_vec()));
        Ok(self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }
}
