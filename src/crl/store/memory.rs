use crate::crl::{
    store::{CrlStore, Result},
    types::{EntryListing, PublicationWindow, RevocationEntry, RevocationRecord},
};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// An in-memory revocation store.
///
/// Useful for testing and development.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: Arc<DashMap<String, RevocationRecord>>,
    window: Arc<RwLock<Option<PublicationWindow>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CrlStore for MemoryStore {
    async fn upsert_entry(&self, serial: &str, record: &RevocationRecord) -> Result<()> {
        self.entries.insert(serial.to_owned(), record.clone());
        Ok(())
    }

    async fn entries(&self) -> Result<EntryListing> {
        let entries = self
            .entries
            .iter()
            .map(|item| RevocationEntry::from_record(item.key().clone(), item.value().clone()))
            .collect();
        Ok(EntryListing {
            entries,
            unreadable: 0,
        })
    }

    async fn load_window(&self) -> Result<Option<PublicationWindow>> {
        Ok(*self.window.read().await)
    }

    async fn save_window(&self, window: &PublicationWindow) -> Result<()> {
        *self.window.write().await = Some(*window);
        Ok(())
    }
}
