//! Store doubles for exercising failure paths.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::store::{CrlStore, MemoryStore, Result, StoreError};
use super::types::{EntryListing, PublicationWindow, RevocationRecord};

/// Wraps a [`MemoryStore`] and fails selected operations on demand.
#[derive(Debug, Clone, Default)]
pub(crate) struct FlakyStore {
    pub inner: MemoryStore,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
    fail_window: Arc<AtomicBool>,
    fail_window_reads: Arc<AtomicBool>,
    unreadable: Arc<AtomicUsize>,
}

impl FlakyStore {
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_window(&self, fail: bool) {
        self.fail_window.store(fail, Ordering::SeqCst);
    }

    pub fn fail_window_reads(&self, fail: bool) {
        self.fail_window_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes every listing report `count` rows that could not be decoded.
    pub fn report_unreadable(&self, count: usize) {
        self.unreadable.store(count, Ordering::SeqCst);
    }

    fn check(flag: &AtomicBool) -> Result<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(StoreError::msg("connection refused"));
        }
        Ok(())
    }
}

#[async_trait]
impl CrlStore for FlakyStore {
    async fn upsert_entry(&self, serial: &str, record: &RevocationRecord) -> Result<()> {
        Self::check(&self.fail_writes)?;
        self.inner.upsert_entry(serial, record).await
    }

    async fn entries(&self) -> Result<EntryListing> {
        Self::check(&self.fail_reads)?;
        let mut listing = self.inner.entries().await?;
        listing.unreadable += self.unreadable.load(Ordering::SeqCst);
        Ok(listing)
    }

    async fn load_window(&self) -> Result<Option<PublicationWindow>> {
        Self::check(&self.fail_window_reads)?;
        self.inner.load_window().await
    }

    async fn save_window(&self, window: &PublicationWindow) -> Result<()> {
        Self::check(&self.fail_window)?;
        self.inner.save_window(window).await
    }
}

/// A store whose every call outlives any reasonable deadline.
#[derive(Debug, Clone, Default)]
pub(crate) struct StalledStore;

impl StalledStore {
    async fn stall() {
        tokio::time::sleep(Duration::from_secs(3600)).await;
    }
}

#[async_trait]
impl CrlStore for StalledStore {
    async fn upsert_entry(&self, _serial: &str, _record: &RevocationRecord) -> Result<()> {
        Self::stall().await;
        Ok(())
    }

    async fn entries(&self) -> Result<EntryListing> {
        Self::stall().await;
        Ok(EntryListing::default())
    }

    async fn load_window(&self) -> Result<Option<PublicationWindow>> {
        Self::stall().await;
        Ok(None)
    }

    async fn save_window(&self, _window: &PublicationWindow) -> Result<()> {
        Self::stall().await;
        Ok(())
    }
}
