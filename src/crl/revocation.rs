use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info};

use super::assembler::field_problem;
use super::clock::{Clock, SystemClock};
use super::errors::{CrlError, CrlResult};
use super::store::{self, CrlStore};
use super::types::{EntryListing, RevocationEntry};

pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(5);

/// Validating front of a [`CrlStore`]: records revocations and lists them in
/// CRL order.
#[derive(Clone)]
pub struct RevocationStore {
    store: Arc<dyn CrlStore>,
    clock: Arc<dyn Clock>,
    timeout: Duration,
}

impl RevocationStore {
    /// Creates a revocation store over `store`.
    ///
    /// Uses the system clock and a 5 second deadline per storage call unless
    /// overridden with [with_clock][wc] and [with_timeout][wt].
    ///
    /// [wc]: Self::with_clock
    /// [wt]: Self::with_timeout
    pub fn new(store: Arc<dyn CrlStore>) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Sets the deadline applied to every storage call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn backend(&self) -> &Arc<dyn CrlStore> {
        &self.store
    }

    pub(crate) fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub(crate) fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Records `serial` as revoked, replacing any earlier record for it.
    ///
    /// A missing `revoked_at`, or one at the Unix epoch, is stamped with the
    /// current time. Returns the entry as it was written.
    pub async fn record_revocation(
        &self,
        serial: &str,
        reason: &str,
        revoked_at: Option<DateTime<Utc>>,
    ) -> CrlResult<RevocationEntry> {
        if let Some(problem) = field_problem(serial, reason) {
            return Err(CrlError::InvalidInput(problem.to_string()));
        }

        let revoked_at = match revoked_at {
            Some(time) if time.timestamp() != 0 => time,
            _ => self.clock.now(),
        };
        let entry = RevocationEntry::new(serial, revoked_at, reason);

        bounded(self.timeout, self.store.upsert_entry(serial, &entry.to_record()))
            .await?
            .map_err(|e| {
                error!("Failed to record revocation of {serial}: {e}");
                CrlError::StorageUnavailable(e)
            })?;

        info!(serial, reason, %revoked_at, "Revocation recorded");
        Ok(entry)
    }

    /// Lists every revocation, newest first, ties broken by serial ascending.
    pub async fn list_entries(&self) -> CrlResult<EntryListing> {
        let mut listing = bounded(self.timeout, self.store.entries())
            .await?
            .map_err(|e| {
                error!("Failed to list revocations: {e}");
                CrlError::StorageUnavailable(e)
            })?;

        listing.entries.sort_by(|a, b| {
            b.revoked_at
                .cmp(&a.revoked_at)
                .then_with(|| a.serial.cmp(&b.serial))
        });
        debug!(
            "Listed {} revocations ({} unreadable)",
            listing.entries.len(),
            listing.unreadable
        );
        Ok(listing)
    }
}

/// Runs a storage call under `limit`, turning expiry into [`CrlError::Timeout`].
pub(crate) async fn bounded<T>(
    limit: Duration,
    op: impl Future<Output = store::Result<T>>,
) -> CrlResult<store::Result<T>> {
    tokio::time::timeout(limit, op).await.map_err(|_| {
        error!("Revocation storage call exceeded {limit:?}");
        CrlError::Timeout(limit)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crl::{
        clock::ManualClock,
        store::MemoryStore,
        testing::{FlakyStore, StalledStore},
    };
    use chrono::{TimeDelta, TimeZone};

    fn t(second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, second).unwrap()
    }

    fn memory_backed(clock: &ManualClock) -> RevocationStore {
        RevocationStore::new(Arc::new(MemoryStore::new())).with_clock(Arc::new(clock.clone()))
    }

    #[tokio::test]
    async fn test_second_recording_replaces_first() {
        let store = memory_backed(&ManualClock::new(t(0)));
        store
            .record_revocation("ABC123", "superseded", Some(t(1)))
            .await
            .unwrap();
        store
            .record_revocation("ABC123", "keyCompromise", Some(t(2)))
            .await
            .unwrap();

        let listing = store.list_entries().await.unwrap();
        assert_eq!(
            listing.entries,
            vec![RevocationEntry::new("ABC123", t(2), "keyCompromise")]
        );
    }

    #[tokio::test]
    async fn test_list_orders_newest_first_then_serial() {
        let store = memory_backed(&ManualClock::new(t(0)));
        for (serial, second) in [("B", 10), ("D", 5), ("A", 10), ("C", 20), ("E", 5)] {
            store
                .record_revocation(serial, "unspecified", Some(t(second)))
                .await
                .unwrap();
        }

        let serials: Vec<_> = store
            .list_entries()
            .await
            .unwrap()
            .entries
            .into_iter()
            .map(|entry| entry.serial)
            .collect();
        assert_eq!(serials, ["C", "A", "B", "D", "E"]);
    }

    #[tokio::test]
    async fn test_missing_or_zero_timestamp_uses_clock() {
        let clock = ManualClock::new(t(42));
        let store = memory_backed(&clock);

        let first = store.record_revocation("S1", "", None).await.unwrap();
        assert_eq!(first.revoked_at, t(42));

        clock.advance(TimeDelta::seconds(1));
        let second = store
            .record_revocation("S2", "", DateTime::from_timestamp(0, 0))
            .await
            .unwrap();
        assert_eq!(second.revoked_at, t(43));
    }

    #[tokio::test]
    async fn test_rejects_unusable_serials() {
        let store = memory_backed(&ManualClock::new(t(0)));

        for serial in ["", "A,B", "A\nB"] {
            let err = store.record_revocation(serial, "", None).await.unwrap_err();
            assert!(matches!(err, CrlError::InvalidInput(_)), "{serial:?}: {err}");
        }
        let err = store
            .record_revocation("OK", "two\nlines", None)
            .await
            .unwrap_err();
        assert!(matches!(err, CrlError::InvalidInput(_)));
        assert!(store.list_entries().await.unwrap().entries.is_empty());
    }

    #[tokio::test]
    async fn test_whitespace_serial_is_stored_verbatim() {
        let store = memory_backed(&ManualClock::new(t(0)));

        let entry = store.record_revocation("   ", "", Some(t(1))).await.unwrap();
        assert_eq!(entry.serial, "   ");
        assert_eq!(store.list_entries().await.unwrap().entries, vec![entry]);
    }

    #[tokio::test]
    async fn test_backend_failures_surface_as_storage_unavailable() {
        let backend = FlakyStore::default();
        let store = RevocationStore::new(Arc::new(backend.clone()));

        backend.fail_writes(true);
        let err = store.record_revocation("S1", "", None).await.unwrap_err();
        assert!(matches!(err, CrlError::StorageUnavailable(_)));

        backend.fail_reads(true);
        let err = store.list_entries().await.unwrap_err();
        assert!(matches!(err, CrlError::StorageUnavailable(_)));
    }

    #[tokio::test]
    async fn test_stalled_backend_times_out() {
        let store =
            RevocationStore::new(Arc::new(StalledStore)).with_timeout(Duration::from_millis(20));

        let err = store.record_revocation("S1", "", None).await.unwrap_err();
        assert!(matches!(err, CrlError::Timeout(_)));

        let err = store.list_entries().await.unwrap_err();
        assert!(matches!(err, CrlError::Timeout(_)));
    }
}
