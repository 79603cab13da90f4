use chrono::{DateTime, Utc};

use super::assembler::CrlDocument;
use super::errors::CrlResult;
use super::scheduler::{Publication, PublicationScheduler, is_stale};
use super::types::{PublicationWindow, RevocationEntry};

/// Publication state as seen at `checked_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicationStatus {
    pub stale: bool,
    pub window: Option<PublicationWindow>,
    pub checked_at: DateTime<Utc>,
}

/// The inbound operations of the CRL issuer.
#[derive(Clone)]
pub struct CrlService {
    scheduler: PublicationScheduler,
}

impl CrlService {
    pub fn new(scheduler: PublicationScheduler) -> Self {
        Self { scheduler }
    }

    pub fn scheduler(&self) -> &PublicationScheduler {
        &self.scheduler
    }

    pub async fn record_revocation(
        &self,
        serial: &str,
        reason: &str,
        revoked_at: Option<DateTime<Utc>>,
    ) -> CrlResult<RevocationEntry> {
        self.scheduler
            .revocations()
            .record_revocation(serial, reason, revoked_at)
            .await
    }

    pub async fn current_document(&self) -> CrlResult<CrlDocument> {
        self.scheduler.render_current().await
    }

    pub async fn publish(&self) -> CrlResult<Publication> {
        self.scheduler.publish().await
    }

    pub async fn status(&self) -> CrlResult<PublicationStatus> {
        let checked_at = self.scheduler.revocations().clock().now();
        let window = self.scheduler.window().await?;
        Ok(PublicationStatus {
            stale: is_stale(window.as_ref(), checked_at),
            window,
            checked_at,
        })
    }

    /// Publishes only when the current window has run out.
    pub async fn publish_if_stale(&self) -> CrlResult<Option<Publication>> {
        let now = self.scheduler.revocations().clock().now();
        if !self.scheduler.is_stale(now).await? {
            return Ok(None);
        }
        self.scheduler.publish().await.map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crl::{ManualClock, MemoryStore, RevocationStore};
    use chrono::{TimeDelta, TimeZone};
    use std::sync::Arc;

    fn service(clock: &ManualClock) -> CrlService {
        let revocations = RevocationStore::new(Arc::new(MemoryStore::new()))
            .with_clock(Arc::new(clock.clone()));
        CrlService::new(PublicationScheduler::new(revocations).with_validity(TimeDelta::hours(1)))
    }

    #[tokio::test]
    async fn test_newer_revocation_is_listed_first() {
        let t1 = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let t2 = t1 + TimeDelta::seconds(30);
        let service = service(&ManualClock::new(t2));

        service.record_revocation("S1", "", Some(t1)).await.unwrap();
        service
            .record_revocation("S2", "superseded", Some(t2))
            .await
            .unwrap();

        let document = service.current_document().await.unwrap();
        assert_eq!(
            document.as_str(),
            "-----BEGIN X509 CRL-----\n\
             S2,2024-03-01T12:00:30Z,superseded\n\
             S1,2024-03-01T12:00:00Z,\n\
             -----END X509 CRL-----\n"
        );
        assert_eq!(document.entry_count(), 2);
        assert_eq!(document.skipped(), 0);
    }

    #[tokio::test]
    async fn test_publish_if_stale_only_publishes_when_due() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        let service = service(&clock);

        let status = service.status().await.unwrap();
        assert!(status.stale);
        assert_eq!(status.window, None);

        assert!(service.publish_if_stale().await.unwrap().is_some());
        clock.advance(TimeDelta::minutes(59));
        assert!(service.publish_if_stale().await.unwrap().is_none());

        clock.advance(TimeDelta::minutes(1));
        let republished = service.publish_if_stale().await.unwrap().unwrap();
        assert_eq!(republished.window.last_published(), start + TimeDelta::hours(1));

        let status = service.status().await.unwrap();
        assert!(!status.stale);
        assert_eq!(status.window, Some(republished.window));
    }
}
