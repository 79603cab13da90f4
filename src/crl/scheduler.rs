use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, error, info, warn};

use super::assembler::{CrlDocument, CrlRenderer, PemTextRenderer};
use super::errors::{CrlError, CrlResult};
use super::revocation::{RevocationStore, bounded};
use super::types::PublicationWindow;

/// Default validity of a published CRL (24 hours).
pub const DEFAULT_VALIDITY_SECS: i64 = 24 * 60 * 60;

const MIN_VALIDITY_SECS: i64 = 1;

/// Result of a successful publication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publication {
    pub document: CrlDocument,
    pub window: PublicationWindow,
}

/// Publishes the revocation list and tracks when the next publication is due.
///
/// The scheduler is either unpublished (no window stored) or published.
/// It owns no background task: something outside polls
/// [is_stale][Self::is_stale] and calls [publish][Self::publish].
#[derive(Clone)]
pub struct PublicationScheduler {
    revocations: RevocationStore,
    renderer: Arc<dyn CrlRenderer>,
    validity: TimeDelta,
}

impl PublicationScheduler {
    pub fn new(revocations: RevocationStore) -> Self {
        Self {
            revocations,
            renderer: Arc::new(PemTextRenderer),
            validity: TimeDelta::seconds(DEFAULT_VALIDITY_SECS),
        }
    }

    /// Sets how long a publication stays fresh.
    ///
    /// Anything shorter than one second is raised to one second so that
    /// `next_update` always lies after `last_published`.
    pub fn with_validity(mut self, validity: TimeDelta) -> Self {
        let min_validity = TimeDelta::seconds(MIN_VALIDITY_SECS);
        if validity < min_validity {
            warn!("CRL validity {validity} is too short, using {min_validity}");
        }
        self.validity = validity.max(min_validity);
        self
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn CrlRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn validity(&self) -> TimeDelta {
        self.validity
    }

    pub fn revocations(&self) -> &RevocationStore {
        &self.revocations
    }

    /// Renders the current revocation list without publishing it.
    pub async fn render_current(&self) -> CrlResult<CrlDocument> {
        let listing = self.revocations.list_entries().await?;
        let document = self
            .renderer
            .render(&listing.entries)
            .with_unreadable(listing.unreadable);
        if let Some(warning) = document.warning() {
            warn!("{warning}");
        }
        Ok(document)
    }

    /// Renders a fresh document and advances the publication window.
    ///
    /// `last_published` never moves backwards, even if the clock does, as
    /// long as the previous window can be read. An unreadable previous window
    /// is overwritten. When the new window cannot be written the call fails
    /// with [`CrlError::PublicationIncomplete`] and the list stays stale.
    pub async fn publish(&self) -> CrlResult<Publication> {
        let document = self.render_current().await?;

        let mut now = self.revocations.clock().now();
        if let Some(previous) = self.previous_window().await {
            now = now.max(previous.last_published());
        }

        let window = PublicationWindow::starting_at(now, self.validity);
        self.bounded_window_io(self.revocations.backend().save_window(&window))
            .await?;

        info!(
            entries = document.entry_count(),
            skipped = document.skipped(),
            bytes = document.byte_len(),
            next_update = %window.next_update(),
            "CRL published"
        );
        Ok(Publication { document, window })
    }

    /// The currently stored window, `None` while unpublished.
    pub async fn window(&self) -> CrlResult<Option<PublicationWindow>> {
        bounded(
            self.revocations.timeout(),
            self.revocations.backend().load_window(),
        )
        .await?
        .map_err(|e| {
            error!("Failed to load publication window: {e}");
            CrlError::StorageUnavailable(e)
        })
    }

    /// Whether a publication is due at `now`.
    ///
    /// True while unpublished and from `next_update` onwards.
    pub async fn is_stale(&self, now: DateTime<Utc>) -> CrlResult<bool> {
        let stale = is_stale(self.window().await?.as_ref(), now);
        debug!("CRL stale at {now}: {stale}");
        Ok(stale)
    }

    async fn previous_window(&self) -> Option<PublicationWindow> {
        let limit = self.revocations.timeout();
        match tokio::time::timeout(limit, self.revocations.backend().load_window()).await {
            Ok(Ok(previous)) => previous,
            Ok(Err(e)) => {
                warn!("Ignoring unreadable publication window: {e}");
                None
            }
            Err(_) => {
                warn!("Reading the previous publication window exceeded {limit:?}, ignoring it");
                None
            }
        }
    }

    async fn bounded_window_io<T>(
        &self,
        op: impl Future<Output = super::store::Result<T>>,
    ) -> CrlResult<T> {
        let limit = self.revocations.timeout();
        match tokio::time::timeout(limit, op).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                error!("Failed to update publication window: {e}");
                Err(CrlError::PublicationIncomplete(e))
            }
            Err(_) => {
                error!("Publication window update exceeded {limit:?}");
                Err(CrlError::Timeout(limit))
            }
        }
    }
}

/// Staleness of an optional window at `now`.
pub fn is_stale(window: Option<&PublicationWindow>, now: DateTime<Utc>) -> bool {
    window.is_none_or(|window| window.is_stale_at(now))
}
