use ::redis::RedisError;
use async_trait::async_trait;
use color_eyre::Report;
use std::error::Error as StdError;
use std::fmt;

mod memory;
mod redis;

pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

use super::types::{EntryListing, PublicationWindow, RevocationRecord};

pub(crate) type Result<T> = std::result::Result<T, StoreError>;

/// Error type for revocation store operations.
///
/// Wraps whatever the backend raised (a Redis connection or command failure,
/// a JSON record that would not encode, a window hash with missing fields) as
/// an opaque report. The engine surfaces it as storage unavailability or as
/// an incomplete publication.
#[derive(Debug)]
pub struct StoreError {
    error: Report,
}

impl StoreError {
    pub fn new<T>(error: T) -> Self
    where
        T: StdError + Send + Sync + 'static,
    {
        Self {
            error: Report::new(error),
        }
    }

    pub fn msg<T>(message: T) -> Self
    where
        T: fmt::Debug + fmt::Display + Send + Sync + 'static,
    {
        Self {
            error: Report::msg(message),
        }
    }
}

impl StdError for StoreError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.error.source()
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.error.fmt(f)
    }
}

impl From<RedisError> for StoreError {
    fn from(error: RedisError) -> Self {
        Self {
            error: Report::new(error),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(error: serde_json::Error) -> Self {
        Self {
            error: Report::new(error),
        }
    }
}

/// Abstract interface for revocation storage backends.
///
/// Implementations must make `upsert_entry` and `save_window` single
/// indivisible writes; the engine holds no lock of its own around them.
#[async_trait]
pub trait CrlStore: Send + Sync + 'static {
    /// Inserts the record for `serial`, replacing any existing one.
    async fn upsert_entry(&self, serial: &str, record: &RevocationRecord) -> Result<()>;

    /// Returns every stored entry in no particular order.
    async fn entries(&self) -> Result<EntryListing>;

    /// Loads the publication window, if one was ever written.
    async fn load_window(&self) -> Result<Option<PublicationWindow>>;

    /// Creates or overwrites the publication window.
    async fn save_window(&self, window: &PublicationWindow) -> Result<()>;
}
