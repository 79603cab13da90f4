use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// A revoked certificate, keyed by its serial number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevocationEntry {
    pub serial: String,
    pub revoked_at: DateTime<Utc>,
    pub reason: String,
}

impl RevocationEntry {
    pub fn new(serial: impl Into<String>, revoked_at: DateTime<Utc>, reason: impl Into<String>) -> Self {
        Self {
            serial: serial.into(),
            revoked_at,
            reason: reason.into(),
        }
    }

    pub(crate) fn from_record(serial: String, record: RevocationRecord) -> Self {
        Self {
            serial,
            revoked_at: record.revoked_at,
            reason: record.reason,
        }
    }

    pub(crate) fn to_record(&self) -> RevocationRecord {
        RevocationRecord {
            revoked_at: self.revoked_at,
            reason: self.reason.clone(),
        }
    }
}

/// The value half of a stored revocation; the serial is the storage key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevocationRecord {
    pub revoked_at: DateTime<Utc>,
    pub reason: String,
}

/// Everything a store returned for a listing.
///
/// Rows the backend could not decode are counted in `unreadable` instead of
/// being dropped without a trace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryListing {
    pub entries: Vec<RevocationEntry>,
    pub unreadable: usize,
}

/// The singleton publication window.
///
/// `next_update` is always `last_published` plus the validity period the
/// window was created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicationWindow {
    last_published: DateTime<Utc>,
    next_update: DateTime<Utc>,
}

impl PublicationWindow {
    /// Opens a window at `last_published` that stays fresh for `validity`.
    pub fn starting_at(last_published: DateTime<Utc>, validity: TimeDelta) -> Self {
        Self {
            last_published,
            next_update: last_published
                .checked_add_signed(validity)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    /// Rebuilds a window from persisted fields.
    pub(crate) fn from_parts(last_published: DateTime<Utc>, next_update: DateTime<Utc>) -> Self {
        Self {
            last_published,
            next_update,
        }
    }

    pub fn last_published(&self) -> DateTime<Utc> {
        self.last_published
    }

    pub fn next_update(&self) -> DateTime<Utc> {
        self.next_update
    }

    /// The deadline is inclusive: a window is stale exactly at `next_update`.
    pub fn is_stale_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.next_update
    }
}
