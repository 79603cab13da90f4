use std::collections::HashMap;

use crate::crl::{
    store::{CrlStore, Result, StoreError},
    types::{EntryListing, PublicationWindow, RevocationEntry, RevocationRecord},
};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use redis::{AsyncCommands, aio::ConnectionManager};

pub const DEFAULT_KEY_PREFIX: &str = "crl";

const LAST_PUBLISHED: &str = "last_published";
const NEXT_UPDATE: &str = "next_update";

/// A Redis revocation store.
///
/// Entries live in one hash keyed by serial, so every upsert is a single
/// `HSET`. The window is a second hash written with one multi-field `HSET`.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    prefix: String,
}

impl RedisStore {
    /// Creates a new Redis store from a connection manager.
    pub fn new(conn: ConnectionManager) -> Self {
        Self {
            conn,
            prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }

    /// Namespaces every key under `prefix` instead of the default `crl`.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    fn entries_key(&self) -> String {
        format!("{}:entries", self.prefix)
    }

    fn window_key(&self) -> String {
        format!("{}:window", self.prefix)
    }
}

#[async_trait]
impl CrlStore for RedisStore {
    async fn upsert_entry(&self, serial: &str, record: &RevocationRecord) -> Result<()> {
        let mut conn = self.conn.clone();
        let value = serde_json::to_string(record)?;
        let _: () = conn.hset(self.entries_key(), serial, value).await?;
        Ok(())
    }

    async fn entries(&self) -> Result<EntryListing> {
        let mut conn = self.conn.clone();
        let rows: HashMap<String, String> = conn.hgetall(self.entries_key()).await?;
        Ok(decode_entries(rows))
    }

    async fn load_window(&self) -> Result<Option<PublicationWindow>> {
        let mut conn = self.conn.clone();
        let fields: HashMap<String, String> = conn.hgetall(self.window_key()).await?;
        decode_window(&fields)
    }

    async fn save_window(&self, window: &PublicationWindow) -> Result<()> {
        let mut conn = self.conn.clone();
        let fields = [
            (LAST_PUBLISHED, encode_time(window.last_published())),
            (NEXT_UPDATE, encode_time(window.next_update())),
        ];
        let _: () = conn.hset_multiple(self.window_key(), &fields).await?;
        Ok(())
    }
}

fn decode_entries(rows: HashMap<String, String>) -> EntryListing {
    let mut listing = EntryListing::default();
    for (serial, value) in rows {
        match serde_json::from_str::<RevocationRecord>(&value) {
            Ok(record) => listing
                .entries
                .push(RevocationEntry::from_record(serial, record)),
            Err(e) => {
                tracing::error!("Failed to decode revocation entry {serial}: {e}");
                listing.unreadable += 1;
            }
        }
    }
    listing
}

fn decode_window(fields: &HashMap<String, String>) -> Result<Option<PublicationWindow>> {
    if fields.is_empty() {
        return Ok(None);
    }
    let last_published = decode_time(fields, LAST_PUBLISHED)?;
    let next_update = decode_time(fields, NEXT_UPDATE)?;
    Ok(Some(PublicationWindow::from_parts(last_published, next_update)))
}

fn decode_time(fields: &HashMap<String, String>, name: &'static str) -> Result<DateTime<Utc>> {
    let raw = fields
        .get(name)
        .ok_or_else(|| StoreError::msg(format!("publication window is missing {name}")))?;
    DateTime::parse_from_rfc3339(raw)
        .map(|time| time.with_timezone(&Utc))
        .map_err(StoreError::new)
}

fn encode_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Nanos, true)
}
