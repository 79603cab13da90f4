use std::fmt::{self, Write as _};

use chrono::SecondsFormat;
use tracing::warn;

use super::errors::RenderWarning;
use super::types::RevocationEntry;

pub const CRL_HEADER: &str = "-----BEGIN X509 CRL-----";
pub const CRL_FOOTER: &str = "-----END X509 CRL-----";

/// A rendered revocation list plus what was left out of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrlDocument {
    text: String,
    entry_count: usize,
    skipped: usize,
}

impl CrlDocument {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    /// Size of the document in bytes.
    pub fn byte_len(&self) -> usize {
        self.text.len()
    }

    /// Number of entry lines in the document.
    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    /// Number of entries that could not be rendered or read back from storage.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn warning(&self) -> Option<RenderWarning> {
        (self.skipped > 0).then_some(RenderWarning::PartialRender {
            rendered: self.entry_count,
            skipped: self.skipped,
        })
    }

    /// Folds rows the store could not decode into the skipped count.
    pub(crate) fn with_unreadable(mut self, unreadable: usize) -> Self {
        self.skipped += unreadable;
        self
    }
}

impl fmt::Display for CrlDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Turns an ordered entry sequence into a CRL document.
///
/// Implementations must be deterministic and free of I/O. The entry order is
/// decided by the caller and must be preserved.
pub trait CrlRenderer: Send + Sync + fmt::Debug {
    fn render(&self, entries: &[RevocationEntry]) -> CrlDocument;
}

/// The line-oriented, unsigned text format:
///
/// ```text
/// -----BEGIN X509 CRL-----
/// <serial>,<revoked at, RFC 3339>,<reason>
/// -----END X509 CRL-----
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PemTextRenderer;

impl CrlRenderer for PemTextRenderer {
    fn render(&self, entries: &[RevocationEntry]) -> CrlDocument {
        let mut text = String::with_capacity(CRL_HEADER.len() + CRL_FOOTER.len() + 2 + entries.len() * 64);
        let mut entry_count = 0;
        let mut skipped = 0;

        text.push_str(CRL_HEADER);
        text.push('\n');
        for entry in entries {
            if let Some(problem) = field_problem(&entry.serial, &entry.reason) {
                warn!("Skipping CRL entry {:?}: {}", entry.serial, problem);
                skipped += 1;
                continue;
            }
            // Writing into a String cannot fail.
            let _ = writeln!(
                text,
                "{},{},{}",
                entry.serial,
                entry.revoked_at.to_rfc3339_opts(SecondsFormat::Secs, true),
                entry.reason
            );
            entry_count += 1;
        }
        text.push_str(CRL_FOOTER);
        text.push('\n');

        CrlDocument {
            text,
            entry_count,
            skipped,
        }
    }
}

/// Renders with the default text format.
pub fn render(entries: &[RevocationEntry]) -> CrlDocument {
    PemTextRenderer.render(entries)
}

/// Reports why a serial/reason pair cannot be represented as one CRL line.
pub(crate) fn field_problem(serial: &str, reason: &str) -> Option<&'static str> {
    if serial.is_empty() {
        return Some("serial number is required");
    }
    if serial.contains(',') {
        return Some("serial number must not contain commas");
    }
    if serial.contains(['\n', '\r']) || reason.contains(['\n', '\r']) {
        return Some("line breaks are not allowed");
    }
    None
}
