use thiserror::Error;

use super::store::StoreError;

/// Errors surfaced by the revocation-list engine.
#[derive(Error, Debug)]
pub enum CrlError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Revocation storage unavailable: {0}")]
    StorageUnavailable(#[from] StoreError),

    #[error("CRL was rendered but the publication window could not be advanced: {0}")]
    PublicationIncomplete(#[source] StoreError),

    #[error("Timed out after {0:?} waiting for revocation storage")]
    Timeout(std::time::Duration),
}

impl CrlError {
    /// Short machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            CrlError::InvalidInput(_) => "InvalidInput",
            CrlError::StorageUnavailable(_) => "StorageUnavailable",
            CrlError::PublicationIncomplete(_) => "PublicationIncomplete",
            CrlError::Timeout(_) => "Timeout",
        }
    }
}

/// Non-fatal conditions reported next to a successfully rendered document.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderWarning {
    #[error("{skipped} revocation entries were skipped ({rendered} rendered)")]
    PartialRender { rendered: usize, skipped: usize },
}

/// Convenient Result type alias
pub type CrlResult<T> = Result<T, CrlError>;
