//! Certificate Revocation List (CRL) issuing engine
//!
//! # Components
//! - [`RevocationStore`]: validated, last-write-wins recording of revocations
//!   over a pluggable [`CrlStore`] backend
//! - [`assembler`]: deterministic rendering of an ordered entry list into a
//!   CRL document
//! - [`PublicationScheduler`]: publication with a persisted validity window
//!   and staleness checks for an external driver

pub mod assembler;
pub mod clock;
mod errors;
mod revocation;
pub mod scheduler;
pub mod service;
pub mod store;
#[cfg(test)]
pub(crate) mod testing;
mod types;

// Re-export public types
pub use assembler::{CrlDocument, CrlRenderer, PemTextRenderer, render};
pub use clock::{Clock, ManualClock, SystemClock};
pub use errors::{CrlError, CrlResult, RenderWarning};
pub use revocation::{DEFAULT_OPERATION_TIMEOUT, RevocationStore};
pub use scheduler::{DEFAULT_VALIDITY_SECS, Publication, PublicationScheduler};
pub use service::{CrlService, PublicationStatus};
pub use store::{CrlStore, MemoryStore, RedisStore, StoreError};
pub use types::{EntryListing, PublicationWindow, RevocationEntry, RevocationRecord};
