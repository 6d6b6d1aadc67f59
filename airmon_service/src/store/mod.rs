//! Reading persistence.
//!
//! The service talks to storage only through `ReadingStore`. `main` opens
//! one store at startup, hands it to the endpoint, and closes it on
//! shutdown; nothing in the crate keeps a process-wide handle.
//!
//! Implementations:
//! - `postgres` — `air.readings` table, the production backend
//! - `memory`   — process-local `Vec`, for development and tests

pub mod memory;
pub mod postgres;

pub use self::memory::MemoryStore;
pub use self::postgres::PostgresStore;

use crate::model::Reading;
use std::fmt;

/// Storage failure. Surfaced to HTTP clients as a 500.
#[derive(Debug)]
pub enum StoreError {
    /// Query or connection failure from PostgreSQL
    Database(::postgres::Error),
    /// A concentration could not be represented as NUMERIC
    Encode { field: &'static str, value: f64 },
    /// A stored row could not be turned back into a `Reading`
    Decode(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Database(e) => write!(f, "{}", e),
            StoreError::Encode { field, value } => {
                write!(f, "cannot store {} value {} as NUMERIC", field, value)
            }
            StoreError::Decode(msg) => write!(f, "invalid stored reading: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Database(e) => Some(e),
            _ => None,
        }
    }
}

impl From<::postgres::Error> for StoreError {
    fn from(e: ::postgres::Error) -> Self {
        StoreError::Database(e)
    }
}

/// Append-only log of readings.
///
/// Ordering is by `Reading::timestamp`; readings sharing a timestamp keep
/// insertion order.
pub trait ReadingStore: Send {
    /// Short backend name for health output ("postgres", "memory").
    fn backend(&self) -> &'static str;

    /// Appends a reading.
    fn insert(&mut self, reading: &Reading) -> Result<(), StoreError>;

    /// Most recent reading, if any.
    fn latest(&mut self) -> Result<Option<Reading>, StoreError>;

    /// The `limit` most recent readings, returned oldest first.
    fn recent(&mut self, limit: usize) -> Result<Vec<Reading>, StoreError>;

    /// Number of stored readings.
    fn count(&mut self) -> Result<u64, StoreError>;

    /// Releases the backend. Called once at shutdown.
    fn close(self: Box<Self>) -> Result<(), StoreError>;
}
