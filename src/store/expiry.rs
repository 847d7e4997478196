//! Expiration policy
//!
//! Turns a relative time-to-live into an absolute timestamp (Unix epoch
//! milliseconds). Nothing here evicts; `expires` is metadata for whoever
//! sweeps the store.

use std::time::Duration;

use chrono::{DateTime, Utc};

/// When a written item should be considered stale
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Expiry {
    #[default]
    Never,
    /// Relative time-to-live from the moment of the write
    In(Duration),
    /// Absolute instant
    At(DateTime<Utc>),
}

impl From<Duration> for Expiry {
    fn from(ttl: Duration) -> Self {
        Expiry::In(ttl)
    }
}

impl From<Option<Duration>> for Expiry {
    fn from(ttl: Option<Duration>) -> Self {
        ttl.map_or(Expiry::Never, Expiry::In)
    }
}

impl From<DateTime<Utc>> for Expiry {
    fn from(at: DateTime<Utc>) -> Self {
        Expiry::At(at)
    }
}

/// Absolute expiry for a write happening now
pub fn compute_expiry(expiry: Expiry) -> Option<i64> {
    compute_expiry_from(Utc::now(), expiry)
}

/// Absolute expiry relative to `now`. Saturates instead of overflowing.
pub fn compute_expiry_from(now: DateTime<Utc>, expiry: Expiry) -> Option<i64> {
    match expiry {
        Expiry::Never => None,
        Expiry::In(ttl) => {
            let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
            Some(now.timestamp_millis().saturating_add(ttl_ms))
        }
        Expiry::At(at) => Some(at.timestamp_millis()),
    }
}

/// Current time in the unit used by `expires`
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
