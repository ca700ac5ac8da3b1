//! Retention policy for each key namespace.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::keys::{COUNTER_PREFIX, EVENT_PREFIX, VISITOR_PREFIX};

/// Raw event records are kept for one year.
pub const EVENT_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Visitor markers are kept for 30 days.
pub const VISITOR_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Namespaces of keys written by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyNamespace {
    Event,
    Counter,
    Visitor,
}

impl KeyNamespace {
    /// Key prefix for this namespace.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Event => EVENT_PREFIX,
            Self::Counter => COUNTER_PREFIX,
            Self::Visitor => VISITOR_PREFIX,
        }
    }

    /// Expiry applied when writing a key of this namespace.
    ///
    /// Counters never expire.
    pub fn ttl(&self) -> Option<Duration> {
        match self {
            Self::Event => Some(EVENT_TTL),
            Self::Counter => None,
            Self::Visitor => Some(VISITOR_TTL),
        }
    }
}
