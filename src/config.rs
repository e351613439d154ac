//! Session configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Result;

const DEFAULT_FETCH_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_PERSIST_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_PLACEHOLDER: &str = "Private";

/// Knobs for one viewer session.
///
/// Every field has a default, so `{}` is a valid JSON config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Upper bound on a child-list fetch.
    pub fetch_timeout_ms: u64,
    /// Upper bound on create / delete / privacy updates.
    pub persist_timeout_ms: u64,
    /// Text substituted for every personal field of a redacted occupant.
    pub redacted_placeholder: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
            persist_timeout_ms: DEFAULT_PERSIST_TIMEOUT_MS,
            redacted_placeholder: DEFAULT_PLACEHOLDER.to_string(),
        }
    }
}

impl SessionConfig {
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout_ms = millis(timeout);
        self
    }

    pub fn with_persist_timeout(mut self, timeout: Duration) -> Self {
        self.persist_timeout_ms = millis(timeout);
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.redacted_placeholder = placeholder.into();
        self
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn persist_timeout(&self) -> Duration {
        Duration::from_millis(self.persist_timeout_ms)
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
