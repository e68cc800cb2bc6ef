//! Configuration for the remote mutator.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Longest server-requested wait the mutator sleeps through by default.
const DEFAULT_MAX_RETRY_WAIT: Duration = Duration::from_secs(5);

/// What a mutating call does when the service rate-limits it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateLimitPolicy {
    /// Return [`MessageError::RateLimited`](crate::message::error::MessageError::RateLimited)
    /// to the caller immediately.
    #[default]
    Surface,
    /// Suspend for the requested wait, then retry exactly once. A second rate
    /// limit is surfaced.
    RetryOnce,
}

/// Remote mutator settings.
///
/// # Examples
///
/// ```
/// use herald::message::services::{MutatorConfig, RateLimitPolicy};
/// use std::time::Duration;
///
/// let config = MutatorConfig::default();
/// assert_eq!(config.rate_limit, RateLimitPolicy::Surface);
///
/// let parsed = MutatorConfig::from_json(r#"{"rate_limit":"retry_once","max_retry_wait_ms":250}"#)
///     .expect("valid configuration");
/// assert_eq!(parsed.rate_limit, RateLimitPolicy::RetryOnce);
/// assert_eq!(parsed.max_retry_wait, Duration::from_millis(250));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MutatorConfig {
    /// Policy applied when a call is rate-limited.
    pub rate_limit: RateLimitPolicy,
    /// Requested waits longer than this are surfaced even under
    /// [`RateLimitPolicy::RetryOnce`].
    #[serde(rename = "max_retry_wait_ms", with = "duration_millis")]
    pub max_retry_wait: Duration,
}

impl Default for MutatorConfig {
    fn default() -> Self {
        Self {
            rate_limit: RateLimitPolicy::Surface,
            max_retry_wait: DEFAULT_MAX_RETRY_WAIT,
        }
    }
}

impl MutatorConfig {
    /// Surfaces every rate limit to the caller.
    #[must_use]
    pub fn surface() -> Self {
        Self::default()
    }

    /// Retries once after each rate limit within the default wait cap.
    #[must_use]
    pub fn retry_once() -> Self {
        Self {
            rate_limit: RateLimitPolicy::RetryOnce,
            ..Self::default()
        }
    }

    /// Sets the longest wait the mutator will sleep through.
    #[must_use]
    pub const fn with_max_retry_wait(mut self, max_retry_wait: Duration) -> Self {
        self.max_retry_wait = max_retry_wait;
        self
    }

    /// Parses a configuration from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`MutatorConfigError`] when the JSON is malformed.
    pub fn from_json(raw: &str) -> Result<Self, MutatorConfigError> {
        serde_json::from_str(raw).map_err(|err| MutatorConfigError(err.to_string()))
    }

    /// Returns `true` if a call rate-limited for `retry_after` should sleep and
    /// retry under `policy`.
    #[must_use]
    pub fn permits_retry(&self, policy: RateLimitPolicy, retry_after: Duration) -> bool {
        policy == RateLimitPolicy::RetryOnce && retry_after <= self.max_retry_wait
    }
}

/// Error returned when a configuration cannot be parsed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid mutator configuration: {0}")]
pub struct MutatorConfigError(pub String);

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
