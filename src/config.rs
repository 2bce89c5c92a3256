//! Relay tunables.
//!
//! [`Config`] derives `Deserialize` so a proxy can embed it in its own
//! configuration file; missing fields fall back to the defaults below.

use serde::Deserialize;
use std::time::Duration;

use crate::error;

pub const DEFAULT_BUFFER_SIZE: usize = 32 * 1024;

/// What a direction does to the connections once it stops copying.
///
/// * `NoClose` leaves both connections untouched. If one peer stalls without
///   ever sending end-of-stream, its direction blocks until the caller closes
///   the session or an idle timeout fires.
/// * `HalfClose` shuts down the write side of the destination, so its peer
///   sees end-of-stream while the opposite direction keeps delivering
///   whatever is still in flight.
/// * `CloseBoth` shuts down the destination and stops the opposite direction
///   too. Sessions end promptly, but bytes the other direction had not yet
///   delivered are dropped. Both connections are closed before `run` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClosePolicy {
    NoClose,
    #[default]
    HalfClose,
    CloseBoth,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Close discipline applied when a direction ends
    #[serde(default)]
    pub policy: ClosePolicy,
    /// Size of each direction's transfer buffer in bytes
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
    /// Longest a read may wait for data before its direction gives up
    #[serde(default)]
    pub idle_timeout_ms: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            policy: ClosePolicy::default(),
            buffer_size: default_buffer_size(),
            idle_timeout_ms: None,
        }
    }
}

fn default_buffer_size() -> usize {
    DEFAULT_BUFFER_SIZE
}

impl Config {
    pub fn with_policy(mut self, policy: ClosePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout_ms = Some(timeout.as_millis().try_into().unwrap_or(u64::MAX));
        self
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout_ms.map(Duration::from_millis)
    }

    pub fn validate(&self) -> Result<(), error::Box> {
        if self.buffer_size == 0 {
            Err("buffer_size must be greater than zero")?
        }

        if self.idle_timeout_ms == Some(0) {
            Err("idle_timeout_ms must be greater than zero when set")?
        }

        Ok(())
    }
}
